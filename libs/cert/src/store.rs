//! `CertificateSet` and the chain-validation algorithm (§4.2, the central
//! correctness contract of this component).

use crate::cert::{Certificate, CertType, KeyPurpose, KeyUsage};
use crate::dn::{CertificateKeyId, DistinguishedName};
use crate::error::{CertError, CertResult};
use crate::packed_time::packed_date_to_time;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateFlags {
    pub ignore_not_before: bool,
    pub ignore_not_after: bool,
    pub require_sha256: bool,
}

#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub effective_time: u32,
    pub flags: ValidateFlags,
    pub required_key_usages: KeyUsage,
    pub required_key_purposes: KeyPurpose,
    pub required_cert_type: Option<CertType>,
    /// Populated on success with the index (into the owning `CertificateSet`)
    /// of the trust anchor that terminated the chain.
    pub trust_anchor: Option<usize>,
}

impl ValidationContext {
    pub fn new(effective_time: u32) -> Self {
        Self {
            effective_time,
            flags: ValidateFlags::default(),
            required_key_usages: KeyUsage::default(),
            required_key_purposes: KeyPurpose::default(),
            required_cert_type: None,
            trust_anchor: None,
        }
    }
}

/// Bounded collection of certs (§3). Certs reference each other only through
/// the owning set's indices — never through direct pointers — per §9's
/// "arena plus opaque indices" guidance for the original's cyclic pointer
/// graph.
pub struct CertificateSet {
    certs: Vec<Certificate>,
    capacity: usize,
}

/// An opaque index into a `CertificateSet`. Never outlives the set (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertRef(pub usize);

impl CertificateSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            certs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn get(&self, r: CertRef) -> &Certificate {
        &self.certs[r.0]
    }

    /// Load an already-decoded certificate into the set (decoding itself —
    /// parsing Weave-TLV and computing the TBS hash — is `crate::weave`'s
    /// job; this is the step the original calls `LoadCert` after decode).
    pub fn load_cert(&mut self, cert: Certificate) -> CertResult<CertRef> {
        if self.certs.len() >= self.capacity {
            return Err(CertError::NoMemory {
                capacity: self.capacity,
            });
        }
        self.certs.push(cert);
        Ok(CertRef(self.certs.len() - 1))
    }

    pub fn load_certs(&mut self, certs: Vec<Certificate>) -> CertResult<Vec<CertRef>> {
        certs.into_iter().map(|c| self.load_cert(c)).collect()
    }

    /// Synthesize a trust anchor without parsing a wire certificate — used
    /// when the trust root is embedded rather than transmitted.
    pub fn add_trusted_key(
        &mut self,
        ca_id: DistinguishedName,
        curve: crate::cert::CurveId,
        public_key: Vec<u8>,
        key_id: CertificateKeyId,
    ) -> CertResult<CertRef> {
        let synthetic = Certificate {
            serial_number: Vec::new(),
            issuer: ca_id.clone(),
            subject: ca_id,
            not_before: 0,
            not_after: 0,
            public_key_algorithm: curve,
            public_key: crate::cert::PublicKey::Ec {
                curve,
                point: public_key,
            },
            signature_algorithm: crate::cert::SignatureAlgorithm::EcdsaWithSha256,
            signature: crate::cert::EcdsaSignature {
                r: Vec::new(),
                s: Vec::new(),
            },
            subject_key_id: key_id.clone(),
            authority_key_id: key_id,
            key_usage: KeyUsage {
                key_cert_sign: true,
                ..Default::default()
            },
            extended_key_usage: None,
            basic_constraints: Some(crate::cert::BasicConstraints {
                is_ca: true,
                path_len_constraint: None,
            }),
            cert_type: CertType::Ca,
            is_trusted: true,
            tbs_hash: None,
        };
        self.load_cert(synthetic)
    }

    /// Iterates all certs currently loaded, paired with their `CertRef`.
    pub fn iter(&self) -> impl Iterator<Item = (CertRef, &Certificate)> {
        self.certs.iter().enumerate().map(|(i, c)| (CertRef(i), c))
    }

    pub fn find_cert(&self, subject_key_id: &CertificateKeyId) -> Option<CertRef> {
        self.certs
            .iter()
            .position(|c| &c.subject_key_id == subject_key_id)
            .map(CertRef)
    }

    /// The chain-validation algorithm (§4.2). `depth` is the distance of
    /// `cert_ref` from the leaf under test (0 == the leaf itself).
    pub fn validate_cert(
        &self,
        cert_ref: CertRef,
        ctx: &mut ValidationContext,
        depth: u8,
    ) -> CertResult<()> {
        let cert = self.get(cert_ref);

        // Step 1: non-leaf certs in the chain must be CAs with signing rights.
        if depth > 0 {
            if !cert.is_ca() || !cert.key_usage.key_cert_sign || cert.cert_type != CertType::Ca {
                return Err(CertError::PathLenConstraintExceeded {
                    depth,
                    constraint: cert.path_len_constraint().unwrap_or(0),
                });
            }
            if let Some(constraint) = cert.path_len_constraint() {
                if depth.saturating_sub(1) > constraint {
                    return Err(CertError::PathLenConstraintExceeded { depth, constraint });
                }
            }
        }

        // Step 2: the leaf must satisfy the caller's required usage/purpose/type.
        if depth == 0 {
            if !cert.key_usage.contains_all(&ctx.required_key_usages) {
                return Err(CertError::UsageNotAllowed {
                    usage: "required key usage not present on leaf".to_string(),
                });
            }
            let purposes_ok = cert
                .extended_key_usage
                .map(|eku| eku.contains_all(&ctx.required_key_purposes))
                .unwrap_or(ctx.required_key_purposes == KeyPurpose::default());
            if !purposes_ok {
                return Err(CertError::UsageNotAllowed {
                    usage: "required key purpose not present on leaf".to_string(),
                });
            }
            if let Some(required_type) = ctx.required_cert_type {
                if cert.cert_type != required_type {
                    return Err(CertError::WrongCertType {
                        required: format!("{required_type:?}"),
                        actual: format!("{:?}", cert.cert_type),
                    });
                }
            }
        }

        // Step 3: validity window. A sentinel date (0) means "no well-defined
        // bound" and skips its half of the check entirely, on both ends.
        if !ctx.flags.ignore_not_before && cert.not_before != 0 {
            let not_before = packed_date_to_time(cert.not_before);
            if ctx.effective_time < not_before {
                return Err(CertError::NotYetValid {
                    effective: ctx.effective_time,
                    not_before: cert.not_before,
                });
            }
        }
        if !ctx.flags.ignore_not_after && cert.not_after != 0 {
            let not_after = packed_date_to_time(cert.not_after).saturating_add(
                crate::packed_time::SECONDS_PER_DAY - 1,
            );
            if ctx.effective_time > not_after {
                return Err(CertError::CertExpired {
                    effective: ctx.effective_time,
                    not_after: cert.not_after,
                });
            }
        }

        // Step 4: trusted certs terminate the chain immediately.
        if cert.is_trusted {
            ctx.trust_anchor = Some(cert_ref.0);
            return Ok(());
        }

        // Step 5: otherwise the cert must chain to something trusted.
        if cert.is_self_signed() {
            return Err(CertError::CertNotTrusted);
        }
        if depth as usize >= self.certs.len() {
            return Err(CertError::DepthExceeded(depth));
        }
        if cert.tbs_hash.is_none() {
            return Err(CertError::UnsupportedCertFormat {
                reason: "no TBS hash computed at load time".to_string(),
            });
        }
        if ctx.flags.require_sha256
            && cert.signature_algorithm != crate::cert::SignatureAlgorithm::EcdsaWithSha256
        {
            return Err(CertError::InvalidSignature);
        }
        let mut recursive_flags = ctx.flags;
        if cert.signature_algorithm == crate::cert::SignatureAlgorithm::EcdsaWithSha256 {
            recursive_flags.require_sha256 = true;
        }

        // Step 6: find and validate the issuer, then verify this cert's signature.
        let issuer_ref = self.find_valid_cert(
            &cert.issuer,
            &cert.authority_key_id,
            ctx,
            recursive_flags,
            depth + 1,
        )?;
        let issuer = self.get(issuer_ref);
        crate::sign::verify_signature(cert, issuer).map_err(|_| CertError::InvalidSignature)?;
        Ok(())
    }

    /// `FindValidCert`: scans the set for a candidate matching `subject` and
    /// `subject_key_id`, returning the first one that validates.
    pub fn find_valid_cert(
        &self,
        subject: &DistinguishedName,
        subject_key_id: &CertificateKeyId,
        ctx: &mut ValidationContext,
        flags: ValidateFlags,
        depth: u8,
    ) -> CertResult<CertRef> {
        let mut last_error = None;
        for (i, candidate) in self.certs.iter().enumerate() {
            if !candidate.subject.is_equal(subject) || &candidate.subject_key_id != subject_key_id
            {
                continue;
            }
            let candidate_ref = CertRef(i);
            let mut sub_ctx = ValidationContext {
                effective_time: ctx.effective_time,
                flags,
                required_key_usages: KeyUsage::default(),
                required_key_purposes: KeyPurpose::default(),
                required_cert_type: None,
                trust_anchor: None,
            };
            match self.validate_cert(candidate_ref, &mut sub_ctx, depth) {
                Ok(()) => {
                    ctx.trust_anchor = sub_ctx.trust_anchor;
                    return Ok(candidate_ref);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or(if depth > 0 {
            CertError::CaCertNotFound { depth }
        } else {
            CertError::CertNotFound
        }))
    }

    /// Emit `first` as a pre-encoded container, then every other non-trusted
    /// (and optionally trusted) cert, into `writer`.
    pub fn save_certs(
        &self,
        writer: &mut tlv::Writer,
        first: CertRef,
        include_trusted: bool,
    ) -> CertResult<()> {
        crate::weave::encode_cert_list(writer, self, first, include_trusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::{BasicConstraints, CurveId, EcdsaSignature, PublicKey, SignatureAlgorithm};
    use crate::dn::DnOid;
    use crate::packed_time::pack_date;

    fn device_cert(not_before: u32, not_after: u32) -> Certificate {
        Certificate {
            serial_number: vec![1],
            issuer: DistinguishedName::weave_id(DnOid::WeaveCaId, 0x18B4_3002_0000_0001),
            subject: DistinguishedName::weave_id(DnOid::WeaveDeviceId, 0x18B4_3000_0000_00AA),
            not_before,
            not_after,
            public_key_algorithm: CurveId::Secp224r1,
            public_key: PublicKey::Ec {
                curve: CurveId::Secp224r1,
                point: vec![4; 57],
            },
            signature_algorithm: SignatureAlgorithm::EcdsaWithSha256,
            signature: EcdsaSignature {
                r: vec![0; 28],
                s: vec![0; 28],
            },
            subject_key_id: CertificateKeyId::new(vec![0xAA; 20]).unwrap(),
            authority_key_id: CertificateKeyId::new(vec![0xBB; 20]).unwrap(),
            key_usage: KeyUsage {
                digital_signature: true,
                ..Default::default()
            },
            extended_key_usage: None,
            basic_constraints: None,
            cert_type: CertType::Device,
            is_trusted: false,
            tbs_hash: Some(vec![0u8; 32]),
        }
    }

    fn ca_cert(key_id: CertificateKeyId, trusted: bool) -> Certificate {
        Certificate {
            serial_number: vec![2],
            issuer: DistinguishedName::weave_id(DnOid::WeaveCaId, 0x18B4_3002_0000_0001),
            subject: DistinguishedName::weave_id(DnOid::WeaveCaId, 0x18B4_3002_0000_0001),
            not_before: 0,
            not_after: 0,
            public_key_algorithm: CurveId::Secp224r1,
            public_key: PublicKey::Ec {
                curve: CurveId::Secp224r1,
                point: vec![4; 57],
            },
            signature_algorithm: SignatureAlgorithm::EcdsaWithSha256,
            signature: EcdsaSignature {
                r: vec![0; 28],
                s: vec![0; 28],
            },
            subject_key_id: key_id.clone(),
            authority_key_id: key_id,
            key_usage: KeyUsage {
                key_cert_sign: true,
                ..Default::default()
            },
            extended_key_usage: None,
            basic_constraints: Some(BasicConstraints {
                is_ca: true,
                path_len_constraint: None,
            }),
            cert_type: CertType::Ca,
            is_trusted: trusted,
            tbs_hash: None,
        }
    }

    /// S1: a trust-anchored CA validates a device cert within its window.
    #[test]
    fn s1_validates_within_window() {
        let mut set = CertificateSet::new(4);
        let ca_key_id = CertificateKeyId::new(vec![0xBB; 20]).unwrap();
        let ca_ref = set.load_cert(ca_cert(ca_key_id, true)).unwrap();
        let mut leaf = device_cert(
            pack_date(2023, 6, 1),
            pack_date(2028, 6, 1),
        );
        leaf.authority_key_id = set.get(ca_ref).subject_key_id.clone();
        let leaf_ref = set.load_cert(leaf).unwrap();

        let mut ctx = ValidationContext::new(pack_date(2024, 1, 1) * 86_400);
        set.validate_cert(leaf_ref, &mut ctx, 0).unwrap();
        assert_eq!(ctx.trust_anchor, Some(ca_ref.0));
    }

    /// S2: same chain, effective time past not-after.
    #[test]
    fn s2_expired_cert_is_rejected() {
        let mut set = CertificateSet::new(4);
        let ca_key_id = CertificateKeyId::new(vec![0xBB; 20]).unwrap();
        let ca_ref = set.load_cert(ca_cert(ca_key_id, true)).unwrap();
        let mut leaf = device_cert(pack_date(2023, 6, 1), pack_date(2028, 6, 1));
        leaf.authority_key_id = set.get(ca_ref).subject_key_id.clone();
        let leaf_ref = set.load_cert(leaf).unwrap();

        let mut ctx = ValidationContext::new(pack_date(2029, 1, 1) * 86_400);
        let err = set.validate_cert(leaf_ref, &mut ctx, 0).unwrap_err();
        assert!(matches!(err, CertError::CertExpired { .. }));
    }

    #[test]
    fn untrusted_self_signed_cert_is_rejected() {
        let mut set = CertificateSet::new(4);
        let key_id = CertificateKeyId::new(vec![0xCC; 20]).unwrap();
        let self_signed = ca_cert(key_id, false);
        let cert_ref = set.load_cert(self_signed).unwrap();
        let mut ctx = ValidationContext::new(0);
        ctx.flags.ignore_not_before = true;
        ctx.flags.ignore_not_after = true;
        let err = set.validate_cert(cert_ref, &mut ctx, 0).unwrap_err();
        assert_eq!(err, CertError::CertNotTrusted);
    }
}
