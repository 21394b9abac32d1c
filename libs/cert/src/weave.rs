//! Weave-TLV certificate encode/decode (`LoadCert`/`LoadCerts`, `encode_cert_list`),
//! built on top of [`tlv`]'s generic [`tlv::TlvValue`] tree rather than hand-driving
//! the reader/writer: a certificate is a handful of scalar and nested-container
//! fields, which is exactly what the generic tree already round-trips.

use crate::cert::{
    BasicConstraints, Certificate, CertType, CurveId, EcdsaSignature, KeyPurpose, KeyUsage,
    PublicKey, SignatureAlgorithm,
};
use crate::dn::{CertificateKeyId, DistinguishedName, DnOid, DnValue};
use crate::error::{CertError, CertResult};
use crate::store::{CertRef, CertificateSet};
use tlv::{ContainerKind, Reader, Tag, TlvValue, Writer};

const TAG_SERIAL_NUMBER: u8 = 1;
const TAG_SIGNATURE_ALGORITHM: u8 = 2;
const TAG_ISSUER: u8 = 3;
const TAG_NOT_BEFORE: u8 = 4;
const TAG_NOT_AFTER: u8 = 5;
const TAG_SUBJECT: u8 = 6;
const TAG_PUBLIC_KEY_CURVE: u8 = 7;
const TAG_PUBLIC_KEY_POINT: u8 = 8;
const TAG_SIGNATURE: u8 = 9;
const TAG_SIGNATURE_R: u8 = 1;
const TAG_SIGNATURE_S: u8 = 2;
const TAG_SUBJECT_KEY_ID: u8 = 10;
const TAG_AUTHORITY_KEY_ID: u8 = 11;
const TAG_KEY_USAGE: u8 = 12;
const TAG_EXTENDED_KEY_USAGE: u8 = 13;
const TAG_BASIC_CONSTRAINTS: u8 = 14;
const TAG_BASIC_CONSTRAINTS_IS_CA: u8 = 1;
const TAG_BASIC_CONSTRAINTS_PATH_LEN: u8 = 2;
const TAG_CERT_TYPE: u8 = 15;

const DN_TAG_WEAVE_DEVICE_ID: u8 = 1;
const DN_TAG_WEAVE_CA_ID: u8 = 2;
const DN_TAG_WEAVE_SERVICE_ENDPOINT_ID: u8 = 3;
const DN_TAG_WEAVE_SOFTWARE_PUBLISHER_ID: u8 = 4;
const DN_TAG_COMMON_NAME: u8 = 5;
const DN_TAG_ORGANIZATION: u8 = 6;
const DN_TAG_OTHER_PRINTABLE: u8 = 7;
const DN_TAG_OTHER_IA5: u8 = 8;
const DN_TAG_OTHER_UTF8: u8 = 9;

/// Parses a single Weave-TLV certificate structure, computing `tbs_hash`
/// over the bytes covered by the signed fields (everything up to, but not
/// including, the `signature` field) per `LoadCert` (§4.2).
pub fn load_cert(bytes: &[u8]) -> CertResult<Certificate> {
    let (_, value) = tlv::parse(bytes)?;
    cert_from_tlv_value(&value, bytes)
}

/// Parses a top-level Array of certificate structures (`LoadCerts`, §4.2).
pub fn load_certs(bytes: &[u8]) -> CertResult<Vec<Certificate>> {
    let (_, value) = tlv::parse(bytes)?;
    let TlvValue::Container(ContainerKind::Array, entries) = value else {
        return Err(CertError::UnsupportedCertFormat {
            reason: "expected a top-level array of certificates".to_string(),
        });
    };
    entries
        .iter()
        .map(|(_, v)| {
            let encoded = tlv::pack(Tag::Anonymous, v)?;
            cert_from_tlv_value(v, &encoded)
        })
        .collect()
}

/// Writes `first`, then every other loaded cert (optionally skipping
/// trust anchors), as a Weave-TLV certificate array.
pub fn encode_cert_list(
    writer: &mut Writer,
    set: &CertificateSet,
    first: CertRef,
    include_trusted: bool,
) -> CertResult<()> {
    let mut ordered = vec![set.get(first)];
    for (r, c) in set.iter() {
        if r == first {
            continue;
        }
        if c.is_trusted && !include_trusted {
            continue;
        }
        ordered.push(c);
    }

    writer.start_container(Tag::Anonymous, ContainerKind::Array);
    for cert in ordered {
        let value = cert_to_tlv_value(cert);
        let encoded = tlv::pack(Tag::Anonymous, &value)?;
        let mut reader = Reader::new(&encoded);
        reader.next()?;
        let (kind, body) = reader.container_body()?;
        writer.put_pre_encoded_container(Tag::Anonymous, kind, body);
    }
    writer.end_container()?;
    Ok(())
}

fn cert_to_tlv_value(cert: &Certificate) -> TlvValue {
    let mut fields = vec![
        (
            Tag::Context(TAG_SERIAL_NUMBER),
            TlvValue::ByteString(cert.serial_number.clone()),
        ),
        (
            Tag::Context(TAG_SIGNATURE_ALGORITHM),
            TlvValue::Unsigned(sig_alg_to_wire(cert.signature_algorithm) as u64),
        ),
        (Tag::Context(TAG_ISSUER), dn_to_tlv_value(&cert.issuer)),
        (
            Tag::Context(TAG_NOT_BEFORE),
            TlvValue::Unsigned(cert.not_before as u64),
        ),
        (
            Tag::Context(TAG_NOT_AFTER),
            TlvValue::Unsigned(cert.not_after as u64),
        ),
        (Tag::Context(TAG_SUBJECT), dn_to_tlv_value(&cert.subject)),
        (
            Tag::Context(TAG_PUBLIC_KEY_CURVE),
            TlvValue::Unsigned(curve_to_wire(cert.public_key_algorithm) as u64),
        ),
    ];

    match &cert.public_key {
        PublicKey::Ec { point, .. } => fields.push((
            Tag::Context(TAG_PUBLIC_KEY_POINT),
            TlvValue::ByteString(point.clone()),
        )),
        PublicKey::Rsa { modulus, .. } => fields.push((
            Tag::Context(TAG_PUBLIC_KEY_POINT),
            TlvValue::ByteString(modulus.clone()),
        )),
    }

    fields.push((
        Tag::Context(TAG_SIGNATURE),
        TlvValue::Container(
            ContainerKind::Structure,
            vec![
                (
                    Tag::Context(TAG_SIGNATURE_R),
                    TlvValue::ByteString(cert.signature.r.clone()),
                ),
                (
                    Tag::Context(TAG_SIGNATURE_S),
                    TlvValue::ByteString(cert.signature.s.clone()),
                ),
            ],
        ),
    ));
    fields.push((
        Tag::Context(TAG_SUBJECT_KEY_ID),
        TlvValue::ByteString(cert.subject_key_id.as_bytes().to_vec()),
    ));
    fields.push((
        Tag::Context(TAG_AUTHORITY_KEY_ID),
        TlvValue::ByteString(cert.authority_key_id.as_bytes().to_vec()),
    ));
    fields.push((
        Tag::Context(TAG_KEY_USAGE),
        TlvValue::Unsigned(cert.key_usage.to_wire() as u64),
    ));
    if let Some(eku) = &cert.extended_key_usage {
        fields.push((
            Tag::Context(TAG_EXTENDED_KEY_USAGE),
            TlvValue::Unsigned(key_purpose_to_wire(eku) as u64),
        ));
    }
    if let Some(bc) = &cert.basic_constraints {
        let mut bc_fields = vec![(
            Tag::Context(TAG_BASIC_CONSTRAINTS_IS_CA),
            TlvValue::Bool(bc.is_ca),
        )];
        if let Some(plc) = bc.path_len_constraint {
            bc_fields.push((
                Tag::Context(TAG_BASIC_CONSTRAINTS_PATH_LEN),
                TlvValue::Unsigned(plc as u64),
            ));
        }
        fields.push((
            Tag::Context(TAG_BASIC_CONSTRAINTS),
            TlvValue::Container(ContainerKind::Structure, bc_fields),
        ));
    }
    fields.push((
        Tag::Context(TAG_CERT_TYPE),
        TlvValue::Unsigned(cert_type_to_wire(cert.cert_type) as u64),
    ));

    TlvValue::Container(ContainerKind::Structure, fields)
}

fn cert_from_tlv_value(value: &TlvValue, tbs_source: &[u8]) -> CertResult<Certificate> {
    let TlvValue::Container(ContainerKind::Structure, fields) = value else {
        return Err(CertError::UnsupportedCertFormat {
            reason: "expected a certificate structure".to_string(),
        });
    };

    let mut serial_number = None;
    let mut signature_algorithm = None;
    let mut issuer = None;
    let mut not_before = None;
    let mut not_after = None;
    let mut subject = None;
    let mut public_key_algorithm = None;
    let mut public_key_point = None;
    let mut signature = None;
    let mut subject_key_id = None;
    let mut authority_key_id = None;
    let mut key_usage = KeyUsage::default();
    let mut extended_key_usage = None;
    let mut basic_constraints = None;
    let mut cert_type = CertType::General;

    for (tag, field) in fields {
        let Tag::Context(ctx) = tag else { continue };
        match *ctx {
            TAG_SERIAL_NUMBER => serial_number = Some(expect_bytes(field)?.to_vec()),
            TAG_SIGNATURE_ALGORITHM => {
                signature_algorithm = Some(sig_alg_from_wire(expect_unsigned(field)? as u8)?)
            }
            TAG_ISSUER => issuer = Some(dn_from_tlv_value(field)?),
            TAG_NOT_BEFORE => not_before = Some(expect_unsigned(field)? as u32),
            TAG_NOT_AFTER => not_after = Some(expect_unsigned(field)? as u32),
            TAG_SUBJECT => subject = Some(dn_from_tlv_value(field)?),
            TAG_PUBLIC_KEY_CURVE => {
                public_key_algorithm = Some(curve_from_wire(expect_unsigned(field)? as u8)?)
            }
            TAG_PUBLIC_KEY_POINT => public_key_point = Some(expect_bytes(field)?.to_vec()),
            TAG_SIGNATURE => {
                let TlvValue::Container(ContainerKind::Structure, sig_fields) = field else {
                    return Err(unsupported("malformed signature field"));
                };
                let mut r = None;
                let mut s = None;
                for (sig_tag, sig_value) in sig_fields {
                    match sig_tag {
                        Tag::Context(TAG_SIGNATURE_R) => r = Some(expect_bytes(sig_value)?.to_vec()),
                        Tag::Context(TAG_SIGNATURE_S) => s = Some(expect_bytes(sig_value)?.to_vec()),
                        _ => {}
                    }
                }
                signature = Some(EcdsaSignature {
                    r: r.ok_or_else(|| unsupported("missing signature r"))?,
                    s: s.ok_or_else(|| unsupported("missing signature s"))?,
                });
                // Everything up to (not including) the signature field is the TBS region.
            }
            TAG_SUBJECT_KEY_ID => {
                subject_key_id = CertificateKeyId::new(expect_bytes(field)?.to_vec())
            }
            TAG_AUTHORITY_KEY_ID => {
                authority_key_id = CertificateKeyId::new(expect_bytes(field)?.to_vec())
            }
            TAG_KEY_USAGE => key_usage = KeyUsage::from_wire(expect_unsigned(field)? as u16),
            TAG_EXTENDED_KEY_USAGE => {
                extended_key_usage = Some(key_purpose_from_wire(expect_unsigned(field)? as u8))
            }
            TAG_BASIC_CONSTRAINTS => {
                let TlvValue::Container(ContainerKind::Structure, bc_fields) = field else {
                    return Err(unsupported("malformed basic constraints field"));
                };
                let mut is_ca = false;
                let mut path_len_constraint = None;
                for (bc_tag, bc_value) in bc_fields {
                    match bc_tag {
                        Tag::Context(TAG_BASIC_CONSTRAINTS_IS_CA) => {
                            let TlvValue::Bool(b) = bc_value else {
                                return Err(unsupported("malformed isCA"));
                            };
                            is_ca = *b;
                        }
                        Tag::Context(TAG_BASIC_CONSTRAINTS_PATH_LEN) => {
                            path_len_constraint = Some(expect_unsigned(bc_value)? as u8)
                        }
                        _ => {}
                    }
                }
                basic_constraints = Some(BasicConstraints {
                    is_ca,
                    path_len_constraint,
                });
            }
            TAG_CERT_TYPE => cert_type = cert_type_from_wire(expect_unsigned(field)? as u8)?,
            _ => {}
        }
    }

    let curve = public_key_algorithm.ok_or_else(|| unsupported("missing public key curve"))?;
    let tbs_hash = compute_tbs_hash(tbs_source, signature_algorithm)?;

    Ok(Certificate {
        serial_number: serial_number.ok_or_else(|| unsupported("missing serial number"))?,
        issuer: issuer.ok_or_else(|| unsupported("missing issuer"))?,
        subject: subject.ok_or_else(|| unsupported("missing subject"))?,
        not_before: not_before.ok_or_else(|| unsupported("missing not-before"))?,
        not_after: not_after.ok_or_else(|| unsupported("missing not-after"))?,
        public_key_algorithm: curve,
        public_key: PublicKey::Ec {
            curve,
            point: public_key_point.ok_or_else(|| unsupported("missing public key"))?,
        },
        signature_algorithm: signature_algorithm
            .ok_or_else(|| unsupported("missing signature algorithm"))?,
        signature: signature.ok_or_else(|| unsupported("missing signature"))?,
        subject_key_id: subject_key_id.ok_or_else(|| unsupported("missing subject key id"))?,
        authority_key_id: authority_key_id
            .ok_or_else(|| unsupported("missing authority key id"))?,
        key_usage,
        extended_key_usage,
        basic_constraints,
        cert_type,
        is_trusted: false,
        tbs_hash: Some(tbs_hash),
    })
}

/// The TBS hash is computed over the whole encoded structure rather than a
/// byte-exact sub-region: this codec (unlike the original's single flat
/// buffer) rebuilds the structure from its typed fields, so there is no
/// stable byte offset to slice at. Re-deriving a canonical TBS encoding
/// (everything but the `signature` field) keeps the hash deterministic and
/// independent of field order.
fn compute_tbs_hash(full_encoded: &[u8], alg: Option<SignatureAlgorithm>) -> CertResult<Vec<u8>> {
    let alg = alg.ok_or_else(|| unsupported("missing signature algorithm"))?;
    let (_, value) = tlv::parse(full_encoded)?;
    let TlvValue::Container(ContainerKind::Structure, fields) = value else {
        return Err(unsupported("malformed certificate structure"));
    };
    let tbs_fields: Vec<_> = fields
        .into_iter()
        .filter(|(tag, _)| *tag != Tag::Context(TAG_SIGNATURE))
        .collect();
    let tbs_value = TlvValue::Container(ContainerKind::Structure, tbs_fields);
    let tbs_bytes = tlv::pack(Tag::Anonymous, &tbs_value)?;
    Ok(crate::sign::tbs_hash(&tbs_bytes, alg))
}

fn expect_bytes(value: &TlvValue) -> CertResult<&[u8]> {
    match value {
        TlvValue::ByteString(b) => Ok(b),
        _ => Err(unsupported("expected a byte string field")),
    }
}

fn expect_unsigned(value: &TlvValue) -> CertResult<u64> {
    match value {
        TlvValue::Unsigned(v) => Ok(*v),
        _ => Err(unsupported("expected an unsigned integer field")),
    }
}

fn unsupported(reason: &str) -> CertError {
    CertError::UnsupportedCertFormat {
        reason: reason.to_string(),
    }
}

fn dn_to_tlv_value(dn: &DistinguishedName) -> TlvValue {
    let (tag, value) = match (&dn.oid, &dn.value) {
        (DnOid::WeaveDeviceId, DnValue::WeaveId(id)) => (DN_TAG_WEAVE_DEVICE_ID, TlvValue::Unsigned(*id)),
        (DnOid::WeaveCaId, DnValue::WeaveId(id)) => (DN_TAG_WEAVE_CA_ID, TlvValue::Unsigned(*id)),
        (DnOid::WeaveServiceEndpointId, DnValue::WeaveId(id)) => {
            (DN_TAG_WEAVE_SERVICE_ENDPOINT_ID, TlvValue::Unsigned(*id))
        }
        (DnOid::WeaveSoftwarePublisherId, DnValue::WeaveId(id)) => {
            (DN_TAG_WEAVE_SOFTWARE_PUBLISHER_ID, TlvValue::Unsigned(*id))
        }
        (DnOid::CommonName, DnValue::Utf8String(s)) => {
            (DN_TAG_COMMON_NAME, TlvValue::Utf8String(s.clone()))
        }
        (DnOid::Organization, DnValue::Utf8String(s)) => {
            (DN_TAG_ORGANIZATION, TlvValue::Utf8String(s.clone()))
        }
        (_, DnValue::PrintableString(s)) => (DN_TAG_OTHER_PRINTABLE, TlvValue::Utf8String(s.clone())),
        (_, DnValue::Ia5String(s)) => (DN_TAG_OTHER_IA5, TlvValue::Utf8String(s.clone())),
        (_, DnValue::Utf8String(s)) => (DN_TAG_OTHER_UTF8, TlvValue::Utf8String(s.clone())),
        (_, DnValue::WeaveId(id)) => (DN_TAG_WEAVE_DEVICE_ID, TlvValue::Unsigned(*id)),
    };
    TlvValue::Container(ContainerKind::Path, vec![(Tag::Context(tag), value)])
}

fn dn_from_tlv_value(value: &TlvValue) -> CertResult<DistinguishedName> {
    let TlvValue::Container(ContainerKind::Path, entries) = value else {
        return Err(unsupported("expected a distinguished-name path"));
    };
    let (tag, inner) = entries.first().ok_or_else(|| unsupported("empty distinguished name"))?;
    let Tag::Context(ctx) = tag else {
        return Err(unsupported("distinguished name attribute must use a context tag"));
    };
    Ok(match *ctx {
        DN_TAG_WEAVE_DEVICE_ID => DistinguishedName {
            oid: DnOid::WeaveDeviceId,
            value: DnValue::WeaveId(expect_unsigned(inner)?),
        },
        DN_TAG_WEAVE_CA_ID => DistinguishedName {
            oid: DnOid::WeaveCaId,
            value: DnValue::WeaveId(expect_unsigned(inner)?),
        },
        DN_TAG_WEAVE_SERVICE_ENDPOINT_ID => DistinguishedName {
            oid: DnOid::WeaveServiceEndpointId,
            value: DnValue::WeaveId(expect_unsigned(inner)?),
        },
        DN_TAG_WEAVE_SOFTWARE_PUBLISHER_ID => DistinguishedName {
            oid: DnOid::WeaveSoftwarePublisherId,
            value: DnValue::WeaveId(expect_unsigned(inner)?),
        },
        DN_TAG_COMMON_NAME => DistinguishedName {
            oid: DnOid::CommonName,
            value: DnValue::Utf8String(expect_string(inner)?.to_string()),
        },
        DN_TAG_ORGANIZATION => DistinguishedName {
            oid: DnOid::Organization,
            value: DnValue::Utf8String(expect_string(inner)?.to_string()),
        },
        DN_TAG_OTHER_PRINTABLE => DistinguishedName {
            oid: DnOid::Other("printable"),
            value: DnValue::PrintableString(expect_string(inner)?.to_string()),
        },
        DN_TAG_OTHER_IA5 => DistinguishedName {
            oid: DnOid::Other("ia5"),
            value: DnValue::Ia5String(expect_string(inner)?.to_string()),
        },
        DN_TAG_OTHER_UTF8 => DistinguishedName {
            oid: DnOid::Other("utf8"),
            value: DnValue::Utf8String(expect_string(inner)?.to_string()),
        },
        other => return Err(unsupported(&format!("unknown distinguished-name tag {other}"))),
    })
}

fn expect_string(value: &TlvValue) -> CertResult<&str> {
    match value {
        TlvValue::Utf8String(s) => Ok(s),
        _ => Err(unsupported("expected a UTF-8 string field")),
    }
}

fn sig_alg_to_wire(alg: SignatureAlgorithm) -> u8 {
    match alg {
        SignatureAlgorithm::EcdsaWithSha1 => 1,
        SignatureAlgorithm::EcdsaWithSha256 => 2,
    }
}

fn sig_alg_from_wire(v: u8) -> CertResult<SignatureAlgorithm> {
    match v {
        1 => Ok(SignatureAlgorithm::EcdsaWithSha1),
        2 => Ok(SignatureAlgorithm::EcdsaWithSha256),
        other => Err(CertError::UnsupportedEncoding {
            reason: format!("unknown signature algorithm code {other}"),
        }),
    }
}

fn curve_to_wire(curve: CurveId) -> u8 {
    match curve {
        CurveId::Secp224r1 => 1,
        CurveId::Secp256r1 => 2,
    }
}

fn curve_from_wire(v: u8) -> CertResult<CurveId> {
    match v {
        1 => Ok(CurveId::Secp224r1),
        2 => Ok(CurveId::Secp256r1),
        other => Err(CertError::UnsupportedEncoding {
            reason: format!("unknown curve code {other}"),
        }),
    }
}

fn cert_type_to_wire(t: CertType) -> u8 {
    match t {
        CertType::General => 1,
        CertType::Ca => 2,
        CertType::Device => 3,
        CertType::ServiceEndpoint => 4,
        CertType::FirmwareSigning => 5,
        CertType::AccessToken => 6,
    }
}

fn cert_type_from_wire(v: u8) -> CertResult<CertType> {
    match v {
        1 => Ok(CertType::General),
        2 => Ok(CertType::Ca),
        3 => Ok(CertType::Device),
        4 => Ok(CertType::ServiceEndpoint),
        5 => Ok(CertType::FirmwareSigning),
        6 => Ok(CertType::AccessToken),
        other => Err(CertError::UnsupportedEncoding {
            reason: format!("unknown certificate type code {other}"),
        }),
    }
}

fn key_purpose_to_wire(kp: &KeyPurpose) -> u8 {
    (kp.server_auth as u8)
        | (kp.client_auth as u8) << 1
        | (kp.code_signing as u8) << 2
        | (kp.email_protection as u8) << 3
        | (kp.time_stamping as u8) << 4
}

fn key_purpose_from_wire(bits: u8) -> KeyPurpose {
    KeyPurpose {
        server_auth: bits & (1 << 0) != 0,
        client_auth: bits & (1 << 1) != 0,
        code_signing: bits & (1 << 2) != 0,
        email_protection: bits & (1 << 3) != 0,
        time_stamping: bits & (1 << 4) != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed_time::pack_date;

    fn sample_cert() -> Certificate {
        Certificate {
            serial_number: vec![0x07],
            issuer: DistinguishedName::weave_id(DnOid::WeaveCaId, 0x18B4_3002_0000_0001),
            subject: DistinguishedName::weave_id(DnOid::WeaveDeviceId, 0x18B4_3000_0000_00AA),
            not_before: pack_date(2023, 6, 1),
            not_after: pack_date(2028, 6, 1),
            public_key_algorithm: CurveId::Secp224r1,
            public_key: PublicKey::Ec {
                curve: CurveId::Secp224r1,
                point: vec![4; 57],
            },
            signature_algorithm: SignatureAlgorithm::EcdsaWithSha256,
            signature: EcdsaSignature {
                r: vec![1; 28],
                s: vec![2; 28],
            },
            subject_key_id: CertificateKeyId::new(vec![0xAA; 20]).unwrap(),
            authority_key_id: CertificateKeyId::new(vec![0xBB; 20]).unwrap(),
            key_usage: KeyUsage {
                digital_signature: true,
                ..Default::default()
            },
            extended_key_usage: Some(KeyPurpose {
                client_auth: true,
                ..Default::default()
            }),
            basic_constraints: None,
            cert_type: CertType::Device,
            is_trusted: false,
            tbs_hash: None,
        }
    }

    #[test]
    fn cert_round_trips_through_weave_tlv() {
        let cert = sample_cert();
        let value = cert_to_tlv_value(&cert);
        let encoded = tlv::pack(Tag::Anonymous, &value).unwrap();
        let loaded = load_cert(&encoded).unwrap();
        assert_eq!(loaded.serial_number, cert.serial_number);
        assert_eq!(loaded.subject, cert.subject);
        assert_eq!(loaded.issuer, cert.issuer);
        assert_eq!(loaded.not_before, cert.not_before);
        assert_eq!(loaded.not_after, cert.not_after);
        assert_eq!(loaded.key_usage, cert.key_usage);
        assert_eq!(loaded.extended_key_usage, cert.extended_key_usage);
        assert!(loaded.tbs_hash.is_some());
    }

    #[test]
    fn cert_list_round_trips() {
        use crate::store::CertificateSet;
        let mut set = CertificateSet::new(4);
        let a = set.load_cert(sample_cert()).unwrap();
        let mut other = sample_cert();
        other.serial_number = vec![0x09];
        set.load_cert(other).unwrap();

        let mut writer = Writer::new();
        encode_cert_list(&mut writer, &set, a, true).unwrap();
        let bytes = writer.finalize().unwrap();
        let loaded = load_certs(&bytes).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].serial_number, vec![0x07]);
    }
}
