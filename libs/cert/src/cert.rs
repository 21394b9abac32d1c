//! The `Certificate` value type (§3) and its flag sets.

use crate::dn::{CertificateKeyId, DistinguishedName};

/// Key-usage flags, as named boolean fields per §9's redesign guidance for
/// C-style flag bitfields. `to_wire()`/`from_wire()` preserve the original
/// bit positions for the wire encoding (§6); the in-memory shape does not
/// need to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyUsage {
    pub digital_signature: bool,
    pub non_repudiation: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
}

impl KeyUsage {
    pub fn to_wire(self) -> u16 {
        (self.digital_signature as u16)
            | (self.non_repudiation as u16) << 1
            | (self.key_encipherment as u16) << 2
            | (self.data_encipherment as u16) << 3
            | (self.key_agreement as u16) << 4
            | (self.key_cert_sign as u16) << 5
            | (self.crl_sign as u16) << 6
    }

    pub fn from_wire(bits: u16) -> Self {
        Self {
            digital_signature: bits & (1 << 0) != 0,
            non_repudiation: bits & (1 << 1) != 0,
            key_encipherment: bits & (1 << 2) != 0,
            data_encipherment: bits & (1 << 3) != 0,
            key_agreement: bits & (1 << 4) != 0,
            key_cert_sign: bits & (1 << 5) != 0,
            crl_sign: bits & (1 << 6) != 0,
        }
    }

    /// True iff every usage set in `required` is also set in `self`.
    pub fn contains_all(&self, required: &KeyUsage) -> bool {
        (!required.digital_signature || self.digital_signature)
            && (!required.non_repudiation || self.non_repudiation)
            && (!required.key_encipherment || self.key_encipherment)
            && (!required.data_encipherment || self.data_encipherment)
            && (!required.key_agreement || self.key_agreement)
            && (!required.key_cert_sign || self.key_cert_sign)
            && (!required.crl_sign || self.crl_sign)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPurpose {
    pub server_auth: bool,
    pub client_auth: bool,
    pub code_signing: bool,
    pub email_protection: bool,
    pub time_stamping: bool,
}

impl KeyPurpose {
    pub fn contains_all(&self, required: &KeyPurpose) -> bool {
        (!required.server_auth || self.server_auth)
            && (!required.client_auth || self.client_auth)
            && (!required.code_signing || self.code_signing)
            && (!required.email_protection || self.email_protection)
            && (!required.time_stamping || self.time_stamping)
    }
}

/// The certificate-type tag (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertType {
    General,
    Ca,
    Device,
    ServiceEndpoint,
    FirmwareSigning,
    AccessToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    EcdsaWithSha1,
    EcdsaWithSha256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveId {
    Secp224r1,
    Secp256r1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Ec { curve: CurveId, point: Vec<u8> },
    Rsa { modulus: Vec<u8>, exponent: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub path_len_constraint: Option<u8>,
}

/// Immutable after load (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    pub serial_number: Vec<u8>,
    pub issuer: DistinguishedName,
    pub subject: DistinguishedName,
    /// Packed date (§4.2), 1-day resolution.
    pub not_before: u32,
    /// Packed date (§4.2), 1-day resolution.
    pub not_after: u32,
    pub public_key_algorithm: CurveId,
    pub public_key: PublicKey,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature: EcdsaSignature,
    pub subject_key_id: CertificateKeyId,
    pub authority_key_id: CertificateKeyId,
    pub key_usage: KeyUsage,
    pub extended_key_usage: Option<KeyPurpose>,
    pub basic_constraints: Option<BasicConstraints>,
    pub cert_type: CertType,
    pub is_trusted: bool,
    /// Computed at load time from the TBS (to-be-signed) region.
    pub tbs_hash: Option<Vec<u8>>,
}

impl Certificate {
    pub fn is_ca(&self) -> bool {
        self.basic_constraints
            .as_ref()
            .map(|bc| bc.is_ca)
            .unwrap_or(false)
    }

    pub fn path_len_constraint(&self) -> Option<u8> {
        self.basic_constraints.as_ref().and_then(|bc| bc.path_len_constraint)
    }

    pub fn is_self_signed(&self) -> bool {
        self.issuer.is_equal(&self.subject) && self.authority_key_id == self.subject_key_id
    }

    /// Invariant (§3): a CA certificate MUST have `KEY_CERT_SIGN` set.
    pub fn satisfies_ca_invariant(&self) -> bool {
        !self.is_ca() || self.key_usage.key_cert_sign
    }
}
