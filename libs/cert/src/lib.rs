//! Weave-TLV certificate store: certificate and key-identifier types, packed
//! date/time conversion, chain validation, signature verification, and
//! bidirectional Weave-TLV/X.509 conversion (§4.2).

pub mod cert;
pub mod der;
pub mod dn;
pub mod error;
pub mod oid;
pub mod packed_time;
pub mod sign;
pub mod store;
pub mod weave;
pub mod x509;

pub use cert::{
    BasicConstraints, CertType, Certificate, CurveId, EcdsaSignature, KeyPurpose, KeyUsage,
    PublicKey, SignatureAlgorithm,
};
pub use dn::{CertificateKeyId, DistinguishedName, DnOid, DnValue};
pub use error::{CertError, CertResult};
pub use store::{CertRef, CertificateSet, ValidateFlags, ValidationContext};
