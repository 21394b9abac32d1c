//! Certificate-kind errors (§7's "Certificate" taxonomy entry).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CertError {
    #[error("certificate format not supported: {reason}")]
    UnsupportedCertFormat { reason: String },

    #[error("certificate encoding not supported: {reason}")]
    UnsupportedEncoding { reason: String },

    #[error("certificate is not yet valid: effective {effective}, not-before {not_before}")]
    NotYetValid { effective: u32, not_before: u32 },

    #[error("certificate has expired: effective {effective}, not-after {not_after}")]
    CertExpired { effective: u32, not_after: u32 },

    #[error("certificate is not trusted and is self-signed")]
    CertNotTrusted,

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("no CA certificate found for issuer at depth {depth}")]
    CaCertNotFound { depth: u8 },

    #[error("certificate not found in set")]
    CertNotFound,

    #[error("path length constraint exceeded at depth {depth} (constraint {constraint})")]
    PathLenConstraintExceeded { depth: u8, constraint: u8 },

    #[error("required key usage not satisfied: {usage}")]
    UsageNotAllowed { usage: String },

    #[error("certificate type mismatch: required {required}, got {actual}")]
    WrongCertType { required: String, actual: String },

    #[error("certificate set is full (capacity {capacity})")]
    NoMemory { capacity: usize },

    #[error("buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("TLV error while processing certificate: {0}")]
    Tlv(#[from] tlv::TlvError),

    #[error("cycle or excessive depth detected during chain validation (depth {0})")]
    DepthExceeded(u8),
}

impl CertError {
    pub fn category(&self) -> &'static str {
        "certificate"
    }

    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CertError::BufferTooSmall { .. } | CertError::NoMemory { .. })
    }
}

pub type CertResult<T> = std::result::Result<T, CertError>;
