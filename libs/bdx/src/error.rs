//! BDX and cert-provisioning errors (§7's "Encoding"/"Protocol" entries).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BdxError {
    #[error("buffer too short: needed at least {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },

    #[error("transfer-control byte set more than one of sender-drive/receiver-drive/async")]
    MultipleTransferModes,

    #[error("metadata exceeds the {max}-byte limit")]
    MetadataTooLarge { max: usize },

    #[error("file designator is not valid UTF-8")]
    InvalidFileDesignator,

    #[error("tlv error while encoding/decoding an embedded structure: {0}")]
    Tlv(#[from] tlv::TlvError),

    #[error("certificate error: {0}")]
    Cert(#[from] cert::CertError),

    #[error("exchange error: {0}")]
    Exchange(#[from] exchange::ExchangeError),

    #[error("status report: profile={profile} code={code}")]
    StatusReport { profile: u32, code: u16 },
}

impl BdxError {
    pub fn category(&self) -> &'static str {
        "bdx"
    }
}

pub type BdxResult<T> = std::result::Result<T, BdxError>;
