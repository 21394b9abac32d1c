//! DataMgmt errors (§7's "Encoding"/"Resource exhaustion" taxonomy entries).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataMgmtError {
    #[error("trait catalog is full")]
    NoMemory,

    #[error("handle {0:?} is out of range or stale")]
    InvalidHandle(crate::handle::TraitDataHandle),

    #[error("no catalog entry for resource {resource_id}/{instance_id}")]
    NotFound { resource_id: u32, instance_id: u16 },

    #[error("subscription path list overflowed the supplied buffer")]
    BufferTooSmall,

    #[error("exchange error while driving a subscription: {0}")]
    Exchange(#[from] exchange::ExchangeError),
}

impl DataMgmtError {
    pub fn category(&self) -> &'static str {
        "datamgmt"
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DataMgmtError::Exchange(e) if e.is_retryable())
    }
}

pub type DataMgmtResult<T> = std::result::Result<T, DataMgmtError>;
