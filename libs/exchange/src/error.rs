//! Exchange-kind errors (§7's "Protocol"/"Timeout" taxonomy entries, as they
//! apply to message binding and request/response correlation).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("no handler registered for profile {profile}, message type {message_type}")]
    NoHandler { profile: u32, message_type: u8 },

    #[error("binding is not ready (state {state:?})")]
    BindingNotReady { state: crate::binding::BindingState },

    #[error("exchange {0:?} timed out waiting for a response")]
    TimedOut(crate::context::ExchangeId),

    #[error("exchange {0:?} was aborted")]
    Aborted(crate::context::ExchangeId),

    #[error("send failed: {reason}")]
    SendFailed { reason: String },

    #[error("unexpected message type for current exchange state")]
    UnexpectedMessageType,

    #[error("TLV error while processing an exchange message: {0}")]
    Tlv(#[from] tlv::TlvError),
}

impl ExchangeError {
    pub fn category(&self) -> &'static str {
        "exchange"
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ExchangeError::TimedOut(_) | ExchangeError::SendFailed { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ExchangeError::BindingNotReady { .. } | ExchangeError::TimedOut(_))
    }
}

pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
