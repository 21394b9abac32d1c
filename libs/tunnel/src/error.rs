//! Tunnel-kind errors (§7's "Transport"/"Timeout" taxonomy entries).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TunnelError {
    #[error("connect attempt to {addr} failed: {reason}")]
    ConnectFailed { addr: String, reason: String },

    #[error("connect attempt timed out after {0:?}")]
    ConnectTimedOut(std::time::Duration),

    #[error("tunnel open was rejected by the peer")]
    OpenRejected,

    #[error("liveness probe received no response")]
    LivenessTimeout,

    #[error("operation invalid in connection state {0:?}")]
    InvalidState(crate::state::ConnState),

    #[error("failed to program socket options: {reason}")]
    SocketConfig { reason: String },

    #[error("exchange error while driving the tunnel: {0}")]
    Exchange(#[from] exchange::ExchangeError),
}

impl TunnelError {
    pub fn category(&self) -> &'static str {
        "tunnel"
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, TunnelError::OpenRejected)
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TunnelError::ConnectTimedOut(_) | TunnelError::LivenessTimeout
        )
    }
}

pub type TunnelResult<T> = std::result::Result<T, TunnelError>;
