//! `ExchangeContext`: an in-flight request/response pair (§3).

use bytes::Bytes;
use std::time::Duration;

/// (local node id, peer node id, exchange id, session key id) — uniquely
/// identifies one in-flight exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId {
    pub local_node_id: u64,
    pub peer_node_id: u64,
    pub exchange_id: u16,
    pub session_key_id: u16,
}

/// An inbound or outbound message delivered through an exchange.
#[derive(Debug, Clone)]
pub struct ExchangeMessage {
    pub profile: u32,
    pub message_type: u8,
    pub payload: Bytes,
}

/// Owned by a single consumer (cert-prov, BDX, data-mgmt, tunnel); destroyed
/// on completion, abort, or timeout.
pub struct ExchangeContext {
    pub id: ExchangeId,
    pub timeout: Duration,
    response_tx: Option<tokio::sync::oneshot::Sender<ExchangeMessage>>,
}

impl ExchangeContext {
    pub fn new(
        id: ExchangeId,
        timeout: Duration,
    ) -> (Self, tokio::sync::oneshot::Receiver<ExchangeMessage>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        (
            Self {
                id,
                timeout,
                response_tx: Some(tx),
            },
            rx,
        )
    }

    /// Delivers a response, completing the exchange. Returns `false` if the
    /// context already completed (response already delivered, or dropped).
    pub fn complete(&mut self, message: ExchangeMessage) -> bool {
        match self.response_tx.take() {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}
