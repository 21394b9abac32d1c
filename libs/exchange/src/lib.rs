//! Exchange engine interface (§2, §3): message binding, exchange contexts
//! with request/response correlation, reliable-messaging ACK handling, and
//! WRM session key identifiers.
//!
//! This crate defines only what the other components demand of an exchange
//! engine — it is an interface, not a full protocol-engine implementation
//! (§2: "~10% of core. Provided as an interface").

pub mod binding;
pub mod context;
pub mod error;
pub mod wrm;

pub use binding::{Binding, BindingEvent, BindingState, SecurityMode, TransportKind};
pub use context::{ExchangeContext, ExchangeId, ExchangeMessage};
pub use error::{ExchangeError, ExchangeResult};
pub use wrm::{AckState, WrmSessionKeyId};

use async_trait::async_trait;
use std::time::Duration;

/// A handler for inbound exchange messages of a given (profile, message
/// type) pair.
#[async_trait]
pub trait ExchangeHandler: Send + Sync {
    async fn handle(&self, ctx: &ExchangeId, message: ExchangeMessage) -> ExchangeResult<()>;
}

/// The interface the rest of the stack (tunnel, data-mgmt, BDX, cert-prov)
/// builds against. Handler registration is strictly additive and happens
/// only at init (§5's shared-resource policy).
#[async_trait]
pub trait ExchangeEngine: Send + Sync {
    /// Send a request over `binding` and await the correlated response,
    /// subject to `timeout`. Fails with `ExchangeError::BindingNotReady` if
    /// the binding has not reached `Ready`.
    async fn send_request(
        &self,
        binding: &Binding,
        request: ExchangeMessage,
        timeout: Duration,
    ) -> ExchangeResult<ExchangeMessage>;

    /// Send a message with no expected response (e.g. a status report).
    async fn send_standalone(&self, binding: &Binding, message: ExchangeMessage) -> ExchangeResult<()>;

    /// Register a handler for unsolicited inbound messages of a given
    /// (profile, message type). Only valid before the engine starts serving
    /// requests.
    fn register_handler(
        &mut self,
        profile: u32,
        message_type: u8,
        handler: std::sync::Arc<dyn ExchangeHandler>,
    );
}
