//! `Binding`: a handle to a peer with a readiness lifecycle (§3).

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unprepared,
    Preparing,
    Ready,
    Failed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    None,
    SharedCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    UdpWrm,
    Tcp,
}

/// A lifecycle event delivered to the binding's owner (§3: "lifecycle events
/// delivered via a protocol-layer callback").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEvent {
    BecameReady,
    Failed,
    Released,
}

pub struct Binding {
    state: BindingState,
    security_mode: SecurityMode,
    transport: TransportKind,
    response_timeout: Duration,
    listeners: Vec<tokio::sync::mpsc::UnboundedSender<BindingEvent>>,
}

impl Binding {
    pub fn new(security_mode: SecurityMode, transport: TransportKind, response_timeout: Duration) -> Self {
        Self {
            state: BindingState::Unprepared,
            security_mode,
            transport,
            response_timeout,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn security_mode(&self) -> SecurityMode {
        self.security_mode
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    pub fn is_ready(&self) -> bool {
        self.state == BindingState::Ready
    }

    /// Subscribe to lifecycle events. The returned receiver observes every
    /// subsequent state transition until the binding is released.
    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<BindingEvent> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    pub fn begin_preparing(&mut self) {
        self.state = BindingState::Preparing;
    }

    pub fn mark_ready(&mut self) {
        self.state = BindingState::Ready;
        self.notify(BindingEvent::BecameReady);
    }

    pub fn mark_failed(&mut self) {
        self.state = BindingState::Failed;
        self.notify(BindingEvent::Failed);
    }

    pub fn release(&mut self) {
        self.state = BindingState::Released;
        self.notify(BindingEvent::Released);
        self.listeners.clear();
    }

    fn notify(&mut self, event: BindingEvent) {
        self.listeners.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_starts_unprepared_and_transitions_to_ready() {
        let mut b = Binding::new(SecurityMode::SharedCase, TransportKind::Tcp, Duration::from_secs(5));
        assert_eq!(b.state(), BindingState::Unprepared);
        b.begin_preparing();
        assert_eq!(b.state(), BindingState::Preparing);
        b.mark_ready();
        assert!(b.is_ready());
    }

    #[tokio::test]
    async fn subscribers_observe_lifecycle_events() {
        let mut b = Binding::new(SecurityMode::None, TransportKind::UdpWrm, Duration::from_secs(1));
        let mut rx = b.subscribe();
        b.mark_ready();
        assert_eq!(rx.recv().await, Some(BindingEvent::BecameReady));
    }
}
