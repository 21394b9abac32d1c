//! `SubscriptionClient`/`SubscriptionHandler` and the counter-subscription
//! coupling that gates `kFlag_ServiceSubscriptionEstablished` (§4.4).

use exchange::binding::{Binding, BindingEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Quiescent,
    AwaitingBindingReady,
    AwaitingResponse,
    Established,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Established,
    Terminated,
}

/// Installed via `EnableResubscribe` (§4.4, step 4); deliberately the same
/// shape as [`tunnel::ReconnectPolicy`](../tunnel/trait.ReconnectPolicy.html)
/// so both components share one mental model for "retry with backoff".
pub trait ResubscribePolicy: Send + Sync {
    fn next_delay(&self, consecutive_failures: u32) -> std::time::Duration;
}

/// Manages one outgoing subscription (§4.4 steps 1-4).
pub struct SubscriptionClient {
    binding: Arc<Mutex<Binding>>,
    state: ClientState,
    resubscribe_policy: Option<Arc<dyn ResubscribePolicy>>,
    listeners: Vec<mpsc::UnboundedSender<SubscriptionEvent>>,
}

impl SubscriptionClient {
    pub fn new(binding: Arc<Mutex<Binding>>) -> Self {
        Self {
            binding,
            state: ClientState::Quiescent,
            resubscribe_policy: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn enable_resubscribe(&mut self, policy: Arc<dyn ResubscribePolicy>) {
        self.resubscribe_policy = Some(policy);
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SubscriptionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    /// `InitiateSubscription()`: quiescent while the binding isn't ready.
    pub async fn initiate_subscription(&mut self) {
        self.state = ClientState::AwaitingBindingReady;
        let ready = self.binding.lock().await.is_ready();
        if ready {
            self.state = ClientState::AwaitingResponse;
        }
    }

    /// Called when the binding's readiness listener fires.
    pub fn on_binding_event(&mut self, event: BindingEvent) {
        if self.state == ClientState::AwaitingBindingReady && event == BindingEvent::BecameReady {
            self.state = ClientState::AwaitingResponse;
        }
    }

    /// Called once the server's Subscribe response is in.
    pub fn on_subscribe_response(&mut self, accepted: bool) {
        self.state = if accepted {
            ClientState::Established
        } else {
            ClientState::Quiescent
        };
        let event = if accepted {
            SubscriptionEvent::Established
        } else {
            SubscriptionEvent::Terminated
        };
        for listener in &self.listeners {
            let _ = listener.send(event);
        }
    }

    pub fn is_established(&self) -> bool {
        self.state == ClientState::Established
    }
}

/// The server-side peer (§4.4): accepts inbound Subscribe, filters
/// duplicates by peer node id.
pub struct SubscriptionHandler {
    established_peers: Vec<u64>,
}

impl Default for SubscriptionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionHandler {
    pub fn new() -> Self {
        Self {
            established_peers: Vec::new(),
        }
    }

    /// Returns `true` if this Subscribe newly established (a duplicate
    /// from an already-subscribed peer is filtered and returns `false`).
    pub fn on_subscribe_request(&mut self, peer_node_id: u64) -> bool {
        if self.established_peers.contains(&peer_node_id) {
            debug!(peer_node_id, "duplicate subscribe filtered");
            return false;
        }
        self.established_peers.push(peer_node_id);
        info!(peer_node_id, "subscription established");
        true
    }

    pub fn on_terminate(&mut self, peer_node_id: u64) {
        self.established_peers.retain(|&p| p != peer_node_id);
    }

    pub fn is_established(&self, peer_node_id: u64) -> bool {
        self.established_peers.contains(&peer_node_id)
    }
}

/// Tracks `kFlag_ServiceSubscriptionEstablished`: both the outbound
/// client's subscription AND the inbound counter-subscription from the
/// service data-management endpoint must be established (§4.4, P8).
pub struct ServiceSubscriptionCoupling {
    outbound_established: bool,
    inbound_established: bool,
    flag: bool,
    listeners: Vec<mpsc::UnboundedSender<bool>>,
}

impl Default for ServiceSubscriptionCoupling {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceSubscriptionCoupling {
    pub fn new() -> Self {
        Self {
            outbound_established: false,
            inbound_established: false,
            flag: false,
            listeners: Vec::new(),
        }
    }

    pub fn flag(&self) -> bool {
        self.flag
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<bool> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    pub fn set_outbound(&mut self, established: bool) {
        self.outbound_established = established;
        self.recompute();
    }

    pub fn set_inbound(&mut self, established: bool) {
        self.inbound_established = established;
        self.recompute();
    }

    fn recompute(&mut self) {
        let new_flag = self.outbound_established && self.inbound_established;
        if new_flag != self.flag {
            self.flag = new_flag;
            for listener in &self.listeners {
                let _ = listener.send(new_flag);
            }
        }
    }
}

/// Driving predicate (§4.4): "a service subscription should be active" iff
/// the mode is enabled, the station is Wi-Fi provisioned, and the device
/// is account-paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSubscriptionDesiredState {
    pub mode_enabled: bool,
    pub wifi_station_provisioned: bool,
    pub account_paired: bool,
}

impl ServiceSubscriptionDesiredState {
    pub fn should_be_active(&self) -> bool {
        self.mode_enabled && self.wifi_station_provisioned && self.account_paired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flag_requires_both_halves() {
        let mut coupling = ServiceSubscriptionCoupling::new();
        let mut rx = coupling.subscribe();
        coupling.set_outbound(true);
        assert!(!coupling.flag());
        coupling.set_inbound(true);
        assert!(coupling.flag());
        assert_eq!(rx.recv().await, Some(true));

        coupling.set_outbound(false);
        assert!(!coupling.flag());
        assert_eq!(rx.recv().await, Some(false));
    }

    #[test]
    fn duplicate_subscribe_from_same_peer_is_filtered() {
        let mut handler = SubscriptionHandler::new();
        assert!(handler.on_subscribe_request(7));
        assert!(!handler.on_subscribe_request(7));
    }

    #[test]
    fn driving_predicate_requires_all_three_conditions() {
        let desired = ServiceSubscriptionDesiredState {
            mode_enabled: true,
            wifi_station_provisioned: true,
            account_paired: false,
        };
        assert!(!desired.should_be_active());
    }
}
