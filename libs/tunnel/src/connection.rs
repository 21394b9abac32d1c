//! `TunnelConnection`: owned by the `TunnelConnMgr` (§3).

use crate::keepalive::KeepaliveParams;
use crate::state::{ConnState, SourceInterface};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelRole {
    Primary,
    Backup,
}

pub struct TunnelConnection {
    pub role: TunnelRole,
    pub state: ConnState,
    pub source_interface: SourceInterface,
    pub dest_node_id: u64,
    pub dest_addr: SocketAddr,
    pub keepalive: KeepaliveParams,
    pub liveness_probe_interval: Option<Duration>,
    pub failed_connect_attempts: u32,
}

impl TunnelConnection {
    pub fn new(
        role: TunnelRole,
        source_interface: SourceInterface,
        dest_node_id: u64,
        dest_addr: SocketAddr,
    ) -> Self {
        let keepalive = match role {
            TunnelRole::Primary => KeepaliveParams::primary(),
            TunnelRole::Backup => KeepaliveParams::backup(),
        };
        Self {
            role,
            state: ConnState::NotConnected,
            source_interface,
            dest_node_id,
            dest_addr,
            keepalive,
            liveness_probe_interval: None,
            failed_connect_attempts: 0,
        }
    }

    pub fn record_connect_failure(&mut self) {
        self.failed_connect_attempts += 1;
        self.state = ConnState::NotConnected;
    }

    pub fn record_connect_success(&mut self) {
        self.failed_connect_attempts = 0;
        self.state = ConnState::ConnectionEstablished;
    }
}
