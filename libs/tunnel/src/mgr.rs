//! `TunnelConnMgr`: drives one tunnel instance's state machine (§4.3).

use crate::connection::TunnelConnection;
use crate::error::{TunnelError, TunnelResult};
use crate::keepalive;
use crate::state::{ConnState, ReconnectParam, ReconnectPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Notify the application after this many consecutive connect failures
/// (§4.3's "after N consecutive failures ... notify the application").
const DEFAULT_NOTIFY_AFTER_FAILURES: u32 = 3;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub type FailoverNotify = Box<dyn Fn(u32) + Send + Sync>;

pub struct TunnelConnMgr {
    conn: TunnelConnection,
    reconnect_policy: Arc<dyn ReconnectPolicy>,
    connect_timeout: Duration,
    notify_after_failures: u32,
    on_notify_application: Option<FailoverNotify>,
    stream: Option<TcpStream>,
}

impl TunnelConnMgr {
    pub fn new(conn: TunnelConnection, reconnect_policy: Arc<dyn ReconnectPolicy>) -> Self {
        Self {
            conn,
            reconnect_policy,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            notify_after_failures: DEFAULT_NOTIFY_AFTER_FAILURES,
            on_notify_application: None,
            stream: None,
        }
    }

    pub fn on_notify_application(&mut self, f: FailoverNotify) {
        self.on_notify_application = Some(f);
    }

    pub fn state(&self) -> ConnState {
        self.conn.state
    }

    /// `TryConnectingNow()`: `not-connected -> connecting`, then attempts the
    /// TCP connect. On success: `connecting -> connection-established`,
    /// socket options programmed immediately. On failure: back to
    /// `not-connected`, failure count bumped, caller should schedule a
    /// retry via `next_reconnect_delay`.
    pub async fn try_connecting_now(&mut self) -> TunnelResult<()> {
        self.conn.state = ConnState::Connecting;
        let result = timeout(self.connect_timeout, TcpStream::connect(self.conn.dest_addr)).await;

        match result {
            Ok(Ok(stream)) => {
                keepalive::configure(&stream, &self.conn.keepalive)?;
                self.stream = Some(stream);
                self.conn.record_connect_success();
                info!(dest = %self.conn.dest_addr, "tunnel TCP connection established");
                Ok(())
            }
            Ok(Err(e)) => {
                self.conn.record_connect_failure();
                self.maybe_notify_application();
                Err(TunnelError::ConnectFailed {
                    addr: self.conn.dest_addr.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                self.conn.record_connect_failure();
                self.maybe_notify_application();
                Err(TunnelError::ConnectTimedOut(self.connect_timeout))
            }
        }
    }

    fn maybe_notify_application(&self) {
        if self.conn.failed_connect_attempts >= self.notify_after_failures {
            if let Some(cb) = &self.on_notify_application {
                cb(self.conn.failed_connect_attempts);
            }
        }
    }

    /// The delay to wait before the next `try_connecting_now`, per the
    /// configured reconnect policy.
    pub fn next_reconnect_delay(&self, min_delay: Duration) -> Duration {
        self.reconnect_policy.next_delay(&ReconnectParam {
            consecutive_failures: self.conn.failed_connect_attempts,
            status_report: None,
            min_delay_to_connect: min_delay,
        })
    }

    /// Called once the peer ACKs the tunnel-open control message
    /// (`connection-established -> tunnel-open`).
    pub fn on_tunnel_opened(&mut self) -> TunnelResult<()> {
        if self.conn.state != ConnState::ConnectionEstablished {
            return Err(TunnelError::InvalidState(self.conn.state));
        }
        self.conn.state = ConnState::TunnelOpen;
        Ok(())
    }

    /// `ServiceTunnelClose()`: graceful shutdown request.
    pub fn begin_closing(&mut self) -> TunnelResult<()> {
        if self.conn.state != ConnState::TunnelOpen {
            return Err(TunnelError::InvalidState(self.conn.state));
        }
        self.conn.state = ConnState::TunnelClosing;
        Ok(())
    }

    /// Called once the Close is ACKed, or the transport drops while closing.
    pub fn on_closed(&mut self) {
        self.stream = None;
        self.conn.state = ConnState::NotConnected;
        debug!("tunnel closed, returning to not-connected");
    }

    /// Any transport error at any state drives the manager back to
    /// `not-connected` and bumps the failure counter, regardless of which
    /// state it happened in (§4.3: "any state -> not-connected on transport
    /// error").
    pub fn on_transport_error(&mut self, reason: &str) {
        warn!(reason, state = ?self.conn.state, "tunnel transport error");
        self.stream = None;
        self.conn.record_connect_failure();
        self.maybe_notify_application();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::TunnelRole;
    use crate::state::{FibonacciReconnectPolicy, SourceInterface};
    use std::net::SocketAddr;

    fn new_mgr() -> TunnelConnMgr {
        let conn = TunnelConnection::new(
            TunnelRole::Primary,
            SourceInterface::WiFi,
            42,
            "127.0.0.1:1".parse::<SocketAddr>().unwrap(),
        );
        TunnelConnMgr::new(conn, Arc::new(FibonacciReconnectPolicy::default()))
    }

    #[tokio::test]
    async fn failed_connect_returns_to_not_connected_and_notifies_after_threshold() {
        let mut mgr = new_mgr();
        let notified = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let notified_clone = notified.clone();
        mgr.on_notify_application(Box::new(move |count| {
            notified_clone.store(count, std::sync::atomic::Ordering::SeqCst);
        }));

        for _ in 0..3 {
            let _ = mgr.try_connecting_now().await;
        }
        assert_eq!(mgr.state(), ConnState::NotConnected);
        assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[test]
    fn opening_tunnel_before_connection_established_is_rejected() {
        let mut mgr = new_mgr();
        let err = mgr.on_tunnel_opened().unwrap_err();
        assert!(matches!(err, TunnelError::InvalidState(ConnState::NotConnected)));
    }
}
