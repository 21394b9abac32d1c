//! Tunnel connection manager: TCP lifecycle, Fibonacci reconnect policy,
//! keepalive/liveness defaults, primary/backup failover (§4.3).

pub mod connection;
pub mod error;
pub mod keepalive;
pub mod mgr;
pub mod state;

pub use connection::{TunnelConnection, TunnelRole};
pub use error::{TunnelError, TunnelResult};
pub use keepalive::KeepaliveParams;
pub use mgr::{FailoverNotify, TunnelConnMgr};
pub use state::{ConnState, FibonacciReconnectPolicy, Priority, ReconnectParam, ReconnectPolicy, SourceInterface};
