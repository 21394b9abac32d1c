//! TCP keepalive and user-timeout programming (§4.3, §4.3.1).
//!
//! `tokio::net::TcpStream` doesn't surface `TCP_KEEPIDLE`/`TCP_USER_TIMEOUT`
//! directly, so these are programmed through the raw `socket2::Socket` the
//! stream wraps, immediately after connect.

use crate::error::{TunnelError, TunnelResult};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct KeepaliveParams {
    pub interval: Duration,
    pub max_probes: u32,
    pub user_timeout: Duration,
}

impl KeepaliveParams {
    /// Defaults for the primary tunnel (§4.3).
    pub fn primary() -> Self {
        Self {
            interval: Duration::from_secs(15),
            max_probes: 6,
            user_timeout: Duration::from_secs(30),
        }
    }

    /// Looser defaults for the backup tunnel (§4.3).
    pub fn backup() -> Self {
        Self {
            interval: Duration::from_secs(45),
            max_probes: 4,
            user_timeout: Duration::from_secs(90),
        }
    }
}

#[cfg(unix)]
pub fn configure(stream: &tokio::net::TcpStream, params: &KeepaliveParams) -> TunnelResult<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock_ref = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(params.interval)
        .with_interval(params.interval)
        .with_retries(params.max_probes);
    sock_ref
        .set_tcp_keepalive(&keepalive)
        .map_err(|e| TunnelError::SocketConfig {
            reason: format!("set_tcp_keepalive: {e}"),
        })?;

    // TCP_USER_TIMEOUT has no cross-platform socket2 setter; set it via the
    // raw option where the platform defines it (Linux).
    #[cfg(target_os = "linux")]
    {
        sock_ref
            .set_tcp_user_timeout(Some(params.user_timeout))
            .map_err(|e| TunnelError::SocketConfig {
                reason: format!("set_tcp_user_timeout: {e}"),
            })?;
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn configure(_stream: &tokio::net::TcpStream, _params: &KeepaliveParams) -> TunnelResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_defaults_match_spec() {
        let p = KeepaliveParams::primary();
        assert_eq!(p.interval, Duration::from_secs(15));
        assert_eq!(p.max_probes, 6);
        assert_eq!(p.user_timeout, Duration::from_secs(30));
    }

    #[test]
    fn backup_defaults_are_looser() {
        let p = KeepaliveParams::backup();
        assert!(p.interval > KeepaliveParams::primary().interval);
        assert!(p.user_timeout > KeepaliveParams::primary().user_timeout);
    }
}
