//! Software-update exchange: `ImageAnnounce → ImageQuery → ImageQueryResponse`
//! (§3.1, §4.7). Runs over the same `ExchangeEngine` as cert-prov and BDX;
//! the actual image transfer is a BDX `ReceiveInit`/`ReceiveAccept`/
//! `BlockQuery` client role, not a separate wire protocol.

use crate::error::BdxResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAnnounce;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub product_id: u16,
    pub vendor_id: u16,
    pub current_version: String,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQueryResponse {
    pub uri: String,
    pub version: String,
    pub update_priority: UpdatePriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePriority {
    Normal,
    Critical,
}

/// Whichever of these occurred is delivered to a single application
/// callback (§4.7). The `NoUpdateAvailable` status-report shortcut and a
/// successful `ImageQueryResponse` both arrive here, never as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftwareUpdateOutcome {
    UpdateAvailable(ImageQueryResponse),
    NoUpdateAvailable,
}

const SWU_PROFILE: u32 = 0x0000_0014;
const SWU_CODE_NO_UPDATE_AVAILABLE: u16 = 1;

/// Maps a raw status-report (profile, code) pair to `Ok(None)`-shaped
/// terminal success when it is the SWU no-update shortcut, mirroring the
/// "no-change" status report in §4.6 (both collapse to `Ok` at the Rust
/// API, never an `Err`).
pub fn interpret_status_report(profile: u32, code: u16) -> BdxResult<Option<SoftwareUpdateOutcome>> {
    if profile == SWU_PROFILE && code == SWU_CODE_NO_UPDATE_AVAILABLE {
        return Ok(Some(SoftwareUpdateOutcome::NoUpdateAvailable));
    }
    Err(crate::error::BdxError::StatusReport { profile, code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_update_available_status_report_is_terminal_success() {
        let outcome = interpret_status_report(SWU_PROFILE, SWU_CODE_NO_UPDATE_AVAILABLE).unwrap();
        assert_eq!(outcome, Some(SoftwareUpdateOutcome::NoUpdateAvailable));
    }

    #[test]
    fn other_status_reports_are_errors() {
        assert!(interpret_status_report(SWU_PROFILE, 99).is_err());
    }
}
