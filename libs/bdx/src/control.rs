//! Transfer-control and range-control bytes shared by every BDX message
//! (§4.5).

use crate::error::{BdxError, BdxResult};

const VERSION_MASK: u8 = 0x0F;

const BIT_SENDER_DRIVE: u8 = 1 << 4;
const BIT_RECEIVER_DRIVE: u8 = 1 << 5;
const BIT_ASYNC: u8 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    SenderDrive,
    ReceiverDrive,
    Async,
}

/// Version in bits 0-3, at most one of sender-drive/receiver-drive/async
/// in bits 4-6 (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferControl {
    pub version: u8,
    pub mode: Option<TransferMode>,
}

impl TransferControl {
    pub fn new(version: u8, mode: Option<TransferMode>) -> BdxResult<Self> {
        Ok(Self { version, mode })
    }

    pub fn pack(&self) -> u8 {
        let mode_bit = match self.mode {
            Some(TransferMode::SenderDrive) => BIT_SENDER_DRIVE,
            Some(TransferMode::ReceiverDrive) => BIT_RECEIVER_DRIVE,
            Some(TransferMode::Async) => BIT_ASYNC,
            None => 0,
        };
        (self.version & VERSION_MASK) | mode_bit
    }

    pub fn parse(byte: u8) -> BdxResult<Self> {
        let version = byte & VERSION_MASK;
        let bits = [
            (byte & BIT_SENDER_DRIVE != 0, TransferMode::SenderDrive),
            (byte & BIT_RECEIVER_DRIVE != 0, TransferMode::ReceiverDrive),
            (byte & BIT_ASYNC != 0, TransferMode::Async),
        ];
        let set: Vec<TransferMode> = bits.into_iter().filter(|(set, _)| *set).map(|(_, m)| m).collect();
        if set.len() > 1 {
            return Err(BdxError::MultipleTransferModes);
        }
        Ok(Self {
            version,
            mode: set.into_iter().next(),
        })
    }
}

const BIT_DEFINITE_LENGTH: u8 = 1 << 0;
const BIT_START_OFFSET_PRESENT: u8 = 1 << 1;
const BIT_WIDE_RANGE: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeControl {
    pub definite_length: bool,
    pub start_offset_present: bool,
    pub wide_range: bool,
}

impl RangeControl {
    pub fn pack(&self) -> u8 {
        (self.definite_length as u8 * BIT_DEFINITE_LENGTH)
            | (self.start_offset_present as u8 * BIT_START_OFFSET_PRESENT)
            | (self.wide_range as u8 * BIT_WIDE_RANGE)
    }

    pub fn parse(byte: u8) -> Self {
        Self {
            definite_length: byte & BIT_DEFINITE_LENGTH != 0,
            start_offset_present: byte & BIT_START_OFFSET_PRESENT != 0,
            wide_range: byte & BIT_WIDE_RANGE != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_control_round_trips_with_single_mode() {
        let tc = TransferControl::new(1, Some(TransferMode::ReceiverDrive)).unwrap();
        let packed = tc.pack();
        assert_eq!(TransferControl::parse(packed).unwrap(), tc);
    }

    #[test]
    fn transfer_control_rejects_multiple_modes_on_parse() {
        let byte = 1 | BIT_SENDER_DRIVE | BIT_RECEIVER_DRIVE;
        assert!(matches!(
            TransferControl::parse(byte),
            Err(BdxError::MultipleTransferModes)
        ));
    }

    #[test]
    fn range_control_round_trips() {
        let rc = RangeControl {
            definite_length: true,
            start_offset_present: false,
            wide_range: true,
        };
        assert_eq!(RangeControl::parse(rc.pack()), rc);
    }
}
