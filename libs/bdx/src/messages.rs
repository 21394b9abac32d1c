//! BDX wire messages: init / pack / parse / packed-length / equality for
//! each message type (§4.5).

use crate::control::{RangeControl, TransferControl};
use crate::error::{BdxError, BdxResult};
use crate::metadata::Metadata;
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub trait BdxMessage: Sized {
    fn pack(&self) -> BdxResult<Bytes>;
    fn parse(buf: &[u8]) -> BdxResult<Self>;
    fn packed_length(&self) -> BdxResult<usize> {
        Ok(self.pack()?.len())
    }
}

fn require(buf: &[u8], needed: usize) -> BdxResult<()> {
    if buf.len() < needed {
        return Err(BdxError::Truncated {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

fn put_offset_or_length(out: &mut BytesMut, value: u64, wide: bool) {
    if wide {
        out.put_u64(value);
    } else {
        out.put_u32(value as u32);
    }
}

fn get_offset_or_length(buf: &mut impl Buf, wide: bool) -> BdxResult<u64> {
    if wide {
        require_remaining(buf.remaining(), 8)?;
        Ok(buf.get_u64())
    } else {
        require_remaining(buf.remaining(), 4)?;
        Ok(buf.get_u32() as u64)
    }
}

fn require_remaining(available: usize, needed: usize) -> BdxResult<()> {
    if available < needed {
        return Err(BdxError::Truncated { needed, available });
    }
    Ok(())
}

fn put_file_designator(out: &mut BytesMut, designator: &str) {
    out.put_u16(designator.len() as u16);
    out.put_slice(designator.as_bytes());
}

fn get_file_designator(buf: &mut impl Buf) -> BdxResult<String> {
    require_remaining(buf.remaining(), 2)?;
    let len = buf.get_u16() as usize;
    require_remaining(buf.remaining(), len)?;
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    String::from_utf8(raw).map_err(|_| BdxError::InvalidFileDesignator)
}

fn put_metadata(out: &mut BytesMut, metadata: &Option<Metadata>) -> BdxResult<()> {
    if let Some(metadata) = metadata {
        out.put_slice(&metadata.resolve()?);
    }
    Ok(())
}

/// SendInit: proposal to send (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct SendInit {
    pub transfer_control: TransferControl,
    pub range_control: RangeControl,
    pub start_offset: Option<u64>,
    pub length: Option<u64>,
    pub max_block_size: u16,
    pub file_designator: String,
    pub metadata: Option<Metadata>,
}

impl SendInit {
    pub fn new(
        transfer_control: TransferControl,
        range_control: RangeControl,
        max_block_size: u16,
        file_designator: impl Into<String>,
    ) -> Self {
        Self {
            transfer_control,
            range_control,
            start_offset: None,
            length: None,
            max_block_size,
            file_designator: file_designator.into(),
            metadata: None,
        }
    }
}

impl BdxMessage for SendInit {
    fn pack(&self) -> BdxResult<Bytes> {
        let mut out = BytesMut::new();
        out.put_u8(self.transfer_control.pack());
        out.put_u8(self.range_control.pack());
        if self.range_control.start_offset_present {
            put_offset_or_length(
                &mut out,
                self.start_offset.unwrap_or(0),
                self.range_control.wide_range,
            );
        }
        if self.range_control.definite_length {
            put_offset_or_length(&mut out, self.length.unwrap_or(0), self.range_control.wide_range);
        }
        out.put_u16(self.max_block_size);
        put_file_designator(&mut out, &self.file_designator);
        put_metadata(&mut out, &self.metadata)?;
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 2)?;
        let mut cursor = buf;
        let transfer_control = TransferControl::parse(cursor.get_u8())?;
        let range_control = RangeControl::parse(cursor.get_u8());
        let start_offset = if range_control.start_offset_present {
            Some(get_offset_or_length(&mut cursor, range_control.wide_range)?)
        } else {
            None
        };
        let length = if range_control.definite_length {
            Some(get_offset_or_length(&mut cursor, range_control.wide_range)?)
        } else {
            None
        };
        require_remaining(cursor.remaining(), 2)?;
        let max_block_size = cursor.get_u16();
        let file_designator = get_file_designator(&mut cursor)?;
        let metadata = if cursor.has_remaining() {
            Some(Metadata::Inline(Bytes::copy_from_slice(cursor.chunk())))
        } else {
            None
        };
        Ok(Self {
            transfer_control,
            range_control,
            start_offset,
            length,
            max_block_size,
            file_designator,
            metadata,
        })
    }
}

/// SendAccept: confirms version, exactly one transfer mode, max block
/// size, and optional metadata (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct SendAccept {
    pub transfer_control: TransferControl,
    pub max_block_size: u16,
    pub metadata: Option<Metadata>,
}

impl SendAccept {
    pub fn new(transfer_control: TransferControl, max_block_size: u16) -> BdxResult<Self> {
        if transfer_control.mode.is_none() {
            return Err(BdxError::MultipleTransferModes);
        }
        Ok(Self {
            transfer_control,
            max_block_size,
            metadata: None,
        })
    }
}

impl BdxMessage for SendAccept {
    fn pack(&self) -> BdxResult<Bytes> {
        if self.transfer_control.mode.is_none() {
            return Err(BdxError::MultipleTransferModes);
        }
        let mut out = BytesMut::new();
        out.put_u8(self.transfer_control.pack());
        out.put_u16(self.max_block_size);
        put_metadata(&mut out, &self.metadata)?;
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 3)?;
        let mut cursor = buf;
        let transfer_control = TransferControl::parse(cursor.get_u8())?;
        if transfer_control.mode.is_none() {
            return Err(BdxError::MultipleTransferModes);
        }
        let max_block_size = cursor.get_u16();
        let metadata = if cursor.has_remaining() {
            Some(Metadata::Inline(Bytes::copy_from_slice(cursor.chunk())))
        } else {
            None
        };
        Ok(Self {
            transfer_control,
            max_block_size,
            metadata,
        })
    }
}

/// ReceiveInit: mirrors `SendInit` (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveInit {
    pub inner: SendInit,
}

impl BdxMessage for ReceiveInit {
    fn pack(&self) -> BdxResult<Bytes> {
        self.inner.pack()
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        Ok(Self {
            inner: SendInit::parse(buf)?,
        })
    }
}

/// ReceiveAccept: mirrors `SendAccept` but also carries the responder's
/// definitive length field (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveAccept {
    pub transfer_control: TransferControl,
    pub range_control: RangeControl,
    pub start_offset: Option<u64>,
    pub length: Option<u64>,
    pub max_block_size: u16,
    pub metadata: Option<Metadata>,
}

impl BdxMessage for ReceiveAccept {
    fn pack(&self) -> BdxResult<Bytes> {
        let mut out = BytesMut::new();
        out.put_u8(self.transfer_control.pack());
        out.put_u8(self.range_control.pack());
        if self.range_control.start_offset_present {
            put_offset_or_length(
                &mut out,
                self.start_offset.unwrap_or(0),
                self.range_control.wide_range,
            );
        }
        if self.range_control.definite_length {
            put_offset_or_length(&mut out, self.length.unwrap_or(0), self.range_control.wide_range);
        }
        out.put_u16(self.max_block_size);
        put_metadata(&mut out, &self.metadata)?;
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 2)?;
        let mut cursor = buf;
        let transfer_control = TransferControl::parse(cursor.get_u8())?;
        let range_control = RangeControl::parse(cursor.get_u8());
        let start_offset = if range_control.start_offset_present {
            Some(get_offset_or_length(&mut cursor, range_control.wide_range)?)
        } else {
            None
        };
        let length = if range_control.definite_length {
            Some(get_offset_or_length(&mut cursor, range_control.wide_range)?)
        } else {
            None
        };
        require_remaining(cursor.remaining(), 2)?;
        let max_block_size = cursor.get_u16();
        let metadata = if cursor.has_remaining() {
            Some(Metadata::Inline(Bytes::copy_from_slice(cursor.chunk())))
        } else {
            None
        };
        Ok(Self {
            transfer_control,
            range_control,
            start_offset,
            length,
            max_block_size,
            metadata,
        })
    }
}

/// BlockQuery: 8-bit block counter (pre-v1 BDX) (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockQuery {
    pub block_counter: u8,
}

impl BdxMessage for BlockQuery {
    fn pack(&self) -> BdxResult<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.block_counter]))
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 1)?;
        Ok(Self { block_counter: buf[0] })
    }
}

/// BlockQueryV1: 32-bit block counter (BDX v1) (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockQueryV1 {
    pub block_counter: u32,
}

impl BdxMessage for BlockQueryV1 {
    fn pack(&self) -> BdxResult<Bytes> {
        let mut out = BytesMut::with_capacity(4);
        out.put_u32(self.block_counter);
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 4)?;
        let mut cursor = buf;
        Ok(Self {
            block_counter: cursor.get_u32(),
        })
    }
}

/// BlockSend: owns its payload as `bytes::Bytes`, a cheap refcounted slice
/// of the original receive buffer — the Rust analogue of "retains the
/// buffer through a packet-buffer reference count" (§4.5 Open Question
/// resolution).
#[derive(Debug, Clone)]
pub struct BlockSend {
    pub block_counter: u8,
    pub data: Bytes,
}

impl PartialEq for BlockSend {
    fn eq(&self, other: &Self) -> bool {
        self.block_counter == other.block_counter
            && self.data.len() == other.data.len()
            && self.data[..self.data.len()] == other.data[..other.data.len()]
    }
}

impl BdxMessage for BlockSend {
    fn pack(&self) -> BdxResult<Bytes> {
        let mut out = BytesMut::with_capacity(1 + self.data.len());
        out.put_u8(self.block_counter);
        out.put_slice(&self.data);
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 1)?;
        Ok(Self {
            block_counter: buf[0],
            data: Bytes::copy_from_slice(&buf[1..]),
        })
    }
}

/// BlockSendV1: 32-bit counter variant of `BlockSend` (§4.5).
#[derive(Debug, Clone)]
pub struct BlockSendV1 {
    pub block_counter: u32,
    pub data: Bytes,
}

impl PartialEq for BlockSendV1 {
    fn eq(&self, other: &Self) -> bool {
        self.block_counter == other.block_counter
            && self.data.len() == other.data.len()
            && self.data[..self.data.len()] == other.data[..other.data.len()]
    }
}

impl BdxMessage for BlockSendV1 {
    fn pack(&self) -> BdxResult<Bytes> {
        let mut out = BytesMut::with_capacity(4 + self.data.len());
        out.put_u32(self.block_counter);
        out.put_slice(&self.data);
        Ok(out.freeze())
    }

    fn parse(buf: &[u8]) -> BdxResult<Self> {
        require(buf, 4)?;
        let mut cursor = buf;
        let block_counter = cursor.get_u32();
        Ok(Self {
            block_counter,
            data: Bytes::copy_from_slice(cursor.chunk()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::TransferMode;

    fn tc() -> TransferControl {
        TransferControl::new(1, Some(TransferMode::ReceiverDrive)).unwrap()
    }

    #[test]
    fn send_init_round_trips_without_optional_fields() {
        let msg = SendInit::new(
            tc(),
            RangeControl {
                definite_length: false,
                start_offset_present: false,
                wide_range: false,
            },
            1024,
            "firmware.bin",
        );
        let packed = msg.pack().unwrap();
        assert_eq!(msg.packed_length().unwrap(), packed.len());
        let parsed = SendInit::parse(&packed).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn send_init_round_trips_with_wide_definite_length_and_offset() {
        let mut msg = SendInit::new(
            tc(),
            RangeControl {
                definite_length: true,
                start_offset_present: true,
                wide_range: true,
            },
            1024,
            "firmware.bin",
        );
        msg.start_offset = Some(0x1_0000_0000);
        msg.length = Some(0x2_0000_0000);
        let packed = msg.pack().unwrap();
        let parsed = SendInit::parse(&packed).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn send_accept_rejects_missing_mode() {
        let tc_no_mode = TransferControl::new(1, None).unwrap();
        assert!(SendAccept::new(tc_no_mode, 1024).is_err());
    }

    #[test]
    fn block_query_v1_uses_32_bit_counter() {
        let q = BlockQueryV1 { block_counter: 70000 };
        let packed = q.pack().unwrap();
        assert_eq!(packed.len(), 4);
        assert_eq!(BlockQueryV1::parse(&packed).unwrap(), q);
    }

    #[test]
    fn block_send_equality_compares_counter_and_data() {
        let a = BlockSend {
            block_counter: 3,
            data: Bytes::from_static(b"hello"),
        };
        let b = BlockSend {
            block_counter: 3,
            data: Bytes::from_static(b"hello"),
        };
        let c = BlockSend {
            block_counter: 3,
            data: Bytes::from_static(b"world"),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
