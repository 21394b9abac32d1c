//! TLV writer: `Put`, `StartContainer`/`EndContainer`, `PutPreEncodedContainer`,
//! `CopyContainer`, and `Finalize` (§4.1).

use crate::error::{TlvError, TlvResult};
use crate::reader::Reader;
use crate::tag::{ContainerKind, ElementType, Tag};

/// A TLV writer over an in-memory buffer.
///
/// `finalize` consumes `self`, so a finalized writer cannot be written to
/// again — the "writer-closed" failure mode from §4.1 is enforced at
/// compile time rather than with a runtime flag.
pub struct Writer {
    buf: Vec<u8>,
    open_containers: Vec<ContainerKind>,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            open_containers: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            open_containers: Vec::new(),
        }
    }

    fn write_control_and_tag(&mut self, et: ElementType, tag: Tag) {
        let control = (tag.control_form() << 5) | (et as u8);
        self.buf.push(control);
        match tag {
            Tag::Anonymous => {}
            Tag::Context(v) => self.buf.push(v),
            Tag::Common(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
            Tag::Profile(profile, number) => {
                self.buf.extend_from_slice(&profile.to_le_bytes());
                self.buf.extend_from_slice(&number.to_le_bytes());
            }
            Tag::Implicit(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
        }
    }

    pub fn put_signed(&mut self, tag: Tag, value: i64) {
        let et = if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
            ElementType::Int8
        } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
            ElementType::Int16
        } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            ElementType::Int32
        } else {
            ElementType::Int64
        };
        self.write_control_and_tag(et, tag);
        match et {
            ElementType::Int8 => self.buf.push(value as i8 as u8),
            ElementType::Int16 => self.buf.extend_from_slice(&(value as i16).to_le_bytes()),
            ElementType::Int32 => self.buf.extend_from_slice(&(value as i32).to_le_bytes()),
            _ => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn put_unsigned(&mut self, tag: Tag, value: u64) {
        let et = if value <= u8::MAX as u64 {
            ElementType::UInt8
        } else if value <= u16::MAX as u64 {
            ElementType::UInt16
        } else if value <= u32::MAX as u64 {
            ElementType::UInt32
        } else {
            ElementType::UInt64
        };
        self.write_control_and_tag(et, tag);
        match et {
            ElementType::UInt8 => self.buf.push(value as u8),
            ElementType::UInt16 => self.buf.extend_from_slice(&(value as u16).to_le_bytes()),
            ElementType::UInt32 => self.buf.extend_from_slice(&(value as u32).to_le_bytes()),
            _ => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn put_bool(&mut self, tag: Tag, value: bool) {
        let et = if value {
            ElementType::BoolTrue
        } else {
            ElementType::BoolFalse
        };
        self.write_control_and_tag(et, tag);
    }

    pub fn put_float(&mut self, tag: Tag, value: f64) {
        self.write_control_and_tag(ElementType::Float64, tag);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_null(&mut self, tag: Tag) {
        self.write_control_and_tag(ElementType::Null, tag);
    }

    fn length_element_type(len: usize, base: [ElementType; 4]) -> (ElementType, usize) {
        if len <= u8::MAX as usize {
            (base[0], 1)
        } else if len <= u16::MAX as usize {
            (base[1], 2)
        } else if len <= u32::MAX as usize {
            (base[2], 4)
        } else {
            (base[3], 8)
        }
    }

    fn write_length(&mut self, len: usize, width: usize) {
        match width {
            1 => self.buf.push(len as u8),
            2 => self.buf.extend_from_slice(&(len as u16).to_le_bytes()),
            4 => self.buf.extend_from_slice(&(len as u32).to_le_bytes()),
            _ => self.buf.extend_from_slice(&(len as u64).to_le_bytes()),
        }
    }

    pub fn put_utf8_string(&mut self, tag: Tag, value: &str) {
        let bytes = value.as_bytes();
        let (et, width) = Self::length_element_type(
            bytes.len(),
            [
                ElementType::Utf8String1,
                ElementType::Utf8String2,
                ElementType::Utf8String4,
                ElementType::Utf8String8,
            ],
        );
        self.write_control_and_tag(et, tag);
        self.write_length(bytes.len(), width);
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_byte_string(&mut self, tag: Tag, value: &[u8]) {
        let (et, width) = Self::length_element_type(
            value.len(),
            [
                ElementType::ByteString1,
                ElementType::ByteString2,
                ElementType::ByteString4,
                ElementType::ByteString8,
            ],
        );
        self.write_control_and_tag(et, tag);
        self.write_length(value.len(), width);
        self.buf.extend_from_slice(value);
    }

    pub fn start_container(&mut self, tag: Tag, kind: ContainerKind) {
        self.write_control_and_tag(kind.element_type(), tag);
        self.open_containers.push(kind);
    }

    pub fn end_container(&mut self) -> TlvResult<()> {
        if self.open_containers.pop().is_none() {
            return Err(TlvError::invalid_encoding(
                self.buf.len(),
                "end_container called with no open container",
            ));
        }
        self.write_control_and_tag(ElementType::EndOfContainer, Tag::Anonymous);
        Ok(())
    }

    /// Bulk-copy a previously encoded container body (including its own
    /// trailing end-of-container marker) under a new outer tag.
    pub fn put_pre_encoded_container(&mut self, tag: Tag, kind: ContainerKind, body: &[u8]) {
        self.write_control_and_tag(kind.element_type(), tag);
        self.buf.extend_from_slice(body);
    }

    /// Copy the container the reader currently sits on into this writer,
    /// rewriting only the outer tag.
    pub fn copy_container(&mut self, reader: &mut Reader<'_>, tag: Tag) -> TlvResult<()> {
        let (kind, body) = reader.container_body()?;
        self.put_pre_encoded_container(tag, kind, body);
        Ok(())
    }

    /// The number of bytes written so far. Lets a caller note a starting
    /// offset before writing a region it will later want to snapshot
    /// (e.g. a to-be-signed region inside a larger structure).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written since `start` (as returned by `len()` at that
    /// point), without finalizing or otherwise consuming the writer.
    pub fn bytes_from(&self, start: usize) -> &[u8] {
        &self.buf[start..]
    }

    /// Close any still-open containers and return the finished buffer.
    pub fn finalize(mut self) -> TlvResult<Vec<u8>> {
        while !self.open_containers.is_empty() {
            self.end_container()?;
        }
        Ok(self.buf)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
