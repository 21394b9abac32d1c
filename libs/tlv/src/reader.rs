//! TLV reader: advances over elements, enters/exits containers, and exposes
//! the current tag/type/value (§4.1).
//!
//! Byte/UTF-8 string accessors return slices borrowed from the input buffer
//! (`DataPtr` in the distilled spec). The borrow checker enforces the "valid
//! only until the next `next`/`enter_container`/`exit_container` call" rule
//! for free: `get_bytes`/`get_string` borrow `&self`, and any reader method
//! that would invalidate them takes `&mut self`.

use crate::error::{TlvError, TlvResult};
use crate::tag::{ContainerKind, ElementType, Tag};

#[derive(Debug, Clone, Copy)]
struct CurrentElem {
    tag: Tag,
    et: ElementType,
    value_offset: usize,
    value_len: usize,
}

struct Header {
    tag: Tag,
    et: ElementType,
    value_offset: usize,
    value_len: usize,
    next_offset: usize,
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    cur: Option<CurrentElem>,
    depth_stack: Vec<ContainerKind>,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            cur: None,
            depth_stack: Vec::new(),
        }
    }

    fn require(&self, offset: usize, len: usize, context: &str) -> TlvResult<()> {
        let end = offset.checked_add(len).ok_or_else(|| {
            TlvError::buffer_too_small(usize::MAX, self.buf.len(), context.to_string())
        })?;
        if end > self.buf.len() {
            return Err(TlvError::buffer_too_small(end, self.buf.len(), context.to_string()));
        }
        Ok(())
    }

    fn read_tag_bytes(&self, tag_form: u8, mut p: usize) -> TlvResult<(Tag, usize)> {
        let tag = match tag_form {
            0 => Tag::Anonymous,
            1 => {
                self.require(p, 1, "context tag byte")?;
                let v = self.buf[p];
                p += 1;
                Tag::Context(v)
            }
            2 => {
                self.require(p, 4, "common tag bytes")?;
                let v = u32::from_le_bytes(self.buf[p..p + 4].try_into().unwrap());
                p += 4;
                Tag::Common(v)
            }
            3 => {
                self.require(p, 8, "profile tag bytes")?;
                let profile = u32::from_le_bytes(self.buf[p..p + 4].try_into().unwrap());
                let number = u32::from_le_bytes(self.buf[p + 4..p + 8].try_into().unwrap());
                p += 8;
                Tag::Profile(profile, number)
            }
            4 => {
                self.require(p, 4, "implicit tag bytes")?;
                let v = u32::from_le_bytes(self.buf[p..p + 4].try_into().unwrap());
                p += 4;
                Tag::Implicit(v)
            }
            other => {
                return Err(TlvError::invalid_encoding(
                    p,
                    format!("unknown tag control form {other}"),
                ))
            }
        };
        Ok((tag, p))
    }

    fn parse_header(&self, pos: usize) -> TlvResult<Header> {
        self.require(pos, 1, "control byte")?;
        let control = self.buf[pos];
        let et = ElementType::from_byte(control & 0x1F)
            .ok_or(TlvError::UnknownElementType(control & 0x1F))?;
        let tag_form = control >> 5;
        let (tag, mut p) = self.read_tag_bytes(tag_form, pos + 1)?;

        let fixed = |len: usize| -> TlvResult<(usize, usize, usize)> {
            self.require(p, len, "fixed-width value")?;
            Ok((p, len, p + len))
        };

        let (value_offset, value_len, next_offset) = match et {
            ElementType::Int8 | ElementType::UInt8 => fixed(1)?,
            ElementType::Int16 | ElementType::UInt16 => fixed(2)?,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => fixed(4)?,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => fixed(8)?,
            ElementType::BoolFalse | ElementType::BoolTrue | ElementType::Null => (p, 0, p),
            ElementType::Utf8String1 | ElementType::ByteString1 => {
                self.require(p, 1, "1-byte length")?;
                let len = self.buf[p] as usize;
                p += 1;
                self.require(p, len, "string/byte data")?;
                (p, len, p + len)
            }
            ElementType::Utf8String2 | ElementType::ByteString2 => {
                self.require(p, 2, "2-byte length")?;
                let len = u16::from_le_bytes(self.buf[p..p + 2].try_into().unwrap()) as usize;
                p += 2;
                self.require(p, len, "string/byte data")?;
                (p, len, p + len)
            }
            ElementType::Utf8String4 | ElementType::ByteString4 => {
                self.require(p, 4, "4-byte length")?;
                let len = u32::from_le_bytes(self.buf[p..p + 4].try_into().unwrap()) as usize;
                p += 4;
                self.require(p, len, "string/byte data")?;
                (p, len, p + len)
            }
            ElementType::Utf8String8 | ElementType::ByteString8 => {
                self.require(p, 8, "8-byte length")?;
                let len = u64::from_le_bytes(self.buf[p..p + 8].try_into().unwrap()) as usize;
                p += 8;
                self.require(p, len, "string/byte data")?;
                (p, len, p + len)
            }
            ElementType::Structure
            | ElementType::Array
            | ElementType::Path
            | ElementType::List => (p, 0, p),
            ElementType::EndOfContainer => (p, 0, p),
        };

        Ok(Header {
            tag,
            et,
            value_offset,
            value_len,
            next_offset,
        })
    }

    /// Advance to the next element at the current depth. Returns `Ok(false)`
    /// at the end of the buffer (top level) or at an end-of-container marker
    /// (nested level) — callers inside a container must follow with
    /// `exit_container`.
    pub fn next(&mut self) -> TlvResult<bool> {
        if self.pos >= self.buf.len() {
            if self.depth_stack.is_empty() {
                self.cur = None;
                return Ok(false);
            }
            return Err(TlvError::invalid_encoding(
                self.pos,
                "buffer ended without a matching end-of-container marker",
            ));
        }
        let hdr = self.parse_header(self.pos)?;
        if hdr.et == ElementType::EndOfContainer {
            self.cur = None;
            return Ok(false);
        }
        self.cur = Some(CurrentElem {
            tag: hdr.tag,
            et: hdr.et,
            value_offset: hdr.value_offset,
            value_len: hdr.value_len,
        });
        self.pos = hdr.next_offset;
        Ok(true)
    }

    pub fn tag(&self) -> Option<Tag> {
        self.cur.map(|c| c.tag)
    }

    pub fn element_type(&self) -> Option<ElementType> {
        self.cur.map(|c| c.et)
    }

    pub fn length(&self) -> Option<usize> {
        self.cur.map(|c| c.value_len)
    }

    fn current(&self) -> TlvResult<CurrentElem> {
        self.cur.ok_or(TlvError::ReaderClosed)
    }

    pub fn get_i64(&self) -> TlvResult<i64> {
        let c = self.current()?;
        let b = &self.buf[c.value_offset..c.value_offset + c.value_len];
        Ok(match c.et {
            ElementType::Int8 => b[0] as i8 as i64,
            ElementType::Int16 => i16::from_le_bytes(b.try_into().unwrap()) as i64,
            ElementType::Int32 => i32::from_le_bytes(b.try_into().unwrap()) as i64,
            ElementType::Int64 => i64::from_le_bytes(b.try_into().unwrap()),
            other => {
                return Err(TlvError::WrongType {
                    expected: "signed integer",
                    actual: element_type_name(other),
                    offset: c.value_offset,
                })
            }
        })
    }

    pub fn get_u64(&self) -> TlvResult<u64> {
        let c = self.current()?;
        let b = &self.buf[c.value_offset..c.value_offset + c.value_len];
        Ok(match c.et {
            ElementType::UInt8 => b[0] as u64,
            ElementType::UInt16 => u16::from_le_bytes(b.try_into().unwrap()) as u64,
            ElementType::UInt32 => u32::from_le_bytes(b.try_into().unwrap()) as u64,
            ElementType::UInt64 => u64::from_le_bytes(b.try_into().unwrap()),
            other => {
                return Err(TlvError::WrongType {
                    expected: "unsigned integer",
                    actual: element_type_name(other),
                    offset: c.value_offset,
                })
            }
        })
    }

    pub fn get_bool(&self) -> TlvResult<bool> {
        let c = self.current()?;
        match c.et {
            ElementType::BoolTrue => Ok(true),
            ElementType::BoolFalse => Ok(false),
            other => Err(TlvError::WrongType {
                expected: "bool",
                actual: element_type_name(other),
                offset: c.value_offset,
            }),
        }
    }

    pub fn get_f64(&self) -> TlvResult<f64> {
        let c = self.current()?;
        let b = &self.buf[c.value_offset..c.value_offset + c.value_len];
        Ok(match c.et {
            ElementType::Float32 => f32::from_le_bytes(b.try_into().unwrap()) as f64,
            ElementType::Float64 => f64::from_le_bytes(b.try_into().unwrap()),
            other => {
                return Err(TlvError::WrongType {
                    expected: "float",
                    actual: element_type_name(other),
                    offset: c.value_offset,
                })
            }
        })
    }

    /// Borrow the raw bytes of a byte-string value. The borrow is valid only
    /// until the next call to `next`, `enter_container`, or `exit_container`.
    pub fn get_bytes(&self) -> TlvResult<&'a [u8]> {
        let c = self.current()?;
        match c.et {
            ElementType::ByteString1
            | ElementType::ByteString2
            | ElementType::ByteString4
            | ElementType::ByteString8 => {
                Ok(&self.buf[c.value_offset..c.value_offset + c.value_len])
            }
            other => Err(TlvError::WrongType {
                expected: "byte-string",
                actual: element_type_name(other),
                offset: c.value_offset,
            }),
        }
    }

    /// Borrow the raw bytes of a UTF-8 string value. See `get_bytes` for the
    /// borrow's validity window.
    pub fn get_string(&self) -> TlvResult<&'a str> {
        let c = self.current()?;
        match c.et {
            ElementType::Utf8String1
            | ElementType::Utf8String2
            | ElementType::Utf8String4
            | ElementType::Utf8String8 => {
                let b = &self.buf[c.value_offset..c.value_offset + c.value_len];
                std::str::from_utf8(b)
                    .map_err(|_| TlvError::invalid_encoding(c.value_offset, "invalid UTF-8"))
            }
            other => Err(TlvError::WrongType {
                expected: "utf8-string",
                actual: element_type_name(other),
                offset: c.value_offset,
            }),
        }
    }

    /// Descend into the container the reader currently sits on.
    pub fn enter_container(&mut self) -> TlvResult<ContainerKind> {
        let c = self.current()?;
        let kind = ContainerKind::from_element_type(c.et).ok_or(TlvError::WrongType {
            expected: "container",
            actual: element_type_name(c.et),
            offset: c.value_offset,
        })?;
        self.depth_stack.push(kind);
        self.cur = None;
        Ok(kind)
    }

    /// Leave the current container. Must be called after `next` has
    /// returned `Ok(false)` inside that container.
    pub fn exit_container(&mut self) -> TlvResult<()> {
        if self.depth_stack.pop().is_none() {
            return Err(TlvError::invalid_encoding(
                self.pos,
                "exit_container with no matching enter_container",
            ));
        }
        let hdr = self.parse_header(self.pos)?;
        if hdr.et != ElementType::EndOfContainer {
            return Err(TlvError::ContainerMismatch {
                opened: self.pos,
                found: hdr.et as u8,
            });
        }
        self.pos = hdr.next_offset;
        self.cur = None;
        Ok(())
    }

    /// Return the container the reader currently sits on as its raw body
    /// bytes (everything after the outer tag, including the matching
    /// end-of-container marker) and advance past it, as if it had been
    /// skipped. Used by `Writer::copy_container`.
    pub fn container_body(&mut self) -> TlvResult<(ContainerKind, &'a [u8])> {
        let c = self.current()?;
        let kind = ContainerKind::from_element_type(c.et).ok_or(TlvError::WrongType {
            expected: "container",
            actual: element_type_name(c.et),
            offset: c.value_offset,
        })?;
        let body_start = c.value_offset;
        let mut depth = 1usize;
        let mut p = body_start;
        loop {
            let hdr = self.parse_header(p)?;
            if hdr.et == ElementType::EndOfContainer {
                depth -= 1;
                if depth == 0 {
                    let end = hdr.next_offset;
                    self.pos = end;
                    self.cur = None;
                    return Ok((kind, &self.buf[body_start..end]));
                }
                p = hdr.next_offset;
            } else if hdr.et.is_container() {
                depth += 1;
                p = hdr.value_offset;
            } else {
                p = hdr.next_offset;
            }
        }
    }
}

fn element_type_name(et: ElementType) -> &'static str {
    match et {
        ElementType::Int8 | ElementType::Int16 | ElementType::Int32 | ElementType::Int64 => {
            "signed integer"
        }
        ElementType::UInt8 | ElementType::UInt16 | ElementType::UInt32 | ElementType::UInt64 => {
            "unsigned integer"
        }
        ElementType::BoolFalse | ElementType::BoolTrue => "bool",
        ElementType::Float32 | ElementType::Float64 => "float",
        ElementType::Utf8String1
        | ElementType::Utf8String2
        | ElementType::Utf8String4
        | ElementType::Utf8String8 => "utf8-string",
        ElementType::ByteString1
        | ElementType::ByteString2
        | ElementType::ByteString4
        | ElementType::ByteString8 => "byte-string",
        ElementType::Null => "null",
        ElementType::Structure => "structure",
        ElementType::Array => "array",
        ElementType::Path => "path",
        ElementType::List => "list",
        ElementType::EndOfContainer => "end-of-container",
    }
}
