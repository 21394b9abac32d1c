//! Minimal DER tag-length-value primitives, just enough to emit and parse
//! the handful of ASN.1 shapes an X.509 certificate needs (§4.2). Not a
//! general ASN.1 implementation: definite-length form only, no indefinite
//! length, no BER relaxations.

use crate::error::{CertError, CertResult};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_UTF8_STRING: u8 = 0x0C;
pub const TAG_PRINTABLE_STRING: u8 = 0x13;
pub const TAG_IA5_STRING: u8 = 0x16;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_GENERALIZED_TIME: u8 = 0x18;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;
pub const TAG_CONTEXT_0: u8 = 0xA0;
pub const TAG_CONTEXT_3: u8 = 0xA3;

/// Appends a DER length octet sequence for `len` bytes.
fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let significant = &bytes[first_nonzero..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Writes a complete `tag || length || value` TLV.
pub fn write_tlv(out: &mut Vec<u8>, tag: u8, value: &[u8]) {
    out.push(tag);
    write_length(out, value.len());
    out.extend_from_slice(value);
}

/// Wraps already-encoded member TLVs in a SEQUENCE.
pub fn write_sequence(out: &mut Vec<u8>, members: &[u8]) {
    write_tlv(out, TAG_SEQUENCE, members);
}

/// Encodes an unsigned integer, prefixing a leading 0x00 byte when the high
/// bit is set so the value doesn't read as negative (DER INTEGER rule).
pub fn write_unsigned_integer(out: &mut Vec<u8>, bytes: &[u8]) {
    let mut trimmed = bytes;
    while trimmed.len() > 1 && trimmed[0] == 0 {
        trimmed = &trimmed[1..];
    }
    if trimmed.is_empty() {
        trimmed = &[0];
    }
    if trimmed[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(trimmed.len() + 1);
        padded.push(0);
        padded.extend_from_slice(trimmed);
        write_tlv(out, TAG_INTEGER, &padded);
    } else {
        write_tlv(out, TAG_INTEGER, trimmed);
    }
}

/// Encodes a BIT STRING with zero unused bits, as used for public keys and
/// signatures in X.509.
pub fn write_bit_string(out: &mut Vec<u8>, bytes: &[u8]) {
    let mut value = Vec::with_capacity(bytes.len() + 1);
    value.push(0);
    value.extend_from_slice(bytes);
    write_tlv(out, TAG_BIT_STRING, &value);
}

pub struct ParsedTlv<'a> {
    pub tag: u8,
    pub value: &'a [u8],
    pub consumed: usize,
}

/// Parses one `tag || length || value` item starting at `buf[0]`.
pub fn parse_tlv(buf: &[u8]) -> CertResult<ParsedTlv<'_>> {
    if buf.len() < 2 {
        return Err(CertError::UnsupportedEncoding {
            reason: "truncated DER TLV".into(),
        });
    }
    let tag = buf[0];
    let (len, len_octets) = parse_length(&buf[1..])?;
    let start = 1 + len_octets;
    let end = start
        .checked_add(len)
        .ok_or_else(|| CertError::UnsupportedEncoding {
            reason: "DER length overflow".into(),
        })?;
    if end > buf.len() {
        return Err(CertError::UnsupportedEncoding {
            reason: "DER length exceeds buffer".into(),
        });
    }
    Ok(ParsedTlv {
        tag,
        value: &buf[start..end],
        consumed: end,
    })
}

fn parse_length(buf: &[u8]) -> CertResult<(usize, usize)> {
    if buf.is_empty() {
        return Err(CertError::UnsupportedEncoding {
            reason: "missing DER length".into(),
        });
    }
    let first = buf[0];
    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }
    let num_octets = (first & 0x7F) as usize;
    if num_octets == 0 || num_octets > 8 || buf.len() < 1 + num_octets {
        return Err(CertError::UnsupportedEncoding {
            reason: "unsupported DER long-form length".into(),
        });
    }
    let mut len: usize = 0;
    for &b in &buf[1..1 + num_octets] {
        len = (len << 8) | b as usize;
    }
    Ok((len, 1 + num_octets))
}

/// Strips a leading DER-INTEGER sign padding byte, if present.
pub fn strip_integer_padding(bytes: &[u8]) -> &[u8] {
    if bytes.len() > 1 && bytes[0] == 0 && bytes[1] & 0x80 != 0 {
        &bytes[1..]
    } else {
        bytes
    }
}

/// Iterates the top-level members of a SEQUENCE or SET value.
pub fn iter_members(value: &[u8]) -> MemberIter<'_> {
    MemberIter { rest: value }
}

pub struct MemberIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for MemberIter<'a> {
    type Item = CertResult<ParsedTlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match parse_tlv(self.rest) {
            Ok(item) => {
                self.rest = &self.rest[item.consumed..];
                Some(Ok(item))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}
