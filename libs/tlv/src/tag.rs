//! Tag forms and the element-type wire codes.
//!
//! Container element-type codes are part of the wire contract (§6) and MUST
//! stay bit-exact: structure = 0x15, array = 0x16, path = 0x17, list = 0x18.

/// A TLV tag: identifies *what* a value means, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No tag at all — valid only directly inside an Array or a top-level value.
    Anonymous,
    /// A single byte, scoped to the enclosing container.
    Context(u8),
    /// A profile-less 32-bit number in the "common" profile.
    Common(u32),
    /// A fully qualified (profile, number) pair.
    Profile(u32, u32),
    /// A 32-bit number whose profile is implied by the enclosing context
    /// (e.g. the profile of the surrounding structure).
    Implicit(u32),
}

impl Tag {
    pub(crate) fn control_form(&self) -> u8 {
        match self {
            Tag::Anonymous => 0,
            Tag::Context(_) => 1,
            Tag::Common(_) => 2,
            Tag::Profile(_, _) => 3,
            Tag::Implicit(_) => 4,
        }
    }
}

/// Element-type byte. Low 5 bits of the control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    Int8 = 0x00,
    Int16 = 0x01,
    Int32 = 0x02,
    Int64 = 0x03,
    UInt8 = 0x04,
    UInt16 = 0x05,
    UInt32 = 0x06,
    UInt64 = 0x07,
    BoolFalse = 0x08,
    BoolTrue = 0x09,
    Float32 = 0x0A,
    Float64 = 0x0B,
    Utf8String1 = 0x0C,
    Utf8String2 = 0x0D,
    Utf8String4 = 0x0E,
    Utf8String8 = 0x0F,
    ByteString1 = 0x10,
    ByteString2 = 0x11,
    ByteString4 = 0x12,
    ByteString8 = 0x13,
    Null = 0x14,
    Structure = 0x15,
    Array = 0x16,
    Path = 0x17,
    List = 0x18,
    EndOfContainer = 0x19,
}

impl ElementType {
    pub fn from_byte(b: u8) -> Option<Self> {
        use ElementType::*;
        Some(match b {
            0x00 => Int8,
            0x01 => Int16,
            0x02 => Int32,
            0x03 => Int64,
            0x04 => UInt8,
            0x05 => UInt16,
            0x06 => UInt32,
            0x07 => UInt64,
            0x08 => BoolFalse,
            0x09 => BoolTrue,
            0x0A => Float32,
            0x0B => Float64,
            0x0C => Utf8String1,
            0x0D => Utf8String2,
            0x0E => Utf8String4,
            0x0F => Utf8String8,
            0x10 => ByteString1,
            0x11 => ByteString2,
            0x12 => ByteString4,
            0x13 => ByteString8,
            0x14 => Null,
            0x15 => Structure,
            0x16 => Array,
            0x17 => Path,
            0x18 => List,
            0x19 => EndOfContainer,
            _ => return None,
        })
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementType::Structure | ElementType::Array | ElementType::Path | ElementType::List
        )
    }
}

/// Container kinds exposed at the API level (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Structure,
    Array,
    Path,
    List,
}

impl ContainerKind {
    pub(crate) fn element_type(&self) -> ElementType {
        match self {
            ContainerKind::Structure => ElementType::Structure,
            ContainerKind::Array => ElementType::Array,
            ContainerKind::Path => ElementType::Path,
            ContainerKind::List => ElementType::List,
        }
    }

    pub(crate) fn from_element_type(et: ElementType) -> Option<Self> {
        match et {
            ElementType::Structure => Some(ContainerKind::Structure),
            ElementType::Array => Some(ContainerKind::Array),
            ElementType::Path => Some(ContainerKind::Path),
            ElementType::List => Some(ContainerKind::List),
            _ => None,
        }
    }
}
