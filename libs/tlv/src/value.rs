//! The `TLVValue` data model (§3): a discriminated variant over the element
//! kinds the codec understands, each paired with its `Tag`.

use crate::tag::{ContainerKind, Tag};

#[derive(Debug, Clone, PartialEq)]
pub enum TlvValue {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f64),
    Utf8String(String),
    ByteString(Vec<u8>),
    Null,
    Container(ContainerKind, Vec<(Tag, TlvValue)>),
}

impl TlvValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TlvValue::Signed(_) => "signed",
            TlvValue::Unsigned(_) => "unsigned",
            TlvValue::Bool(_) => "bool",
            TlvValue::Float(_) => "float",
            TlvValue::Utf8String(_) => "utf8-string",
            TlvValue::ByteString(_) => "byte-string",
            TlvValue::Null => "null",
            TlvValue::Container(_, _) => "container",
        }
    }
}
