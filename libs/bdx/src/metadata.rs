//! BDX optional metadata: inline bytes, or an idempotent callback capped at
//! `WEAVE_CONFIG_BDX_SEND_INIT_MAX_METADATA_BYTES` (§4.5).

use crate::error::{BdxError, BdxResult};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

pub const MAX_METADATA_BYTES: usize = 256;

#[derive(Clone)]
pub enum Metadata {
    Inline(Bytes),
    /// Invoked independently by `pack` and `packed_length`; the caller MUST
    /// supply a pure function so both calls observe byte-identical output.
    Callback(Arc<dyn Fn() -> BdxResult<Bytes> + Send + Sync>),
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metadata::Inline(b) => f.debug_tuple("Inline").field(b).finish(),
            Metadata::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        match (self.resolve(), other.resolve()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Metadata {
    pub fn resolve(&self) -> BdxResult<Bytes> {
        let bytes = match self {
            Metadata::Inline(b) => b.clone(),
            Metadata::Callback(f) => f()?,
        };
        if bytes.len() > MAX_METADATA_BYTES {
            return Err(BdxError::MetadataTooLarge {
                max: MAX_METADATA_BYTES,
            });
        }
        Ok(bytes)
    }
}
