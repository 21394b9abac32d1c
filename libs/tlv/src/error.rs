//! Errors for TLV encode/decode.
//!
//! Mirrors the diagnostic-context convention used across this workspace's
//! error enums: every variant carries enough state to explain itself without
//! a second round-trip through the source buffer.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TlvError {
    #[error("buffer too small: need {need} bytes, have {have} (context: {context})")]
    BufferTooSmall {
        need: usize,
        have: usize,
        context: String,
    },

    #[error("invalid TLV encoding at offset {offset}: {reason}")]
    InvalidEncoding { offset: usize, reason: String },

    #[error("unknown element type {0:#04x}")]
    UnknownElementType(u8),

    #[error("wrong type: expected {expected}, got {actual} (offset {offset})")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
        offset: usize,
    },

    #[error("integer overflow converting {value} into target width")]
    Overflow { value: i128 },

    #[error("container end marker mismatch: opened {opened} bytes ago, found {found:#04x}")]
    ContainerMismatch { opened: usize, found: u8 },

    #[error("Next() called while reader is inside a closed or exited container")]
    ReaderClosed,

    #[error("writer already finalized, no further writes are possible")]
    WriterClosed,

    #[error("container depth {0} exceeds the maximum nesting depth {1}")]
    DepthExceeded(usize, usize),
}

impl TlvError {
    pub fn buffer_too_small(need: usize, have: usize, context: impl Into<String>) -> Self {
        Self::BufferTooSmall {
            need,
            have,
            context: context.into(),
        }
    }

    pub fn invalid_encoding(offset: usize, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            offset,
            reason: reason.into(),
        }
    }

    /// Coarse error-kind classifier, matching the §7 taxonomy's "Encoding" kind.
    pub fn category(&self) -> &'static str {
        "encoding"
    }

    /// TLV errors are never retryable as-is; the caller must fix the input.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, TlvError::BufferTooSmall { .. })
    }
}

pub type TlvResult<T> = std::result::Result<T, TlvError>;
