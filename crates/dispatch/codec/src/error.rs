use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while converting raw payload bytes into typed values.
///
/// Each variant maps to a stable short code that is surfaced verbatim to
/// callers through the dispatch chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("BC01: expected exactly {expected} bytes for integer conversion, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("BC02: {actual} bytes do not fit in a {width}-byte word")]
    ValueTooLarge { width: usize, actual: usize },

    #[error("BC03: buffer of {available} bytes is too short for {required} bytes at offset {offset}")]
    BufferTooShort {
        offset: usize,
        required: usize,
        available: usize,
    },

    #[error("BC04: word does not encode a valid {expected}")]
    InvalidValue { expected: &'static str },
}

impl CodecError {
    /// Stable short identifier for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::InvalidLength { .. } => "BC01",
            CodecError::ValueTooLarge { .. } => "BC02",
            CodecError::BufferTooShort { .. } => "BC03",
            CodecError::InvalidValue { .. } => "BC04",
        }
    }

    /// BC04 for a word that does not decode as `expected`.
    pub fn invalid(expected: &'static str) -> Self {
        CodecError::InvalidValue { expected }
    }

    pub(crate) fn too_short(offset: usize, width: usize, available: usize) -> Self {
        CodecError::BufferTooShort {
            offset,
            required: width,
            available,
        }
    }
}
