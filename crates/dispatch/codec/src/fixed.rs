//! Fixed-width conversions.
//!
//! These three functions are the trusted boundary between raw payload bytes
//! and typed values. Every other decoder in the dispatch core is built on
//! them.

use crate::error::{CodecError, CodecResult};
use crate::selector::SELECTOR_SIZE;
use crate::word::{Word, U256, WORD_SIZE};

/// Convert exactly [`WORD_SIZE`] bytes into an unsigned 256-bit integer.
///
/// Shorter and longer inputs both fail with BC01.
pub fn to_uint256(bytes: &[u8]) -> CodecResult<U256> {
    let word: [u8; WORD_SIZE] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
        expected: WORD_SIZE,
        actual: bytes.len(),
    })?;
    Ok(U256::from_be_bytes(word))
}

/// Convert at most [`WORD_SIZE`] bytes into a word, zero-padding the tail.
///
/// Inputs longer than the word fail with BC02.
pub fn to_bytes32(bytes: &[u8]) -> CodecResult<Word> {
    if bytes.len() > WORD_SIZE {
        return Err(CodecError::ValueTooLarge {
            width: WORD_SIZE,
            actual: bytes.len(),
        });
    }
    let mut word = [0u8; WORD_SIZE];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(Word(word))
}

/// Read the word at `offset` within `buffer`.
///
/// Fails with BC03 when fewer than `offset + WORD_SIZE` bytes are available.
/// Trailing bytes past the field are ignored.
pub fn extract_field(buffer: &[u8], offset: usize) -> CodecResult<Word> {
    let field = offset
        .checked_add(WORD_SIZE)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| CodecError::too_short(offset, WORD_SIZE, buffer.len()))?;
    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(field);
    Ok(Word(word))
}

/// The first argument slot of a call payload (the word right after the selector).
pub fn first_parameter(payload: &[u8]) -> CodecResult<Word> {
    extract_field(payload, SELECTOR_SIZE)
}
