use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::{Address, ADDRESS_SIZE};
use crate::error::{CodecError, CodecResult};

/// Width of one argument slot, storage slot and storage value.
pub const WORD_SIZE: usize = 32;

/// A fixed-width 32-byte value.
///
/// Words are the unit of the payload head, of storage keys and of storage
/// values. Interpretation (integer, identity, flag) is left to the reader.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Word(pub [u8; WORD_SIZE]);

impl Word {
    pub const ZERO: Word = Word([0u8; WORD_SIZE]);

    pub fn as_bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_SIZE]
    }

    /// Left-pad an identity into a word.
    pub fn from_address(address: Address) -> Self {
        let mut bytes = [0u8; WORD_SIZE];
        bytes[WORD_SIZE - ADDRESS_SIZE..].copy_from_slice(address.as_bytes());
        Self(bytes)
    }

    pub fn from_bool(value: bool) -> Self {
        let mut bytes = [0u8; WORD_SIZE];
        bytes[WORD_SIZE - 1] = value as u8;
        Self(bytes)
    }

    /// Read the word as an identity. The twelve high bytes must be zero.
    pub fn to_address(&self) -> CodecResult<Address> {
        if self.0[..WORD_SIZE - ADDRESS_SIZE].iter().any(|b| *b != 0) {
            return Err(CodecError::invalid("address"));
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&self.0[WORD_SIZE - ADDRESS_SIZE..]);
        Ok(Address(bytes))
    }

    /// Read the word as a flag. Only 0 and 1 are accepted.
    pub fn to_bool(&self) -> CodecResult<bool> {
        match U256::from(*self).as_u128() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CodecError::invalid("bool")),
        }
    }
}

impl From<Address> for Word {
    fn from(address: Address) -> Self {
        Word::from_address(address)
    }
}

impl From<bool> for Word {
    fn from(value: bool) -> Self {
        Word::from_bool(value)
    }
}

impl From<U256> for Word {
    fn from(value: U256) -> Self {
        Word(value.to_be_bytes())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self)
    }
}

/// Unsigned 256-bit integer, stored big-endian.
///
/// Only the operations the dispatch core needs are provided: checked
/// addition and subtraction for supply accounting, narrowing to native
/// integers, and decimal formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct U256([u8; WORD_SIZE]);

impl U256 {
    pub const ZERO: U256 = U256([0u8; WORD_SIZE]);
    pub const MAX: U256 = U256([0xffu8; WORD_SIZE]);

    pub const fn from_be_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }

    pub const fn to_be_bytes(self) -> [u8; WORD_SIZE] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_SIZE]
    }

    pub fn checked_add(self, rhs: U256) -> Option<U256> {
        let mut out = [0u8; WORD_SIZE];
        let mut carry = 0u16;
        for i in (0..WORD_SIZE).rev() {
            let sum = self.0[i] as u16 + rhs.0[i] as u16 + carry;
            out[i] = sum as u8;
            carry = sum >> 8;
        }
        (carry == 0).then_some(U256(out))
    }

    pub fn checked_sub(self, rhs: U256) -> Option<U256> {
        if self < rhs {
            return None;
        }
        let mut out = [0u8; WORD_SIZE];
        let mut borrow = 0i16;
        for i in (0..WORD_SIZE).rev() {
            let mut diff = self.0[i] as i16 - rhs.0[i] as i16 - borrow;
            borrow = 0;
            if diff < 0 {
                diff += 256;
                borrow = 1;
            }
            out[i] = diff as u8;
        }
        Some(U256(out))
    }

    /// Narrow to `u128` when the high sixteen bytes are zero.
    pub fn as_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// Narrow to `usize`; used for payload offsets and lengths.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_u128().and_then(|v| usize::try_from(v).ok())
    }

    fn div_rem_small(self, divisor: u8) -> (U256, u8) {
        let mut out = [0u8; WORD_SIZE];
        let mut rem = 0u16;
        for (i, byte) in self.0.iter().enumerate() {
            let acc = (rem << 8) | *byte as u16;
            out[i] = (acc / divisor as u16) as u8;
            rem = acc % divisor as u16;
        }
        (U256(out), rem as u8)
    }

    fn mul_small_add(self, factor: u8, addend: u8) -> Option<U256> {
        let mut out = [0u8; WORD_SIZE];
        let mut carry = addend as u16;
        for i in (0..WORD_SIZE).rev() {
            let acc = self.0[i] as u16 * factor as u16 + carry;
            out[i] = acc as u8;
            carry = acc >> 8;
        }
        (carry == 0).then_some(U256(out))
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from(value as u128)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; WORD_SIZE];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        U256(bytes)
    }
}

impl From<Word> for U256 {
    fn from(word: Word) -> Self {
        U256(word.0)
    }
}

impl TryFrom<U256> for u128 {
    type Error = CodecError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        value.as_u128().ok_or(CodecError::invalid("uint128"))
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(small) = self.as_u128() {
            return write!(f, "{}", small);
        }
        let mut digits = Vec::with_capacity(78);
        let mut rest = *self;
        while !rest.is_zero() {
            let (quotient, digit) = rest.div_rem_small(10);
            digits.push(b'0' + digit);
            rest = quotient;
        }
        digits.reverse();
        // digits are ASCII by construction
        f.write_str(std::str::from_utf8(&digits).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

impl FromStr for U256 {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CodecError::invalid("uint256"));
        }
        s.bytes().try_fold(U256::ZERO, |acc, b| {
            if !b.is_ascii_digit() {
                return Err(CodecError::invalid("uint256"));
            }
            acc.mul_small_add(10, b - b'0')
                .ok_or(CodecError::invalid("uint256"))
        })
    }
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
