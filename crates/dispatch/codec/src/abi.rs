//! Call payload and return data encoding.
//!
//! Arguments occupy one 32-byte head slot each. Dynamic values (`bytes`,
//! `string`, `address[]`, `uint256[]`) store an offset in their head slot
//! that points at `length ‖ data` in the tail. Offsets are relative to the
//! start of the arguments, i.e. just after the selector.
//!
//! Decoding goes exclusively through [`extract_field`] and [`to_uint256`],
//! and every offset, length and element count is bounds-checked against the
//! buffer before anything is allocated.

use crate::address::Address;
use crate::error::{CodecError, CodecResult};
use crate::fixed::{extract_field, to_uint256};
use crate::selector::{Selector, Signature, SELECTOR_SIZE};
use crate::word::{Word, U256, WORD_SIZE};

enum Slot {
    Static(Word),
    Dynamic(Vec<u8>),
}

/// Builder for call payloads and return data.
///
/// ```
/// use maple_dispatch_codec::{Address, Decoder, Encoder, Signature, U256};
///
/// static BURN: Signature = Signature::new("burn(address,uint256)");
///
/// let token = Address::from_low_u64(9);
/// let payload = Encoder::call(&BURN).address(token).uint(U256::from(5u64)).finish();
///
/// let (selector, mut args) = Decoder::call(&payload).unwrap();
/// assert!(BURN.matches(selector));
/// assert_eq!(args.address().unwrap(), token);
/// assert_eq!(args.uint().unwrap(), U256::from(5u64));
/// ```
pub struct Encoder {
    selector: Option<Selector>,
    slots: Vec<Slot>,
}

impl Encoder {
    /// Start a call payload for the given operation.
    pub fn call(signature: &Signature) -> Self {
        Self::with_selector(signature.selector())
    }

    pub fn with_selector(selector: Selector) -> Self {
        Self {
            selector: Some(selector),
            slots: Vec::new(),
        }
    }

    /// Start return data (no selector).
    pub fn returns() -> Self {
        Self {
            selector: None,
            slots: Vec::new(),
        }
    }

    pub fn word(mut self, word: Word) -> Self {
        self.slots.push(Slot::Static(word));
        self
    }

    pub fn uint(self, value: impl Into<U256>) -> Self {
        self.word(Word::from(value.into()))
    }

    pub fn address(self, address: Address) -> Self {
        self.word(Word::from_address(address))
    }

    pub fn bool(self, value: bool) -> Self {
        self.word(Word::from_bool(value))
    }

    pub fn bytes(mut self, data: &[u8]) -> Self {
        let mut tail = Word::from(U256::from(data.len() as u64)).0.to_vec();
        tail.extend_from_slice(data);
        let padding = (WORD_SIZE - data.len() % WORD_SIZE) % WORD_SIZE;
        tail.resize(tail.len() + padding, 0);
        self.slots.push(Slot::Dynamic(tail));
        self
    }

    pub fn string(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    pub fn words(mut self, words: &[Word]) -> Self {
        let mut tail = Word::from(U256::from(words.len() as u64)).0.to_vec();
        for word in words {
            tail.extend_from_slice(word.as_bytes());
        }
        self.slots.push(Slot::Dynamic(tail));
        self
    }

    pub fn address_array(self, addresses: &[Address]) -> Self {
        let words: Vec<Word> = addresses.iter().copied().map(Word::from_address).collect();
        self.words(&words)
    }

    pub fn uint_array(self, values: &[U256]) -> Self {
        let words: Vec<Word> = values.iter().copied().map(Word::from).collect();
        self.words(&words)
    }

    pub fn finish(self) -> Vec<u8> {
        let head_len = self.slots.len() * WORD_SIZE;
        let mut head = Vec::with_capacity(SELECTOR_SIZE + head_len);
        let mut tail = Vec::new();

        if let Some(selector) = self.selector {
            head.extend_from_slice(&selector.0);
        }
        for slot in self.slots {
            match slot {
                Slot::Static(word) => head.extend_from_slice(word.as_bytes()),
                Slot::Dynamic(data) => {
                    let offset = U256::from((head_len + tail.len()) as u64);
                    head.extend_from_slice(Word::from(offset).as_bytes());
                    tail.extend_from_slice(&data);
                }
            }
        }
        head.extend_from_slice(&tail);
        head
    }
}

/// Sequential reader over call arguments or return data.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    body: &'a [u8],
    index: usize,
}

impl<'a> Decoder<'a> {
    /// Split a call payload into its selector and an argument reader.
    pub fn call(payload: &'a [u8]) -> CodecResult<(Selector, Self)> {
        let selector = Selector::from_payload(payload)?;
        Ok((
            selector,
            Self {
                body: &payload[SELECTOR_SIZE..],
                index: 0,
            },
        ))
    }

    /// Argument reader for a payload whose selector was already checked.
    pub fn arguments(payload: &'a [u8]) -> CodecResult<Self> {
        Self::call(payload).map(|(_, decoder)| decoder)
    }

    /// Reader over return data (no selector).
    pub fn returns(data: &'a [u8]) -> Self {
        Self {
            body: data,
            index: 0,
        }
    }

    pub fn word(&mut self) -> CodecResult<Word> {
        let offset = self
            .index
            .checked_mul(WORD_SIZE)
            .ok_or_else(|| CodecError::too_short(usize::MAX, WORD_SIZE, self.body.len()))?;
        let word = extract_field(self.body, offset)?;
        self.index += 1;
        Ok(word)
    }

    pub fn uint(&mut self) -> CodecResult<U256> {
        let word = self.word()?;
        to_uint256(word.as_bytes())
    }

    pub fn address(&mut self) -> CodecResult<Address> {
        self.word()?.to_address()
    }

    pub fn bool(&mut self) -> CodecResult<bool> {
        self.word()?.to_bool()
    }

    pub fn bytes(&mut self) -> CodecResult<Vec<u8>> {
        let (start, len) = self.dynamic_head(1)?;
        Ok(self.body[start..start + len].to_vec())
    }

    pub fn string(&mut self) -> CodecResult<String> {
        String::from_utf8(self.bytes()?).map_err(|_| CodecError::invalid("string"))
    }

    pub fn words(&mut self) -> CodecResult<Vec<Word>> {
        let (start, len) = self.dynamic_head(WORD_SIZE)?;
        (0..len)
            .map(|i| extract_field(self.body, start + i * WORD_SIZE))
            .collect()
    }

    pub fn address_array(&mut self) -> CodecResult<Vec<Address>> {
        self.words()?.iter().map(Word::to_address).collect()
    }

    pub fn uint_array(&mut self) -> CodecResult<Vec<U256>> {
        Ok(self.words()?.into_iter().map(U256::from).collect())
    }

    /// Resolve a dynamic head slot into `(data start, element count)`.
    ///
    /// The whole data region (`count * element_size` bytes) is checked to lie
    /// within the body, so callers can index without further checks.
    fn dynamic_head(&mut self, element_size: usize) -> CodecResult<(usize, usize)> {
        let available = self.body.len();
        let offset = self
            .uint()?
            .as_usize()
            .ok_or_else(|| CodecError::too_short(usize::MAX, WORD_SIZE, available))?;
        let len = to_uint256(extract_field(self.body, offset)?.as_bytes())?
            .as_usize()
            .ok_or_else(|| CodecError::too_short(offset, usize::MAX, available))?;
        let start = offset + WORD_SIZE;
        let size = len
            .checked_mul(element_size)
            .ok_or_else(|| CodecError::too_short(start, usize::MAX, available))?;
        match start.checked_add(size) {
            Some(end) if end <= available => Ok((start, len)),
            _ => Err(CodecError::too_short(start, size, available)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TRANSFER: Signature = Signature::new("transfer(address,uint256)");
    static MINT: Signature = Signature::new("mint(address,address[],uint256[])");
    static NAMED: Signature = Signature::new("named(string,bool,bytes)");

    #[test]
    fn static_arguments_follow_selector() {
        let to = Address::from_low_u64(3);
        let payload = Encoder::call(&TRANSFER).address(to).uint(100u64).finish();
        assert_eq!(payload.len(), SELECTOR_SIZE + 2 * WORD_SIZE);
        assert_eq!(&payload[..4], &TRANSFER.selector().0);

        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.address().unwrap(), to);
        assert_eq!(args.uint().unwrap(), U256::from(100u64));
    }

    #[test]
    fn dynamic_arrays_in_tail() {
        let token = Address::from_low_u64(1);
        let recipients = [Address::from_low_u64(2), Address::from_low_u64(3)];
        let amounts = [U256::from(0u64), U256::from(7u64)];
        let payload = Encoder::call(&MINT)
            .address(token)
            .address_array(&recipients)
            .uint_array(&amounts)
            .finish();

        let (selector, mut args) = Decoder::call(&payload).unwrap();
        assert!(MINT.matches(selector));
        assert_eq!(args.address().unwrap(), token);
        assert_eq!(args.address_array().unwrap(), recipients.to_vec());
        assert_eq!(args.uint_array().unwrap(), amounts.to_vec());
    }

    #[test]
    fn strings_and_bytes_are_padded() {
        let payload = Encoder::call(&NAMED)
            .string("TheAnswerToLife")
            .bool(true)
            .bytes(&[0xab; 33])
            .finish();
        assert_eq!((payload.len() - SELECTOR_SIZE) % WORD_SIZE, 0);

        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.string().unwrap(), "TheAnswerToLife");
        assert!(args.bool().unwrap());
        assert_eq!(args.bytes().unwrap(), vec![0xab; 33]);
    }

    #[test]
    fn return_data_has_no_selector() {
        let data = Encoder::returns().uint(42u64).finish();
        assert_eq!(data.len(), WORD_SIZE);
        assert_eq!(Decoder::returns(&data).uint().unwrap(), U256::from(42u64));
    }

    #[test]
    fn missing_argument_is_buffer_too_short() {
        let payload = Encoder::call(&TRANSFER)
            .address(Address::from_low_u64(3))
            .finish();
        let mut args = Decoder::arguments(&payload).unwrap();
        args.address().unwrap();
        assert_eq!(args.uint().unwrap_err().code(), "BC03");
    }

    #[test]
    fn out_of_range_offset_rejected() {
        let payload = Encoder::call(&NAMED).uint(U256::MAX).finish();
        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.string().unwrap_err().code(), "BC03");
    }

    #[test]
    fn oversized_length_rejected_before_allocation() {
        // offset 32 -> length word claiming 2^64 elements, no data
        let payload = Encoder::call(&MINT)
            .uint(32u64)
            .uint(u64::MAX)
            .finish();
        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.address_array().unwrap_err().code(), "BC03");
    }

    #[test]
    fn invalid_utf8_rejected() {
        let payload = Encoder::call(&NAMED).bytes(&[0xff, 0xfe]).finish();
        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.string().unwrap_err().code(), "BC04");
    }

    #[test]
    fn dirty_address_in_array_rejected() {
        let mut dirty = Word::from_address(Address::from_low_u64(5));
        dirty.0[0] = 0xff;
        let payload = Encoder::call(&MINT).words(&[dirty]).finish();
        let mut args = Decoder::arguments(&payload).unwrap();
        assert_eq!(args.address_array().unwrap_err().code(), "BC04");
    }
}
