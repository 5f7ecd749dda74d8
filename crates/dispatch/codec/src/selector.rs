use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Size of the operation selector that prefixes every payload.
pub const SELECTOR_SIZE: usize = 4;

/// Four-byte operation selector.
///
/// Derived from the canonical operation signature
/// (e.g. `mint(address,address[],uint256[])`) as the first four bytes of its
/// BLAKE3 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector(pub [u8; SELECTOR_SIZE]);

impl Selector {
    pub fn of(signature: &str) -> Self {
        let hash = blake3::hash(signature.as_bytes());
        let mut bytes = [0u8; SELECTOR_SIZE];
        bytes.copy_from_slice(&hash.as_bytes()[..SELECTOR_SIZE]);
        Self(bytes)
    }

    /// Read the selector prefix of a payload.
    pub fn from_payload(payload: &[u8]) -> CodecResult<Self> {
        let head = payload
            .get(..SELECTOR_SIZE)
            .ok_or_else(|| CodecError::too_short(0, SELECTOR_SIZE, payload.len()))?;
        let mut bytes = [0u8; SELECTOR_SIZE];
        bytes.copy_from_slice(head);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

/// A canonical operation signature with a lazily computed selector.
///
/// Declared as `static` items next to the contract that answers them:
///
/// ```
/// use maple_dispatch_codec::Signature;
///
/// static CORE: Signature = Signature::new("core()");
/// assert_eq!(CORE.text(), "core()");
/// ```
pub struct Signature {
    text: &'static str,
    selector: OnceLock<Selector>,
}

impl Signature {
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            selector: OnceLock::new(),
        }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn selector(&self) -> Selector {
        *self.selector.get_or_init(|| Selector::of(self.text))
    }

    pub fn matches(&self, selector: Selector) -> bool {
        self.selector() == selector
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("text", &self.text)
            .field("selector", &self.selector())
            .finish()
    }
}
