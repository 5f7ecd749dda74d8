//! Fixed-width codec and call payload ABI for the Maple dispatch core.
//!
//! Every dispatched call is a raw byte buffer:
//!
//! ```text
//! selector (4 bytes) ‖ argument-0 (32 bytes) ‖ argument-1 (32 bytes) ‖ …
//! ```
//!
//! This crate is the only boundary that turns those attacker-controlled bytes
//! into typed values. Every conversion rejects malformed input with a stable
//! short code instead of truncating and continuing:
//!
//! | Code | Failure |
//! |------|---------|
//! | BC01 | wrong length for integer conversion |
//! | BC02 | too long for a fixed-width word |
//! | BC03 | buffer too short for the requested field |
//! | BC04 | word does not encode a value of the declared type |
//!
//! ## Layers
//!
//! - [`fixed`]: the three fixed-width primitives (`to_uint256`, `to_bytes32`,
//!   `extract_field`) everything else is built on.
//! - [`abi`]: head/tail payload encoding for scalar and dynamic arguments.
//! - [`Address`], [`Word`], [`U256`], [`Selector`]: the scalar vocabulary.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod abi;
mod address;
mod error;
pub mod fixed;
mod selector;
mod word;

pub use abi::{Decoder, Encoder};
pub use address::{Address, ADDRESS_SIZE};
pub use error::{CodecError, CodecResult};
pub use fixed::{extract_field, first_parameter, to_bytes32, to_uint256};
pub use selector::{Selector, Signature, SELECTOR_SIZE};
pub use word::{Word, U256, WORD_SIZE};
