//! Token front-end for the Maple dispatch core.
//!
//! A [`TokenCore`] holds the ledgers of any number of tokens. Each token is
//! reached through its own [`TokenProxy`], and the ledger rules come from
//! swappable delegate logic such as [`MintableTokenDelegate`].
//!
//! ```text
//! holder ──transfer──► TokenProxy ──► TokenCore ──► MintableTokenDelegate
//!                          ▲                               │
//!                          └──────── emitTransfer ◄────────┘
//! ```
//!
//! Operators mint, burn and finish minting by calling the delegate
//! operations directly on the core, naming the token in the first argument.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod calls;
mod delegate;
mod error;
pub mod layout;
mod token_core;
mod token_proxy;

pub use calls::{TokenCall, TokenCoreCall, TokenProxyCall};
pub use delegate::MintableTokenDelegate;
pub use error::{TokenError, TokenResult};
pub use token_core::TokenCore;
pub use token_proxy::TokenProxy;
