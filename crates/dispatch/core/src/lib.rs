//! Core registry and Proxy forwarding for the Maple dispatch core.
//!
//! Three parties cooperate on every call:
//!
//! ```text
//! caller ──► Proxy ──forward──► Core ──delegate_call──► Delegate logic
//!              ▲                 │        (runs in the Core's storage)
//!              └──── relay ◄─────┘
//! ```
//!
//! - [`Proxy`] gives one logical instance a stable address and forwards
//!   every non-administrative payload verbatim to its current core.
//! - [`Core`] owns all persistent state. It maps delegate ids to logic and
//!   proxies to delegate ids, and executes the resolved logic against its
//!   own storage.
//! - Delegate logic (see [`maple_dispatch_host::Delegate`]) is stateless
//!   and swappable: re-pointing an id upgrades every proxy using it without
//!   touching any data.
//!
//! Failures anywhere in the chain reach the original caller with their code
//! intact, and leave state exactly as it was before the call.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod calls;
mod error;
pub mod mocks;
mod proxy;
pub mod registry;
mod router;

pub use calls::{CoreCall, ProxyCall};
pub use error::{CoreError, CoreResult};
pub use proxy::Proxy;
pub use registry::Registry;
pub use router::Core;
