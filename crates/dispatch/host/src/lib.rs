//! Execution host for the Maple dispatch core.
//!
//! The host owns deployed code and a journaled world state, and runs calls
//! as nested frames:
//!
//! - **Contracts** (cores, proxies) receive a [`CallContext`] bound to their
//!   own account. They can read and write their own storage, emit events,
//!   call other accounts, forward a payload on behalf of the original
//!   sender, and execute delegate logic against their own storage.
//! - **Delegates** are stateless logic. They only ever run inside a core's
//!   frame, through a [`DelegateContext`] that exposes the core's delegated
//!   storage and a read-only view of its operator records.
//!
//! Every frame takes a checkpoint on entry. A failing frame rolls its
//! writes and events back before the revert propagates unchanged to its
//! caller; a read-only frame is rolled back unconditionally (or rejects
//! writes outright, see [`ViewEnforcement`]).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

mod access;
pub mod config;
mod context;
mod contract;
mod delegate;
mod error;
mod host;
mod log;
pub mod state;
pub mod telemetry;

pub use access::AccessGate;
pub use config::{ConfigError, HostConfig, LoggingConfig, ViewEnforcement};
pub use context::{CallContext, CodeRegistry, Frame};
pub use contract::{Code, Contract};
pub use delegate::{Delegate, DelegateContext, CHECK_CONFIGURATIONS};
pub use error::{CallResult, HostResult, Revert};
pub use host::{Host, Receipt, SharedHost};
pub use log::{Event, Log};
pub use state::{
    Namespace, ScopedStorage, Storage, StorageKey, StorageRead, StorageView, WorldState,
};
