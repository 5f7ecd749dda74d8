//! Delegate logic and the capability it executes with.

use maple_dispatch_codec::{Address, Signature, U256};

use crate::access::AccessGate;
use crate::context::CallContext;
use crate::error::{CallResult, HostResult};
use crate::log::Event;
use crate::state::{Namespace, ScopedStorage, StorageView};

/// The one operation delegate logic answers when called directly.
pub static CHECK_CONFIGURATIONS: Signature = Signature::new("checkConfigurations(uint256[])");

/// Stateless logic executed by a core on behalf of one of its proxies.
///
/// A delegate never owns storage. Everything it reads or writes goes
/// through the [`DelegateContext`] the core hands it, which is bound to the
/// core's account.
pub trait Delegate: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, ctx: &mut DelegateContext<'_, '_>, input: &[u8]) -> CallResult;

    /// Validation hook consulted before a core adopts this logic.
    fn check_configurations(&self, _configurations: &[U256]) -> bool {
        true
    }
}

/// Storage-access capability handed to delegate logic.
///
/// Grants read-write access to the delegated namespace of the executing
/// core, read-only access to the core's own records (operators, token
/// metadata) and the ability to emit events or make calls as the core.
pub struct DelegateContext<'c, 'h> {
    inner: &'c mut CallContext<'h>,
    delegate: Address,
    proxy: Address,
}

impl<'c, 'h> DelegateContext<'c, 'h> {
    pub(crate) fn new(inner: &'c mut CallContext<'h>, delegate: Address, proxy: Address) -> Self {
        Self {
            inner,
            delegate,
            proxy,
        }
    }

    /// The core whose storage this execution runs against.
    pub fn core(&self) -> Address {
        self.inner.this()
    }

    /// The address the logic was loaded from.
    pub fn delegate(&self) -> Address {
        self.delegate
    }

    /// The proxy the core resolved this execution for.
    pub fn proxy(&self) -> Address {
        self.proxy
    }

    pub fn caller(&self) -> Address {
        self.inner.caller()
    }

    pub fn sender(&self) -> Address {
        self.inner.sender()
    }

    pub fn is_static(&self) -> bool {
        self.inner.is_static()
    }

    pub fn storage(&mut self) -> ScopedStorage<'_> {
        self.inner.scoped(Namespace::Delegated)
    }

    pub fn storage_view(&self) -> StorageView<'_> {
        self.inner.view(Namespace::Delegated)
    }

    /// Read-only view of the core's own records.
    pub fn core_records(&self) -> StorageView<'_> {
        self.inner.view(Namespace::Contract)
    }

    pub fn is_operator(&self, account: Address) -> bool {
        AccessGate::is_operator(&self.core_records(), account)
    }

    /// CO03 unless `account` is one of the core's operators.
    pub fn require_operator(&self, account: Address) -> HostResult<()> {
        AccessGate::require_operator(&self.core_records(), account)
    }

    /// Emit an event as the core.
    pub fn emit(&mut self, event: Event) -> HostResult<()> {
        self.inner.emit(event)
    }

    /// Call another account as the core.
    pub fn call(&mut self, to: Address, input: &[u8]) -> CallResult {
        self.inner.call(to, input)
    }

    pub fn static_call(&mut self, to: Address, input: &[u8]) -> CallResult {
        self.inner.static_call(to, input)
    }
}
