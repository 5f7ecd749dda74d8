//! Delegate and proxy registries.
//!
//! Both registries live in the core's contract storage. A proxy has an entry
//! exactly when its stored delegate id is non-zero, which is why id 0 can
//! never be registered.

use maple_dispatch_codec::{Address, Word, U256};
use maple_dispatch_host::{HostResult, Storage, StorageRead};

use crate::error::CoreError;

const DELEGATES: &str = "core.delegates";
const PROXY_DELEGATE_ID: &str = "core.proxy_delegate_id";

/// Typed access to a core's registries over any storage handle.
pub struct Registry<S> {
    storage: S,
}

impl<S> Registry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: StorageRead> Registry<S> {
    /// Implementation registered for `id`, or the null identity.
    pub fn delegate(&self, id: U256) -> HostResult<Address> {
        self.storage.get_address(DELEGATES, &[Word::from(id)])
    }

    /// Delegate id assigned to `proxy`; zero when it has no entry.
    pub fn proxy_delegate_id(&self, proxy: Address) -> U256 {
        self.storage
            .get_u256(PROXY_DELEGATE_ID, &[Word::from_address(proxy)])
    }

    pub fn has_proxy(&self, proxy: Address) -> bool {
        !self.proxy_delegate_id(proxy).is_zero()
    }

    /// Delegate implementation `proxy` currently dispatches to.
    ///
    /// Fails with CO12 when the proxy has no entry and CO10 when its id has
    /// been cleared since the proxy was defined.
    pub fn resolve(&self, proxy: Address) -> HostResult<Address> {
        let id = self.proxy_delegate_id(proxy);
        if id.is_zero() {
            return Err(CoreError::ProxyNotFound { proxy }.into());
        }
        let delegate = self.delegate(id)?;
        if delegate.is_zero() {
            return Err(CoreError::DelegateNotRegistered { id }.into());
        }
        Ok(delegate)
    }

    /// CO12 unless `proxy` has an entry.
    pub fn require_proxy(&self, proxy: Address) -> HostResult<()> {
        if self.has_proxy(proxy) {
            Ok(())
        } else {
            Err(CoreError::ProxyNotFound { proxy }.into())
        }
    }
}

impl<S: Storage> Registry<S> {
    /// Register, replace or (with the null identity) clear the logic for `id`.
    pub fn define_delegate(&mut self, id: U256, delegate: Address) -> HostResult<()> {
        if id.is_zero() {
            return Err(CoreError::ReservedDelegateId.into());
        }
        self.storage
            .set_address(DELEGATES, &[Word::from(id)], delegate)
    }

    pub fn define_proxy(&mut self, proxy: Address, id: U256) -> HostResult<()> {
        if proxy.is_zero() {
            return Err(CoreError::NullProxy.into());
        }
        if id.is_zero() || self.delegate(id)?.is_zero() {
            return Err(CoreError::DelegateNotRegistered { id }.into());
        }
        self.storage
            .set_u256(PROXY_DELEGATE_ID, &[Word::from_address(proxy)], id)
    }

    pub fn remove_proxy(&mut self, proxy: Address) -> HostResult<()> {
        self.require_proxy(proxy)?;
        self.storage
            .set_u256(PROXY_DELEGATE_ID, &[Word::from_address(proxy)], U256::ZERO)
    }
}
