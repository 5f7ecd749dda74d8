//! The Core: storage owner and dispatch router.

use maple_dispatch_codec::{first_parameter, Address, Encoder};
use maple_dispatch_host::{
    AccessGate, CallContext, CallResult, Contract, Event, HostResult, ScopedStorage, StorageView,
};
use tracing::{debug, info};

use crate::calls::{CoreCall, ProxyCall};
use crate::registry::Registry;

/// Storage-owning dispatch router.
///
/// Holds the delegate registry, the proxy registry and the operator set,
/// and executes delegate logic against its own storage on behalf of its
/// proxies. Operators are fixed at construction.
///
/// Dispatch paths:
///
/// | Entry | Proxy key | Mode |
/// |-------|-----------|------|
/// | `delegateCall(bytes)` | immediate caller | mutating |
/// | `delegateCallView(bytes)` | caller if registered, else argument 0 | read-only |
/// | any other selector | caller if registered, else argument 0 | mutating |
///
/// Delegate logic sees the forwarded sender only when the immediate caller
/// is the proxy being served. Every other caller acts as itself.
#[derive(Debug, Clone)]
pub struct Core {
    operators: Vec<Address>,
}

impl Core {
    pub fn new(operators: impl IntoIterator<Item = Address>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }

    pub fn registry<'a>(ctx: &'a CallContext<'_>) -> Registry<StorageView<'a>> {
        Registry::new(ctx.storage_view())
    }

    pub fn registry_mut<'a>(ctx: &'a mut CallContext<'_>) -> Registry<ScopedStorage<'a>> {
        Registry::new(ctx.storage())
    }

    /// CO03 unless the immediate caller is an operator.
    pub fn require_operator(ctx: &CallContext<'_>) -> HostResult<()> {
        AccessGate::require_operator(&ctx.storage_view(), ctx.caller())
    }

    /// Handle one of the core's own operations.
    pub fn handle(&self, ctx: &mut CallContext<'_>, call: CoreCall) -> CallResult {
        match call {
            CoreCall::DefineDelegate { id, delegate } => {
                Self::require_operator(ctx)?;
                Self::registry_mut(ctx).define_delegate(id, delegate)?;
                ctx.emit(Event::DelegateDefined { id, delegate })?;
                info!(core = %ctx.this(), id = %id, delegate = %delegate, "Delegate defined");
                Ok(success())
            }
            CoreCall::DefineProxy { proxy, delegate_id } => {
                Self::require_operator(ctx)?;
                Self::registry_mut(ctx).define_proxy(proxy, delegate_id)?;
                ctx.emit(Event::ProxyDefined { proxy, delegate_id })?;
                info!(
                    core = %ctx.this(),
                    proxy = %proxy,
                    delegate_id = %delegate_id,
                    "Proxy defined"
                );
                Ok(success())
            }
            CoreCall::RemoveProxy { proxy } => {
                Self::require_operator(ctx)?;
                Self::registry_mut(ctx).remove_proxy(proxy)?;
                ctx.emit(Event::ProxyRemoved { proxy })?;
                info!(core = %ctx.this(), proxy = %proxy, "Proxy removed");
                Ok(success())
            }
            CoreCall::MigrateProxy { proxy, new_core } => {
                Self::require_operator(ctx)?;
                Self::registry(ctx).require_proxy(proxy)?;
                ctx.call(proxy, &ProxyCall::UpdateCore { core: new_core }.encode())?;
                ctx.emit(Event::ProxyMigrated {
                    proxy,
                    core: new_core,
                })?;
                info!(core = %ctx.this(), proxy = %proxy, new_core = %new_core, "Proxy migrated");
                Ok(success())
            }
            CoreCall::DelegateCall { payload } => {
                let proxy = ctx.caller();
                Self::dispatch(ctx, proxy, &payload, false)
            }
            CoreCall::DelegateCallView { payload } => {
                let proxy = Self::resolve_proxy(ctx, &payload)?;
                Self::dispatch(ctx, proxy, &payload, true)
            }
            CoreCall::Delegates { id } => {
                let delegate = Self::registry(ctx).delegate(id)?;
                Ok(Encoder::returns().address(delegate).finish())
            }
            CoreCall::ProxyDelegateId { proxy } => {
                let id = Self::registry(ctx).proxy_delegate_id(proxy);
                Ok(Encoder::returns().uint(id).finish())
            }
            CoreCall::IsOperator { account } => {
                let operator = AccessGate::is_operator(&ctx.storage_view(), account);
                Ok(Encoder::returns().bool(operator).finish())
            }
        }
    }

    /// Route a payload that names no core operation to the delegate of the
    /// proxy it concerns.
    pub fn fallback(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        let proxy = Self::resolve_proxy(ctx, input)?;
        Self::dispatch(ctx, proxy, input, false)
    }

    /// The immediate caller when it is a registered proxy, otherwise the
    /// instance named by the payload's first argument.
    fn resolve_proxy(ctx: &CallContext<'_>, payload: &[u8]) -> HostResult<Address> {
        let caller = ctx.caller();
        if Self::registry(ctx).has_proxy(caller) {
            return Ok(caller);
        }
        Ok(first_parameter(payload)?.to_address()?)
    }

    /// Identity the delegate acts for. The proxy being served vouches for
    /// the sender it forwarded. Any other caller acts for itself.
    fn acting_sender(ctx: &CallContext<'_>, proxy: Address) -> Address {
        if ctx.caller() == proxy {
            ctx.sender()
        } else {
            ctx.caller()
        }
    }

    fn dispatch(
        ctx: &mut CallContext<'_>,
        proxy: Address,
        payload: &[u8],
        read_only: bool,
    ) -> CallResult {
        let delegate = Self::registry(ctx).resolve(proxy)?;
        let sender = Self::acting_sender(ctx, proxy);
        debug!(
            core = %ctx.this(),
            proxy = %proxy,
            delegate = %delegate,
            sender = %sender,
            read_only,
            "Dispatching to delegate"
        );
        ctx.delegate_call(delegate, proxy, sender, payload, read_only)
    }
}

fn success() -> Vec<u8> {
    Encoder::returns().bool(true).finish()
}

impl Contract for Core {
    fn name(&self) -> &str {
        "Core"
    }

    fn construct(&self, ctx: &mut CallContext<'_>) -> HostResult<()> {
        let mut storage = ctx.storage();
        for operator in &self.operators {
            AccessGate::grant(&mut storage, *operator)?;
        }
        Ok(())
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        match CoreCall::decode(input)? {
            Some(call) => self.handle(ctx, call),
            None => self.fallback(ctx, input),
        }
    }
}
