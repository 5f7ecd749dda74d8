use maple_dispatch_codec::{Address, Encoder};
use maple_dispatch_host::{
    AccessGate, CallContext, CallResult, Contract, Event, HostResult, Storage, StorageRead,
};
use tracing::info;

use crate::calls::ProxyCall;

const CORE: &str = "proxy.core";

/// Stable-address forwarding front for one logical instance.
///
/// Holds a single value, the current core. Every payload other than the
/// administrative operations is forwarded verbatim to that core on behalf
/// of the proxy's immediate caller, and the core's answer is relayed
/// unchanged.
#[derive(Debug, Clone)]
pub struct Proxy {
    core: Address,
}

impl Proxy {
    pub fn new(core: Address) -> Self {
        Self { core }
    }

    pub fn current_core(ctx: &CallContext<'_>) -> HostResult<Address> {
        ctx.storage_view().get_address(CORE, &[])
    }

    /// PR01 unless the immediate caller is the current core.
    pub fn require_core(ctx: &CallContext<'_>) -> HostResult<()> {
        AccessGate::require_core(Self::current_core(ctx)?, ctx.caller())
    }

    pub fn handle(&self, ctx: &mut CallContext<'_>, call: ProxyCall) -> CallResult {
        match call {
            ProxyCall::Core => {
                let core = Self::current_core(ctx)?;
                Ok(Encoder::returns().address(core).finish())
            }
            ProxyCall::UpdateCore { core } => {
                Self::require_core(ctx)?;
                ctx.storage().set_address(CORE, &[], core)?;
                ctx.emit(Event::CoreUpdated { core })?;
                info!(proxy = %ctx.this(), core = %core, "Core updated");
                Ok(Encoder::returns().bool(true).finish())
            }
            ProxyCall::SuccessOnlyCore { success } => {
                Self::require_core(ctx)?;
                Ok(Encoder::returns().bool(success).finish())
            }
        }
    }

    /// Relay `input` to the current core.
    pub fn forward(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        let core = Self::current_core(ctx)?;
        ctx.forward(core, input)
    }
}

impl Contract for Proxy {
    fn name(&self) -> &str {
        "Proxy"
    }

    fn construct(&self, ctx: &mut CallContext<'_>) -> HostResult<()> {
        ctx.storage().set_address(CORE, &[], self.core)
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        match ProxyCall::decode(input)? {
            Some(call) => self.handle(ctx, call),
            None => self.forward(ctx, input),
        }
    }
}
