use maple_dispatch_codec::{Address, Encoder};
use maple_dispatch_core::Proxy;
use maple_dispatch_host::{CallContext, CallResult, Contract, Event, HostResult};
use tracing::debug;

use crate::calls::TokenProxyCall;

/// The public address of one token.
///
/// Forwards everything to its core like a plain [`Proxy`], and lets the
/// core emit `Transfer` and `Approval` events on the token's address.
#[derive(Debug, Clone)]
pub struct TokenProxy {
    proxy: Proxy,
}

impl TokenProxy {
    pub fn new(core: Address) -> Self {
        Self {
            proxy: Proxy::new(core),
        }
    }

    pub fn handle(&self, ctx: &mut CallContext<'_>, call: TokenProxyCall) -> CallResult {
        Proxy::require_core(ctx)?;
        let event = match call {
            TokenProxyCall::EmitTransfer { from, to, value } => Event::Transfer { from, to, value },
            TokenProxyCall::EmitApproval {
                owner,
                spender,
                value,
            } => Event::Approval {
                owner,
                spender,
                value,
            },
        };
        debug!(token = %ctx.this(), event = event.name(), "Relaying token event");
        ctx.emit(event)?;
        Ok(Encoder::returns().bool(true).finish())
    }
}

impl Contract for TokenProxy {
    fn name(&self) -> &str {
        "TokenProxy"
    }

    fn construct(&self, ctx: &mut CallContext<'_>) -> HostResult<()> {
        self.proxy.construct(ctx)
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        match TokenProxyCall::decode(input)? {
            Some(call) => self.handle(ctx, call),
            None => self.proxy.call(ctx, input),
        }
    }
}
