use maple_dispatch_codec::{Address, Decoder, Encoder, U256};
use maple_dispatch_core::{Core, CoreCall};
use maple_dispatch_host::{
    CallContext, CallResult, Contract, HostResult, Storage, StorageRead, CHECK_CONFIGURATIONS,
};
use tracing::info;

use crate::calls::TokenCoreCall;
use crate::error::TokenError;
use crate::layout::{self, token_key};

/// A core that hosts tokens.
///
/// Adds a display name, configuration-checked delegate registration and
/// token definition on top of the plain [`Core`]. Every other payload is
/// handled exactly as the plain core handles it.
#[derive(Debug, Clone)]
pub struct TokenCore {
    core: Core,
    name: String,
}

impl TokenCore {
    pub fn new(name: impl Into<String>, operators: impl IntoIterator<Item = Address>) -> Self {
        Self {
            core: Core::new(operators),
            name: name.into(),
        }
    }

    pub fn handle(&self, ctx: &mut CallContext<'_>, call: TokenCoreCall) -> CallResult {
        match call {
            TokenCoreCall::Name => {
                let name = ctx.storage_view().get_string(layout::CORE_NAME, &[])?;
                Ok(Encoder::returns().string(&name).finish())
            }
            TokenCoreCall::DefineTokenDelegate {
                id,
                delegate,
                configurations,
            } => {
                Core::require_operator(ctx)?;
                if !delegate.is_zero() {
                    Self::check_configurations(ctx, delegate, &configurations)?;
                }
                self.core
                    .handle(ctx, CoreCall::DefineDelegate { id, delegate })
            }
            TokenCoreCall::DefineToken {
                token,
                delegate_id,
                name,
                symbol,
                decimals,
            } => {
                let output = self.core.handle(
                    ctx,
                    CoreCall::DefineProxy {
                        proxy: token,
                        delegate_id,
                    },
                )?;
                Self::store_metadata(ctx, token, &name, &symbol, decimals)?;
                info!(
                    core = %ctx.this(),
                    token = %token,
                    name = %name,
                    symbol = %symbol,
                    decimals = %decimals,
                    "Token defined"
                );
                Ok(output)
            }
        }
    }

    /// TC01 unless `delegate` accepts `configurations`.
    fn check_configurations(
        ctx: &mut CallContext<'_>,
        delegate: Address,
        configurations: &[U256],
    ) -> HostResult<()> {
        let request = Encoder::call(&CHECK_CONFIGURATIONS)
            .uint_array(configurations)
            .finish();
        let output = ctx.static_call(delegate, &request)?;
        if Decoder::returns(&output).bool()? {
            Ok(())
        } else {
            Err(TokenError::InvalidConfiguration { delegate }.into())
        }
    }

    fn store_metadata(
        ctx: &mut CallContext<'_>,
        token: Address,
        name: &str,
        symbol: &str,
        decimals: U256,
    ) -> HostResult<()> {
        let key = token_key(token);
        let mut storage = ctx.storage();
        storage.set_string(layout::NAME, &key, name)?;
        storage.set_string(layout::SYMBOL, &key, symbol)?;
        storage.set_u256(layout::DECIMALS, &key, decimals)
    }

    /// Whether the payload was forwarded by one of this core's tokens.
    ///
    /// A token's own `name()` shares its selector with the core's, so calls
    /// arriving from a registered token go to the token logic instead.
    fn forwarded_by_token(ctx: &CallContext<'_>) -> bool {
        Core::registry(ctx).has_proxy(ctx.caller())
    }
}

impl Contract for TokenCore {
    fn name(&self) -> &str {
        "TokenCore"
    }

    fn construct(&self, ctx: &mut CallContext<'_>) -> HostResult<()> {
        self.core.construct(ctx)?;
        ctx.storage().set_string(layout::CORE_NAME, &[], &self.name)
    }

    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
        match TokenCoreCall::decode(input)? {
            Some(TokenCoreCall::Name) if Self::forwarded_by_token(ctx) => {
                self.core.call(ctx, input)
            }
            Some(call) => self.handle(ctx, call),
            None => self.core.call(ctx, input),
        }
    }
}
