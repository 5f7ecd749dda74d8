//! Mintable ERC20 delegate logic.

use maple_dispatch_codec::{Address, Encoder, Selector, U256};
use maple_dispatch_host::{
    CallResult, Delegate, DelegateContext, Event, HostResult, Revert, Storage, StorageRead,
};
use tracing::{debug, info};

use crate::calls::{TokenCall, TokenProxyCall};
use crate::error::TokenError;
use crate::layout::{self, allowance_key, holder_key, token_key};

/// ERC20 ledger with operator-controlled minting and burning.
///
/// Runs inside a token core. Balances, allowances and supply live in the
/// core's delegated storage keyed by token, so one core can serve many
/// tokens and the logic can be swapped without moving any balance.
///
/// Transfers debit, and operator checks apply to, the acting sender: the
/// account that called the token proxy, or the one that called the core
/// directly. Token-level `Transfer` and `Approval` events are relayed to
/// the token proxy so they appear on the token's own address.
#[derive(Debug, Default, Clone)]
pub struct MintableTokenDelegate;

impl MintableTokenDelegate {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, ctx: &mut DelegateContext<'_, '_>, call: TokenCall) -> CallResult {
        match call {
            TokenCall::Name => {
                let token = ctx.proxy();
                let name = ctx.core_records().get_string(layout::NAME, &token_key(token))?;
                Ok(Encoder::returns().string(&name).finish())
            }
            TokenCall::Symbol => {
                let token = ctx.proxy();
                let symbol = ctx
                    .core_records()
                    .get_string(layout::SYMBOL, &token_key(token))?;
                Ok(Encoder::returns().string(&symbol).finish())
            }
            TokenCall::Decimals => {
                let token = ctx.proxy();
                let decimals = ctx
                    .core_records()
                    .get_u256(layout::DECIMALS, &token_key(token));
                Ok(Encoder::returns().uint(decimals).finish())
            }
            TokenCall::TotalSupply => {
                let supply = total_supply(ctx, ctx.proxy());
                Ok(Encoder::returns().uint(supply).finish())
            }
            TokenCall::BalanceOf { owner } => {
                let balance = balance_of(ctx, ctx.proxy(), owner);
                Ok(Encoder::returns().uint(balance).finish())
            }
            TokenCall::Allowance { owner, spender } => {
                let allowance = allowance(ctx, ctx.proxy(), owner, spender);
                Ok(Encoder::returns().uint(allowance).finish())
            }
            TokenCall::Transfer { to, value } => {
                let (token, from) = (ctx.proxy(), ctx.sender());
                transfer(ctx, token, from, to, value)?;
                Ok(success())
            }
            TokenCall::Approve { spender, value } => {
                let (token, owner) = (ctx.proxy(), ctx.sender());
                ctx.storage().set_u256(
                    layout::ALLOWANCE,
                    &allowance_key(token, owner, spender),
                    value,
                )?;
                relay(
                    ctx,
                    token,
                    TokenProxyCall::EmitApproval {
                        owner,
                        spender,
                        value,
                    },
                )?;
                Ok(success())
            }
            TokenCall::TransferFrom { from, to, value } => {
                let (token, spender) = (ctx.proxy(), ctx.sender());
                let allowed = allowance(ctx, token, from, spender);
                let remaining = allowed
                    .checked_sub(value)
                    .ok_or(TokenError::InsufficientAllowance {
                        allowance: allowed,
                        value,
                    })?;
                ctx.storage().set_u256(
                    layout::ALLOWANCE,
                    &allowance_key(token, from, spender),
                    remaining,
                )?;
                transfer(ctx, token, from, to, value)?;
                Ok(success())
            }
            TokenCall::Mint {
                token,
                recipients,
                amounts,
            } => {
                self.mint(ctx, token, &recipients, &amounts)?;
                Ok(success())
            }
            TokenCall::FinishMinting { token } => {
                ctx.require_operator(ctx.sender())?;
                if minting_finished(ctx, token)? {
                    return Err(TokenError::MintingFinished { token }.into());
                }
                ctx.storage()
                    .set_bool(layout::MINTING_FINISHED, &token_key(token), true)?;
                ctx.emit(Event::MintFinish { token })?;
                info!(core = %ctx.core(), token = %token, "Minting finished");
                Ok(success())
            }
            TokenCall::Burn { token, amount } => {
                self.burn(ctx, token, amount)?;
                Ok(success())
            }
            TokenCall::Token { token } => {
                let finished = minting_finished(ctx, token)?;
                let storage = ctx.storage_view();
                let minted = storage.get_u256(layout::ALL_TIME_MINTED, &token_key(token));
                let burned = storage.get_u256(layout::ALL_TIME_BURNED, &token_key(token));
                let supply = storage.get_u256(layout::TOTAL_SUPPLY, &token_key(token));
                Ok(Encoder::returns()
                    .bool(finished)
                    .uint(minted)
                    .uint(burned)
                    .uint(supply)
                    .address_array(&[])
                    .uint(U256::ZERO)
                    .address_array(&[])
                    .finish())
            }
        }
    }

    /// Credit each recipient with the amount at the same position.
    pub fn mint(
        &self,
        ctx: &mut DelegateContext<'_, '_>,
        token: Address,
        recipients: &[Address],
        amounts: &[U256],
    ) -> HostResult<()> {
        ctx.require_operator(ctx.sender())?;
        if recipients.len() != amounts.len() {
            return Err(TokenError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            }
            .into());
        }
        if minting_finished(ctx, token)? {
            return Err(TokenError::MintingFinished { token }.into());
        }

        for (&recipient, &amount) in recipients.iter().zip(amounts) {
            let supply = add(total_supply(ctx, token), amount)?;
            let balance = add(balance_of(ctx, token, recipient), amount)?;
            let minted = add(
                ctx.storage_view()
                    .get_u256(layout::ALL_TIME_MINTED, &token_key(token)),
                amount,
            )?;

            let mut storage = ctx.storage();
            storage.set_u256(layout::TOTAL_SUPPLY, &token_key(token), supply)?;
            storage.set_u256(layout::BALANCE, &holder_key(token, recipient), balance)?;
            storage.set_u256(layout::ALL_TIME_MINTED, &token_key(token), minted)?;

            ctx.emit(Event::MintErc20 {
                token,
                recipient,
                amount,
            })?;
            relay(
                ctx,
                token,
                TokenProxyCall::EmitTransfer {
                    from: Address::ZERO,
                    to: recipient,
                    value: amount,
                },
            )?;
        }

        info!(
            core = %ctx.core(),
            token = %token,
            recipients = recipients.len(),
            "Tokens minted"
        );
        Ok(())
    }

    /// Destroy `amount` of the operator's own balance.
    pub fn burn(
        &self,
        ctx: &mut DelegateContext<'_, '_>,
        token: Address,
        amount: U256,
    ) -> HostResult<()> {
        let operator = ctx.sender();
        ctx.require_operator(operator)?;

        let balance = balance_of(ctx, token, operator);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(TokenError::BurnExceedsBalance { balance, amount })?;
        let supply = total_supply(ctx, token)
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;
        let burned = add(
            ctx.storage_view()
                .get_u256(layout::ALL_TIME_BURNED, &token_key(token)),
            amount,
        )?;

        let mut storage = ctx.storage();
        storage.set_u256(layout::BALANCE, &holder_key(token, operator), remaining)?;
        storage.set_u256(layout::TOTAL_SUPPLY, &token_key(token), supply)?;
        storage.set_u256(layout::ALL_TIME_BURNED, &token_key(token), burned)?;

        ctx.emit(Event::BurnErc20 { token, amount })?;
        relay(
            ctx,
            token,
            TokenProxyCall::EmitTransfer {
                from: operator,
                to: Address::ZERO,
                value: amount,
            },
        )?;
        info!(
            core = %ctx.core(),
            token = %token,
            operator = %operator,
            amount = %amount,
            "Tokens burned"
        );
        Ok(())
    }
}

impl Delegate for MintableTokenDelegate {
    fn name(&self) -> &str {
        "MintableTokenDelegate"
    }

    fn execute(&self, ctx: &mut DelegateContext<'_, '_>, input: &[u8]) -> CallResult {
        match TokenCall::decode(input)? {
            Some(call) => self.handle(ctx, call),
            None => Err(Revert::UnknownSelector {
                selector: Selector::from_payload(input)?,
            }),
        }
    }
}

fn success() -> Vec<u8> {
    Encoder::returns().bool(true).finish()
}

fn add(a: U256, b: U256) -> HostResult<U256> {
    Ok(a.checked_add(b).ok_or(TokenError::Overflow)?)
}

fn total_supply(ctx: &DelegateContext<'_, '_>, token: Address) -> U256 {
    ctx.storage_view()
        .get_u256(layout::TOTAL_SUPPLY, &token_key(token))
}

fn balance_of(ctx: &DelegateContext<'_, '_>, token: Address, holder: Address) -> U256 {
    ctx.storage_view()
        .get_u256(layout::BALANCE, &holder_key(token, holder))
}

fn allowance(
    ctx: &DelegateContext<'_, '_>,
    token: Address,
    owner: Address,
    spender: Address,
) -> U256 {
    ctx.storage_view()
        .get_u256(layout::ALLOWANCE, &allowance_key(token, owner, spender))
}

fn minting_finished(ctx: &DelegateContext<'_, '_>, token: Address) -> HostResult<bool> {
    ctx.storage_view()
        .get_bool(layout::MINTING_FINISHED, &token_key(token))
}

fn transfer(
    ctx: &mut DelegateContext<'_, '_>,
    token: Address,
    from: Address,
    to: Address,
    value: U256,
) -> HostResult<()> {
    if to.is_zero() {
        return Err(TokenError::NullRecipient.into());
    }
    let balance = balance_of(ctx, token, from);
    let remaining = balance
        .checked_sub(value)
        .ok_or(TokenError::InsufficientBalance { balance, value })?;
    ctx.storage()
        .set_u256(layout::BALANCE, &holder_key(token, from), remaining)?;
    // read after the debit so a self-transfer nets to zero
    let credited = add(balance_of(ctx, token, to), value)?;
    ctx.storage()
        .set_u256(layout::BALANCE, &holder_key(token, to), credited)?;

    debug!(token = %token, from = %from, to = %to, value = %value, "Transfer");
    relay(ctx, token, TokenProxyCall::EmitTransfer { from, to, value })
}

/// Have the token proxy emit a token-level event on its own address.
fn relay(
    ctx: &mut DelegateContext<'_, '_>,
    token: Address,
    call: TokenProxyCall,
) -> HostResult<()> {
    ctx.call(token, &call.encode())?;
    Ok(())
}
