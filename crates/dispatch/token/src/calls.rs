//! Typed token operations.

use maple_dispatch_codec::{Address, CodecResult, Decoder, Encoder, Selector, Signature, U256};

pub static CORE_NAME: Signature = Signature::new("name()");
pub static DEFINE_TOKEN_DELEGATE: Signature =
    Signature::new("defineTokenDelegate(uint256,address,uint256[])");
pub static DEFINE_TOKEN: Signature =
    Signature::new("defineToken(address,uint256,string,string,uint256)");

pub static EMIT_TRANSFER: Signature = Signature::new("emitTransfer(address,address,uint256)");
pub static EMIT_APPROVAL: Signature = Signature::new("emitApproval(address,address,uint256)");

pub static NAME: Signature = Signature::new("name()");
pub static SYMBOL: Signature = Signature::new("symbol()");
pub static DECIMALS: Signature = Signature::new("decimals()");
pub static TOTAL_SUPPLY: Signature = Signature::new("totalSupply()");
pub static BALANCE_OF: Signature = Signature::new("balanceOf(address)");
pub static ALLOWANCE: Signature = Signature::new("allowance(address,address)");
pub static TRANSFER: Signature = Signature::new("transfer(address,uint256)");
pub static APPROVE: Signature = Signature::new("approve(address,uint256)");
pub static TRANSFER_FROM: Signature = Signature::new("transferFrom(address,address,uint256)");
pub static MINT: Signature = Signature::new("mint(address,address[],uint256[])");
pub static FINISH_MINTING: Signature = Signature::new("finishMinting(address)");
pub static BURN: Signature = Signature::new("burn(address,uint256)");
pub static TOKEN: Signature = Signature::new("token(address)");

/// Operations a token core answers in addition to the core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCoreCall {
    Name,
    DefineTokenDelegate {
        id: U256,
        delegate: Address,
        configurations: Vec<U256>,
    },
    DefineToken {
        token: Address,
        delegate_id: U256,
        name: String,
        symbol: String,
        decimals: U256,
    },
}

impl TokenCoreCall {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TokenCoreCall::Name => Encoder::call(&CORE_NAME).finish(),
            TokenCoreCall::DefineTokenDelegate {
                id,
                delegate,
                configurations,
            } => Encoder::call(&DEFINE_TOKEN_DELEGATE)
                .uint(*id)
                .address(*delegate)
                .uint_array(configurations)
                .finish(),
            TokenCoreCall::DefineToken {
                token,
                delegate_id,
                name,
                symbol,
                decimals,
            } => Encoder::call(&DEFINE_TOKEN)
                .address(*token)
                .uint(*delegate_id)
                .string(name)
                .string(symbol)
                .uint(*decimals)
                .finish(),
        }
    }

    pub fn decode(input: &[u8]) -> CodecResult<Option<Self>> {
        let Ok(selector) = Selector::from_payload(input) else {
            return Ok(None);
        };
        let mut args = Decoder::arguments(input)?;
        let call = if CORE_NAME.matches(selector) {
            TokenCoreCall::Name
        } else if DEFINE_TOKEN_DELEGATE.matches(selector) {
            TokenCoreCall::DefineTokenDelegate {
                id: args.uint()?,
                delegate: args.address()?,
                configurations: args.uint_array()?,
            }
        } else if DEFINE_TOKEN.matches(selector) {
            TokenCoreCall::DefineToken {
                token: args.address()?,
                delegate_id: args.uint()?,
                name: args.string()?,
                symbol: args.string()?,
                decimals: args.uint()?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}

/// Core-only event relays answered by a token proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenProxyCall {
    EmitTransfer {
        from: Address,
        to: Address,
        value: U256,
    },
    EmitApproval {
        owner: Address,
        spender: Address,
        value: U256,
    },
}

impl TokenProxyCall {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TokenProxyCall::EmitTransfer { from, to, value } => Encoder::call(&EMIT_TRANSFER)
                .address(*from)
                .address(*to)
                .uint(*value)
                .finish(),
            TokenProxyCall::EmitApproval {
                owner,
                spender,
                value,
            } => Encoder::call(&EMIT_APPROVAL)
                .address(*owner)
                .address(*spender)
                .uint(*value)
                .finish(),
        }
    }

    pub fn decode(input: &[u8]) -> CodecResult<Option<Self>> {
        let Ok(selector) = Selector::from_payload(input) else {
            return Ok(None);
        };
        let mut args = Decoder::arguments(input)?;
        let call = if EMIT_TRANSFER.matches(selector) {
            TokenProxyCall::EmitTransfer {
                from: args.address()?,
                to: args.address()?,
                value: args.uint()?,
            }
        } else if EMIT_APPROVAL.matches(selector) {
            TokenProxyCall::EmitApproval {
                owner: args.address()?,
                spender: args.address()?,
                value: args.uint()?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}

/// Operations implemented by the mintable token delegate.
///
/// The ERC20 operations act on the token the core resolved for the call.
/// The mintable operations name their token explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf {
        owner: Address,
    },
    Allowance {
        owner: Address,
        spender: Address,
    },
    Transfer {
        to: Address,
        value: U256,
    },
    Approve {
        spender: Address,
        value: U256,
    },
    TransferFrom {
        from: Address,
        to: Address,
        value: U256,
    },
    Mint {
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    },
    FinishMinting {
        token: Address,
    },
    Burn {
        token: Address,
        amount: U256,
    },
    /// Ledger summary of one token. The three trailing return fields
    /// (two address lists and a number) belong to token features this
    /// delegate does not carry and are always empty or zero.
    Token {
        token: Address,
    },
}

impl TokenCall {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TokenCall::Name => Encoder::call(&NAME).finish(),
            TokenCall::Symbol => Encoder::call(&SYMBOL).finish(),
            TokenCall::Decimals => Encoder::call(&DECIMALS).finish(),
            TokenCall::TotalSupply => Encoder::call(&TOTAL_SUPPLY).finish(),
            TokenCall::BalanceOf { owner } => Encoder::call(&BALANCE_OF).address(*owner).finish(),
            TokenCall::Allowance { owner, spender } => Encoder::call(&ALLOWANCE)
                .address(*owner)
                .address(*spender)
                .finish(),
            TokenCall::Transfer { to, value } => {
                Encoder::call(&TRANSFER).address(*to).uint(*value).finish()
            }
            TokenCall::Approve { spender, value } => Encoder::call(&APPROVE)
                .address(*spender)
                .uint(*value)
                .finish(),
            TokenCall::TransferFrom { from, to, value } => Encoder::call(&TRANSFER_FROM)
                .address(*from)
                .address(*to)
                .uint(*value)
                .finish(),
            TokenCall::Mint {
                token,
                recipients,
                amounts,
            } => Encoder::call(&MINT)
                .address(*token)
                .address_array(recipients)
                .uint_array(amounts)
                .finish(),
            TokenCall::FinishMinting { token } => {
                Encoder::call(&FINISH_MINTING).address(*token).finish()
            }
            TokenCall::Burn { token, amount } => Encoder::call(&BURN)
                .address(*token)
                .uint(*amount)
                .finish(),
            TokenCall::Token { token } => Encoder::call(&TOKEN).address(*token).finish(),
        }
    }

    pub fn decode(input: &[u8]) -> CodecResult<Option<Self>> {
        let Ok(selector) = Selector::from_payload(input) else {
            return Ok(None);
        };
        let mut args = Decoder::arguments(input)?;
        let call = if NAME.matches(selector) {
            TokenCall::Name
        } else if SYMBOL.matches(selector) {
            TokenCall::Symbol
        } else if DECIMALS.matches(selector) {
            TokenCall::Decimals
        } else if TOTAL_SUPPLY.matches(selector) {
            TokenCall::TotalSupply
        } else if BALANCE_OF.matches(selector) {
            TokenCall::BalanceOf {
                owner: args.address()?,
            }
        } else if ALLOWANCE.matches(selector) {
            TokenCall::Allowance {
                owner: args.address()?,
                spender: args.address()?,
            }
        } else if TRANSFER.matches(selector) {
            TokenCall::Transfer {
                to: args.address()?,
                value: args.uint()?,
            }
        } else if APPROVE.matches(selector) {
            TokenCall::Approve {
                spender: args.address()?,
                value: args.uint()?,
            }
        } else if TRANSFER_FROM.matches(selector) {
            TokenCall::TransferFrom {
                from: args.address()?,
                to: args.address()?,
                value: args.uint()?,
            }
        } else if MINT.matches(selector) {
            TokenCall::Mint {
                token: args.address()?,
                recipients: args.address_array()?,
                amounts: args.uint_array()?,
            }
        } else if FINISH_MINTING.matches(selector) {
            TokenCall::FinishMinting {
                token: args.address()?,
            }
        } else if BURN.matches(selector) {
            TokenCall::Burn {
                token: args.address()?,
                amount: args.uint()?,
            }
        } else if TOKEN.matches(selector) {
            TokenCall::Token {
                token: args.address()?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}
