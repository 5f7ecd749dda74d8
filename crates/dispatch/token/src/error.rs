use maple_dispatch_codec::{Address, U256};
use maple_dispatch_host::Revert;
use thiserror::Error;

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Failures raised by token cores and token delegate logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("TC01: delegate {delegate} rejected the token configuration")]
    InvalidConfiguration { delegate: Address },

    #[error("TE01: recipient must not be the null identity")]
    NullRecipient,

    #[error("TE02: transfer of {value} exceeds balance {balance}")]
    InsufficientBalance { balance: U256, value: U256 },

    #[error("TE03: transfer of {value} exceeds allowance {allowance}")]
    InsufficientAllowance { allowance: U256, value: U256 },

    #[error("MT01: minting is finished for token {token}")]
    MintingFinished { token: Address },

    #[error("MT02: burn of {amount} exceeds balance {balance}")]
    BurnExceedsBalance { balance: U256, amount: U256 },

    #[error("MT04: {recipients} recipients but {amounts} amounts")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("MT05: supply accounting overflow")]
    Overflow,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidConfiguration { .. } => "TC01",
            TokenError::NullRecipient => "TE01",
            TokenError::InsufficientBalance { .. } => "TE02",
            TokenError::InsufficientAllowance { .. } => "TE03",
            TokenError::MintingFinished { .. } => "MT01",
            TokenError::BurnExceedsBalance { .. } => "MT02",
            TokenError::LengthMismatch { .. } => "MT04",
            TokenError::Overflow => "MT05",
        }
    }
}

impl From<TokenError> for Revert {
    fn from(err: TokenError) -> Self {
        Revert::Domain {
            code: err.code(),
            message: err.to_string(),
        }
    }
}
