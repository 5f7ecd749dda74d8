use maple_dispatch_codec::{Address, U256};
use maple_dispatch_host::Revert;
use thiserror::Error;

/// Result type for registry operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Registry-consistency failures raised by a core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("CO09: delegate id 0 is reserved")]
    ReservedDelegateId,

    #[error("CO10: delegate id {id} is not registered")]
    DelegateNotRegistered { id: U256 },

    #[error("CO11: proxy identity is null")]
    NullProxy,

    #[error("CO12: no registry entry for proxy {proxy}")]
    ProxyNotFound { proxy: Address },
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ReservedDelegateId => "CO09",
            CoreError::DelegateNotRegistered { .. } => "CO10",
            CoreError::NullProxy => "CO11",
            CoreError::ProxyNotFound { .. } => "CO12",
        }
    }
}

impl From<CoreError> for Revert {
    fn from(err: CoreError) -> Self {
        Revert::Domain {
            code: err.code(),
            message: err.to_string(),
        }
    }
}
