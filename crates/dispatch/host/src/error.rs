use maple_dispatch_codec::{Address, CodecError, Selector};
use thiserror::Error;

/// Result of executing a frame: return data or a revert.
pub type CallResult = Result<Vec<u8>, Revert>;

/// Result type for host operations that carry no return data.
pub type HostResult<T> = Result<T, Revert>;

/// A failed call.
///
/// A revert travels unchanged from the frame that raised it to the top-level
/// caller; intermediate frames (a Proxy forwarding to its Core, a Core
/// executing a Delegate) relay it as a value and never re-wrap it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("CO03: {account} is not an authorized operator")]
    NotOperator { account: Address },

    #[error("PR01: {caller} is not the current core")]
    NotCore { caller: Address },

    #[error("HS01: state mutation attempted in a read-only context")]
    StaticWrite,

    #[error("HS02: delegate {delegate} cannot be called outside a core context")]
    DelegateOutsideCore { delegate: Address },

    #[error("HS03: no code at {address}")]
    NoCode { address: Address },

    #[error("HS04: call depth exceeds {max}")]
    DepthExceeded { max: usize },

    #[error("HS05: unknown selector {selector}")]
    UnknownSelector { selector: Selector },

    /// A failure raised by registry or delegate logic. `message` starts
    /// with the code.
    #[error("{message}")]
    Domain { code: &'static str, message: String },
}

impl Revert {
    pub fn domain(code: &'static str, message: impl std::fmt::Display) -> Self {
        Revert::Domain {
            code,
            message: format!("{code}: {message}"),
        }
    }

    /// Stable short identifier for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Revert::Codec(err) => err.code(),
            Revert::NotOperator { .. } => "CO03",
            Revert::NotCore { .. } => "PR01",
            Revert::StaticWrite => "HS01",
            Revert::DelegateOutsideCore { .. } => "HS02",
            Revert::NoCode { .. } => "HS03",
            Revert::DepthExceeded { .. } => "HS04",
            Revert::UnknownSelector { .. } => "HS05",
            Revert::Domain { code, .. } => code,
        }
    }
}
