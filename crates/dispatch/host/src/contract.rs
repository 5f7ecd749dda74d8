use crate::context::CallContext;
use crate::delegate::Delegate;
use crate::error::{CallResult, HostResult};

/// Code deployed at a contract account.
///
/// Contract values hold no mutable state of their own. Everything they
/// persist goes through [`CallContext::storage`], so a failed frame can be
/// rolled back by the host.
pub trait Contract: Send + Sync {
    /// Human-readable name, used in traces.
    fn name(&self) -> &str;

    /// Runs once, in its own frame, when the contract is deployed.
    fn construct(&self, _ctx: &mut CallContext<'_>) -> HostResult<()> {
        Ok(())
    }

    /// Handle one call payload.
    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult;
}

/// What lives at an address.
pub enum Code {
    Contract(Box<dyn Contract>),
    Delegate(Box<dyn Delegate>),
}

impl Code {
    pub fn name(&self) -> &str {
        match self {
            Code::Contract(contract) => contract.name(),
            Code::Delegate(delegate) => delegate.name(),
        }
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self, Code::Delegate(_))
    }
}

impl std::fmt::Debug for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Code::Contract(contract) => write!(f, "Contract({})", contract.name()),
            Code::Delegate(delegate) => write!(f, "Delegate({})", delegate.name()),
        }
    }
}
