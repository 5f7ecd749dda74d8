use maple_dispatch_codec::{Address, Word};
use tracing::debug;

use crate::error::{HostResult, Revert};
use crate::state::{Storage, StorageRead};

const OPERATOR: &str = "access.operator";

/// Role checks shared by cores, proxies and delegate logic.
///
/// Operator records live in the core's contract storage; delegate logic
/// reaches them through a read-only view.
pub struct AccessGate;

impl AccessGate {
    pub fn grant(storage: &mut impl Storage, account: Address) -> HostResult<()> {
        debug!(account = %account, "Operator granted");
        storage.set_bool(OPERATOR, &[Word::from_address(account)], true)
    }

    pub fn is_operator(storage: &impl StorageRead, account: Address) -> bool {
        !storage
            .load_slot(OPERATOR, &[Word::from_address(account)])
            .is_zero()
    }

    /// CO03 unless `account` is an operator.
    pub fn require_operator(storage: &impl StorageRead, account: Address) -> HostResult<()> {
        if Self::is_operator(storage, account) {
            Ok(())
        } else {
            Err(Revert::NotOperator { account })
        }
    }

    /// PR01 unless `caller` is the current core.
    pub fn require_core(core: Address, caller: Address) -> HostResult<()> {
        if caller == core {
            Ok(())
        } else {
            Err(Revert::NotCore { caller })
        }
    }
}
