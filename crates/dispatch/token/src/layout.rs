//! Storage layout shared by the token core and token delegate logic.
//!
//! Metadata is written by the token core into its own records and read by
//! delegate logic through [`DelegateContext::core_records`]. Ledger state
//! lives in the delegated namespace, keyed by token first so several tokens
//! can share one core.
//!
//! [`DelegateContext::core_records`]: maple_dispatch_host::DelegateContext::core_records

use maple_dispatch_codec::{Address, Word};

pub const CORE_NAME: &str = "token_core.name";

pub const NAME: &str = "token.name";
pub const SYMBOL: &str = "token.symbol";
pub const DECIMALS: &str = "token.decimals";

pub const TOTAL_SUPPLY: &str = "token.total_supply";
pub const BALANCE: &str = "token.balance";
pub const ALLOWANCE: &str = "token.allowance";
pub const MINTING_FINISHED: &str = "token.minting_finished";
pub const ALL_TIME_MINTED: &str = "token.all_time_minted";
pub const ALL_TIME_BURNED: &str = "token.all_time_burned";

pub fn token_key(token: Address) -> [Word; 1] {
    [Word::from_address(token)]
}

pub fn holder_key(token: Address, holder: Address) -> [Word; 2] {
    [Word::from_address(token), Word::from_address(holder)]
}

pub fn allowance_key(token: Address, owner: Address, spender: Address) -> [Word; 3] {
    [
        Word::from_address(token),
        Word::from_address(owner),
        Word::from_address(spender),
    ]
}
