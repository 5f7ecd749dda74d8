use maple_dispatch_codec::{Address, U256};
use serde::{Deserialize, Serialize};

/// Events raised by cores, proxies and delegate logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
    #[serde(rename = "MintERC20")]
    MintErc20 {
        token: Address,
        recipient: Address,
        amount: U256,
    },
    #[serde(rename = "BurnERC20")]
    BurnErc20 { token: Address, amount: U256 },
    MintFinish { token: Address },

    DelegateDefined { id: U256, delegate: Address },
    ProxyDefined { proxy: Address, delegate_id: U256 },
    ProxyRemoved { proxy: Address },
    ProxyMigrated { proxy: Address, core: Address },
    CoreUpdated { core: Address },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Transfer { .. } => "Transfer",
            Event::Approval { .. } => "Approval",
            Event::MintErc20 { .. } => "MintERC20",
            Event::BurnErc20 { .. } => "BurnERC20",
            Event::MintFinish { .. } => "MintFinish",
            Event::DelegateDefined { .. } => "DelegateDefined",
            Event::ProxyDefined { .. } => "ProxyDefined",
            Event::ProxyRemoved { .. } => "ProxyRemoved",
            Event::ProxyMigrated { .. } => "ProxyMigrated",
            Event::CoreUpdated { .. } => "CoreUpdated",
        }
    }
}

/// An event together with the account that emitted it.
///
/// Delegate logic emits as the core it executes for; a proxy emits as
/// itself, which is how token-level events end up on the token address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub emitter: Address,
    #[serde(flatten)]
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let log = Log {
            emitter: Address::from_low_u64(1),
            event: Event::MintErc20 {
                token: Address::from_low_u64(2),
                recipient: Address::from_low_u64(3),
                amount: U256::from(100u64),
            },
        };
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["event"], "MintERC20");
        assert_eq!(json["amount"], "100");
        assert_eq!(json["emitter"], Address::from_low_u64(1).to_string());

        let back: Log = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
