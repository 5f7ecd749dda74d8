//! Typed Core and Proxy operations.
//!
//! Each operation has a canonical signature, an encoder for building call
//! payloads and a decoder that recognises incoming payloads. Decoding
//! returns `Ok(None)` for any selector that is not one of the operations, so
//! the caller can fall through to its forwarding path.

use maple_dispatch_codec::{Address, CodecResult, Decoder, Encoder, Selector, Signature, U256};

pub static DEFINE_DELEGATE: Signature = Signature::new("defineDelegate(uint256,address)");
pub static DEFINE_PROXY: Signature = Signature::new("defineProxy(address,uint256)");
pub static REMOVE_PROXY: Signature = Signature::new("removeProxy(address)");
pub static MIGRATE_PROXY: Signature = Signature::new("migrateProxy(address,address)");
pub static DELEGATE_CALL: Signature = Signature::new("delegateCall(bytes)");
pub static DELEGATE_CALL_VIEW: Signature = Signature::new("delegateCallView(bytes)");
pub static DELEGATES: Signature = Signature::new("delegates(uint256)");
pub static PROXY_DELEGATE_ID: Signature = Signature::new("proxyDelegateId(address)");
pub static IS_OPERATOR: Signature = Signature::new("isOperator(address)");

pub static CORE: Signature = Signature::new("core()");
pub static UPDATE_CORE: Signature = Signature::new("updateCore(address)");
pub static SUCCESS_ONLY_CORE: Signature = Signature::new("successOnlyCore(bool)");

/// Operations answered by a core itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCall {
    DefineDelegate { id: U256, delegate: Address },
    DefineProxy { proxy: Address, delegate_id: U256 },
    RemoveProxy { proxy: Address },
    MigrateProxy { proxy: Address, new_core: Address },
    DelegateCall { payload: Vec<u8> },
    DelegateCallView { payload: Vec<u8> },
    Delegates { id: U256 },
    ProxyDelegateId { proxy: Address },
    IsOperator { account: Address },
}

impl CoreCall {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            CoreCall::DefineDelegate { id, delegate } => Encoder::call(&DEFINE_DELEGATE)
                .uint(*id)
                .address(*delegate)
                .finish(),
            CoreCall::DefineProxy { proxy, delegate_id } => Encoder::call(&DEFINE_PROXY)
                .address(*proxy)
                .uint(*delegate_id)
                .finish(),
            CoreCall::RemoveProxy { proxy } => {
                Encoder::call(&REMOVE_PROXY).address(*proxy).finish()
            }
            CoreCall::MigrateProxy { proxy, new_core } => Encoder::call(&MIGRATE_PROXY)
                .address(*proxy)
                .address(*new_core)
                .finish(),
            CoreCall::DelegateCall { payload } => {
                Encoder::call(&DELEGATE_CALL).bytes(payload).finish()
            }
            CoreCall::DelegateCallView { payload } => {
                Encoder::call(&DELEGATE_CALL_VIEW).bytes(payload).finish()
            }
            CoreCall::Delegates { id } => Encoder::call(&DELEGATES).uint(*id).finish(),
            CoreCall::ProxyDelegateId { proxy } => {
                Encoder::call(&PROXY_DELEGATE_ID).address(*proxy).finish()
            }
            CoreCall::IsOperator { account } => {
                Encoder::call(&IS_OPERATOR).address(*account).finish()
            }
        }
    }

    pub fn decode(input: &[u8]) -> CodecResult<Option<Self>> {
        let Ok(selector) = Selector::from_payload(input) else {
            return Ok(None);
        };
        let mut args = Decoder::arguments(input)?;
        let call = if DEFINE_DELEGATE.matches(selector) {
            CoreCall::DefineDelegate {
                id: args.uint()?,
                delegate: args.address()?,
            }
        } else if DEFINE_PROXY.matches(selector) {
            CoreCall::DefineProxy {
                proxy: args.address()?,
                delegate_id: args.uint()?,
            }
        } else if REMOVE_PROXY.matches(selector) {
            CoreCall::RemoveProxy {
                proxy: args.address()?,
            }
        } else if MIGRATE_PROXY.matches(selector) {
            CoreCall::MigrateProxy {
                proxy: args.address()?,
                new_core: args.address()?,
            }
        } else if DELEGATE_CALL.matches(selector) {
            CoreCall::DelegateCall {
                payload: args.bytes()?,
            }
        } else if DELEGATE_CALL_VIEW.matches(selector) {
            CoreCall::DelegateCallView {
                payload: args.bytes()?,
            }
        } else if DELEGATES.matches(selector) {
            CoreCall::Delegates { id: args.uint()? }
        } else if PROXY_DELEGATE_ID.matches(selector) {
            CoreCall::ProxyDelegateId {
                proxy: args.address()?,
            }
        } else if IS_OPERATOR.matches(selector) {
            CoreCall::IsOperator {
                account: args.address()?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}

/// Administrative operations answered by a proxy itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyCall {
    Core,
    UpdateCore { core: Address },
    SuccessOnlyCore { success: bool },
}

impl ProxyCall {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ProxyCall::Core => Encoder::call(&CORE).finish(),
            ProxyCall::UpdateCore { core } => Encoder::call(&UPDATE_CORE).address(*core).finish(),
            ProxyCall::SuccessOnlyCore { success } => {
                Encoder::call(&SUCCESS_ONLY_CORE).bool(*success).finish()
            }
        }
    }

    pub fn decode(input: &[u8]) -> CodecResult<Option<Self>> {
        let Ok(selector) = Selector::from_payload(input) else {
            return Ok(None);
        };
        let mut args = Decoder::arguments(input)?;
        let call = if CORE.matches(selector) {
            ProxyCall::Core
        } else if UPDATE_CORE.matches(selector) {
            ProxyCall::UpdateCore {
                core: args.address()?,
            }
        } else if SUCCESS_ONLY_CORE.matches(selector) {
            ProxyCall::SuccessOnlyCore {
                success: args.bool()?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}
