use std::sync::Arc;

use maple_dispatch_codec::{Address, Word};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::HostConfig;
use crate::context::{CallContext, CodeRegistry, Frame};
use crate::contract::{Code, Contract};
use crate::delegate::Delegate;
use crate::error::{CallResult, HostResult, Revert};
use crate::log::{Event, Log};
use crate::state::{Namespace, StorageView, WorldState};

/// Outcome of a committed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: Uuid,
    pub output: Vec<u8>,
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Events emitted by `emitter`, in order.
    pub fn events_from(&self, emitter: Address) -> Vec<&Event> {
        self.logs
            .iter()
            .filter(|log| log.emitter == emitter)
            .map(|log| &log.event)
            .collect()
    }
}

/// The execution host.
///
/// Owns deployed code and world state and runs calls one at a time. Each
/// call either commits entirely or leaves state exactly as it was.
#[derive(Debug)]
pub struct Host {
    code: CodeRegistry,
    state: WorldState,
    config: HostConfig,
    nonce: u64,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        Self {
            code: CodeRegistry::new(),
            state: WorldState::new(),
            config,
            nonce: 0,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn next_address(&mut self, deployer: Address) -> Address {
        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(deployer.as_bytes());
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        self.nonce += 1;
        Address::derive(&seed)
    }

    /// Deploy contract code and run its constructor.
    ///
    /// A failing constructor leaves no code and no state behind.
    pub fn deploy_contract(
        &mut self,
        deployer: Address,
        contract: impl Contract + 'static,
    ) -> HostResult<Address> {
        let address = self.next_address(deployer);
        let name = contract.name().to_string();
        self.code.insert(address, Code::Contract(Box::new(contract)));

        let frame = Frame {
            this: address,
            caller: deployer,
            sender: deployer,
            is_static: false,
            depth: 1,
        };
        let checkpoint = self.state.checkpoint();
        let result = match self.code.get(&address) {
            Some(Code::Contract(contract)) => {
                let mut ctx = CallContext::new(&self.code, &mut self.state, &self.config, frame);
                contract.construct(&mut ctx)
            }
            _ => Err(Revert::NoCode { address }),
        };

        match result {
            Ok(()) => {
                let logs = self.state.commit();
                info!(
                    address = %address,
                    contract = %name,
                    deployer = %deployer,
                    logs = logs.len(),
                    "Contract deployed"
                );
                Ok(address)
            }
            Err(revert) => {
                self.state.revert_to(checkpoint);
                self.code.remove(&address);
                warn!(
                    contract = %name,
                    code = revert.code(),
                    error = %revert,
                    "Constructor reverted"
                );
                Err(revert)
            }
        }
    }

    /// Register delegate logic. Delegates have no constructor and no storage.
    pub fn deploy_delegate(&mut self, delegate: impl Delegate + 'static) -> Address {
        let address = self.next_address(Address::ZERO);
        info!(address = %address, delegate = delegate.name(), "Delegate deployed");
        self.code.insert(address, Code::Delegate(Box::new(delegate)));
        address
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.code.contains_key(&address)
    }

    pub fn code_name(&self, address: Address) -> Option<&str> {
        self.code.get(&address).map(Code::name)
    }

    /// Submit a state-changing call from an external identity.
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        input: &[u8],
    ) -> Result<Receipt, Revert> {
        let transaction_id = Uuid::new_v4();
        let checkpoint = self.state.checkpoint();
        let result = {
            let mut origin = CallContext::new(
                &self.code,
                &mut self.state,
                &self.config,
                Frame::origin(from, false),
            );
            origin.call(to, input)
        };

        match result {
            Ok(output) => {
                let logs = self.state.commit();
                debug!(
                    transaction_id = %transaction_id,
                    from = %from,
                    to = %to,
                    logs = logs.len(),
                    "Transaction committed"
                );
                Ok(Receipt {
                    transaction_id,
                    output,
                    logs,
                })
            }
            Err(revert) => {
                self.state.revert_to(checkpoint);
                warn!(
                    transaction_id = %transaction_id,
                    from = %from,
                    to = %to,
                    code = revert.code(),
                    error = %revert,
                    "Transaction reverted"
                );
                Err(revert)
            }
        }
    }

    /// Run a read-only call. Nothing it does persists.
    pub fn query(&mut self, from: Address, to: Address, input: &[u8]) -> CallResult {
        let checkpoint = self.state.checkpoint();
        let result = {
            let mut origin = CallContext::new(
                &self.code,
                &mut self.state,
                &self.config,
                Frame::origin(from, true),
            );
            origin.call(to, input)
        };
        self.state.revert_to(checkpoint);
        result
    }

    /// Inspect one namespace of an account's storage.
    pub fn storage(&self, account: Address, namespace: Namespace) -> StorageView<'_> {
        StorageView::new(&self.state, account, namespace)
    }

    pub fn state_root(&self) -> Word {
        self.state.state_root()
    }
}

/// A host shared between threads.
///
/// Calls from any thread are executed strictly one at a time under a single
/// lock, so each call observes and leaves a consistent state.
#[derive(Debug, Clone, Default)]
pub struct SharedHost {
    inner: Arc<Mutex<Host>>,
}

impl SharedHost {
    pub fn new(host: Host) -> Self {
        Self {
            inner: Arc::new(Mutex::new(host)),
        }
    }

    pub fn transact(&self, from: Address, to: Address, input: &[u8]) -> Result<Receipt, Revert> {
        self.inner.lock().transact(from, to, input)
    }

    pub fn query(&self, from: Address, to: Address, input: &[u8]) -> CallResult {
        self.inner.lock().query(from, to, input)
    }

    /// Run `f` with exclusive access to the host.
    pub fn with<R>(&self, f: impl FnOnce(&mut Host) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewEnforcement;
    use crate::delegate::{DelegateContext, CHECK_CONFIGURATIONS};
    use crate::state::{Storage, StorageRead};
    use maple_dispatch_codec::{Decoder, Encoder, Signature, U256};

    static BUMP: Signature = Signature::new("bump()");
    static COUNT: Signature = Signature::new("count()");
    static BUMP_THEN_FAIL: Signature = Signature::new("bumpThenFail()");
    static CALL: Signature = Signature::new("call(address,bytes)");
    static STATIC_CALL: Signature = Signature::new("staticCall(address,bytes)");
    static FORWARD: Signature = Signature::new("forward(address,bytes)");
    static WHO: Signature = Signature::new("who()");
    static RUN: Signature = Signature::new("run(address,address,address,bytes,bool)");

    /// A counter that can also relay calls and run delegate logic.
    struct Counter;

    impl Contract for Counter {
        fn name(&self) -> &str {
            "Counter"
        }

        fn construct(&self, ctx: &mut CallContext<'_>) -> HostResult<()> {
            ctx.storage().set_u256("count", &[], U256::from(1u64))
        }

        fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> CallResult {
            let (selector, mut args) = Decoder::call(input)?;
            if BUMP.matches(selector) {
                let next = ctx
                    .storage_view()
                    .get_u256("count", &[])
                    .checked_add(U256::from(1u64))
                    .ok_or_else(|| Revert::domain("CT01", "overflow"))?;
                ctx.storage().set_u256("count", &[], next)?;
                ctx.emit(Event::CoreUpdated { core: ctx.this() })?;
                Ok(Encoder::returns().uint(next).finish())
            } else if COUNT.matches(selector) {
                let count = ctx.storage_view().get_u256("count", &[]);
                Ok(Encoder::returns().uint(count).finish())
            } else if BUMP_THEN_FAIL.matches(selector) {
                ctx.storage().set_u256("count", &[], U256::from(999u64))?;
                Err(Revert::domain("CT02", "failed after write"))
            } else if CALL.matches(selector) {
                let to = args.address()?;
                let data = args.bytes()?;
                ctx.call(to, &data)
            } else if STATIC_CALL.matches(selector) {
                let to = args.address()?;
                let data = args.bytes()?;
                ctx.static_call(to, &data)
            } else if FORWARD.matches(selector) {
                let to = args.address()?;
                let data = args.bytes()?;
                ctx.forward(to, &data)
            } else if WHO.matches(selector) {
                Ok(Encoder::returns()
                    .address(ctx.caller())
                    .address(ctx.sender())
                    .finish())
            } else if RUN.matches(selector) {
                let delegate = args.address()?;
                let proxy = args.address()?;
                let sender = args.address()?;
                let data = args.bytes()?;
                let read_only = args.bool()?;
                ctx.delegate_call(delegate, proxy, sender, &data, read_only)
            } else {
                Err(Revert::UnknownSelector { selector })
            }
        }
    }

    /// Delegate logic that writes one slot and reports who it runs for.
    struct Marker;

    impl Delegate for Marker {
        fn name(&self) -> &str {
            "Marker"
        }

        fn execute(&self, ctx: &mut DelegateContext<'_, '_>, _input: &[u8]) -> CallResult {
            ctx.storage().set_bool("marked", &[], true)?;
            Ok(Encoder::returns()
                .address(ctx.core())
                .address(ctx.proxy())
                .address(ctx.caller())
                .address(ctx.sender())
                .finish())
        }

        fn check_configurations(&self, configurations: &[U256]) -> bool {
            configurations.len() < 3
        }
    }

    fn user() -> Address {
        Address::from_low_u64(0xaa)
    }

    fn proxy() -> Address {
        Address::from_low_u64(0xbb)
    }

    fn count(host: &mut Host, counter: Address) -> U256 {
        let out = host
            .query(user(), counter, &Encoder::call(&COUNT).finish())
            .unwrap();
        Decoder::returns(&out).uint().unwrap()
    }

    #[test]
    fn constructor_state_is_committed() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        assert!(host.has_code(counter));
        assert_eq!(host.code_name(counter), Some("Counter"));
        assert_eq!(count(&mut host, counter), U256::from(1u64));
    }

    #[test]
    fn deployments_get_distinct_addresses() {
        let mut host = Host::default();
        let a = host.deploy_contract(user(), Counter).unwrap();
        let b = host.deploy_contract(user(), Counter).unwrap();
        let d = host.deploy_delegate(Marker);
        assert_ne!(a, b);
        assert_ne!(a, d);
    }

    #[test]
    fn transact_commits_state_and_logs() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let receipt = host
            .transact(user(), counter, &Encoder::call(&BUMP).finish())
            .unwrap();
        assert_eq!(Decoder::returns(&receipt.output).uint().unwrap(), U256::from(2u64));
        assert_eq!(receipt.events_from(counter).len(), 1);
        assert_eq!(count(&mut host, counter), U256::from(2u64));
    }

    #[test]
    fn failed_transaction_changes_nothing() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let root = host.state_root();
        let err = host
            .transact(user(), counter, &Encoder::call(&BUMP_THEN_FAIL).finish())
            .unwrap_err();
        assert_eq!(err.code(), "CT02");
        assert_eq!(host.state_root(), root);
    }

    #[test]
    fn nested_failure_propagates_unchanged() {
        let mut host = Host::default();
        let outer = host.deploy_contract(user(), Counter).unwrap();
        let inner = host.deploy_contract(user(), Counter).unwrap();
        let root = host.state_root();
        let payload = Encoder::call(&CALL)
            .address(inner)
            .bytes(&Encoder::call(&BUMP_THEN_FAIL).finish())
            .finish();
        let err = host.transact(user(), outer, &payload).unwrap_err();
        assert_eq!(err, Revert::domain("CT02", "failed after write"));
        assert_eq!(host.state_root(), root);
    }

    #[test]
    fn query_never_persists() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let out = host
            .query(user(), counter, &Encoder::call(&BUMP).finish())
            .unwrap();
        assert_eq!(Decoder::returns(&out).uint().unwrap(), U256::from(2u64));
        assert_eq!(count(&mut host, counter), U256::from(1u64));
    }

    #[test]
    fn strict_views_reject_writes() {
        let config = HostConfig {
            view_enforcement: ViewEnforcement::Strict,
            ..HostConfig::default()
        };
        let mut host = Host::new(config);
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let err = host
            .query(user(), counter, &Encoder::call(&BUMP).finish())
            .unwrap_err();
        assert_eq!(err.code(), "HS01");
    }

    #[test]
    fn static_call_inside_transaction_is_rolled_back() {
        let mut host = Host::default();
        let outer = host.deploy_contract(user(), Counter).unwrap();
        let inner = host.deploy_contract(user(), Counter).unwrap();
        let payload = Encoder::call(&STATIC_CALL)
            .address(inner)
            .bytes(&Encoder::call(&BUMP).finish())
            .finish();
        let receipt = host.transact(user(), outer, &payload).unwrap();
        assert!(receipt.logs.is_empty());
        assert_eq!(count(&mut host, inner), U256::from(1u64));
    }

    #[test]
    fn delegate_runs_in_caller_storage() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let marker = host.deploy_delegate(Marker);
        let payload = Encoder::call(&RUN)
            .address(marker)
            .address(proxy())
            .address(proxy())
            .bytes(&[0, 0, 0, 0])
            .bool(false)
            .finish();
        let receipt = host.transact(user(), counter, &payload).unwrap();

        let mut out = Decoder::returns(&receipt.output);
        assert_eq!(out.address().unwrap(), counter);
        assert_eq!(out.address().unwrap(), proxy());
        assert_eq!(out.address().unwrap(), user());
        assert_eq!(out.address().unwrap(), proxy());
        assert!(host
            .storage(counter, Namespace::Delegated)
            .get_bool("marked", &[])
            .unwrap());
        assert_eq!(host.storage(marker, Namespace::Delegated).get_word("marked", &[]), Word::ZERO);
    }

    #[test]
    fn forward_vouches_only_for_the_immediate_caller() {
        let mut host = Host::default();
        let a = host.deploy_contract(user(), Counter).unwrap();
        let b = host.deploy_contract(user(), Counter).unwrap();
        let c = host.deploy_contract(user(), Counter).unwrap();
        let who = Encoder::call(&WHO).finish();

        // user -> a -forward-> b: b acts for user
        let payload = Encoder::call(&FORWARD).address(b).bytes(&who).finish();
        let receipt = host.transact(user(), a, &payload).unwrap();
        let mut out = Decoder::returns(&receipt.output);
        assert_eq!(out.address().unwrap(), a);
        assert_eq!(out.address().unwrap(), user());

        // user -> a -forward-> b -forward-> c: b can only vouch for a
        let inner = Encoder::call(&FORWARD).address(c).bytes(&who).finish();
        let payload = Encoder::call(&FORWARD).address(b).bytes(&inner).finish();
        let receipt = host.transact(user(), a, &payload).unwrap();
        let mut out = Decoder::returns(&receipt.output);
        assert_eq!(out.address().unwrap(), b);
        assert_eq!(out.address().unwrap(), a);
    }

    #[test]
    fn read_only_delegate_execution_is_rolled_back() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let marker = host.deploy_delegate(Marker);
        let root = host.state_root();
        let payload = Encoder::call(&RUN)
            .address(marker)
            .address(proxy())
            .address(user())
            .bytes(&[0, 0, 0, 0])
            .bool(true)
            .finish();
        host.transact(user(), counter, &payload).unwrap();
        assert_eq!(host.state_root(), root);
    }

    #[test]
    fn delegates_only_answer_configuration_checks_directly() {
        let mut host = Host::default();
        let marker = host.deploy_delegate(Marker);

        let err = host
            .transact(user(), marker, &Encoder::call(&BUMP).finish())
            .unwrap_err();
        assert_eq!(err.code(), "HS02");

        let check = Encoder::call(&CHECK_CONFIGURATIONS)
            .uint_array(&[U256::from(1u64)])
            .finish();
        let out = host.query(user(), marker, &check).unwrap();
        assert!(Decoder::returns(&out).bool().unwrap());

        let check = Encoder::call(&CHECK_CONFIGURATIONS)
            .uint_array(&[U256::ZERO; 3])
            .finish();
        let out = host.query(user(), marker, &check).unwrap();
        assert!(!Decoder::returns(&out).bool().unwrap());
    }

    #[test]
    fn calls_to_accounts_without_code_fail() {
        let mut host = Host::default();
        let err = host
            .transact(user(), Address::from_low_u64(0xdead), &[0, 0, 0, 0])
            .unwrap_err();
        assert_eq!(err.code(), "HS03");
    }

    #[test]
    fn call_depth_is_bounded() {
        let config = HostConfig {
            max_call_depth: 3,
            ..HostConfig::default()
        };
        let mut host = Host::new(config);
        let counter = host.deploy_contract(user(), Counter).unwrap();

        // counter -> counter -> counter -> bump: depth 3 is allowed
        let mut payload = Encoder::call(&BUMP).finish();
        for _ in 0..2 {
            payload = Encoder::call(&CALL).address(counter).bytes(&payload).finish();
        }
        host.transact(user(), counter, &payload).unwrap();

        payload = Encoder::call(&CALL).address(counter).bytes(&payload).finish();
        let err = host.transact(user(), counter, &payload).unwrap_err();
        assert_eq!(err.code(), "HS04");
    }

    #[test]
    fn shared_host_serializes_calls() {
        let mut host = Host::default();
        let counter = host.deploy_contract(user(), Counter).unwrap();
        let shared = SharedHost::new(host);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        shared
                            .transact(user(), counter, &Encoder::call(&BUMP).finish())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total = shared.with(|host| count(host, counter));
        assert_eq!(total, U256::from(41u64));
    }
}
