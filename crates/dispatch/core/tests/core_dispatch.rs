//! Integration tests for the Core registry and its dispatch paths.

use maple_dispatch_codec::{Address, Decoder, Encoder, U256};
use maple_dispatch_core::mocks::*;
use maple_dispatch_core::{Core, CoreCall, Proxy, ProxyCall};
use maple_dispatch_host::{Event, Host, Receipt, Revert};

const STRING: &str = "TheAnswerToLife";

fn account(n: u64) -> Address {
    Address::from_low_u64(0x1000 + n)
}

fn bytes32() -> Vec<u8> {
    let mut bytes = STRING.as_bytes().to_vec();
    bytes.resize(32, 0);
    bytes
}

struct Fixture {
    host: Host,
    core: Address,
    proxy: Address,
    delegate: Address,
}

impl Fixture {
    fn new() -> Self {
        let mut host = Host::default();
        let delegate = host.deploy_delegate(DelegateMock::new());
        let core = host.deploy_contract(account(0), Core::new([account(0)])).unwrap();
        let proxy = host.deploy_contract(account(0), Proxy::new(core)).unwrap();
        Self {
            host,
            core,
            proxy,
            delegate,
        }
    }

    fn with_delegate() -> Self {
        let mut fixture = Self::new();
        fixture
            .admin(CoreCall::DefineDelegate {
                id: U256::from(1u64),
                delegate: fixture.delegate,
            })
            .unwrap();
        fixture
    }

    fn admin(&mut self, call: CoreCall) -> Result<Receipt, Revert> {
        self.host.transact(account(0), self.core, &call.encode())
    }

    fn define_proxy(&mut self, proxy: Address) {
        self.admin(CoreCall::DefineProxy {
            proxy,
            delegate_id: U256::from(1u64),
        })
        .unwrap();
    }

    fn proxy_core(&mut self) -> Address {
        let out = self
            .host
            .query(account(5), self.proxy, &ProxyCall::Core.encode())
            .unwrap();
        Decoder::returns(&out).address().unwrap()
    }
}

fn returns_bool(out: &[u8]) -> bool {
    Decoder::returns(out).bool().unwrap()
}

fn returns_uint(out: &[u8]) -> U256 {
    Decoder::returns(out).uint().unwrap()
}

// ---------------------------------------------------------------------------
// Registry administration
// ---------------------------------------------------------------------------

#[test]
fn defines_a_delegate() {
    let mut f = Fixture::new();
    let receipt = f
        .admin(CoreCall::DefineDelegate {
            id: U256::from(1u64),
            delegate: f.delegate,
        })
        .unwrap();
    assert!(returns_bool(&receipt.output));
    assert_eq!(
        receipt.events_from(f.core),
        vec![&Event::DelegateDefined {
            id: U256::from(1u64),
            delegate: f.delegate
        }]
    );

    let id = U256::from(1u64);
    let out = f
        .host
        .query(account(5), f.core, &CoreCall::Delegates { id }.encode())
        .unwrap();
    assert_eq!(Decoder::returns(&out).address().unwrap(), f.delegate);
}

#[test]
fn undefines_a_delegate() {
    let mut f = Fixture::with_delegate();
    f.admin(CoreCall::DefineDelegate {
        id: U256::from(1u64),
        delegate: Address::ZERO,
    })
    .unwrap();
    let err = f
        .admin(CoreCall::DefineProxy {
            proxy: f.proxy,
            delegate_id: U256::from(1u64),
        })
        .unwrap_err();
    assert_eq!(err.code(), "CO10");
}

#[test]
fn delegate_id_zero_is_reserved() {
    let mut f = Fixture::new();
    let err = f
        .admin(CoreCall::DefineDelegate {
            id: U256::ZERO,
            delegate: f.delegate,
        })
        .unwrap_err();
    assert_eq!(err.code(), "CO09");
}

#[test]
fn defines_a_proxy() {
    let mut f = Fixture::with_delegate();
    let receipt = f
        .admin(CoreCall::DefineProxy {
            proxy: f.proxy,
            delegate_id: U256::from(1u64),
        })
        .unwrap();
    assert!(returns_bool(&receipt.output));

    let out = f
        .host
        .query(account(5), f.core, &CoreCall::ProxyDelegateId { proxy: f.proxy }.encode())
        .unwrap();
    assert_eq!(returns_uint(&out), U256::from(1u64));
}

#[test]
fn rejects_a_null_proxy() {
    let mut f = Fixture::with_delegate();
    let err = f
        .admin(CoreCall::DefineProxy {
            proxy: Address::ZERO,
            delegate_id: U256::from(1u64),
        })
        .unwrap_err();
    assert_eq!(err.code(), "CO11");
}

#[test]
fn rejects_a_proxy_with_unknown_delegate() {
    let mut f = Fixture::with_delegate();
    let err = f
        .admin(CoreCall::DefineProxy {
            proxy: f.proxy,
            delegate_id: U256::from(2u64),
        })
        .unwrap_err();
    assert_eq!(err.code(), "CO10");
}

#[test]
fn administration_requires_an_operator() {
    let mut f = Fixture::new();
    let root = f.host.state_root();
    let err = f
        .host
        .transact(
            account(1),
            f.core,
            &CoreCall::DefineDelegate {
                id: U256::from(1u64),
                delegate: f.delegate,
            }
            .encode(),
        )
        .unwrap_err();
    let stranger = account(1);
    assert_eq!(err, Revert::NotOperator { account: stranger });
    assert_eq!(f.host.state_root(), root);
}

#[test]
fn reports_operators() {
    let mut f = Fixture::new();
    for (who, expected) in [(account(0), true), (account(1), false)] {
        let out = f
            .host
            .query(account(5), f.core, &CoreCall::IsOperator { account: who }.encode())
            .unwrap();
        assert_eq!(returns_bool(&out), expected);
    }
}

// ---------------------------------------------------------------------------
// Dispatch with an external identity registered as the proxy
// ---------------------------------------------------------------------------

fn with_fake_proxy() -> Fixture {
    let mut f = Fixture::with_delegate();
    f.define_proxy(account(0));
    f
}

#[test]
fn dispatches_unknown_selectors_to_the_delegate() {
    let mut f = with_fake_proxy();
    let payload = Encoder::call(&DELEGATE_MOCK_TX_SUCCESS).bool(true).finish();
    let receipt = f.host.transact(account(0), f.core, &payload).unwrap();
    assert!(returns_bool(&receipt.output));
}

#[test]
fn delegate_call_view_bool() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&DELEGATE_CALL_VIEW_BOOL_MOCK)
        .address(account(0))
        .bool(true)
        .finish();
    let out = f
        .host
        .query(account(0), f.core, &CoreCall::DelegateCallView { payload: request }.encode())
        .unwrap();
    assert!(returns_bool(&out));
}

#[test]
fn delegate_call_view_uint256() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&DELEGATE_CALL_VIEW_UINT256_MOCK)
        .address(account(0))
        .uint(42u64)
        .finish();
    let out = f
        .host
        .query(account(0), f.core, &CoreCall::DelegateCallView { payload: request }.encode())
        .unwrap();
    assert_eq!(returns_uint(&out), U256::from(42u64));
}

#[test]
fn delegate_call_view_bytes() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&DELEGATE_CALL_VIEW_BYTES_MOCK)
        .address(account(0))
        .bytes(&bytes32())
        .finish();
    let out = f
        .host
        .query(account(0), f.core, &CoreCall::DelegateCallView { payload: request }.encode())
        .unwrap();
    // offset, length, one data word
    assert_eq!(out.len(), 96);
    assert_eq!(&out[64..], &bytes32()[..]);
}

#[test]
fn delegate_call_view_string() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&DELEGATE_CALL_VIEW_STRING_MOCK)
        .address(account(0))
        .string(STRING)
        .finish();
    let out = f
        .host
        .query(account(0), f.core, &CoreCall::DelegateCallView { payload: request }.encode())
        .unwrap();
    assert_eq!(Decoder::returns(&out).string().unwrap(), STRING);
}

#[test]
fn delegate_call_view_resolves_argument_zero_for_external_readers() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    let request = Encoder::call(&DELEGATE_CALL_VIEW_UINT256_MOCK)
        .address(f.proxy)
        .uint(7u64)
        .finish();
    let out = f
        .host
        .query(account(9), f.core, &CoreCall::DelegateCallView { payload: request }.encode())
        .unwrap();
    assert_eq!(returns_uint(&out), U256::from(7u64));
}

#[test]
fn delegate_call_uint256() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&STATIC_CALL_UINT256_MOCK).uint(42u64).finish();
    let receipt = f
        .host
        .transact(account(0), f.core, &CoreCall::DelegateCall { payload: request }.encode())
        .unwrap();
    assert_eq!(returns_uint(&receipt.output), U256::from(42u64));
}

#[test]
fn delegate_call_bytes() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&STATIC_CALL_BYTES_MOCK).bytes(&bytes32()).finish();
    let receipt = f
        .host
        .transact(account(0), f.core, &CoreCall::DelegateCall { payload: request }.encode())
        .unwrap();
    assert_eq!(receipt.output.len(), 96);
    assert_eq!(Decoder::returns(&receipt.output).bytes().unwrap(), bytes32());
}

#[test]
fn delegate_call_string() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&STATIC_CALL_STRING_MOCK).string(STRING).finish();
    let receipt = f
        .host
        .transact(account(0), f.core, &CoreCall::DelegateCall { payload: request }.encode())
        .unwrap();
    assert_eq!(Decoder::returns(&receipt.output).string().unwrap(), STRING);
}

#[test]
fn delegate_call_requires_a_registered_caller() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&STATIC_CALL_UINT256_MOCK).uint(42u64).finish();
    let err = f
        .host
        .transact(account(1), f.core, &CoreCall::DelegateCall { payload: request }.encode())
        .unwrap_err();
    assert_eq!(err.code(), "CO12");
}

#[test]
fn delegate_failures_propagate_unchanged() {
    let mut f = with_fake_proxy();
    let request = Encoder::call(&STATIC_CALL_UINT256_MOCK).uint(0u64).finish();
    let err = f
        .host
        .transact(account(0), f.core, &CoreCall::DelegateCall { payload: request }.encode())
        .unwrap_err();
    assert_eq!(err, Revert::domain("DM12", "value must not be zero"));
}

#[test]
fn cleared_delegate_stops_dispatch() {
    let mut f = with_fake_proxy();
    f.admin(CoreCall::DefineDelegate {
        id: U256::from(1u64),
        delegate: Address::ZERO,
    })
    .unwrap();
    let payload = Encoder::call(&DELEGATE_MOCK_TX_SUCCESS).bool(true).finish();
    let err = f.host.transact(account(0), f.core, &payload).unwrap_err();
    assert_eq!(err.code(), "CO10");
}

// ---------------------------------------------------------------------------
// Read-only dispatch
// ---------------------------------------------------------------------------

#[test]
fn delegate_call_view_never_persists() {
    let mut f = with_fake_proxy();
    let increment = Encoder::call(&INCREMENT_MOCK).address(account(0)).finish();
    let root = f.host.state_root();

    let receipt = f
        .host
        .transact(
            account(0),
            f.core,
            &CoreCall::DelegateCallView {
                payload: increment.clone(),
            }
            .encode(),
        )
        .unwrap();
    // the write was visible to the delegate while it ran
    assert_eq!(returns_uint(&receipt.output), U256::from(1u64));
    assert_eq!(f.host.state_root(), root);

    f.host.transact(account(0), f.core, &increment).unwrap();
    assert_ne!(f.host.state_root(), root);
}

#[test]
fn upgrading_a_delegate_keeps_instance_data() {
    let mut f = with_fake_proxy();
    let increment = Encoder::call(&INCREMENT_MOCK).address(account(0)).finish();
    f.host.transact(account(0), f.core, &increment).unwrap();
    f.host.transact(account(0), f.core, &increment).unwrap();

    let upgraded = f.host.deploy_delegate(DelegateMock::new());
    f.admin(CoreCall::DefineDelegate {
        id: U256::from(1u64),
        delegate: upgraded,
    })
    .unwrap();

    let counter = Encoder::call(&COUNTER_MOCK).address(account(0)).finish();
    let out = f.host.query(account(0), f.core, &counter).unwrap();
    assert_eq!(returns_uint(&out), U256::from(2u64));
}

// ---------------------------------------------------------------------------
// Proxy lifecycle
// ---------------------------------------------------------------------------

#[test]
fn migrates_a_proxy() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    let receipt = f
        .admin(CoreCall::MigrateProxy {
            proxy: f.proxy,
            new_core: account(1),
        })
        .unwrap();
    assert!(returns_bool(&receipt.output));
    assert_eq!(f.proxy_core(), account(1));
    assert_eq!(
        receipt.events_from(f.proxy),
        vec![&Event::CoreUpdated { core: account(1) }]
    );
}

#[test]
fn old_core_loses_control_after_migration() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    f.admin(CoreCall::MigrateProxy {
        proxy: f.proxy,
        new_core: account(1),
    })
    .unwrap();

    let err = f
        .admin(CoreCall::MigrateProxy {
            proxy: f.proxy,
            new_core: f.core,
        })
        .unwrap_err();
    assert_eq!(err, Revert::NotCore { caller: f.core });
    assert_eq!(f.proxy_core(), account(1));
}

#[test]
fn rejects_migrating_an_unknown_proxy() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    let err = f
        .admin(CoreCall::MigrateProxy {
            proxy: account(0),
            new_core: account(1),
        })
        .unwrap_err();
    assert_eq!(err.code(), "CO12");
}

#[test]
fn removes_a_proxy() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    let receipt = f.admin(CoreCall::RemoveProxy { proxy: f.proxy }).unwrap();
    assert!(returns_bool(&receipt.output));

    let payload = Encoder::call(&STATIC_CALL_UINT256_MOCK).uint(42u64).finish();
    let err = f.host.transact(account(3), f.proxy, &payload).unwrap_err();
    assert_eq!(err.code(), "CO12");
}

#[test]
fn rejects_removing_an_unknown_proxy() {
    let mut f = Fixture::with_delegate();
    f.define_proxy(f.proxy);
    let err = f.admin(CoreCall::RemoveProxy { proxy: account(1) }).unwrap_err();
    assert_eq!(err.code(), "CO12");
}
