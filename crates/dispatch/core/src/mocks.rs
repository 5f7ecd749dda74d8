//! Delegate logic for exercising the dispatch paths in tests.

use maple_dispatch_codec::{Address, Decoder, Encoder, Signature, Word, U256};
use maple_dispatch_host::{CallResult, Delegate, DelegateContext, Revert, Storage, StorageRead};

pub static DELEGATE_MOCK_TX_SUCCESS: Signature = Signature::new("delegateMockTxSuccess(bool)");
pub static DELEGATE_CALL_VIEW_BOOL_MOCK: Signature =
    Signature::new("delegateCallViewBoolMock(address,bool)");
pub static DELEGATE_CALL_VIEW_UINT256_MOCK: Signature =
    Signature::new("delegateCallViewUint256Mock(address,uint256)");
pub static DELEGATE_CALL_VIEW_BYTES_MOCK: Signature =
    Signature::new("delegateCallViewBytesMock(address,bytes)");
pub static DELEGATE_CALL_VIEW_STRING_MOCK: Signature =
    Signature::new("delegateCallViewStringMock(address,string)");
pub static STATIC_CALL_UINT256_MOCK: Signature = Signature::new("staticCallUint256Mock(uint256)");
pub static STATIC_CALL_BYTES_MOCK: Signature = Signature::new("staticCallBytesMock(bytes)");
pub static STATIC_CALL_STRING_MOCK: Signature = Signature::new("staticCallStringMock(string)");
pub static DELEGATE_CALL_UINT256_MOCK: Signature =
    Signature::new("delegateCallUint256Mock(uint256)");
pub static DELEGATE_CALL_STRING_MOCK: Signature = Signature::new("delegateCallStringMock(string)");
pub static INCREMENT_MOCK: Signature = Signature::new("incrementMock(address)");
pub static COUNTER_MOCK: Signature = Signature::new("counterMock(address)");

const COUNTER: &str = "mock.counter";

/// Mock delegate.
///
/// Echoes its arguments back through every return-data shape, fails with
/// DM12/DM14 on empty inputs to the static-call variants, and keeps one
/// per-proxy counter for observing writes.
#[derive(Debug, Default, Clone)]
pub struct DelegateMock;

impl DelegateMock {
    pub fn new() -> Self {
        Self
    }

    fn increment(ctx: &mut DelegateContext<'_, '_>, proxy: Address) -> CallResult {
        let key = [Word::from_address(proxy)];
        let next = ctx
            .storage_view()
            .get_u256(COUNTER, &key)
            .checked_add(U256::from(1u64))
            .ok_or_else(|| Revert::domain("DM01", "counter overflow"))?;
        ctx.storage().set_u256(COUNTER, &key, next)?;
        Ok(Encoder::returns().uint(next).finish())
    }
}

impl Delegate for DelegateMock {
    fn name(&self) -> &str {
        "DelegateMock"
    }

    fn execute(&self, ctx: &mut DelegateContext<'_, '_>, input: &[u8]) -> CallResult {
        let (selector, mut args) = Decoder::call(input)?;

        if DELEGATE_MOCK_TX_SUCCESS.matches(selector) {
            Ok(Encoder::returns().bool(args.bool()?).finish())
        } else if DELEGATE_CALL_VIEW_BOOL_MOCK.matches(selector) {
            args.address()?;
            Ok(Encoder::returns().bool(args.bool()?).finish())
        } else if DELEGATE_CALL_VIEW_UINT256_MOCK.matches(selector) {
            args.address()?;
            Ok(Encoder::returns().uint(args.uint()?).finish())
        } else if DELEGATE_CALL_VIEW_BYTES_MOCK.matches(selector) {
            args.address()?;
            Ok(Encoder::returns().bytes(&args.bytes()?).finish())
        } else if DELEGATE_CALL_VIEW_STRING_MOCK.matches(selector) {
            args.address()?;
            Ok(Encoder::returns().string(&args.string()?).finish())
        } else if STATIC_CALL_UINT256_MOCK.matches(selector) {
            let value = args.uint()?;
            if value.is_zero() {
                return Err(Revert::domain("DM12", "value must not be zero"));
            }
            Ok(Encoder::returns().uint(value).finish())
        } else if STATIC_CALL_BYTES_MOCK.matches(selector) {
            Ok(Encoder::returns().bytes(&args.bytes()?).finish())
        } else if STATIC_CALL_STRING_MOCK.matches(selector) {
            let value = args.string()?;
            if value.is_empty() {
                return Err(Revert::domain("DM14", "string must not be empty"));
            }
            Ok(Encoder::returns().string(&value).finish())
        } else if DELEGATE_CALL_UINT256_MOCK.matches(selector) {
            Ok(Encoder::returns().uint(args.uint()?).finish())
        } else if DELEGATE_CALL_STRING_MOCK.matches(selector) {
            Ok(Encoder::returns().string(&args.string()?).finish())
        } else if INCREMENT_MOCK.matches(selector) {
            let proxy = args.address()?;
            Self::increment(ctx, proxy)
        } else if COUNTER_MOCK.matches(selector) {
            let proxy = args.address()?;
            let value = ctx.storage_view().get_u256(COUNTER, &[Word::from_address(proxy)]);
            Ok(Encoder::returns().uint(value).finish())
        } else {
            Err(Revert::UnknownSelector { selector })
        }
    }
}
