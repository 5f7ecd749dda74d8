//! Call frames.

use std::collections::BTreeMap;

use maple_dispatch_codec::{Address, Decoder, Encoder, Selector};
use tracing::{debug, warn};

use crate::config::{HostConfig, ViewEnforcement};
use crate::contract::Code;
use crate::delegate::{Delegate, DelegateContext, CHECK_CONFIGURATIONS};
use crate::error::{CallResult, HostResult, Revert};
use crate::log::{Event, Log};
use crate::state::{Namespace, ScopedStorage, StorageView, WorldState};

/// Deployed code, by address.
pub type CodeRegistry = BTreeMap<Address, Code>;

/// Identity and mode of one executing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Account whose storage the frame runs against.
    pub this: Address,
    /// Immediate caller.
    pub caller: Address,
    /// Identity on whose behalf the call is made. Equal to `caller` except
    /// across a forward, where the forwarding account vouches for its own
    /// immediate caller.
    pub sender: Address,
    pub is_static: bool,
    pub depth: usize,
}

impl Frame {
    /// The frame of an external identity submitting a call.
    pub fn origin(account: Address, is_static: bool) -> Self {
        Self {
            this: account,
            caller: account,
            sender: account,
            is_static,
            depth: 0,
        }
    }

    fn child(&self, to: Address, sender: Address, is_static: bool) -> Self {
        Self {
            this: to,
            caller: self.this,
            sender,
            is_static: self.is_static || is_static,
            depth: self.depth + 1,
        }
    }
}

/// Execution context handed to contract code.
pub struct CallContext<'h> {
    code: &'h CodeRegistry,
    state: &'h mut WorldState,
    config: &'h HostConfig,
    frame: Frame,
}

impl<'h> CallContext<'h> {
    pub(crate) fn new(
        code: &'h CodeRegistry,
        state: &'h mut WorldState,
        config: &'h HostConfig,
        frame: Frame,
    ) -> Self {
        Self {
            code,
            state,
            config,
            frame,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn this(&self) -> Address {
        self.frame.this
    }

    pub fn caller(&self) -> Address {
        self.frame.caller
    }

    pub fn sender(&self) -> Address {
        self.frame.sender
    }

    pub fn is_static(&self) -> bool {
        self.frame.is_static
    }

    /// Whether `account` holds delegate logic.
    pub fn is_delegate(&self, account: Address) -> bool {
        self.code.get(&account).is_some_and(Code::is_delegate)
    }

    pub fn has_code(&self, account: Address) -> bool {
        self.code.contains_key(&account)
    }

    fn writable(&self) -> bool {
        !(self.frame.is_static && self.config.view_enforcement == ViewEnforcement::Strict)
    }

    /// The executing account's own contract storage.
    pub fn storage(&mut self) -> ScopedStorage<'_> {
        self.scoped(Namespace::Contract)
    }

    pub fn storage_view(&self) -> StorageView<'_> {
        self.view(Namespace::Contract)
    }

    pub(crate) fn scoped(&mut self, namespace: Namespace) -> ScopedStorage<'_> {
        let writable = self.writable();
        ScopedStorage::new(&mut *self.state, self.frame.this, namespace, writable)
    }

    pub(crate) fn view(&self, namespace: Namespace) -> StorageView<'_> {
        StorageView::new(&*self.state, self.frame.this, namespace)
    }

    /// Record an event emitted by the executing account.
    pub fn emit(&mut self, event: Event) -> HostResult<()> {
        if !self.writable() {
            return Err(Revert::StaticWrite);
        }
        self.state.emit(Log {
            emitter: self.frame.this,
            event,
        });
        Ok(())
    }

    /// Call `to` as the executing account.
    pub fn call(&mut self, to: Address, input: &[u8]) -> CallResult {
        let frame = self.frame.child(to, self.frame.this, false);
        self.invoke(frame, input)
    }

    /// Read-only call to `to` as the executing account.
    pub fn static_call(&mut self, to: Address, input: &[u8]) -> CallResult {
        let frame = self.frame.child(to, self.frame.this, true);
        self.invoke(frame, input)
    }

    /// Relay `input` to `to` on behalf of the immediate caller.
    ///
    /// Only the caller is vouched for. A sender this frame was itself handed
    /// is not passed on, so a chain of forwards never lets an account act
    /// for someone further up the stack.
    pub fn forward(&mut self, to: Address, input: &[u8]) -> CallResult {
        let frame = self.frame.child(to, self.frame.caller, false);
        self.invoke(frame, input)
    }

    /// Execute the logic at `delegate` against the executing account's
    /// storage on behalf of `proxy`. The caller is kept and the logic sees
    /// `sender` as the identity it acts for.
    ///
    /// With `read_only` set the frame is static: nothing it does survives
    /// its return.
    pub fn delegate_call(
        &mut self,
        delegate: Address,
        proxy: Address,
        sender: Address,
        input: &[u8],
        read_only: bool,
    ) -> CallResult {
        let code = self.code;
        let Some(Code::Delegate(logic)) = code.get(&delegate) else {
            return Err(Revert::NoCode { address: delegate });
        };
        let frame = Frame {
            sender,
            depth: self.frame.depth + 1,
            is_static: self.frame.is_static || read_only,
            ..self.frame
        };
        self.check_depth(&frame)?;
        debug!(
            core = %frame.this,
            delegate = %delegate,
            proxy = %proxy,
            logic = logic.name(),
            caller = %frame.caller,
            sender = %frame.sender,
            is_static = frame.is_static,
            depth = frame.depth,
            "Executing delegate"
        );

        let checkpoint = self.state.checkpoint();
        let mut child = CallContext::new(code, &mut *self.state, self.config, frame);
        let result = logic.execute(&mut DelegateContext::new(&mut child, delegate, proxy), input);
        if result.is_err() || frame.is_static {
            self.state.revert_to(checkpoint);
        }
        result
    }

    fn check_depth(&self, frame: &Frame) -> HostResult<()> {
        if frame.depth > self.config.max_call_depth {
            warn!(
                this = %frame.this,
                depth = frame.depth,
                max = self.config.max_call_depth,
                "Call depth exceeded"
            );
            return Err(Revert::DepthExceeded {
                max: self.config.max_call_depth,
            });
        }
        Ok(())
    }

    fn invoke(&mut self, frame: Frame, input: &[u8]) -> CallResult {
        self.check_depth(&frame)?;
        let code = self.code;
        match code.get(&frame.this) {
            None => Err(Revert::NoCode {
                address: frame.this,
            }),
            Some(Code::Delegate(logic)) => answer_direct_call(&**logic, frame.this, input),
            Some(Code::Contract(contract)) => {
                debug!(
                    this = %frame.this,
                    contract = contract.name(),
                    caller = %frame.caller,
                    sender = %frame.sender,
                    is_static = frame.is_static,
                    depth = frame.depth,
                    "Entering frame"
                );
                let checkpoint = self.state.checkpoint();
                let mut child = CallContext::new(code, &mut *self.state, self.config, frame);
                let result = contract.call(&mut child, input);
                if result.is_err() || frame.is_static {
                    self.state.revert_to(checkpoint);
                }
                result
            }
        }
    }
}

/// Delegate logic only runs inside a core. Called directly it answers the
/// configuration check and nothing else.
fn answer_direct_call(logic: &dyn Delegate, address: Address, input: &[u8]) -> CallResult {
    match Selector::from_payload(input) {
        Ok(selector) if CHECK_CONFIGURATIONS.matches(selector) => {
            let mut args = Decoder::arguments(input)?;
            let configurations = args.uint_array()?;
            let valid = logic.check_configurations(&configurations);
            Ok(Encoder::returns().bool(valid).finish())
        }
        _ => Err(Revert::DelegateOutsideCore { delegate: address }),
    }
}
