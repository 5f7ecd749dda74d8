//! World state: per-account word storage with a write journal.
//!
//! Every write records the previous value of its slot. A frame takes a
//! [`Checkpoint`] on entry and rolls back to it on failure, which is what
//! makes each call all-or-nothing.

use std::collections::BTreeMap;

use maple_dispatch_codec::{Address, CodecError, Word, U256, WORD_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{HostResult, Revert};
use crate::log::Log;

/// Which part of an account's storage a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Data owned by the account's own code: registries, access records,
    /// a proxy's core reference.
    Contract,
    /// Data written by delegate logic executing for the account.
    Delegated,
}

impl Namespace {
    fn tag(self) -> &'static [u8] {
        match self {
            Namespace::Contract => b"maple.dispatch.contract",
            Namespace::Delegated => b"maple.dispatch.delegated",
        }
    }
}

/// A 32-byte storage slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(pub Word);

impl StorageKey {
    /// Derive a slot key from a namespace, a label and key words.
    ///
    /// Labels and keys are length-framed before hashing, so distinct
    /// `(label, keys)` pairs never collide on framing.
    pub fn derive(namespace: Namespace, label: &str, keys: &[Word]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(namespace.tag());
        hasher.update(&(label.len() as u64).to_be_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&(keys.len() as u64).to_be_bytes());
        for key in keys {
            hasher.update(key.as_bytes());
        }
        Self(Word(*hasher.finalize().as_bytes()))
    }
}

#[derive(Debug, Clone)]
struct JournalEntry {
    account: Address,
    key: StorageKey,
    previous: Option<Word>,
}

/// Position in the journal and log buffer to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    journal: usize,
    logs: usize,
}

#[derive(Debug, Default)]
pub struct WorldState {
    accounts: BTreeMap<Address, BTreeMap<StorageKey, Word>>,
    journal: Vec<JournalEntry>,
    logs: Vec<Log>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot. Unwritten slots read as zero.
    pub fn load(&self, account: Address, key: StorageKey) -> Word {
        self.accounts
            .get(&account)
            .and_then(|slots| slots.get(&key))
            .copied()
            .unwrap_or(Word::ZERO)
    }

    /// Write a slot. Writing zero clears it.
    pub fn store(&mut self, account: Address, key: StorageKey, value: Word) {
        let slots = self.accounts.entry(account).or_default();
        let previous = if value.is_zero() {
            slots.remove(&key)
        } else {
            slots.insert(key, value)
        };
        if slots.is_empty() {
            self.accounts.remove(&account);
        }
        if previous.unwrap_or(Word::ZERO) != value {
            self.journal.push(JournalEntry {
                account,
                key,
                previous,
            });
        }
    }

    pub fn emit(&mut self, log: Log) {
        self.logs.push(log);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            journal: self.journal.len(),
            logs: self.logs.len(),
        }
    }

    /// Undo every write and drop every log recorded after `checkpoint`.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.journal {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            let slots = self.accounts.entry(entry.account).or_default();
            match entry.previous {
                Some(value) => {
                    slots.insert(entry.key, value);
                }
                None => {
                    slots.remove(&entry.key);
                }
            }
            if slots.is_empty() {
                self.accounts.remove(&entry.account);
            }
        }
        self.logs.truncate(checkpoint.logs);
    }

    /// Make all journaled writes permanent and hand back the pending logs.
    pub fn commit(&mut self) -> Vec<Log> {
        self.journal.clear();
        std::mem::take(&mut self.logs)
    }

    pub fn pending_logs(&self) -> &[Log] {
        &self.logs
    }

    /// Number of non-zero slots held by `account`.
    pub fn slot_count(&self, account: Address) -> usize {
        self.accounts.get(&account).map_or(0, BTreeMap::len)
    }

    /// Digest over every non-zero slot of every account.
    ///
    /// Two states with equal roots hold exactly the same data.
    pub fn state_root(&self) -> Word {
        let mut hasher = blake3::Hasher::new();
        for (account, slots) in &self.accounts {
            hasher.update(account.as_bytes());
            hasher.update(&(slots.len() as u64).to_be_bytes());
            for (key, value) in slots {
                hasher.update(key.0.as_bytes());
                hasher.update(value.as_bytes());
            }
        }
        Word(*hasher.finalize().as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Storage capability
// ---------------------------------------------------------------------------

/// Read access to one namespace of one account.
///
/// Slots are addressed by `(label, keys)`; the implementation supplies the
/// account and namespace. The typed getters define the on-slot layout of
/// each value kind.
pub trait StorageRead {
    fn load_slot(&self, label: &str, keys: &[Word]) -> Word;

    fn get_word(&self, label: &str, keys: &[Word]) -> Word {
        self.load_slot(label, keys)
    }

    fn get_u256(&self, label: &str, keys: &[Word]) -> U256 {
        U256::from(self.load_slot(label, keys))
    }

    fn get_address(&self, label: &str, keys: &[Word]) -> HostResult<Address> {
        Ok(self.load_slot(label, keys).to_address()?)
    }

    fn get_bool(&self, label: &str, keys: &[Word]) -> HostResult<bool> {
        Ok(self.load_slot(label, keys).to_bool()?)
    }

    /// Byte strings use a length slot followed by one slot per 32-byte chunk.
    fn get_bytes(&self, label: &str, keys: &[Word]) -> HostResult<Vec<u8>> {
        let len = self
            .get_u256(label, keys)
            .as_usize()
            .ok_or(CodecError::invalid("bytes length"))?;
        let mut out = Vec::with_capacity(len);
        let mut chunk_keys = keys.to_vec();
        chunk_keys.push(Word::ZERO);
        let last = chunk_keys.len() - 1;
        for index in 0..len.div_ceil(WORD_SIZE) {
            chunk_keys[last] = Word::from(U256::from(index as u64));
            let chunk = self.load_slot(&chunk_label(label), &chunk_keys);
            let take = (len - index * WORD_SIZE).min(WORD_SIZE);
            out.extend_from_slice(&chunk.0[..take]);
        }
        Ok(out)
    }

    fn get_string(&self, label: &str, keys: &[Word]) -> HostResult<String> {
        String::from_utf8(self.get_bytes(label, keys)?).map_err(|_| {
            Revert::from(CodecError::invalid("string"))
        })
    }
}

/// Read-write access to one namespace of one account.
pub trait Storage: StorageRead {
    fn store_slot(&mut self, label: &str, keys: &[Word], value: Word) -> HostResult<()>;

    fn set_word(&mut self, label: &str, keys: &[Word], value: Word) -> HostResult<()> {
        self.store_slot(label, keys, value)
    }

    fn set_u256(&mut self, label: &str, keys: &[Word], value: U256) -> HostResult<()> {
        self.store_slot(label, keys, Word::from(value))
    }

    fn set_address(&mut self, label: &str, keys: &[Word], value: Address) -> HostResult<()> {
        self.store_slot(label, keys, Word::from_address(value))
    }

    fn set_bool(&mut self, label: &str, keys: &[Word], value: bool) -> HostResult<()> {
        self.store_slot(label, keys, Word::from_bool(value))
    }

    fn set_bytes(&mut self, label: &str, keys: &[Word], value: &[u8]) -> HostResult<()> {
        let previous_len = self.get_u256(label, keys).as_usize().unwrap_or(0);
        self.set_u256(label, keys, U256::from(value.len() as u64))?;

        let mut chunk_keys = keys.to_vec();
        chunk_keys.push(Word::ZERO);
        let last = chunk_keys.len() - 1;
        let chunks = value.len().div_ceil(WORD_SIZE);
        for index in 0..chunks.max(previous_len.div_ceil(WORD_SIZE)) {
            chunk_keys[last] = Word::from(U256::from(index as u64));
            let mut chunk = Word::ZERO;
            if let Some(part) = value.chunks(WORD_SIZE).nth(index) {
                chunk.0[..part.len()].copy_from_slice(part);
            }
            self.store_slot(&chunk_label(label), &chunk_keys, chunk)?;
        }
        Ok(())
    }

    fn set_string(&mut self, label: &str, keys: &[Word], value: &str) -> HostResult<()> {
        self.set_bytes(label, keys, value.as_bytes())
    }
}

fn chunk_label(label: &str) -> String {
    format!("{label}#chunk")
}

/// Read-only view of one namespace of one account.
pub struct StorageView<'a> {
    state: &'a WorldState,
    account: Address,
    namespace: Namespace,
}

impl<'a> StorageView<'a> {
    pub fn new(state: &'a WorldState, account: Address, namespace: Namespace) -> Self {
        Self {
            state,
            account,
            namespace,
        }
    }
}

impl StorageRead for StorageView<'_> {
    fn load_slot(&self, label: &str, keys: &[Word]) -> Word {
        self.state
            .load(self.account, StorageKey::derive(self.namespace, label, keys))
    }
}

/// Journaled read-write access to one namespace of one account.
///
/// Handed to contract code for its own account and to delegate logic for
/// the core it executes in. When `writable` is false every write fails with
/// HS01.
pub struct ScopedStorage<'a> {
    state: &'a mut WorldState,
    account: Address,
    namespace: Namespace,
    writable: bool,
}

impl<'a> ScopedStorage<'a> {
    pub fn new(
        state: &'a mut WorldState,
        account: Address,
        namespace: Namespace,
        writable: bool,
    ) -> Self {
        Self {
            state,
            account,
            namespace,
            writable,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }
}

impl StorageRead for ScopedStorage<'_> {
    fn load_slot(&self, label: &str, keys: &[Word]) -> Word {
        self.state
            .load(self.account, StorageKey::derive(self.namespace, label, keys))
    }
}

impl Storage for ScopedStorage<'_> {
    fn store_slot(&mut self, label: &str, keys: &[Word], value: Word) -> HostResult<()> {
        if !self.writable {
            return Err(Revert::StaticWrite);
        }
        let key = StorageKey::derive(self.namespace, label, keys);
        self.state.store(self.account, key, value);
        Ok(())
    }
}
