//! In-process chain + registry with the same observable behavior as the deployed
//! contract: first store wins, reads of absent hashes revert, writes emit events.
//!
//! Used by the test-suite and by the binaries' `--offline` mode. Failure
//! injection hooks let tests exercise the remote-error paths.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::crypto::wallet::SigningHandle;
use crate::domain::document::{DocumentEvent, DocumentRecord, StoreReceipt, StoreRequest};
use crate::domain::registry::DocumentRegistry;
use crate::error::RegistryError;
use crate::infra::chain::ChainClient;

/// 10 000 ether, what a dev node funds each default account with.
pub fn default_balance() -> U256 {
    U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64))
}

pub const MEMORY_CHAIN_ID: u64 = 31337;

#[derive(Default)]
struct MemoryState {
    documents: HashMap<B256, DocumentRecord>,
    order: Vec<B256>,
    events: Vec<DocumentEvent>,
    block_number: u64,
    balances: HashMap<Address, U256>,
    offline: bool,
    fail_balance: bool,
    fail_stores: bool,
    broken_hashes: HashSet<B256>,
}

pub struct MemoryChain {
    state: Mutex<MemoryState>,
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(state: &MemoryState) -> Result<(), RegistryError> {
        if state.offline {
            return Err(RegistryError::RemoteCall("connection refused".to_string()));
        }
        Ok(())
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> Vec<DocumentEvent> {
        self.lock().events.clone()
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.lock().balances.insert(address, balance);
    }

    /// Makes every call fail as if the endpoint were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn fail_balance_lookups(&self, fail: bool) {
        self.lock().fail_balance = fail;
    }

    /// Makes `store` revert without touching state.
    pub fn fail_stores(&self, fail: bool) {
        self.lock().fail_stores = fail;
    }

    /// Makes `get_info` for `hash` fail with a remote error.
    pub fn break_lookup(&self, hash: B256) {
        self.lock().broken_hashes.insert(hash);
    }
}

#[async_trait]
impl ChainClient for MemoryChain {
    async fn balance(&self, address: Address) -> Result<U256, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        if state.fail_balance {
            return Err(RegistryError::RemoteCall("eth_getBalance failed".to_string()));
        }
        Ok(state
            .balances
            .get(&address)
            .copied()
            .unwrap_or_else(default_balance))
    }

    async fn chain_id(&self) -> Result<u64, RegistryError> {
        Self::check_online(&self.lock())?;
        Ok(MEMORY_CHAIN_ID)
    }

    async fn block_number(&self) -> Result<u64, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.block_number)
    }

    async fn has_code(&self, _address: Address) -> Result<bool, RegistryError> {
        Self::check_online(&self.lock())?;
        Ok(true)
    }
}

#[async_trait]
impl DocumentRegistry for MemoryChain {
    async fn store(
        &self,
        handle: &SigningHandle,
        request: &StoreRequest,
    ) -> Result<StoreReceipt, RegistryError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        if state.fail_stores {
            return Err(RegistryError::RemoteCall(
                "execution reverted: store disabled".to_string(),
            ));
        }
        if request.hash == B256::ZERO {
            return Err(RegistryError::RemoteCall(
                "execution reverted: Invalid hash".to_string(),
            ));
        }
        if state.documents.contains_key(&request.hash) {
            return Err(RegistryError::RemoteCall(
                "execution reverted: Document already stored".to_string(),
            ));
        }

        let record = DocumentRecord {
            hash: request.hash,
            timestamp: request.timestamp,
            signer: request.signer,
            signature: request.signature.clone(),
        };
        state.documents.insert(request.hash, record);
        state.order.push(request.hash);
        state.events.push(DocumentEvent::DocumentStored {
            hash: request.hash,
            signer: request.signer,
            timestamp: request.timestamp,
            signature: request.signature.clone(),
        });
        state.block_number += 1;

        let mut preimage = Vec::with_capacity(32 + 20 + 8);
        preimage.extend_from_slice(request.hash.as_slice());
        preimage.extend_from_slice(handle.address().as_slice());
        preimage.extend_from_slice(&state.block_number.to_be_bytes());

        Ok(StoreReceipt {
            transaction_hash: keccak256(&preimage),
            block_number: state.block_number,
        })
    }

    async fn verify_document(
        &self,
        _handle: &SigningHandle,
        hash: B256,
        signer: Address,
        signature: &Bytes,
    ) -> Result<bool, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        // Simulated call: the DocumentVerified event is not persisted.
        Ok(state
            .documents
            .get(&hash)
            .map(|doc| doc.signer == signer && &doc.signature == signature)
            .unwrap_or(false))
    }

    async fn get_info(&self, hash: B256) -> Result<DocumentRecord, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        if state.broken_hashes.contains(&hash) {
            return Err(RegistryError::RemoteCall(format!(
                "eth_call failed for {hash}"
            )));
        }
        state
            .documents
            .get(&hash)
            .cloned()
            .ok_or(RegistryError::NotFound(hash))
    }

    async fn get_signature(&self, hash: B256) -> Result<Bytes, RegistryError> {
        self.get_info(hash).await.map(|doc| doc.signature)
    }

    async fn is_stored(&self, hash: B256) -> Result<bool, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.documents.contains_key(&hash))
    }

    async fn count(&self) -> Result<u64, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.order.len() as u64)
    }

    async fn hash_at_index(&self, index: u64) -> Result<B256, RegistryError> {
        let state = self.lock();
        Self::check_online(&state)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| state.order.get(i).copied())
            .ok_or_else(|| {
                RegistryError::RemoteCall("execution reverted: Index out of bounds".to_string())
            })
    }
}
