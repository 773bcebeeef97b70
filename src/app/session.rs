//! The active signing identity for one user session.
//!
//! A session is either disconnected or connected to exactly one identity of its
//! pool. It is an explicit value owned by its caller, so several sessions can
//! coexist (one per test, one per server).

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::crypto::wallet::{SigningHandle, WalletPool};
use crate::error::WorkflowError;
use crate::infra::chain::ChainClient;

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionInfo {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Address>,
    /// Balance in ether; absent while disconnected or when the lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

#[derive(Clone)]
pub struct Session {
    pool: Arc<WalletPool>,
    chain: Arc<dyn ChainClient>,
    active: Option<usize>,
    balance: Option<U256>,
}

impl Session {
    pub fn new(pool: Arc<WalletPool>, chain: Arc<dyn ChainClient>) -> Self {
        Self {
            pool,
            chain,
            active: None,
            balance: None,
        }
    }

    pub fn wallets(&self) -> &WalletPool {
        &self.pool
    }

    /// Activates identity `index` and refreshes its balance.
    ///
    /// An index outside the pool is ignored and the session is left as it was.
    /// Returns whether the index was accepted.
    pub async fn connect(&mut self, index: usize) -> bool {
        let Some(identity) = self.pool.get(index) else {
            tracing::debug!(index, pool = self.pool.len(), "ignoring out-of-range wallet index");
            return false;
        };
        let address = identity.address();
        self.active = Some(index);
        self.balance = None;
        tracing::info!(index, %address, "wallet connected");
        self.refresh_balance().await;
        true
    }

    /// Same transition as [`Session::connect`].
    pub async fn switch_wallet(&mut self, index: usize) -> bool {
        let switched = self.connect(index).await;
        if switched {
            tracing::info!(index, "switched wallet");
        }
        switched
    }

    pub fn disconnect(&mut self) {
        if self.active.take().is_some() {
            tracing::info!("wallet disconnected");
        }
        self.balance = None;
    }

    /// Re-reads the active identity's balance. A failed lookup leaves it unknown.
    pub async fn refresh_balance(&mut self) {
        let Some(address) = self.active_address() else {
            return;
        };
        self.balance = match self.chain.balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                tracing::debug!(%address, error = %e, "balance lookup failed");
                None
            }
        };
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_address(&self) -> Option<Address> {
        self.active
            .and_then(|i| self.pool.get(i))
            .map(|identity| identity.address())
    }

    /// Cached balance in wei, `None` when unknown.
    pub fn balance(&self) -> Option<U256> {
        self.balance
    }

    pub fn signing_handle(&self) -> Option<SigningHandle> {
        self.active
            .and_then(|i| self.pool.get(i))
            .map(|identity| identity.signing_handle())
    }

    /// Personal-message signature by the active identity.
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, WorkflowError> {
        let handle = self.signing_handle().ok_or(WorkflowError::NotConnected)?;
        handle.sign_message(message)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            connected: self.is_connected(),
            wallet_index: self.active,
            address: self.active_address(),
            balance: self.balance.map(format_ether),
        }
    }
}
