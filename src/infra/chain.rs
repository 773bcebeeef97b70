use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::RegistryError;

/// Read-only view of the chain used for cosmetic and connectivity checks.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance in wei.
    async fn balance(&self, address: Address) -> Result<U256, RegistryError>;

    async fn chain_id(&self) -> Result<u64, RegistryError>;

    async fn block_number(&self) -> Result<u64, RegistryError>;

    /// Whether any contract code is deployed at `address`.
    async fn has_code(&self, address: Address) -> Result<bool, RegistryError>;
}
