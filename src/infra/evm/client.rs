// Responsible for the plain JSON-RPC reads (balances, chain id, code).

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;

use crate::error::RegistryError;
use crate::infra::chain::ChainClient;

/// JSON-RPC chain client. A provider is built per call; timeouts are the
/// HTTP client's defaults.
#[derive(Debug, Clone)]
pub struct EvmRpcClient {
    rpc_url: String,
}

impl EvmRpcClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn url(&self) -> Result<Url, RegistryError> {
        self.rpc_url.parse().map_err(RegistryError::remote)
    }
}

#[async_trait]
impl ChainClient for EvmRpcClient {
    async fn balance(&self, address: Address) -> Result<U256, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        provider
            .get_balance(address)
            .await
            .map_err(RegistryError::remote)
    }

    async fn chain_id(&self) -> Result<u64, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        provider.get_chain_id().await.map_err(RegistryError::remote)
    }

    async fn block_number(&self) -> Result<u64, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        provider
            .get_block_number()
            .await
            .map_err(RegistryError::remote)
    }

    async fn has_code(&self, address: Address) -> Result<bool, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let code = provider
            .get_code_at(address)
            .await
            .map_err(RegistryError::remote)?;
        Ok(!code.is_empty())
    }
}
