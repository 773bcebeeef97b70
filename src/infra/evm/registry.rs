// Responsible for all communication with the registry contract.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::ProviderBuilder;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;

use crate::crypto::wallet::SigningHandle;
use crate::domain::document::{DocumentRecord, StoreReceipt, StoreRequest};
use crate::domain::registry::DocumentRegistry;
use crate::error::RegistryError;
use crate::infra::evm::bindings::DocumentRegistry as RegistryContract;

/// Registry contract reached over JSON-RPC.
#[derive(Debug, Clone)]
pub struct EvmDocumentRegistry {
    rpc_url: String,
    contract_address: Address,
}

impl EvmDocumentRegistry {
    pub fn new(rpc_url: impl Into<String>, contract_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address,
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    fn url(&self) -> Result<Url, RegistryError> {
        self.rpc_url.parse().map_err(RegistryError::remote)
    }
}

fn to_record(document: RegistryContract::Document) -> Result<DocumentRecord, RegistryError> {
    let timestamp = u64::try_from(document.timestamp)
        .map_err(|_| RegistryError::RemoteCall("timestamp does not fit in u64".to_string()))?;
    Ok(DocumentRecord {
        hash: document.hash,
        timestamp,
        signer: document.signer,
        signature: document.signature,
    })
}

#[async_trait]
impl DocumentRegistry for EvmDocumentRegistry {
    async fn store(
        &self,
        handle: &SigningHandle,
        request: &StoreRequest,
    ) -> Result<StoreReceipt, RegistryError> {
        let wallet = EthereumWallet::from(handle.signer().clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);

        let pending = contract
            .storeDocumentHash(
                request.hash,
                U256::from(request.timestamp),
                request.signature.clone(),
                request.signer,
            )
            .send()
            .await
            .map_err(RegistryError::remote)?;
        tracing::info!(
            tx = %pending.tx_hash(),
            hash = %request.hash,
            from = %handle.address(),
            "store transaction sent"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(RegistryError::remote)?;
        if !receipt.status() {
            return Err(RegistryError::RemoteCall(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        let block_number = receipt.block_number.unwrap_or_default();
        tracing::info!(tx = %receipt.transaction_hash, block = block_number, "document stored");

        Ok(StoreReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number,
        })
    }

    async fn verify_document(
        &self,
        handle: &SigningHandle,
        hash: B256,
        signer: Address,
        signature: &Bytes,
    ) -> Result<bool, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        let result = contract
            .verifyDocument(hash, signer, signature.clone())
            .from(handle.address())
            .call()
            .await
            .map_err(RegistryError::remote)?;
        Ok(result.isValid)
    }

    async fn get_info(&self, hash: B256) -> Result<DocumentRecord, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        match contract.getDocumentInfo(hash).call().await {
            Ok(result) => {
                let record = to_record(result.document)?;
                // An unset mapping slot decodes as all zeroes.
                if record.signer == Address::ZERO && record.timestamp == 0 {
                    return Err(RegistryError::NotFound(hash));
                }
                Ok(record)
            }
            Err(e) => {
                if !self.is_stored(hash).await? {
                    return Err(RegistryError::NotFound(hash));
                }
                Err(RegistryError::remote(e))
            }
        }
    }

    async fn get_signature(&self, hash: B256) -> Result<Bytes, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        let result = contract
            .getDocumentSignature(hash)
            .call()
            .await
            .map_err(RegistryError::remote)?;
        Ok(result.signature)
    }

    async fn is_stored(&self, hash: B256) -> Result<bool, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        let result = contract
            .isDocumentStored(hash)
            .call()
            .await
            .map_err(RegistryError::remote)?;
        Ok(result.exists)
    }

    async fn count(&self) -> Result<u64, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        let result = contract
            .getDocumentCount()
            .call()
            .await
            .map_err(RegistryError::remote)?;
        u64::try_from(result.count)
            .map_err(|_| RegistryError::RemoteCall("document count does not fit in u64".to_string()))
    }

    async fn hash_at_index(&self, index: u64) -> Result<B256, RegistryError> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let contract = RegistryContract::new(self.contract_address, provider);
        let result = contract
            .getDocumentHashByIndex(U256::from(index))
            .call()
            .await
            .map_err(RegistryError::remote)?;
        Ok(result.hash)
    }
}
