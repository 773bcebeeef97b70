//! Typed access to the document registry.
//!
//! Each method is one or more round trips to the backend. The EVM binding lives in
//! `infra::evm`, an in-process implementation with the same observable behavior in
//! `infra::memory`.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::crypto::wallet::SigningHandle;
use crate::domain::document::{
    DocumentPage, DocumentRecord, IndexedRecord, PageFailure, StoreReceipt, StoreRequest,
};
use crate::error::RegistryError;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u64 = 100;

#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    /// Submits `storeDocumentHash` signed by `handle` and waits until it is mined.
    async fn store(
        &self,
        handle: &SigningHandle,
        request: &StoreRequest,
    ) -> Result<StoreReceipt, RegistryError>;

    /// Simulated `verifyDocument` call from `handle`'s address; no state change.
    async fn verify_document(
        &self,
        handle: &SigningHandle,
        hash: B256,
        signer: Address,
        signature: &Bytes,
    ) -> Result<bool, RegistryError>;

    /// Fails with `NotFound` when nothing is stored under `hash`.
    async fn get_info(&self, hash: B256) -> Result<DocumentRecord, RegistryError>;

    async fn get_signature(&self, hash: B256) -> Result<Bytes, RegistryError>;

    async fn is_stored(&self, hash: B256) -> Result<bool, RegistryError>;

    async fn count(&self) -> Result<u64, RegistryError>;

    /// `index` must be below `count()`; anything else is a remote failure.
    async fn hash_at_index(&self, index: u64) -> Result<B256, RegistryError>;

    /// Every record in store order, one lookup at a time. Aborts on the first failure.
    async fn list_all(&self) -> Result<Vec<DocumentRecord>, RegistryError> {
        let count = self.count().await?;
        let mut documents = Vec::new();
        for index in 0..count {
            let hash = self.hash_at_index(index).await?;
            documents.push(self.get_info(hash).await?);
        }
        Ok(documents)
    }

    /// Reads `[offset, offset + limit)` in store order.
    ///
    /// A failed item lookup is recorded in `failures`; records already fetched
    /// are kept. Only the initial `count()` can fail the whole page.
    async fn page(&self, offset: u64, limit: u64) -> Result<DocumentPage, RegistryError> {
        let total = self.count().await?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let end = offset.saturating_add(limit).min(total);

        let mut page = DocumentPage {
            offset,
            total,
            ..Default::default()
        };
        for index in offset..end {
            let record = match self.hash_at_index(index).await {
                Ok(hash) => self.get_info(hash).await,
                Err(e) => Err(e),
            };
            match record {
                Ok(record) => page.records.push(IndexedRecord { index, record }),
                Err(e) => {
                    tracing::warn!(index, error = %e, "registry lookup failed");
                    page.failures.push(PageFailure {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }
        page.next_offset = (end < total).then_some(end);
        Ok(page)
    }
}

/// Lazy, restartable walk over the registry one page at a time.
pub struct DocumentPages {
    registry: Arc<dyn DocumentRegistry>,
    limit: u64,
    next: Option<u64>,
}

impl DocumentPages {
    pub fn new(registry: Arc<dyn DocumentRegistry>, limit: u64) -> Self {
        Self {
            registry,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            next: Some(0),
        }
    }

    /// Fetches the next page, or `None` once the end was reached.
    ///
    /// On error the cursor does not advance, so calling again retries the same page.
    pub async fn next_page(&mut self) -> Option<Result<DocumentPage, RegistryError>> {
        let offset = self.next?;
        match self.registry.page(offset, self.limit).await {
            Ok(page) => {
                self.next = page.next_offset;
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }

    pub fn restart(&mut self) {
        self.next = Some(0);
    }

    /// Drains the remaining pages into one list of records, collecting failures.
    pub async fn collect_all(
        &mut self,
    ) -> Result<(Vec<IndexedRecord>, Vec<PageFailure>), RegistryError> {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        while let Some(page) = self.next_page().await {
            let page = page?;
            records.extend(page.records);
            failures.extend(page.failures);
        }
        Ok((records, failures))
    }
}
