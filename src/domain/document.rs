//! Registry record and the values derived from it.

use alloy::primitives::{Address, Bytes, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored attestation. Owned by the registry contract, immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentRecord {
    #[schema(value_type = String)]
    pub hash: B256,
    /// Seconds since epoch, as supplied by the caller at store time.
    pub timestamp: u64,
    #[schema(value_type = String)]
    pub signer: Address,
    #[schema(value_type = String)]
    pub signature: Bytes,
}

impl DocumentRecord {
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Arguments of a `storeDocumentHash` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    pub hash: B256,
    pub timestamp: u64,
    pub signature: Bytes,
    pub signer: Address,
}

/// Confirmation that a store transaction was mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoreReceipt {
    #[schema(value_type = String)]
    pub transaction_hash: B256,
    pub block_number: u64,
}

/// Outcome of one verify action. Recomputed on every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationResult {
    #[schema(value_type = String)]
    pub hash: B256,
    pub queried_signer: String,
    pub document_found: bool,
    /// Found AND the stored signer equals the queried signer (case-insensitive).
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub stored_signer: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_timestamp: Option<u64>,
    /// Address recovered from the stored signature, when recovery was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub recovered_signer: Option<Address>,
    /// Recovered signer equals the stored signer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_matches: Option<bool>,
}

impl VerificationResult {
    pub fn not_found(hash: B256, queried_signer: impl Into<String>) -> Self {
        Self {
            hash,
            queried_signer: queried_signer.into(),
            document_found: false,
            is_valid: false,
            stored_signer: None,
            stored_timestamp: None,
            recovered_signer: None,
            signature_matches: None,
        }
    }
}

/// Events declared by the registry contract.
///
/// Only `DocumentStored` ever lands in a log: `verifyDocument` is issued as a
/// simulated call, so `DocumentVerified` is declared in the ABI but never mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum DocumentEvent {
    DocumentStored {
        hash: B256,
        signer: Address,
        timestamp: u64,
        signature: Bytes,
    },
    DocumentVerified {
        hash: B256,
        signer: Address,
        is_valid: bool,
    },
}

/// A record together with its position in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexedRecord {
    pub index: u64,
    pub record: DocumentRecord,
}

/// A lookup that failed while materializing a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageFailure {
    pub index: u64,
    pub error: String,
}

/// One window of the registry in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DocumentPage {
    pub offset: u64,
    /// Registry size when the page was read.
    pub total: u64,
    pub records: Vec<IndexedRecord>,
    pub failures: Vec<PageFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}
