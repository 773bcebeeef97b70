//! The three user-facing flows: Sign-and-Store, Verify and List-All.
//!
//! Sign-and-Store is a linear state machine `Idle -> Hashed -> Signed -> Stored`.
//! Each step awaits its remote call before the state moves; a failed step leaves
//! the state exactly as it was, so the same action can simply be triggered again.
//! Verify and List-All are stateless and can be re-run at will.

use alloy::primitives::{Address, Bytes, B256};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::app::approval::{ApprovalRequest, Approver};
use crate::app::session::Session;
use crate::crypto::hashing::{digest, digest_file, shorten_hash};
use crate::domain::document::{DocumentRecord, StoreReceipt, StoreRequest, VerificationResult};
use crate::domain::registry::DocumentRegistry;
use crate::domain::verify::{evaluate, evaluate_with_recovery, signing_message};
use crate::error::{RegistryError, WorkflowError};

/// Source of the store timestamp, seconds since epoch.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp().max(0) as u64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignFlowState {
    Idle,
    Hashed {
        file_name: String,
        hash: B256,
    },
    Signed {
        file_name: String,
        hash: B256,
        signer: Address,
        signature: Bytes,
    },
    Stored {
        file_name: String,
        hash: B256,
        signer: Address,
        signature: Bytes,
        timestamp: u64,
        receipt: StoreReceipt,
    },
}

impl SignFlowState {
    pub fn name(&self) -> &'static str {
        match self {
            SignFlowState::Idle => "idle",
            SignFlowState::Hashed { .. } => "hashed",
            SignFlowState::Signed { .. } => "signed",
            SignFlowState::Stored { .. } => "stored",
        }
    }

    pub fn hash(&self) -> Option<B256> {
        match self {
            SignFlowState::Idle => None,
            SignFlowState::Hashed { hash, .. }
            | SignFlowState::Signed { hash, .. }
            | SignFlowState::Stored { hash, .. } => Some(*hash),
        }
    }
}

/// Controller for the Sign-and-Store flow of one session.
pub struct SignAndStore {
    registry: Arc<dyn DocumentRegistry>,
    clock: Clock,
    state: SignFlowState,
}

impl SignAndStore {
    pub fn new(registry: Arc<dyn DocumentRegistry>) -> Self {
        Self {
            registry,
            clock: system_clock(),
            state: SignFlowState::Idle,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &SignFlowState {
        &self.state
    }

    /// Back to `Idle`, dropping any hash/signature/receipt of the current run.
    pub fn reset(&mut self) {
        self.state = SignFlowState::Idle;
    }

    /// Hashes a file and starts a new run from it. On a read failure the
    /// current run is kept.
    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> Result<B256, WorkflowError> {
        let path = path.as_ref();
        let hash = digest_file(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!(file = %file_name, %hash, "hash computed");
        self.state = SignFlowState::Hashed { file_name, hash };
        Ok(hash)
    }

    /// Starts a new run from in-memory file contents.
    pub fn select_bytes(&mut self, file_name: impl Into<String>, bytes: &[u8]) -> B256 {
        let file_name = file_name.into();
        let hash = digest(bytes);
        tracing::info!(file = %file_name, %hash, "hash computed");
        self.state = SignFlowState::Hashed { file_name, hash };
        hash
    }

    /// `Hashed -> Signed`: signs the digest with the session's active identity
    /// after the user approved the exact message.
    pub async fn sign(
        &mut self,
        session: &Session,
        approver: &dyn Approver,
    ) -> Result<Bytes, WorkflowError> {
        let (file_name, hash) = match &self.state {
            SignFlowState::Hashed { file_name, hash } => (file_name.clone(), *hash),
            SignFlowState::Idle => return Err(WorkflowError::InvalidState("no file selected")),
            _ => return Err(WorkflowError::InvalidState("document already signed")),
        };
        let handle = session.signing_handle().ok_or(WorkflowError::NotConnected)?;

        let message = signing_message(&hash);
        let request = ApprovalRequest::SignMessage {
            file_name: file_name.clone(),
            hash,
            wallet: handle.address(),
            message: message.clone(),
        };
        if !approver.approve(&request).await {
            tracing::info!(%hash, "signing declined");
            return Err(WorkflowError::UserDeclined);
        }

        let signature = handle.sign_message(message.as_bytes())?;
        tracing::info!(%hash, signer = %handle.address(), wallet = handle.index(), "document signed");
        self.state = SignFlowState::Signed {
            file_name,
            hash,
            signer: handle.address(),
            signature: signature.clone(),
        };
        Ok(signature)
    }

    /// `Signed -> Stored`: records `(hash, now, signature, active address)` in the
    /// registry and waits for the receipt. On failure the run stays `Signed`.
    pub async fn store(
        &mut self,
        session: &Session,
        approver: &dyn Approver,
    ) -> Result<StoreReceipt, WorkflowError> {
        let (file_name, hash, signed_by, signature) = match &self.state {
            SignFlowState::Signed {
                file_name,
                hash,
                signer,
                signature,
            } => (file_name.clone(), *hash, *signer, signature.clone()),
            SignFlowState::Stored { .. } => {
                return Err(WorkflowError::InvalidState("document already stored"))
            }
            _ => return Err(WorkflowError::InvalidState("document not signed")),
        };
        let handle = session.signing_handle().ok_or(WorkflowError::NotConnected)?;
        let signer = handle.address();
        if signer != signed_by {
            tracing::warn!(%signed_by, active = %signer, "active wallet differs from the signing wallet");
        }

        let request = ApprovalRequest::StoreDocument {
            file_name: file_name.clone(),
            hash,
            signer,
            signature: shorten_hash(&format!("0x{}", hex::encode(&signature)), 8),
        };
        if !approver.approve(&request).await {
            tracing::info!(%hash, "store declined");
            return Err(WorkflowError::UserDeclined);
        }

        let timestamp = (self.clock)();
        let store_request = StoreRequest {
            hash,
            timestamp,
            signature: signature.clone(),
            signer,
        };
        tracing::info!(%hash, %signer, timestamp, "storing document hash");
        let receipt = self.registry.store(&handle, &store_request).await?;

        self.state = SignFlowState::Stored {
            file_name,
            hash,
            signer,
            signature,
            timestamp,
            receipt: receipt.clone(),
        };
        Ok(receipt)
    }
}

/// How much checking a verify run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Compare the stored signer field to the candidate only.
    #[default]
    SignerField,
    /// Also recover the signer from the stored signature.
    WithRecovery,
}

/// Checks a digest against the registry for `candidate` (free text).
pub async fn verify_digest(
    registry: &dyn DocumentRegistry,
    hash: B256,
    candidate: &str,
    mode: VerifyMode,
) -> Result<VerificationResult, WorkflowError> {
    if !registry.is_stored(hash).await? {
        tracing::info!(%hash, "document not found");
        return Ok(VerificationResult::not_found(hash, candidate));
    }
    let record = registry.get_info(hash).await?;
    let result = match mode {
        VerifyMode::SignerField => evaluate(&record, candidate),
        VerifyMode::WithRecovery => evaluate_with_recovery(&record, candidate),
    };
    tracing::info!(%hash, valid = result.is_valid, "verification result");
    Ok(result)
}

/// Hashes a local file (never uploaded) and verifies it.
pub async fn verify_file(
    registry: &dyn DocumentRegistry,
    path: impl AsRef<Path>,
    candidate: &str,
    mode: VerifyMode,
) -> Result<VerificationResult, WorkflowError> {
    let hash = digest_file(path).await?;
    verify_digest(registry, hash, candidate, mode).await
}

pub async fn verify_bytes(
    registry: &dyn DocumentRegistry,
    bytes: &[u8],
    candidate: &str,
    mode: VerifyMode,
) -> Result<VerificationResult, WorkflowError> {
    verify_digest(registry, digest(bytes), candidate, mode).await
}

/// Every record in store order, together with the count it was read against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentListing {
    pub total: u64,
    pub documents: Vec<DocumentRecord>,
}

/// List-All: `count()` first, then each record in turn.
pub async fn list_documents(
    registry: &dyn DocumentRegistry,
) -> Result<DocumentListing, RegistryError> {
    let total = registry.count().await?;
    if total == 0 {
        return Ok(DocumentListing {
            total,
            documents: Vec::new(),
        });
    }
    let documents = registry.list_all().await?;
    tracing::info!(count = documents.len(), "loaded documents");
    Ok(DocumentListing { total, documents })
}
