pub mod app;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::approval::{ApprovalRequest, Approver, StaticApproval, TerminalApprover};
pub use app::session::{Session, SessionInfo};
pub use app::workflow::{
    list_documents, verify_bytes, verify_digest, verify_file, SignAndStore, SignFlowState,
    VerifyMode,
};
pub use crypto::hashing::{digest, digest_file};
pub use crypto::wallet::{SigningHandle, WalletPool};
pub use domain::document::{DocumentRecord, StoreReceipt, VerificationResult};
pub use domain::registry::{DocumentPages, DocumentRegistry};
pub use error::{HashError, RegistryError, WorkflowError};
pub use infra::chain::ChainClient;
pub use infra::evm::{EvmDocumentRegistry, EvmRpcClient};
pub use infra::memory::MemoryChain;
