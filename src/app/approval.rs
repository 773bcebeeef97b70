//! Human-in-the-loop confirmation before anything is signed or sent.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::Serialize;
use std::io::{BufRead, Write};

/// What the user is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalRequest {
    /// Sign `message` (the exact bytes) with `wallet`.
    SignMessage {
        file_name: String,
        hash: B256,
        wallet: Address,
        message: String,
    },
    /// Send the store transaction.
    StoreDocument {
        file_name: String,
        hash: B256,
        signer: Address,
        signature: String,
    },
}

impl ApprovalRequest {
    /// Multi-line description suitable for a confirmation prompt.
    pub fn describe(&self) -> String {
        match self {
            ApprovalRequest::SignMessage {
                file_name,
                hash,
                wallet,
                message,
            } => format!(
                "Sign Document\n\nFile: {file_name}\nHash: {hash}\nWallet: {wallet}\nMessage: {message}"
            ),
            ApprovalRequest::StoreDocument {
                file_name,
                hash,
                signer,
                signature,
            } => format!(
                "Store on Blockchain\n\nFile: {file_name}\nHash: {hash}\nSigner: {signer}\nSignature: {signature}\n\nThis will send a transaction."
            ),
        }
    }
}

#[async_trait]
pub trait Approver: Send + Sync {
    async fn approve(&self, request: &ApprovalRequest) -> bool;
}

/// Fixed answer, for non-interactive callers that collected consent up front
/// (the `approved` flag of an API request, `--yes` on the CLI).
#[derive(Debug, Clone, Copy)]
pub struct StaticApproval(pub bool);

#[async_trait]
impl Approver for StaticApproval {
    async fn approve(&self, request: &ApprovalRequest) -> bool {
        tracing::debug!(approved = self.0, ?request, "static approval");
        self.0
    }
}

/// Asks on the terminal and waits for `y`/`yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalApprover;

#[async_trait]
impl Approver for TerminalApprover {
    async fn approve(&self, request: &ApprovalRequest) -> bool {
        let prompt = request.describe();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = writeln!(stdout, "\n{prompt}\n");
            let _ = write!(stdout, "Do you want to proceed? [y/N] ");
            let _ = stdout.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}
