//! Error types shared across the hashing, registry and workflow layers.

use alloy::primitives::B256;
use std::path::PathBuf;
use thiserror::Error;

/// Failure computing a content digest.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to the registry (JSON-RPC transport, contract revert, decoding).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Opaque reason passed through from the remote side.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    #[error("document not found: {0}")]
    NotFound(B256),
}

impl RegistryError {
    pub fn remote(e: impl std::fmt::Display) -> Self {
        RegistryError::RemoteCall(e.to_string())
    }
}

/// Errors surfaced at the workflow boundary.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("no wallet connected")]
    NotConnected,

    #[error("request declined by user")]
    UserDeclined,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The requested step is not valid from the controller's current state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("signing error: {0}")]
    Signing(String),
}

/// Start-up configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}
