use crate::app::session::Session;
use crate::app::workflow::SignAndStore;
use crate::crypto::wallet::WalletPool;
use crate::domain::registry::DocumentRegistry;
use crate::infra::chain::ChainClient;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::{IntoParams, ToSchema};

/// One user session served over HTTP: the active wallet plus its Sign-and-Store run.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub flow: Arc<Mutex<SignAndStore>>,
    pub registry: Arc<dyn DocumentRegistry>,
    pub chain: Arc<dyn ChainClient>,
}

impl AppState {
    pub fn new(
        pool: Arc<WalletPool>,
        chain: Arc<dyn ChainClient>,
        registry: Arc<dyn DocumentRegistry>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(pool, chain.clone()))),
            flow: Arc::new(Mutex::new(SignAndStore::new(registry.clone()))),
            registry,
            chain,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ConnectRequest {
    /// Pool index, 0-based. Out-of-range indexes are ignored.
    pub index: usize,
}

/// Consent collected by the client before a signing or store step.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ApprovalBody {
    #[serde(default)]
    pub approved: bool,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    /// Original file name, shown in confirmation prompts.
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    /// Candidate signer address (free text, compared case-insensitively).
    pub signer: String,
    /// Also recover the signer from the stored signature.
    #[serde(default)]
    pub recover: bool,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct WalletEntry {
    pub index: usize,
    pub address: String,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}

pub fn query_400(err: QueryRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid query string: {} (expected: {})", err, expected)),
        }),
    )
}
