use crate::app::workflow::{verify_bytes, VerifyMode};
use crate::transport::http::handlers::common::{ok, workflow_error};
use crate::transport::http::types::{query_400, ApiResponse, AppState, VerifyQuery};
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

/// The request body is hashed in place and discarded; only the digest reaches the registry.
#[utoipa::path(
    post,
    path = "/api/verify",
    params(VerifyQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw file contents"),
    responses(
        (status = 200, description = "Verification result (also when the document is unknown)", body = ApiResponse),
        (status = 400, description = "Missing or malformed query parameters", body = ApiResponse),
        (status = 502, description = "Registry call failed", body = ApiResponse)
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
    body: Bytes,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return query_400(e, "?signer=<address>[&recover=bool]"),
    };
    let mode = if query.recover {
        VerifyMode::WithRecovery
    } else {
        VerifyMode::SignerField
    };
    match verify_bytes(state.registry.as_ref(), &body, &query.signer, mode).await {
        Ok(result) => ok(result),
        Err(e) => workflow_error(e),
    }
}
