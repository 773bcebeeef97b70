use crate::crypto::hashing::parse_b256;
use crate::domain::registry::DEFAULT_PAGE_SIZE;
use crate::transport::http::handlers::common::{error, ok, registry_error};
use crate::transport::http::types::{ApiResponse, AppState, ListQuery};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/documents",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of records in store order; failed lookups listed separately", body = ApiResponse),
        (status = 502, description = "Registry count failed", body = ApiResponse)
    )
)]
pub async fn list_documents_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    match state.registry.page(query.offset, limit).await {
        Ok(page) => ok(page),
        Err(e) => registry_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/documents/count",
    responses(
        (status = 200, description = "Number of stored documents", body = ApiResponse),
        (status = 502, description = "Registry call failed", body = ApiResponse)
    )
)]
pub async fn count_documents_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.count().await {
        Ok(count) => ok(serde_json::json!({ "count": count })),
        Err(e) => registry_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/documents/{hash}",
    params(("hash" = String, Path, description = "0x-prefixed 32-byte digest")),
    responses(
        (status = 200, description = "Stored record", body = ApiResponse),
        (status = 400, description = "Malformed hash", body = ApiResponse),
        (status = 404, description = "Nothing stored under this hash", body = ApiResponse),
        (status = 502, description = "Registry call failed", body = ApiResponse)
    )
)]
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> impl IntoResponse {
    let hash = match parse_b256(&hash) {
        Ok(h) => h,
        Err(e) => return error(StatusCode::BAD_REQUEST, e),
    };
    match state.registry.get_info(hash).await {
        Ok(record) => ok(record),
        Err(e) => registry_error(e),
    }
}
