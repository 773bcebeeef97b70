//! Sign-and-Store over HTTP. Each step is one request; approval is the
//! `approved` flag the client sends after showing the user what will happen.

use crate::app::approval::StaticApproval;
use crate::transport::http::handlers::common::{busy, ok, workflow_error};
use crate::transport::http::types::{json_422, ApiResponse, AppState, ApprovalBody, FileQuery};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/sign",
    responses(
        (status = 200, description = "Current Sign-and-Store state", body = ApiResponse)
    )
)]
pub async fn get_flow_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Ok(flow) = state.flow.try_lock() else {
        return busy().into_response();
    };
    ok(flow.state()).into_response()
}

#[utoipa::path(
    post,
    path = "/api/sign/file",
    params(FileQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw file contents"),
    responses(
        (status = 200, description = "File hashed; a new run started", body = ApiResponse),
        (status = 409, description = "Another action is in progress", body = ApiResponse)
    )
)]
pub async fn select_file_handler(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
    body: Bytes,
) -> impl IntoResponse {
    let Ok(mut flow) = state.flow.try_lock() else {
        return busy().into_response();
    };
    let name = query.name.unwrap_or_else(|| "upload".to_string());
    flow.select_bytes(name, &body);
    ok(flow.state()).into_response()
}

#[utoipa::path(
    post,
    path = "/api/sign/signature",
    request_body = ApprovalBody,
    responses(
        (status = 200, description = "Document signed", body = ApiResponse),
        (status = 400, description = "No file selected or already signed", body = ApiResponse),
        (status = 403, description = "Not approved", body = ApiResponse),
        (status = 409, description = "Another action is in progress", body = ApiResponse),
        (status = 412, description = "No wallet connected", body = ApiResponse)
    )
)]
pub async fn sign_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApprovalBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "{ \"approved\": bool }").into_response(),
    };
    let Ok(mut flow) = state.flow.try_lock() else {
        return busy().into_response();
    };
    let session = state.session.lock().await.clone();
    match flow.sign(&session, &StaticApproval(body.approved)).await {
        Ok(_) => ok(flow.state()).into_response(),
        Err(e) => workflow_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/sign/store",
    request_body = ApprovalBody,
    responses(
        (status = 200, description = "Stored; receipt in the returned state", body = ApiResponse),
        (status = 400, description = "Not signed or already stored", body = ApiResponse),
        (status = 403, description = "Not approved", body = ApiResponse),
        (status = 409, description = "Another action is in progress", body = ApiResponse),
        (status = 412, description = "No wallet connected", body = ApiResponse),
        (status = 502, description = "Registry call failed; retry without re-signing", body = ApiResponse)
    )
)]
pub async fn store_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApprovalBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "{ \"approved\": bool }").into_response(),
    };
    let Ok(mut flow) = state.flow.try_lock() else {
        return busy().into_response();
    };
    let session = state.session.lock().await.clone();
    match flow.store(&session, &StaticApproval(body.approved)).await {
        Ok(_) => ok(flow.state()).into_response(),
        Err(e) => workflow_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/sign/reset",
    responses(
        (status = 200, description = "Run reset to idle", body = ApiResponse),
        (status = 409, description = "Another action is in progress", body = ApiResponse)
    )
)]
pub async fn reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Ok(mut flow) = state.flow.try_lock() else {
        return busy().into_response();
    };
    flow.reset();
    ok(flow.state()).into_response()
}
