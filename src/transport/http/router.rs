use crate::app::session::SessionInfo;
use crate::domain::document::{
    DocumentPage, DocumentRecord, IndexedRecord, PageFailure, StoreReceipt, VerificationResult,
};
use crate::transport::http::handlers::{documents, health, session, sign, verify};
use crate::transport::http::types::{ApiResponse, ApprovalBody, ConnectRequest, WalletEntry};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        session::list_wallets_handler,
        session::get_session_handler,
        session::connect_handler,
        session::disconnect_handler,
        sign::get_flow_handler,
        sign::select_file_handler,
        sign::sign_handler,
        sign::store_handler,
        sign::reset_handler,
        verify::verify_handler,
        documents::list_documents_handler,
        documents::count_documents_handler,
        documents::get_document_handler
    ),
    components(schemas(
        ApiResponse,
        ConnectRequest,
        ApprovalBody,
        WalletEntry,
        SessionInfo,
        DocumentRecord,
        StoreReceipt,
        VerificationResult,
        IndexedRecord,
        PageFailure,
        DocumentPage
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/wallets", get(session::list_wallets_handler))
        .route("/api/session", get(session::get_session_handler))
        .route("/api/session/connect", post(session::connect_handler))
        .route("/api/session/disconnect", post(session::disconnect_handler))
        .route("/api/sign", get(sign::get_flow_handler))
        .route("/api/sign/file", post(sign::select_file_handler))
        .route("/api/sign/signature", post(sign::sign_handler))
        .route("/api/sign/store", post(sign::store_handler))
        .route("/api/sign/reset", post(sign::reset_handler))
        .route("/api/verify", post(verify::verify_handler))
        .route("/api/documents", get(documents::list_documents_handler))
        .route("/api/documents/count", get(documents::count_documents_handler))
        .route("/api/documents/:hash", get(documents::get_document_handler))
        .with_state(app_state)
}
