use crate::error::{RegistryError, WorkflowError};
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub type HandlerResult = (StatusCode, Json<ApiResponse>);

pub fn ok<T: Serialize>(data: T) -> HandlerResult {
    match serde_json::to_value(data) {
        Ok(value) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(value),
                error: None,
            }),
        ),
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, format!("serialization failed: {e}")),
    }
}

pub fn error(status: StatusCode, message: impl Into<String>) -> HandlerResult {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

/// Returned while another mutating request of the same session is outstanding.
pub fn busy() -> HandlerResult {
    error(StatusCode::CONFLICT, "another action is already in progress")
}

pub fn registry_status(e: &RegistryError) -> StatusCode {
    match e {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::RemoteCall(_) => StatusCode::BAD_GATEWAY,
    }
}

pub fn workflow_status(e: &WorkflowError) -> StatusCode {
    match e {
        WorkflowError::Hash(_) | WorkflowError::InvalidState(_) => StatusCode::BAD_REQUEST,
        WorkflowError::NotConnected => StatusCode::PRECONDITION_FAILED,
        WorkflowError::UserDeclined => StatusCode::FORBIDDEN,
        WorkflowError::Registry(inner) => registry_status(inner),
        WorkflowError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn workflow_error(e: WorkflowError) -> HandlerResult {
    tracing::warn!(error = %e, "request failed");
    error(workflow_status(&e), e.to_string())
}

pub fn registry_error(e: RegistryError) -> HandlerResult {
    tracing::warn!(error = %e, "registry request failed");
    error(registry_status(&e), e.to_string())
}
