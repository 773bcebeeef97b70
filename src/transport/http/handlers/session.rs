use crate::app::session::SessionInfo;
use crate::app::workflow::list_documents;
use crate::transport::http::handlers::common::{busy, ok};
use crate::transport::http::types::{json_422, ApiResponse, AppState, ConnectRequest, WalletEntry};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/wallets",
    responses(
        (status = 200, description = "Identities of the test pool", body = ApiResponse)
    )
)]
pub async fn list_wallets_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let wallets: Vec<WalletEntry> = session
        .wallets()
        .iter()
        .map(|w| WalletEntry {
            index: w.index,
            address: w.address().to_checksum(None),
        })
        .collect();
    ok(wallets)
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = ApiResponse)
    )
)]
pub async fn get_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let info: SessionInfo = state.session.lock().await.info();
    ok(info)
}

#[utoipa::path(
    post,
    path = "/api/session/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Session after the connect attempt (unchanged for an out-of-range index); on success also the stored documents", body = ApiResponse),
        (status = 409, description = "Another session change is in progress", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn connect_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return json_422(e, "{ \"index\": number }").into_response(),
    };
    let Ok(mut session) = state.session.try_lock() else {
        return busy().into_response();
    };
    let accepted = session.switch_wallet(request.index).await;
    let mut body = serde_json::json!({ "accepted": accepted, "session": session.info() });
    drop(session);

    // A fresh connection reloads the registry listing; a failed load does not undo the connect.
    if accepted {
        match list_documents(state.registry.as_ref()).await {
            Ok(listing) => body["documents"] = serde_json::json!(listing),
            Err(e) => {
                tracing::warn!(error = %e, "listing documents after connect failed");
                body["documents_error"] = serde_json::Value::String(e.to_string());
            }
        }
    }
    ok(body).into_response()
}

#[utoipa::path(
    post,
    path = "/api/session/disconnect",
    responses(
        (status = 200, description = "Session disconnected", body = ApiResponse),
        (status = 409, description = "Another session change is in progress", body = ApiResponse)
    )
)]
pub async fn disconnect_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Ok(mut session) = state.session.try_lock() else {
        return busy().into_response();
    };
    session.disconnect();
    ok(session.info()).into_response()
}
