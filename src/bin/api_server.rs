// src/bin/api_server.rs

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use document_registry::infra::config::Config;
use document_registry::infra::telemetry;
use document_registry::transport;
use document_registry::{
    ChainClient, DocumentRegistry, EvmDocumentRegistry, EvmRpcClient, MemoryChain, WalletPool,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let offline = std::env::var("OFFLINE")
        .map(|v| matches!(v.trim(), "1" | "true"))
        .unwrap_or(false)
        || std::env::args().skip(1).any(|a| a == "--offline");

    // --- Wallet pool ---
    let pool = Arc::new(WalletPool::from_mnemonic(&config.mnemonic, config.wallet_count)?);
    tracing::info!(wallets = pool.len(), "wallet pool derived");

    // --- Registry backend ---
    let (chain, registry): (Arc<dyn ChainClient>, Arc<dyn DocumentRegistry>) = if offline {
        tracing::warn!("running against the in-process registry; nothing is persisted");
        let memory = Arc::new(MemoryChain::new());
        (memory.clone(), memory)
    } else {
        tracing::info!(
            rpc_url = %config.rpc_url,
            contract = %config.contract_address,
            "using on-chain registry"
        );
        (
            Arc::new(EvmRpcClient::new(config.rpc_url.clone())),
            Arc::new(EvmDocumentRegistry::new(
                config.rpc_url.clone(),
                config.contract_address,
            )),
        )
    };
    match chain.chain_id().await {
        Ok(id) => tracing::info!(chain_id = id, "RPC reachable"),
        Err(e) => tracing::warn!(error = %e, "RPC not reachable yet; requests will fail until it is"),
    }

    let app_state = transport::http::AppState::new(pool, chain, registry);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "API server listening");
    tracing::info!("Swagger UI available at /swagger-ui");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
