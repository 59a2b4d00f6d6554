//! Upline API server binary
//!
//! Serves the API over in-memory stores seeded with the default
//! catalogs. Useful for local development and demos; production wires a
//! real document store behind the same traits.

use std::sync::Arc;
use tracing::info;
use upline_api::{build_app, ApiConfig, AppState};
use upline_store::Stores;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upline_api=info,upline_core=info,tower_http=info".into()),
        )
        .init();

    let config = ApiConfig::default();
    let listen_addr = config.listen_addr.clone();

    let stores = Stores::in_memory_seeded().await?;
    let state = AppState::new(config, stores);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(listen_addr = %listen_addr, "upline API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
