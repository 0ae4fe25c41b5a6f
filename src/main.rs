// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use codevault::api::router;
use codevault::auth::TokenSigner;
use codevault::config::Config;
use codevault::state::AppState;
use codevault::storage::{DocumentStorage, StoragePaths, UploadStorage};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Invalid configuration");

    let paths = StoragePaths::new(&config.data_dir);
    let mut storage = DocumentStorage::new(paths);
    storage.initialize().expect("Failed to initialize storage");

    let uploads = UploadStorage::new(storage.paths().uploads_dir());
    uploads.initialize().expect("Failed to initialize upload storage");

    let tokens = TokenSigner::new(config.token_secret.as_bytes(), config.token_ttl_secs);

    let state = AppState::new(storage, uploads, tokens);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, data_dir = %config.data_dir, "codevault listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}
