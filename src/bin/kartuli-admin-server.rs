// ABOUTME: Server binary for the Kartuli admin gate and short-link redirector
// ABOUTME: Loads env configuration, migrates the content store and serves the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Kartuli Admin Server Binary
//!
//! Starts the HTTP server with the admin login, CSRF, short-code and
//! short-link endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use kartuli_admin::{
    config::ServerConfig,
    constants::network::LOCKOUT_PURGE_INTERVAL_SECS,
    database_plugins::{ContentStore, SqliteContentStore},
    logging,
    resources::ServerResources,
    routes::build_router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kartuli-admin-server")]
#[command(about = "Kartuli admin gate - admin login, CSRF protection and short links")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    config.log_summary();

    let store = SqliteContentStore::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    store
        .migrate()
        .await
        .context("Failed to migrate content store")?;
    info!("Content store ready");

    let address = format!("{}:{}", config.host, config.http_port);
    let resources = Arc::new(ServerResources::new(config, Arc::new(store)));
    let purge_task =
        resources.spawn_lockout_purge(Duration::from_secs(LOCKOUT_PURGE_INTERVAL_SECS));

    let app = build_router(resources);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    purge_task.abort();
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
