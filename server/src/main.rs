// Copyright (c) 2026 Tally Contributors. MIT License.
// See LICENSE for details.

//! # Tally Server
//!
//! Entry point for the `tally-server` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the transaction API.
//!
//! The binary supports two subcommands:
//!
//! - `run`: start the API and metrics servers
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use tally_ledger::InMemoryTransactionStore;

use cli::{Commands, TallyCli};
use metrics::ApiMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TallyCli::parse();

    match cli.command {
        Commands::Run(args) => run_server(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the API server and the metrics server, and runs until a
/// shutdown signal arrives.
async fn run_server(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_DIRECTIVES, args.log_format);

    tracing::info!(
        host = %args.host,
        port = args.port,
        metrics_port = args.metrics_port,
        max_transactions = ?args.max_transactions,
        "starting tally-server"
    );

    // --- Store ---
    let store = Arc::new(match args.max_transactions {
        Some(limit) => InMemoryTransactionStore::with_capacity_limit(limit),
        None => InMemoryTransactionStore::new(),
    });

    // --- Metrics ---
    let api_metrics = Arc::new(ApiMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState::new(store, Arc::clone(&api_metrics), args.max_body_bytes);

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = SocketAddr::new(args.host, args.port);
    let api_listener = tokio::net::TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&api_metrics));
    let metrics_addr = SocketAddr::new(args.host, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            res.context("API server error")?;
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            res.context("metrics server error")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("tally-server stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("tally-server {}", env!("CARGO_PKG_VERSION"));
    println!("api          {}", tally_ledger::config::API_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler can't be
/// installed, that signal source is ignored rather than shutting down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
