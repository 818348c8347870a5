// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Helium Constructor Service
//!
//! Entry point for the `helium-constructor` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the HTTP API until SIGINT
//! or SIGTERM.
//!
//! - `run`     start the HTTP service
//! - `version` print build version information

mod api;
mod chain;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use chain::HeliumApiClient;
use cli::{Commands, ConstructorCli};
use metrics::ConstructorMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ConstructorCli::parse();

    match cli.command {
        Commands::Run(args) => run_service(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the HTTP service and blocks until shutdown.
async fn run_service(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, args.log_format());

    let network = args.network();
    let chain = HeliumApiClient::new(network, args.api_url.as_deref())
        .context("failed to build chain API client")?;

    tracing::info!(
        port = args.port,
        %network,
        api_url = chain.base_url(),
        "starting helium-constructor"
    );

    let metrics = Arc::new(ConstructorMetrics::new().context("failed to register metrics")?);

    let state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        network,
        chain: Arc::new(chain),
        metrics,
    };

    let router = api::create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", addr))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("helium-constructor stopped");
    Ok(())
}

fn print_version() {
    println!("helium-constructor {}", env!("CARGO_PKG_VERSION"));
    println!("rustc              {}", option_env!("RUSTC_VERSION").unwrap_or("unknown"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that signal is ignored and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received, draining connections");
}
