// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use proofcheck::config;
use proofcheck::engine;
use proofcheck::server;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "proofcheck-verifier", about = "Proof-of-work result verifier")]
struct Cli {
    /// Path to the proofcheck.yaml config file
    #[arg(long, default_value = "proofcheck.yaml", env = "PROOFCHECK_CONFIG")]
    config: String,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "PROOFCHECK_HOST")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "PROOFCHECK_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let addr = SocketAddr::new(cli.host, cli.port);
    tracing::info!(%addr, "proofcheck starting");

    let config = match config::load_config_file(&cli.config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        version = %config.policy.version,
        environment = %config.runtime.environment,
        accept_threshold = config.policy.thresholds.accept,
        review_threshold = config.policy.thresholds.review,
        bounded_task_types = config.policy.bounds.len(),
        contract_hash = %config.contract_hash,
        "config loaded"
    );

    let engine = Arc::new(engine::build_engine(config));
    // Load eagerly so the first request does not pay for it.
    engine.reload_model();

    let app = server::build_router(engine);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, "failed to bind: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "proofcheck listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
