//! Negotiation server - HTTP API over negotiation sessions and salary data.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use negotiator::io::config::load_config;
use negotiator::io::model::OpenRouterClient;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "negotiator-server")]
#[command(about = "HTTP API for salary-negotiation practice sessions")]
struct Args {
    /// Path to the TOML config; defaults apply when the file is missing
    #[arg(long, default_value = "negotiator.toml")]
    config: PathBuf,

    /// Address to bind the server to (overrides `server.bind`)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("negotiator_server=info".parse()?)
                .add_directive("negotiator=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    info!(config = %args.config.display(), model = %config.model.model, "starting negotiator-server");

    let client = OpenRouterClient::from_config(&config.model).context("create model client")?;
    let state = AppState::new(
        Arc::new(client),
        config.coach.recent_messages,
        config.server.max_sessions,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(state).layer(cors);

    let bind = args.bind.unwrap_or(config.server.bind);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("parse listen address {bind}:{port}"))?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
