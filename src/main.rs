// main.rs
// Loads configuration, connects and seeds MongoDB, loads the table mirrors and serves
// the router from `aminna::build_app`.

use std::{process::ExitCode, sync::Arc};

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use aminna::{build_app, config::AppConfig, state};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let state = match state::init_state(&config).await {
        Ok(state) => Arc::new(state),
        Err(err) => {
            tracing::error!(error = ?err, "failed to initialize MongoDB state");
            return ExitCode::FAILURE;
        }
    };

    let app = build_app(state);
    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %config.bind_addr, error = %err, "bind failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Listening on http://{}", config.bind_addr);
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
