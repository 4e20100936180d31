// File: services/meetbook_backend/src/main.rs
use std::process::ExitCode;
use std::sync::Arc;

use meetbook_backend::{build_router, build_state};
use meetbook_common::{init_with_level, level_from_str, log_result};
use meetbook_config::load_config;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_with_level(level_from_str(config.log_level.as_deref()));

    let state = match log_result(
        build_state(config.clone()).await,
        "Application state initialized",
        "Failed to initialize application state",
    ) {
        Ok(state) => state,
        Err(_) => return ExitCode::FAILURE,
    };
    let app = build_router(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
