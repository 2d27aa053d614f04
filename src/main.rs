mod app;
mod auth;
mod config;
mod shell;
mod state;
mod storage;

use crate::app::{build_app, serve};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "grademe=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    // Shell requests answer "loading" until the slot has been read.
    let session = app_state.session.clone();
    tokio::spawn(async move {
        session.initialize().await;
        tracing::info!(durable = session.is_durable(), "session store ready");
    });

    let host = app_state.config.host.clone();
    let port = app_state.config.port;
    serve(build_app(app_state), &host, port).await
}
