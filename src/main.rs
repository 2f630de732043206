use std::{process::ExitCode, sync::Arc};

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tryonx_api::{
    AppState, PlaceholderEngine,
    config::{AppConfig, Env},
    create_router,
    engine::EngineState,
};

/// main
///
/// Loads configuration, sets up logging, resolves the auth strategy and serves the API.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Logging is not up yet, so configuration errors go to stderr.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tryonx_api=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let engine = Arc::new(PlaceholderEngine::new()) as EngineState;
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config, engine);

    if app_state.gate.is_open() {
        tracing::warn!(
            "No identity provider configured: every request is authenticated as the development user"
        );
    } else {
        tracing::info!("Bearer tokens are verified against the configured identity provider");
    }

    let app = create_router(app_state);

    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%bind_addr, error = %e, "failed to bind HTTP listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
