use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::fixtures::FixtureStore;
use crate::web;
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use shared::{AskRequest, ASK_PATH};
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub fixtures: FixtureStore,
}

/// Build the full application router for `config`
pub fn app(config: &ServerConfig) -> Router {
    let state = AppState {
        fixtures: FixtureStore::new(&config.fixtures_dir),
    };

    // Questions are echoed back whatever their size
    let app = Router::new()
        .route(
            ASK_PATH,
            post(handle_ask).layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(web::health))
        .route("/healthz", get(web::health))
        .with_state(state)
        .merge(web::static_routes(&config.static_dir))
        .layer(CorsLayer::permissive());

    if config.debug {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let app = app(&config);
    let addr = config.bind_addr();

    tracing::info!("Serving fixtures from {}", config.fixtures_dir.display());
    tracing::info!("Serving static files from {}", config.static_dir.display());
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Answer a question with a random fixture.
///
/// The body is read raw so that a missing or malformed body means an empty
/// question rather than a rejection.
#[axum::debug_handler]
async fn handle_ask(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let request = AskRequest::from_body(&body);
    let answer = state.fixtures.answer(request.question()).await?;

    tracing::info!(
        "Answering with {} (question injected: {})",
        answer.fixture,
        answer.injected
    );

    Ok(Json(answer.document))
}
