use axum::{routing::get_service, Json, Router};
use serde_json::{json, Value};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Routes for the static frontend: `/` is the root document and every
/// other unmatched path is looked up under `static_dir`.
pub fn static_routes(static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));

    Router::new()
        .route("/", get_service(index))
        .fallback_service(ServeDir::new(static_dir))
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
