pub mod data;
pub mod suggestions;

use std::sync::Arc;

use axum::{http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/data", data::routes())
        .nest("/api/suggestions", suggestions::routes())
        .layer(cors)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Data Visualization Dashboard API",
        "version": "1.0.0",
        "endpoints": {
            "/api/data/upload": "POST - Upload data files",
            "/api/data/summary": "GET - Get data summary",
            "/api/data/data": "GET - Get processed data",
            "/api/suggestions/suggestions": "GET - Get chart suggestions"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
