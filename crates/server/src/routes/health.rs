use axum::{Router, response::Json as ResponseJson, routing::get};
use serde_json::{Value, json};

use crate::AppState;

pub async fn health() -> ResponseJson<Value> {
    ResponseJson(json!({ "status": "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
