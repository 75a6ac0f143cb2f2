use crate::handlers::AppState;
use crate::utils::unix_timestamp;
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "ChatGPT Free Relay",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy"
    }))
}

pub async fn ping(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "pong",
            "environment": state.config.environment,
            "timestamp": unix_timestamp(),
            "status": "healthy"
        })),
    )
}
