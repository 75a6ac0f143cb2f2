use crate::error::{RelayError, RelayResult};
use crate::handlers::AppState;
use crate::models::ArkoseCaptureRecord;
use axum::{extract::State, response::Json};
use serde_json::{json, Value};

/// Record an arkose challenge request observed on the host page. Each
/// capture overwrites the previous one.
pub async fn record(
    State(state): State<AppState>,
    Json(record): Json<ArkoseCaptureRecord>,
) -> RelayResult<Json<Value>> {
    if record.url.is_empty() {
        return Err(RelayError::InvalidRequest(
            "capture url cannot be empty".to_string(),
        ));
    }

    tracing::info!(url = %record.url, "arkose challenge request captured");
    state.capture.record(record);

    Ok(Json(json!({ "success": true })))
}
