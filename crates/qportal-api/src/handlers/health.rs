use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

/// Liveness plus the preview engine's availability. Storage must be reachable.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match state.storage.exists(qportal_core::constants::PREVIEW_DIR).await {
        Ok(_) => "healthy".to_string(),
        Err(e) => format!("unhealthy: {}", e),
    };
    let healthy = storage == "healthy";

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "storage": storage,
            "previews": state.previews.is_available(),
        })),
    )
}
