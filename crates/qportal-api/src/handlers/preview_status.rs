use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewStatusResponse {
    /// Whether uploads currently get previews
    pub available: bool,
    pub enabled: bool,
    pub page_import: bool,
    pub text_reflow: bool,
    pub default_pages: u32,
    /// Strategies in the order they are tried
    pub strategies: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/previews/status",
    tag = "previews",
    responses(
        (status = 200, description = "Preview engine capabilities", body = PreviewStatusResponse)
    )
)]
pub async fn preview_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let capabilities = qportal_processing::capabilities();

    Json(PreviewStatusResponse {
        available: state.previews.is_available(),
        enabled: state.config.preview.enabled,
        page_import: capabilities.page_import,
        text_reflow: capabilities.text_reflow,
        default_pages: state.previews.default_pages(),
        strategies: state
            .previews
            .engine()
            .strategy_names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
