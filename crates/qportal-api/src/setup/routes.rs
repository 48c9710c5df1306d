//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Json, Router,
};
use qportal_core::PortalConfig;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

/// Multipart framing and text fields on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Default cap on in-flight requests; `HTTP_CONCURRENCY_LIMIT` overrides it.
const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 256;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::documents::create_document,
        handlers::documents::update_document,
        handlers::documents::delete_document,
        handlers::documents::toggle_document_status,
        handlers::documents::get_document,
        handlers::documents::list_documents,
        handlers::document_preview::serve_document_preview,
        handlers::preview_status::preview_status,
    ),
    components(schemas(
        qportal_core::models::DocumentResponse,
        crate::error::ErrorResponse,
        handlers::preview_status::PreviewStatusResponse,
    )),
    tags((name = "documents"), (name = "previews"))
)]
pub struct ApiDoc;

/// Build the application router.
pub fn setup_routes(config: &PortalConfig, state: Arc<AppState>) -> Router<()> {
    let documents = Router::new()
        .route(
            "/documents",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/documents/{id}",
            get(handlers::documents::get_document)
                .put(handlers::documents::update_document)
                .delete(handlers::documents::delete_document),
        )
        .route(
            "/documents/{id}/toggle-status",
            patch(handlers::documents::toggle_document_status),
        )
        .route(
            "/documents/{id}/preview",
            get(handlers::document_preview::serve_document_preview),
        )
        .route(
            "/previews/status",
            get(handlers::preview_status::preview_status),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);

    Router::new()
        .nest(API_PREFIX, documents)
        .route("/health", get(handlers::health::health_check))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            config.max_document_size_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
