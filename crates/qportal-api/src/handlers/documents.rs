use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use qportal_core::models::DocumentResponse;
use qportal_core::AppError;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::{CreateDocument, UpdateDocument};
use crate::state::AppState;
use crate::utils::upload::{parse_document_form, validate_upload, DocumentForm};

async fn read_form(state: &AppState, multipart: Multipart) -> Result<DocumentForm, HttpAppError> {
    let form = parse_document_form(multipart).await?;
    form.validate()?;

    if let Some(file) = &form.file {
        validate_upload(
            file,
            state.config.max_document_size_bytes,
            &state.config.document_allowed_extensions,
        )?;
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_form(&state, multipart).await?;

    let title = form
        .title
        .ok_or_else(|| AppError::InvalidInput("title is required".to_string()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::InvalidInput("price is required".to_string()))?;
    let file = form
        .file
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let document = state
        .documents
        .create(CreateDocument {
            title,
            description: form.description,
            price,
            preview_pages: form.preview_pages,
            is_active: form.is_active.unwrap_or(true),
            file,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_form(&state, multipart).await?;

    if form.title.is_none() {
        return Err(AppError::InvalidInput("title is required".to_string()).into());
    }

    let document = state
        .documents
        .update(
            id,
            UpdateDocument {
                title: form.title,
                description: form.description,
                price: form.price,
                preview_pages: form.preview_pages,
                is_active: form.is_active,
                file: form.file,
            },
        )
        .await?;

    Ok(Json(DocumentResponse::from(document)))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.documents.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/documents/{id}/toggle-status",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Status toggled", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn toggle_document_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state.documents.toggle_status(id).await?;
    Ok(Json(DocumentResponse::from(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get_document(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}

#[derive(Deserialize, ToSchema, IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Active documents", body = Vec<DocumentResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = pagination.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = pagination.offset.max(0);

    let documents = state
        .repository
        .list_active_documents(limit, offset)
        .await?;

    let responses: Vec<DocumentResponse> =
        documents.into_iter().map(DocumentResponse::from).collect();
    Ok(Json(responses))
}
