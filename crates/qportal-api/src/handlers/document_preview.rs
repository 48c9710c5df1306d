use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use futures::StreamExt;
use qportal_core::constants::PDF_CONTENT_TYPE;
use qportal_core::models::has_pdf_extension;
use qportal_core::AppError;
use uuid::Uuid;

use crate::error::{storage_error, ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Serve the preview of a document inline. Documents without a generated
/// preview fall back to the original file.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/preview",
    tag = "previews",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Preview PDF", content_type = "application/pdf"),
        (status = 400, description = "File is not a PDF", body = ErrorResponse),
        (status = 404, description = "Document or preview file not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(document_id = %id, operation = "serve_preview"))]
pub async fn serve_document_preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get_document(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let (key, file_name, using_preview_file) = match &document.preview {
        Some(preview) => (preview.path.as_str(), preview.name.as_str(), true),
        None => (document.file_path.as_str(), document.file_name.as_str(), false),
    };

    if !state.storage.exists(key).await.unwrap_or(false) {
        return Err(AppError::NotFound("Preview file not found".to_string()).into());
    }

    if !has_pdf_extension(key) {
        return Err(AppError::BadRequest("Preview is only available for PDF files".to_string()).into());
    }

    let file_size = state.storage.content_length(key).await.map_err(storage_error)?;

    tracing::info!(
        document_id = %id,
        using_preview_file,
        file_size,
        "Serving document preview"
    );

    let stream = state
        .storage
        .download_stream(key)
        .await
        .map_err(storage_error)?;
    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let content_disposition = format!("inline; filename=\"{}\"", header_safe(file_name));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .header(header::CONTENT_LENGTH, file_size)
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Strip characters that cannot appear in a quoted header parameter.
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
