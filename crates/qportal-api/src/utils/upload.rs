//! Multipart form parsing for document create and update

use axum::extract::Multipart;
use qportal_core::AppError;
use validator::Validate;

use crate::services::UploadedFile;

/// Text fields and file of a document form, before validation.
#[derive(Debug, Default, Validate)]
pub struct DocumentForm {
    #[validate(length(min = 1, max = 255, message = "title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 1, max = 10, message = "preview_pages must be between 1 and 10"))]
    pub preview_pages: Option<i32>,
    pub is_active: Option<bool>,
    pub file: Option<UploadedFile>,
}

/// Read every field of a document form. Only one field named `file` is
/// accepted; unknown fields are ignored.
pub async fn parse_document_form(mut multipart: Multipart) -> Result<DocumentForm, AppError> {
    let mut form = DocumentForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

            form.file = Some(UploadedFile {
                data: data.to_vec(),
                original_name,
                content_type,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", field_name, e)))?;
        let value = value.trim().to_string();

        match field_name.as_str() {
            "title" => form.title = Some(value),
            "description" => form.description = Some(value).filter(|v| !v.is_empty()),
            "price" => form.price = Some(parse_number(&field_name, &value)?),
            "preview_pages" if !value.is_empty() => {
                form.preview_pages = Some(parse_number(&field_name, &value)?)
            }
            "is_active" => form.is_active = Some(parse_flag(&value)?),
            _ => {}
        }
    }

    Ok(form)
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("{} must be a whole number", field)))
}

fn parse_flag(value: &str) -> Result<bool, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        _ => Err(AppError::InvalidInput("is_active must be a boolean".to_string())),
    }
}

/// Check an uploaded file against the size limit and extension allowlist.
/// Returns the lowercased extension.
pub fn validate_upload(
    file: &UploadedFile,
    max_size: usize,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    if file.data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }

    if file.data.len() > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }

    let extension = std::path::Path::new(&file.original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}
