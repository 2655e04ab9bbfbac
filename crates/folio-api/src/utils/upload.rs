//! Multipart upload extraction

use axum::extract::Multipart;
use folio_core::AppError;
use folio_services::IncomingFile;

use crate::error::{multipart_error, HttpAppError};

/// Extract the single `file` field from a multipart form.
/// Other fields are ignored; a second `file` field is rejected.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<IncomingFile, HttpAppError> {
    let mut file: Option<IncomingFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if file.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?;

        file = Some(IncomingFile {
            filename,
            content_type,
            data,
        });
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    if file.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()).into());
    }

    Ok(file)
}
