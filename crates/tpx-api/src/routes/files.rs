//! ECU file upload endpoint.
//!
//! Nothing is stored: the handler reads the file and reports what it received.

use axum::Json;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartRejection;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Metadata echoed back for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub filename: Option<String>,
    /// Size of the received content in bytes.
    pub size: usize,
    pub content_type: Option<String>,
    pub message: String,
}

/// Describe an upload without keeping its content.
pub fn describe_upload(
    contents: &[u8],
    filename: Option<String>,
    content_type: Option<String>,
) -> UploadReceipt {
    UploadReceipt {
        filename,
        size: contents.len(),
        content_type,
        message: "File uploaded successfully".into(),
    }
}

/// POST /api/files/upload: multipart form with a `file` field.
pub async fn upload_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadReceipt>> {
    let mut multipart = multipart.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

        let receipt = describe_upload(&contents, filename, content_type);
        tracing::info!(
            filename = ?receipt.filename,
            size = receipt.size,
            "file received (not persisted)"
        );
        return Ok(Json(receipt));
    }

    Err(ApiError::Validation("missing multipart field 'file'".into()))
}
