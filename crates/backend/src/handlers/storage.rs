use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::Json;
use contracts::shared::storage::{StoredObject, UploadFile, UploadPolicy};

use crate::shared::error::{ApiError, ApiResult};
use crate::shared::storage;

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", e))
}

/// GET /api/upload-policy
///
/// Ограничения, по которым браузер проверяет файл до отправки
pub async fn policy() -> Json<UploadPolicy> {
    Json(storage::upload_policy())
}

/// POST /api/storage/:bucket
///
/// multipart: `file` (обязательно) и `filename` (подсказка для имени объекта)
pub async fn upload(
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredObject>)> {
    storage::check_bucket(&bucket)?;

    let mut file: Option<UploadFile> = None;
    let mut hint: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadFile {
                    name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("filename") => {
                hint = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".into()))?;
    storage::upload_policy().check_file(&file)?;

    let hint = hint
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| file.name.clone());
    let stored = storage::save(&bucket, &hint, &file.bytes).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// DELETE /api/storage/:bucket/:name
pub async fn remove(Path((bucket, name)): Path<(String, String)>) -> ApiResult<StatusCode> {
    storage::remove(&bucket, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
