use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::{ApiError, AppState};
use crate::food::api::UploadedFile;

const FILE_FIELDS: [&str; 2] = ["file", "image"];

pub async fn scan_food(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    relay(state, multipart, "scan").await
}

pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    relay(state, multipart, "image").await
}

async fn relay(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
    kind: &str,
) -> Result<Json<Value>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let file = read_file(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;

    let url = state
        .images
        .upload(file)
        .await
        .map_err(ApiError::internal("Failed to upload file"))?;

    info!("Relayed {} upload to {}", kind, url);
    Ok(Json(json!({ "url": url.as_str() })))
}

/// First non-empty attachment under one of the accepted field names.
async fn read_file(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;

        if bytes.is_empty() {
            continue;
        }

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
