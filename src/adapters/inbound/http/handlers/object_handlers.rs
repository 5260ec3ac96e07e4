use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{api_error, bad_request, ApiError};
use crate::{
    adapters::inbound::http::{
        dto::{
            BulkDeleteResponseDto, ListObjectsResponseDto, PrefixQueryDto, StoredObjectDto,
            SuccessResponseDto,
        },
        router::AppState,
    },
    domain::models::UploadPayload,
};

/// Handle multipart upload.
///
/// Expects a `path` text field (the key prefix) and a `file` field; the
/// object is stored at `{path}/{file name}`.
pub async fn upload_object(
    State(app_state): State<AppState>,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredObjectDto>), ApiError> {
    let mut key_prefix = None;
    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("path") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Invalid path field: {}", e)))?;
                key_prefix = Some(text);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| bad_request("File field has no file name"))?;
                let content_type = field.content_type().map(str::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Failed to read file: {}", e)))?;

                let mut upload = UploadPayload::new(file_name, content);
                if let Some(ct) = content_type {
                    upload = upload.with_content_type(ct);
                }
                payload = Some(upload);
            }
            _ => {}
        }
    }

    let key_prefix = key_prefix.ok_or_else(|| bad_request("Missing 'path' field"))?;
    let payload = payload.ok_or_else(|| bad_request("Missing 'file' field"))?;

    let stored = app_state
        .gateway
        .put_object(&bucket, &key_prefix, payload)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// Handle object retrieval
pub async fn get_object(
    State(app_state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let content = app_state
        .gateway
        .get_object(&bucket, &key)
        .await
        .map_err(api_error)?;

    let content_type = content
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        content.data,
    )
        .into_response())
}

/// Handle object deletion
pub async fn delete_object(
    State(app_state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    app_state
        .gateway
        .delete_object(&bucket, &key)
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::new("Object deleted successfully")))
}

/// Handle object listing
pub async fn list_objects(
    State(app_state): State<AppState>,
    Path(bucket): Path<String>,
    Query(params): Query<PrefixQueryDto>,
) -> Result<Json<ListObjectsResponseDto>, ApiError> {
    let page = app_state
        .gateway
        .list_objects(&bucket, params.prefix.as_deref())
        .await
        .map_err(api_error)?;

    Ok(Json(page.into()))
}

/// Handle bulk deletion of every object under a prefix
pub async fn delete_all_objects(
    State(app_state): State<AppState>,
    Path(bucket): Path<String>,
    Query(params): Query<PrefixQueryDto>,
) -> Result<Json<BulkDeleteResponseDto>, ApiError> {
    let report = app_state
        .gateway
        .delete_all_objects(&bucket, params.prefix.as_deref())
        .await
        .map_err(api_error)?;

    Ok(Json(report.into()))
}
