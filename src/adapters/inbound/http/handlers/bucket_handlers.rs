use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{api_error, ApiError};
use crate::adapters::inbound::http::{
    dto::{BucketDto, CreateBucketDto, SuccessResponseDto},
    router::AppState,
};

/// Handle bucket creation
pub async fn create_bucket(
    State(app_state): State<AppState>,
    Json(request): Json<CreateBucketDto>,
) -> Result<(StatusCode, Json<BucketDto>), ApiError> {
    let bucket = app_state
        .gateway
        .create_bucket(&request.name)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(bucket.into())))
}

/// Handle bucket listing
pub async fn list_buckets(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<BucketDto>>, ApiError> {
    let buckets = app_state.gateway.list_buckets().await.map_err(api_error)?;
    Ok(Json(buckets.into_iter().map(Into::into).collect()))
}

/// Handle bucket deletion
pub async fn delete_bucket(
    State(app_state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    app_state
        .gateway
        .delete_bucket(&bucket)
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::new("Bucket deleted successfully")))
}
