use axum::{
    extract::{Path, State},
    Json,
};

use super::{api_error, bad_request, ApiError};
use crate::{
    adapters::inbound::http::{
        dto::{SignUrlDto, SignedUrlDto},
        router::AppState,
    },
    domain::models::SignedUrlMethod,
};

/// Issue a signed upload or download URL
pub async fn issue_signed_url(
    State(app_state): State<AppState>,
    Path(bucket): Path<String>,
    Json(request): Json<SignUrlDto>,
) -> Result<Json<SignedUrlDto>, ApiError> {
    let method: SignedUrlMethod = request.method.parse().map_err(|e: String| bad_request(&e))?;

    let grant = match method {
        SignedUrlMethod::Put => app_state.gateway.issue_upload_url(&bucket, &request.key).await,
        SignedUrlMethod::Get => {
            app_state
                .gateway
                .issue_download_url(&bucket, &request.key)
                .await
        }
    }
    .map_err(api_error)?;

    Ok(Json(grant.into()))
}
