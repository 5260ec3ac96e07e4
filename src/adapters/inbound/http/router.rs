use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    // Bucket handlers
    create_bucket,
    delete_all_objects,
    delete_bucket,
    delete_object,
    get_object,
    health,
    // Signed URL handlers
    issue_signed_url,
    list_buckets,
    // Object handlers
    list_objects,
    upload_object,
};
use crate::ports::services::StorageGateway;

/// Largest multipart body accepted by the upload route
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn StorageGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self { gateway }
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(create_bucket_router())
        .merge(create_object_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Create a router with just bucket operations
pub fn create_bucket_router() -> Router<AppState> {
    Router::new()
        .route("/buckets", get(list_buckets).post(create_bucket))
        .route("/buckets/{bucket}", delete(delete_bucket))
}

/// Create a router with object and signed URL operations
pub fn create_object_router() -> Router<AppState> {
    Router::new()
        .route(
            "/buckets/{bucket}/objects",
            get(list_objects)
                .post(upload_object)
                .delete(delete_all_objects),
        )
        .route(
            "/buckets/{bucket}/objects/{*key}",
            get(get_object).delete(delete_object),
        )
        .route("/buckets/{bucket}/signed-urls", post(issue_signed_url))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
