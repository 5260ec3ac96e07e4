use storage_gateway::{create_s3_app, BackendConfig, ErrorKind, UploadPayload};

// These tests need a running MinIO server, configured via:
// - MINIO_ENDPOINT (default: http://localhost:9000)
// - MINIO_ACCESS_KEY_ID (default: minioadmin)
// - MINIO_SECRET_ACCESS_KEY (default: minioadmin)

fn minio_config(bucket: &str) -> BackendConfig {
    let endpoint =
        std::env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
    let access_key =
        std::env::var("MINIO_ACCESS_KEY_ID").unwrap_or_else(|_| "minioadmin".to_string());
    let secret_key =
        std::env::var("MINIO_SECRET_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

    BackendConfig::new("us-east-1", access_key, secret_key, bucket)
        .with_endpoint(endpoint)
        .with_allow_http(true)
}

fn unique_bucket() -> String {
    format!("gw-test-{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
#[ignore = "requires MinIO server to be running"]
async fn test_minio_object_operations() {
    let bucket = unique_bucket();
    let app = create_s3_app(minio_config(&bucket)).unwrap();
    let gateway = &app.gateway;

    gateway.create_bucket(&bucket).await.unwrap();

    let stored = gateway
        .put_object(
            &bucket,
            "docs",
            UploadPayload::new("a.txt", "Hello from MinIO!").with_content_type("text/plain"),
        )
        .await
        .unwrap();
    assert_eq!(stored.key.as_str(), "docs/a.txt");

    let content = gateway.get_object(&bucket, "docs/a.txt").await.unwrap();
    assert_eq!(&content.data[..], b"Hello from MinIO!");

    let page = gateway.list_objects(&bucket, Some("docs")).await.unwrap();
    assert_eq!(page.len(), 1);

    let err = gateway.delete_bucket(&bucket).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let report = gateway.delete_all_objects(&bucket, None).await.unwrap();
    assert_eq!(report.deleted_count(), 1);

    gateway.delete_bucket(&bucket).await.unwrap();
}

#[tokio::test]
#[ignore = "requires MinIO server to be running"]
async fn test_minio_signed_download_url() {
    let bucket = unique_bucket();
    let app = create_s3_app(minio_config(&bucket)).unwrap();
    let gateway = &app.gateway;

    gateway.create_bucket(&bucket).await.unwrap();
    gateway
        .put_object(&bucket, "docs", UploadPayload::new("a.txt", "signed"))
        .await
        .unwrap();

    let grant = gateway
        .issue_download_url(&bucket, "docs/a.txt")
        .await
        .unwrap();

    let body = reqwest::get(&grant.url)
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "signed");

    gateway.delete_all_objects(&bucket, None).await.unwrap();
    gateway.delete_bucket(&bucket).await.unwrap();
}

#[tokio::test]
#[ignore = "requires MinIO server to be running"]
async fn test_minio_list_buckets_includes_created_bucket() {
    let bucket = unique_bucket();
    let app = create_s3_app(minio_config(&bucket)).unwrap();

    app.gateway.create_bucket(&bucket).await.unwrap();
    let buckets = app.gateway.list_buckets().await.unwrap();
    assert!(buckets.iter().any(|b| b.name.as_str() == bucket));

    app.gateway.delete_bucket(&bucket).await.unwrap();
}
