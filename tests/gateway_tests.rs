use chrono::Duration;
use std::sync::Arc;
use storage_gateway::{
    AppBuilder, AppServices, BackendConfig, ClientError, ErrorKind, InMemoryBackend,
    SignedUrlMethod, StorageBackend, UploadPayload,
};

fn setup() -> (AppServices, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let app = AppBuilder::new()
        .with_config(BackendConfig::in_memory("uploads"))
        .with_client(backend.clone())
        .build()
        .unwrap();
    (app, backend)
}

fn text_file(name: &str, body: &str) -> UploadPayload {
    UploadPayload::new(name, body.to_string()).with_content_type("text/plain")
}

#[tokio::test]
async fn test_put_then_get_returns_same_bytes() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    let stored = gateway
        .put_object("b1b", "docs", text_file("a.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(stored.key.as_str(), "docs/a.txt");

    let content = gateway.get_object("b1b", "docs/a.txt").await.unwrap();
    assert_eq!(&content.data[..], b"hello");
    assert_eq!(content.size, 5);
    assert_eq!(content.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn test_put_overwrites_existing_key() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    gateway
        .put_object("b1b", "docs", text_file("a.txt", "first"))
        .await
        .unwrap();
    gateway
        .put_object("b1b", "docs", text_file("a.txt", "second"))
        .await
        .unwrap();

    let content = gateway.get_object("b1b", "docs/a.txt").await.unwrap();
    assert_eq!(&content.data[..], b"second");

    let page = gateway.list_objects("b1b", Some("docs")).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn test_listing_filters_by_prefix() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    for (prefix, name) in [("docs", "a.txt"), ("docs", "b.txt"), ("images", "c.png")] {
        gateway
            .put_object("b1b", prefix, text_file(name, "x"))
            .await
            .unwrap();
    }

    let docs = gateway.list_objects("b1b", Some("docs/")).await.unwrap();
    let keys: Vec<&str> = docs.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["docs/a.txt", "docs/b.txt"]);
    assert!(!docs.is_truncated);

    let partial = gateway.list_objects("b1b", Some("ima")).await.unwrap();
    assert_eq!(partial.len(), 1);

    let everything = gateway.list_objects("b1b", None).await.unwrap();
    assert_eq!(everything.len(), 3);

    let nothing = gateway.list_objects("b1b", Some("videos/")).await.unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_delete_missing_key_succeeds() {
    let (app, _) = setup();
    app.gateway.create_bucket("b1b").await.unwrap();

    app.gateway
        .delete_object("b1b", "docs/never-uploaded.txt")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_missing_key_is_not_found() {
    let (app, _) = setup();
    app.gateway.create_bucket("b1b").await.unwrap();

    let err = app.gateway.get_object("b1b", "docs/missing.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_operations_on_missing_bucket_are_not_found() {
    let (app, _) = setup();

    let err = app.gateway.list_objects("ghost", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app
        .gateway
        .put_object("ghost", "docs", text_file("a.txt", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_names_are_rejected_before_the_backend() {
    let (app, backend) = setup();

    let err = app.gateway.create_bucket("Bad_Bucket").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(backend.list_buckets().await.unwrap().is_empty());

    app.gateway.create_bucket("b1b").await.unwrap();
    let err = app
        .gateway
        .put_object("b1b", "", text_file("a.txt", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_delete_all_on_empty_prefix_is_empty_result() {
    let (app, _) = setup();
    app.gateway.create_bucket("b1b").await.unwrap();

    let err = app
        .gateway
        .delete_all_objects("b1b", Some("nothing/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[tokio::test]
async fn test_delete_all_removes_only_matching_keys() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    for (prefix, name) in [("docs", "a.txt"), ("docs", "b.txt"), ("keep", "c.txt")] {
        gateway
            .put_object("b1b", prefix, text_file(name, "x"))
            .await
            .unwrap();
    }

    let report = gateway
        .delete_all_objects("b1b", Some("docs/"))
        .await
        .unwrap();
    assert_eq!(report.deleted_count(), 2);
    assert!(report.is_complete());

    let remaining = gateway.list_objects("b1b", None).await.unwrap();
    let keys: Vec<&str> = remaining.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["keep/c.txt"]);
}

#[tokio::test]
async fn test_bucket_lifecycle() {
    let (app, _) = setup();
    let gateway = &app.gateway;

    let created = gateway.create_bucket("b1b").await.unwrap();
    assert_eq!(created.name.as_str(), "b1b");

    let err = gateway.create_bucket("b1b").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    gateway
        .put_object("b1b", "docs", text_file("a.txt", "x"))
        .await
        .unwrap();

    let err = gateway.delete_bucket("b1b").await.unwrap_err();
    assert!(err.is_conflict());

    gateway.delete_all_objects("b1b", None).await.unwrap();
    gateway.delete_bucket("b1b").await.unwrap();

    assert!(gateway.list_buckets().await.unwrap().is_empty());
    let err = gateway.delete_bucket("b1b").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_signed_urls_round_trip() {
    let (app, backend) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    let upload = gateway.issue_upload_url("b1b", "docs/a.txt").await.unwrap();
    assert_eq!(upload.method, SignedUrlMethod::Put);
    assert!(!upload.is_expired());
    backend.redeem_put(&upload.url, "signed body").await.unwrap();

    let download = gateway.issue_download_url("b1b", "docs/a.txt").await.unwrap();
    let content = backend.redeem_get(&download.url).await.unwrap();
    assert_eq!(&content.data[..], b"signed body");

    // An upload URL does not authorize a download
    let err = backend.redeem_get(&upload.url).await.unwrap_err();
    assert!(matches!(err, ClientError::SignatureRejected { .. }));
}

#[tokio::test]
async fn test_download_url_for_missing_key_is_issued() {
    let (app, backend) = setup();
    app.gateway.create_bucket("b1b").await.unwrap();

    let grant = app
        .gateway
        .issue_download_url("b1b", "docs/later.txt")
        .await
        .unwrap();

    let err = backend.redeem_get(&grant.url).await.unwrap_err();
    assert!(matches!(err, ClientError::NoSuchKey { .. }));
}

#[tokio::test]
async fn test_signed_url_stops_working_after_expiry() {
    let (app, backend) = setup();
    app.gateway.create_bucket("b1b").await.unwrap();
    app.gateway
        .put_object("b1b", "docs", text_file("a.txt", "x"))
        .await
        .unwrap();

    let grant = app
        .gateway
        .issue_download_url("b1b", "docs/a.txt")
        .await
        .unwrap();

    let before = grant.expires_at - Duration::seconds(5);
    backend.redeem_get_at(&grant.url, before).await.unwrap();

    let after = grant.expires_at + Duration::seconds(5);
    assert!(grant.is_expired_at(after));
    let err = backend.redeem_get_at(&grant.url, after).await.unwrap_err();
    assert!(matches!(err, ClientError::SignatureRejected { .. }));
}

#[tokio::test]
async fn test_signed_url_ttl_comes_from_config() {
    let backend = Arc::new(InMemoryBackend::new());
    let app = AppBuilder::new()
        .with_config(
            BackendConfig::in_memory("uploads")
                .with_signed_url_ttl(std::time::Duration::from_secs(60)),
        )
        .with_client(backend)
        .build()
        .unwrap();

    let before = chrono::Utc::now();
    let grant = app
        .gateway
        .issue_upload_url("uploads", "docs/a.txt")
        .await
        .unwrap();
    let lifetime = grant.expires_at - before;
    assert!(lifetime <= Duration::seconds(61));
    assert!(lifetime >= Duration::seconds(59));
}

#[tokio::test]
async fn test_upload_list_download_delete_scenario() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    gateway
        .put_object("b1b", "docs", text_file("a.txt", "hello"))
        .await
        .unwrap();

    let page = gateway.list_objects("b1b", Some("docs")).await.unwrap();
    assert_eq!(page.items[0].key.as_str(), "docs/a.txt");
    assert_eq!(page.items[0].size, 5);

    let content = gateway.get_object("b1b", "docs/a.txt").await.unwrap();
    assert_eq!(&content.data[..], b"hello");

    gateway.delete_object("b1b", "docs/a.txt").await.unwrap();
    assert!(gateway
        .list_objects("b1b", Some("docs"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reserved_characters_in_file_names_round_trip() {
    let (app, _) = setup();
    let gateway = &app.gateway;
    gateway.create_bucket("b1b").await.unwrap();

    let stored = gateway
        .put_object("b1b", "docs", text_file("report#1.txt", "q1"))
        .await
        .unwrap();
    assert_eq!(stored.key.as_str(), "docs/report#1.txt");

    let page = gateway.list_objects("b1b", Some("docs/")).await.unwrap();
    let keys: Vec<&str> = page.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["docs/report#1.txt"]);

    let content = gateway.get_object("b1b", keys[0]).await.unwrap();
    assert_eq!(&content.data[..], b"q1");

    let report = gateway.delete_all_objects("b1b", Some("docs/")).await.unwrap();
    assert_eq!(report.deleted_count(), 1);
    assert!(report.is_complete());

    gateway.delete_bucket("b1b").await.unwrap();
}
