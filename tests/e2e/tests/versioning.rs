//! Versioning helpers against MinIO


use common::*;
use s3_probe::versioning::VersioningStatus;

#[tokio::test]
async fn test_fresh_bucket_never_enabled() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(1);
    let client = ctx.client();

    let state = ctx.bucket_versioning(&client, &bucket).await?;
    assert_eq!(state.status, VersioningStatus::Unversioned);
    ctx.ensure_versioning_never_enabled(&client, &bucket).await?;

    minio.delete_bucket(&bucket).await
}

#[tokio::test]
async fn test_ensure_enabled_is_idempotent() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(2);
    let client = ctx.client();

    ctx.ensure_versioning_enabled(&client, &bucket).await?;
    ctx.ensure_versioning_enabled(&client, &bucket).await?;

    let state = ctx.bucket_versioning(&client, &bucket).await?;
    assert_eq!(state.status, VersioningStatus::Enabled);

    minio.delete_bucket(&bucket).await
}

#[tokio::test]
async fn test_never_enabled_fails_once_enabled() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(3);
    let client = ctx.client();

    ctx.ensure_versioning_enabled(&client, &bucket).await?;
    let err = ctx
        .ensure_versioning_never_enabled(&client, &bucket)
        .await
        .unwrap_err();
    assert!(err.is_assertion(), "{:?}", err);
    assert!(err.to_string().contains("Enabled"), "{}", err);

    minio.delete_bucket(&bucket).await
}

#[tokio::test]
async fn test_suspend_after_enable() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(4);
    let client = ctx.client();

    ctx.ensure_versioning_enabled(&client, &bucket).await?;
    ctx.set_versioning(&client, &bucket, VersioningStatus::Suspended)
        .await?;

    let state = ctx.bucket_versioning(&client, &bucket).await?;
    assert_eq!(state.status, VersioningStatus::Suspended);
    assert!(!state.is_never_enabled());

    minio.delete_bucket(&bucket).await
}

#[tokio::test]
async fn test_cannot_write_unversioned() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(5);
    let client = ctx.client();

    let err = ctx
        .set_versioning(&client, &bucket, VersioningStatus::Unversioned)
        .await
        .unwrap_err();
    assert!(!err.is_assertion());

    minio.delete_bucket(&bucket).await
}
