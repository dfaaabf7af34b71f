//! Error classification on real responses


use common::*;
use s3_probe::classify::{classify, codes, expect_error_code, Classification};

#[tokio::test]
async fn test_missing_bucket_is_no_such_bucket() -> anyhow::Result<()> {
    let minio = minio().await;
    let mut ctx = minio.context(21);
    let client = ctx.client();
    let bucket = ctx.scratch_bucket_name();

    let outcome = client.get_bucket_location().bucket(&bucket).send().await;
    let err = outcome.as_ref().unwrap_err();

    assert_eq!(
        classify(err),
        Classification::Recognized {
            code: codes::NO_SUCH_BUCKET.to_string(),
            status: 404,
        }
    );
    expect_error_code("GetBucketLocation", outcome, codes::NO_SUCH_BUCKET)?;
    Ok(())
}

#[tokio::test]
async fn test_wrong_code_is_assertion() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(22);
    let client = ctx.client();

    let outcome = client
        .get_object()
        .bucket(&bucket)
        .key("absent")
        .send()
        .await;
    let err = expect_error_code("GetObject", outcome, codes::NO_SUCH_UPLOAD).unwrap_err();

    assert!(err.is_assertion(), "{:?}", err);
    assert!(err.to_string().contains("found NoSuchKey (HTTP 404)"), "{}", err);

    minio.delete_bucket(&bucket).await
}

#[tokio::test]
async fn test_success_where_error_expected() -> anyhow::Result<()> {
    let minio = minio().await;
    let bucket = minio.create_bucket().await?;
    let ctx = minio.context(23);
    let client = ctx.client();

    let outcome = client.get_bucket_location().bucket(&bucket).send().await;
    let err = expect_error_code("GetBucketLocation", outcome, codes::NO_SUCH_BUCKET).unwrap_err();

    assert!(err.is_assertion());
    assert!(err.to_string().contains("but call succeeded"), "{}", err);

    minio.delete_bucket(&bucket).await
}
