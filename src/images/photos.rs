//! Attaching, replacing and detaching a record's photo.
//!
//! The record store and the host are never updated atomically. A failed upload
//! aborts before the record is touched; a failed record update after an upload
//! deletes the fresh upload; a failed delete of an old remote object is logged
//! and dropped, which can leave orphans on the host.

use std::future::Future;

use anyhow::Context;
use tracing::warn;

use super::{ImageHost, ImageSource, Photo};
use crate::error::ApiResult;

pub async fn upload(host: &dyn ImageHost, source: ImageSource, folder: &str) -> ApiResult<Photo> {
    let photo = host
        .upload(source, folder)
        .await
        .context("Failed to upload photo")?;
    Ok(photo)
}

/// Best-effort remote delete. Empty or missing ids are skipped.
pub async fn discard(host: &dyn ImageHost, public_id: Option<&str>) {
    let public_id = match public_id {
        Some(id) if !id.is_empty() => id,
        _ => return,
    };

    if let Err(err) = host.destroy(public_id).await {
        warn!(public_id, error = %format!("{:#}", err), "failed to delete remote photo");
    }
}

/// Uploads `source`, then hands the new reference to `mutate`.
pub async fn attach<F, Fut, T>(
    host: &dyn ImageHost,
    source: ImageSource,
    folder: &str,
    mutate: F,
) -> ApiResult<T>
where
    F: FnOnce(Photo) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let photo = upload(host, source, folder).await?;
    let public_id = photo.public_id.clone();

    match mutate(photo).await {
        Ok(result) => Ok(result),
        Err(err) => {
            discard(host, Some(&public_id)).await;
            Err(err)
        }
    }
}

/// Like [`attach`], dropping `previous` from the host once the record points at the new photo.
pub async fn replace<F, Fut, T>(
    host: &dyn ImageHost,
    source: ImageSource,
    folder: &str,
    previous: Option<String>,
    mutate: F,
) -> ApiResult<T>
where
    F: FnOnce(Photo) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let result = attach(host, source, folder, mutate).await?;
    discard(host, previous.as_deref()).await;
    Ok(result)
}

/// Runs the record mutation first; the remote delete only follows a successful one.
pub async fn detach<F, Fut, T>(host: &dyn ImageHost, previous: Option<String>, mutate: F) -> ApiResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let result = mutate().await?;
    discard(host, previous.as_deref()).await;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ApiError, test_utils::FakeHost};

    fn source() -> ImageSource {
        ImageSource::Bytes {
            data: vec![1, 2, 3],
            file_name: "a.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_attach_passes_new_photo() {
        let host = FakeHost::new();
        let photo = attach(&*host, source(), "staff-photos", |photo| async move {
            Ok(photo)
        })
        .await
        .unwrap();
        assert!(photo.public_id.starts_with("staff-photos/"));
        assert_eq!(host.uploaded().len(), 1);
        assert!(host.destroyed().is_empty());
    }

    #[actix_web::test]
    async fn test_failed_upload_skips_mutation() {
        let host = FakeHost::new();
        host.fail_uploads(true);
        let mut called = false;
        let res = attach(&*host, source(), "staff-photos", |_| {
            called = true;
            async { Ok(()) }
        })
        .await;
        assert!(res.is_err());
        assert!(!called);
    }

    #[actix_web::test]
    async fn test_failed_mutation_cleans_upload() {
        let host = FakeHost::new();
        let res: ApiResult<()> = attach(&*host, source(), "achievements", |_| async {
            Err(ApiError::bad_request("nope"))
        })
        .await;
        assert!(matches!(res, Err(ApiError::BadRequest(_))));
        assert_eq!(host.destroyed(), host.uploaded());
    }

    #[actix_web::test]
    async fn test_replace_swallows_delete_failure() {
        let host = FakeHost::new();
        host.fail_destroys(true);
        let photo = replace(
            &*host,
            source(),
            "staff-photos",
            Some("staff-photos/old".to_string()),
            |photo| async move { Ok(photo) },
        )
        .await
        .unwrap();
        assert_eq!(host.uploaded(), vec![photo.public_id]);
        assert_eq!(host.destroy_attempts(), vec!["staff-photos/old".to_string()]);
    }

    #[actix_web::test]
    async fn test_detach_skips_remote_when_mutation_fails() {
        let host = FakeHost::new();
        let res: ApiResult<()> = detach(&*host, Some("x".to_string()), || async {
            Err(ApiError::not_found("gone"))
        })
        .await;
        assert!(res.is_err());
        assert!(host.destroy_attempts().is_empty());
    }
}
