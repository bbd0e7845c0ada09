use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use actix_web::web;
use anyhow::bail;
use async_trait::async_trait;

use crate::{
    database::init_pool,
    images::{HostedImage, ImageHost, ImageSource, Photo},
    DbPool,
};

pub const TEST_UPLOAD_LIMIT: usize = 1024 * 1024;

/// In-memory image host that records what it was asked to do.
#[derive(Debug, Default)]
pub struct FakeHost {
    next_id: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_destroys: AtomicBool,
    uploaded: Mutex<Vec<(String, String)>>,
    destroy_attempts: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn data(self: &Arc<Self>) -> web::Data<dyn ImageHost> {
        web::Data::from(self.clone() as Arc<dyn ImageHost>)
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroys.store(fail, Ordering::SeqCst);
    }

    /// Public ids of every successful upload, oldest first.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn destroy_attempts(&self) -> Vec<String> {
        self.destroy_attempts.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeHost {
    async fn upload(&self, source: ImageSource, folder: &str) -> anyhow::Result<Photo> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            bail!("upload refused");
        }
        if let ImageSource::Bytes { data, .. } = &source {
            if data.is_empty() {
                bail!("empty file");
            }
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("{}/img{}", folder, n);
        let url = format!("https://images.test/{}.jpg", public_id);
        self.uploaded
            .lock()
            .unwrap()
            .push((public_id.clone(), folder.to_string()));
        Ok(Photo { public_id, url })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        self.destroy_attempts
            .lock()
            .unwrap()
            .push(public_id.to_string());
        if self.fail_destroys.load(Ordering::SeqCst) {
            bail!("destroy refused");
        }
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }

    async fn list(&self, folder: &str, max_results: u32) -> anyhow::Result<Vec<HostedImage>> {
        let destroyed = self.destroyed();
        Ok(self
            .uploaded
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(id, f)| f == folder && !destroyed.contains(id))
            .take(max_results as usize)
            .map(|(id, _)| HostedImage {
                public_id: id.clone(),
                url: format!("https://images.test/{}.jpg", id),
                width: 800,
                height: 600,
                created_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .collect())
    }
}

/// Single-connection pool over a private in-memory database.
pub fn test_pool() -> DbPool {
    crate::logging::init_test_logging();

    init_pool(":memory:", 1).expect("Failed to create pool")
}

pub fn image_source() -> ImageSource {
    ImageSource::Bytes {
        data: vec![0xff, 0xd8, 0xff, 0xe0],
        file_name: "photo.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    }
}

/// Hand-rolled `multipart/form-data` body. Files are `(field, file_name, bytes)`.
pub fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "----salon-test-boundary";

    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Builds the full service with the given pool and fake host.
macro_rules! init_app {
    ($pool:expr, $host:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data($host.data())
                .app_data(actix_web::web::Data::new($crate::config::AppSettings {
                    login_ttl_secs: 3600,
                    max_upload_bytes: $crate::test_utils::TEST_UPLOAD_LIMIT,
                }))
                .app_data($crate::json_config($crate::test_utils::TEST_UPLOAD_LIMIT))
                .configure($crate::routes),
        )
        .await
    };
}

/// Registers the bootstrap admin and returns its bearer header value.
macro_rules! admin_auth {
    ($app:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/admin/register")
            .set_json(serde_json::json!({
                "name": "Owner",
                "email": "owner@salon.test",
                "password": "hunter22",
            }))
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        format!("Bearer {}", body["data"]["token"].as_str().unwrap())
    }};
}

pub(crate) use admin_auth;
pub(crate) use init_app;
