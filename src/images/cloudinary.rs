use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::Deserialize;
use serde_json::json;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use super::{HostedImage, ImageHost, ImageSource, Photo};
use crate::config::CloudinaryConfig;

/// Client for the Cloudinary upload, destroy and search APIs.
#[derive(Clone, Debug)]
pub struct Cloudinary {
    client: Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct UploadResult {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct DestroyResult {
    result: String,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    resources: Vec<SearchResource>,
}

#[derive(Deserialize)]
struct SearchResource {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    created_at: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl Cloudinary {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.url_base.trim_end_matches('/'),
            self.config.cloud_name,
            path
        )
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.config.api_secret)
    }
}

/// Cloudinary request signature: the parameters sorted by name, joined as a
/// query string, with the API secret appended, hashed with SHA-1.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut params = params.to_vec();
    params.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha1::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

async fn check_status(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|body| body.error.message)
        .unwrap_or(body);
    bail!("Image host answered {}: {}", status, message)
}

#[async_trait]
impl ImageHost for Cloudinary {
    async fn upload(&self, source: ImageSource, folder: &str) -> anyhow::Result<Photo> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let file = match source {
            ImageSource::Bytes {
                data,
                file_name,
                content_type,
            } => Part::bytes(data)
                .file_name(file_name)
                .mime_str(&content_type)
                .context("Invalid content type")?,
            ImageSource::DataUri(uri) => Part::text(uri),
        };
        let form = Form::new()
            .part("file", file)
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await
            .context("Upload request failed")?;
        let result: UploadResult = check_status(response)
            .await?
            .json()
            .await
            .context("Malformed upload response")?;

        debug!(public_id = %result.public_id, "uploaded image");
        Ok(Photo {
            public_id: result.public_id,
            url: result.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let form = Form::new()
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("image/destroy"))
            .multipart(form)
            .send()
            .await
            .context("Destroy request failed")?;
        let result: DestroyResult = check_status(response)
            .await?
            .json()
            .await
            .context("Malformed destroy response")?;

        match result.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(public_id, "image already gone from host");
                Ok(())
            }
            other => bail!("Image host refused to delete {}: {}", public_id, other),
        }
    }

    async fn list(&self, folder: &str, max_results: u32) -> anyhow::Result<Vec<HostedImage>> {
        let query = json!({
            "expression": format!("resource_type:image AND folder:{}", folder),
            "sort_by": [{ "created_at": "desc" }],
            "max_results": max_results,
        });

        let response = self
            .client
            .post(self.endpoint("resources/search"))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .json(&query)
            .send()
            .await
            .context("Search request failed")?;
        let result: SearchResult = check_status(response)
            .await?
            .json()
            .await
            .context("Malformed search response")?;

        Ok(result
            .resources
            .into_iter()
            .map(|resource| HostedImage {
                public_id: resource.public_id,
                url: resource.secure_url,
                width: resource.width,
                height: resource.height,
                created_at: resource.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_sorts_params() {
        let a = sign_params(&[("timestamp", "1315060510"), ("folder", "Gallery")], "secret");
        let b = sign_params(&[("folder", "Gallery"), ("timestamp", "1315060510")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_signature_matches_documented_example() {
        // Example from the Cloudinary signing guide.
        let signature = sign_params(
            &[
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
                ("public_id", "sample_image"),
                ("timestamp", "1315060510"),
            ],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let host = Cloudinary::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            url_base: "https://api.cloudinary.com/v1_1/".to_string(),
        });
        assert_eq!(
            host.endpoint("image/upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
