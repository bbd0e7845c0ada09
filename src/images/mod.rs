//! Remote object store for photos.
//!
//! Records only ever keep the `public_id` and `url` a host hands back; the
//! bytes live with the host. Everything that talks to the host goes through
//! [`ImageHost`] so handlers can be exercised against an in-process fake.

pub mod cloudinary;
pub mod photos;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::cloudinary::Cloudinary;

pub const GALLERY_FOLDER: &str = "Gallery";
pub const STAFF_FOLDER: &str = "staff-photos";
pub const STUDENT_FOLDER: &str = "student-photos";
pub const ACHIEVEMENT_FOLDER: &str = "achievements";

/// Newest-first cap for gallery listings.
pub const GALLERY_MAX_RESULTS: u32 = 100;

/// Reference to an object stored with the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub public_id: String,
    pub url: String,
}

impl Photo {
    /// Rebuilds a reference from the two nullable columns a record stores.
    pub fn from_columns(public_id: Option<String>, url: Option<String>) -> Option<Self> {
        match (public_id, url) {
            (Some(public_id), Some(url)) => Some(Self { public_id, url }),
            (None, Some(url)) => Some(Self {
                public_id: String::new(),
                url,
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostedImage {
    pub public_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub created_at: String,
}

#[derive(Clone, Debug)]
pub enum ImageSource {
    Bytes {
        data: Vec<u8>,
        file_name: String,
        content_type: String,
    },
    /// A `data:<mime>;base64,...` URI, passed to the host as-is.
    DataUri(String),
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, source: ImageSource, folder: &str) -> anyhow::Result<Photo>;

    /// Deleting an object the host no longer has is not an error.
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()>;

    async fn list(&self, folder: &str, max_results: u32) -> anyhow::Result<Vec<HostedImage>>;
}
