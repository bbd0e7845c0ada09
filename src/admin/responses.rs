use serde::Serialize;

use crate::images::Photo;

#[derive(Serialize, Debug)]
pub struct AuthItem {
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

/// Gallery upload result; the photo fields sit beside the envelope.
#[derive(Serialize, Debug, Default)]
pub struct UploadResponse {
    pub success: bool,
    pub err: String,
    #[serde(flatten)]
    pub photo: Photo,
}

crate::impl_err_response! {
    UploadResponse,
}
