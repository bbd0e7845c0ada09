use actix_multipart::Multipart;
use actix_web::web;
use anyhow::Context;
use tracing::info;

use super::{requests::DeletePhotoRequest, responses::UploadResponse, utils::AdminSession};
use crate::{
    config::AppSettings,
    error::{ApiError, ApiResult},
    form::FormData,
    images::{photos, ImageHost, GALLERY_FOLDER},
    protocol::SimpleResponse,
    utils::non_blank,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_gallery_photo).service(delete_gallery_photo);
}

crate::api_funcs! {
    (post, upload_gallery_photo, "/gallery", CREATED, UploadResponse,
        (_session: AdminSession, host: web::Data<dyn ImageHost>, settings: web::Data<AppSettings>,
         payload: Multipart)),
    (delete, delete_gallery_photo, "/gallery", OK, SimpleResponse,
        (_session: AdminSession, host: web::Data<dyn ImageHost>, info: web::Json<DeletePhotoRequest>)),
}

async fn upload_gallery_photo_impl(
    _session: AdminSession,
    host: web::Data<dyn ImageHost>,
    settings: web::Data<AppSettings>,
    payload: Multipart,
) -> ApiResult<UploadResponse> {
    let mut form = FormData::read(payload, settings.max_upload_bytes).await?;
    let source = form
        .take_file("file")
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let photo = photos::upload(host.get_ref(), source, GALLERY_FOLDER).await?;
    info!(public_id = %photo.public_id, "uploaded gallery photo");

    Ok(UploadResponse {
        success: true,
        err: "".to_string(),
        photo,
    })
}

async fn delete_gallery_photo_impl(
    _session: AdminSession,
    host: web::Data<dyn ImageHost>,
    info: web::Json<DeletePhotoRequest>,
) -> ApiResult<SimpleResponse> {
    let public_id = non_blank(info.into_inner().public_id)
        .ok_or_else(|| ApiError::bad_request("No public_id provided"))?;

    host.destroy(&public_id)
        .await
        .context("Failed to delete photo")?;
    info!(public_id = %public_id, "deleted gallery photo");

    Ok(SimpleResponse::ok())
}
