use actix_multipart::Multipart;
use actix_web::web;
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use super::utils::AdminSession;
use crate::{
    config::AppSettings,
    database::{assert, block, get_db_conn},
    error::{ApiError, ApiResult},
    form::FormData,
    images::{photos, ImageHost, Photo, ACHIEVEMENT_FOLDER},
    models::achievements::{Achievement, NewAchievement, UpdateAchievement},
    protocol::{AchievementItem, DataResponse, SimpleResponse},
    utils::parse_date_field,
    DbPool,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_achievements)
        .service(add_achievement)
        .service(modify_achievement)
        .service(delete_achievement);
}

crate::api_funcs! {
    (get, list_achievements, "/achievements", OK, DataResponse<Vec<AchievementItem>>,
        (_session: AdminSession, pool: web::Data<DbPool>)),
    (post, add_achievement, "/achievements", CREATED, DataResponse<AchievementItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         settings: web::Data<AppSettings>, payload: Multipart)),
    (put, modify_achievement, "/achievements/{id}", OK, DataResponse<AchievementItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         settings: web::Data<AppSettings>, path: web::Path<i32>, payload: Multipart)),
    (delete, delete_achievement, "/achievements/{id}", OK, SimpleResponse,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         path: web::Path<i32>)),
}

async fn list_achievements_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
) -> ApiResult<DataResponse<Vec<AchievementItem>>> {
    use crate::schema::achievements;

    let mut conn = get_db_conn(&pool)?;
    let list = block(move || {
        Ok(achievements::table
            .order((achievements::date.desc(), achievements::id.desc()))
            .load::<Achievement>(&mut conn)?)
    })
    .await?;

    Ok(DataResponse::ok(
        list.into_iter().map(AchievementItem::from).collect(),
    ))
}

async fn insert_achievement(
    pool: &web::Data<DbPool>,
    mut data: NewAchievement,
    photo: Photo,
) -> ApiResult<Achievement> {
    use crate::schema::achievements;

    data.photo_public_id = photo.public_id;
    data.photo_url = photo.url;

    let mut conn = get_db_conn(pool)?;
    block(move || {
        conn.transaction(|conn| {
            diesel::insert_into(achievements::table)
                .values(&data)
                .execute(conn)?;
            Ok(achievements::table
                .order(achievements::id.desc())
                .first::<Achievement>(conn)?)
        })
    })
    .await
}

async fn add_achievement_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    settings: web::Data<AppSettings>,
    payload: Multipart,
) -> ApiResult<DataResponse<AchievementItem>> {
    let mut form = FormData::read(payload, settings.max_upload_bytes).await?;
    let (title, description, student_name, date, source) = match (
        form.text("title"),
        form.text("description"),
        form.text("student_name"),
        form.text("date"),
        form.take_file("photo"),
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e)) => (a, b, c, d, e),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    let data = NewAchievement {
        title,
        description,
        student_name,
        date: parse_date_field(&date, "date")?,
        photo_public_id: String::new(),
        photo_url: String::new(),
        created_at: Utc::now().naive_utc(),
    };

    let record = photos::attach(host.get_ref(), source, ACHIEVEMENT_FOLDER, |photo| {
        insert_achievement(&pool, data, photo)
    })
    .await?;

    info!(id = record.id, "added achievement");
    Ok(DataResponse::ok(record.into()))
}

async fn update_achievement(
    pool: &web::Data<DbPool>,
    id: i32,
    mut update: UpdateAchievement,
    photo: Option<Photo>,
) -> ApiResult<Achievement> {
    use crate::schema::achievements;

    if let Some(photo) = photo {
        update.photo_public_id = Some(photo.public_id);
        update.photo_url = Some(photo.url);
    }

    let mut conn = get_db_conn(pool)?;
    block(move || {
        diesel::update(achievements::table.find(id))
            .set(&update)
            .execute(&mut conn)?;
        Ok(achievements::table.find(id).first::<Achievement>(&mut conn)?)
    })
    .await
}

async fn modify_achievement_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    settings: web::Data<AppSettings>,
    path: web::Path<i32>,
    payload: Multipart,
) -> ApiResult<DataResponse<AchievementItem>> {
    let record = assert::assert_achievement(&pool, path.into_inner()).await?;
    let mut form = FormData::read(payload, settings.max_upload_bytes).await?;

    let update = UpdateAchievement {
        title: form.text("title"),
        description: form.text("description"),
        student_name: form.text("student_name"),
        date: form
            .text("date")
            .map(|d| parse_date_field(&d, "date"))
            .transpose()?,
        ..Default::default()
    };

    let record = match form.take_file("photo") {
        Some(source) => {
            photos::replace(
                host.get_ref(),
                source,
                ACHIEVEMENT_FOLDER,
                Some(record.photo_public_id),
                |photo| update_achievement(&pool, record.id, update, Some(photo)),
            )
            .await?
        }
        None if update.is_empty() => return Err(ApiError::bad_request("No fields to update")),
        None => update_achievement(&pool, record.id, update, None).await?,
    };

    Ok(DataResponse::ok(record.into()))
}

async fn delete_achievement_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    path: web::Path<i32>,
) -> ApiResult<SimpleResponse> {
    use crate::schema::achievements;

    let record = assert::assert_achievement(&pool, path.into_inner()).await?;
    photos::discard(host.get_ref(), Some(&record.photo_public_id)).await;

    let id = record.id;
    let mut conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(achievements::table.find(id)).execute(&mut conn)?;
        Ok(())
    })
    .await?;

    info!(id, "deleted achievement");
    Ok(SimpleResponse::ok())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_auth, init_app, multipart_body, test_pool, FakeHost};
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    const FIELDS: &[(&str, &str)] = &[
        ("title", "Best Bridal Look"),
        ("description", "First place at the state championship"),
        ("student_name", "Priya Sharma"),
        ("date", "2026-02-14"),
    ];

    #[actix_web::test]
    async fn test_add_and_list_achievements() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let (content_type, payload) = multipart_body(FIELDS, &[("photo", "win.jpg", b"jpeg")]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["title"], "Best Bridal Look");
        assert_eq!(body["data"]["date"], "2026-02-14");
        assert_eq!(body["data"]["photo"]["public_id"], "achievements/img1");

        let mut older = FIELDS.to_vec();
        older[3] = ("date", "2025-11-02");
        let (content_type, payload) = multipart_body(&older, &[("photo", "old.jpg", b"jpeg")]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let dates: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["date"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["2026-02-14", "2025-11-02"]);
    }

    #[actix_web::test]
    async fn test_add_achievement_needs_every_field() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let (content_type, payload) = multipart_body(FIELDS, &[]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["err"], "Missing required fields");

        let (content_type, payload) =
            multipart_body(&FIELDS[..3], &[("photo", "win.jpg", b"jpeg")]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert!(host.uploaded().is_empty());
    }

    #[actix_web::test]
    async fn test_modify_achievement_replaces_photo() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let (content_type, payload) = multipart_body(FIELDS, &[("photo", "win.jpg", b"jpeg")]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/admin/achievements/{}", body["data"]["id"]);

        let (content_type, payload) = multipart_body(&[("title", "Runner Up")], &[]);
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Runner Up");
        assert_eq!(body["data"]["student_name"], "Priya Sharma");

        host.fail_destroys(true);
        let (content_type, payload) = multipart_body(&[], &[("photo", "new.jpg", b"jpeg")]);
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["photo"]["public_id"], "achievements/img2");
        assert_eq!(host.destroy_attempts(), vec!["achievements/img1".to_string()]);

        let (content_type, payload) = multipart_body(&[("title", "Ghost")], &[]);
        let req = test::TestRequest::put()
            .uri("/api/admin/achievements/999")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_achievement() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let (content_type, payload) = multipart_body(FIELDS, &[("photo", "win.jpg", b"jpeg")]);
        let req = test::TestRequest::post()
            .uri("/api/admin/achievements")
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/admin/achievements/{}", body["data"]["id"]);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(host.destroyed(), vec!["achievements/img1".to_string()]);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
