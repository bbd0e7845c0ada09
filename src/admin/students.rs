use actix_multipart::Multipart;
use actix_web::web;
use chrono::{Datelike, Local};
use diesel::prelude::*;
use tracing::info;

use super::{requests::*, utils::AdminSession};
use crate::{
    config::AppSettings,
    database::{assert, block, fold_case, get_db_conn},
    error::{ApiError, ApiResult},
    form::FormData,
    images::{photos, ImageHost, ImageSource, Photo, STUDENT_FOLDER},
    models::students::{next_roll_no, NewStudent, StudentData, UpdateStudent},
    protocol::{DataResponse, SimpleResponse, StudentItem},
    utils::*,
    DbPool,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_students)
        .service(add_student)
        .service(get_student)
        .service(modify_student)
        .service(delete_student)
        .service(upload_student_photo)
        .service(delete_student_photo);
}

crate::api_funcs! {
    (get, list_students, "/students", OK, DataResponse<Vec<StudentItem>>,
        (_session: AdminSession, pool: web::Data<DbPool>, query: web::Query<SearchByNameQuery>)),
    (post, add_student, "/students", CREATED, DataResponse<StudentItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         info: web::Json<AddStudentRequest>)),
    (get, get_student, "/students/{roll_no}", OK, DataResponse<StudentItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, path: web::Path<String>)),
    (put, modify_student, "/students/{roll_no}", OK, DataResponse<StudentItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, path: web::Path<String>,
         info: web::Json<ModifyStudentRequest>)),
    (delete, delete_student, "/students/{roll_no}", OK, SimpleResponse,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         path: web::Path<String>)),
    (put, upload_student_photo, "/students/{roll_no}/photo", OK, DataResponse<StudentItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         settings: web::Data<AppSettings>, path: web::Path<String>, payload: Multipart)),
    (delete, delete_student_photo, "/students/{roll_no}/photo", OK, DataResponse<StudentItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         path: web::Path<String>)),
}

async fn list_students_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    query: web::Query<SearchByNameQuery>,
) -> ApiResult<DataResponse<Vec<StudentItem>>> {
    use crate::schema::students;

    let name = non_blank(query.into_inner().name).map(|n| n.to_lowercase());
    let pattern = get_str_pattern_opt(name);
    let mut conn = get_db_conn(&pool)?;
    let list = block(move || {
        Ok(students::table
            .filter(fold_case(students::full_name).like(pattern).escape('\\'))
            .order(students::roll_no.asc())
            .load::<StudentData>(&mut conn)?)
    })
    .await?;

    Ok(DataResponse::ok(list.into_iter().map(StudentItem::from).collect()))
}

async fn insert_student(
    pool: &web::Data<DbPool>,
    mut data: NewStudent,
    photo: Option<Photo>,
) -> ApiResult<StudentData> {
    use crate::schema::students;

    if let Some(photo) = photo {
        data.photo_public_id = Some(photo.public_id).filter(|id| !id.is_empty());
        data.photo_url = Some(photo.url);
    }

    let year = Local::now().year();
    let mut conn = get_db_conn(pool)?;
    block(move || {
        conn.transaction(|conn| {
            let existing = students::table
                .filter(students::roll_no.like(format!("{}%", year)))
                .select(students::roll_no)
                .load::<String>(conn)?;
            data.roll_no = next_roll_no(year, existing.as_slice());

            diesel::insert_into(students::table)
                .values(&data)
                .execute(conn)?;

            Ok(students::table
                .filter(students::roll_no.eq(&data.roll_no))
                .first::<StudentData>(conn)?)
        })
    })
    .await
}

async fn add_student_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    info: web::Json<AddStudentRequest>,
) -> ApiResult<DataResponse<StudentItem>> {
    let info = info.into_inner();
    let (full_name, gender, guardian_name, phone_number, dob, course, course_duration, address) =
        match (
            non_blank(info.full_name),
            non_blank(info.gender),
            non_blank(info.guardian_name),
            non_blank(info.phone_number),
            non_blank(info.dob),
            non_blank(info.course),
            non_blank(info.course_duration),
            non_blank(info.address),
        ) {
            (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f), Some(g), Some(h)) => {
                (a, b, c, d, e, f, g, h)
            }
            _ => return Err(ApiError::bad_request("Missing required fields")),
        };

    assert_gender_str(&gender)?;
    assert_phone_str(&phone_number)?;
    assert_duration_str(&course_duration, "course_duration")?;

    let data = NewStudent {
        roll_no: String::new(),
        full_name,
        gender,
        guardian_name,
        phone_number,
        dob: parse_date_field(&dob, "dob")?,
        joining_date: match non_blank(info.joining_date) {
            Some(d) => parse_date_field(&d, "joining_date")?,
            None => Local::now().date_naive(),
        },
        farewell_date: non_blank(info.farewell_date)
            .map(|d| parse_date_field(&d, "farewell_date"))
            .transpose()?,
        course,
        course_duration,
        address,
        certificate: info.certificate.unwrap_or(false),
        photo_public_id: None,
        photo_url: None,
    };

    let record = match (non_blank(info.photo_base64), info.photo) {
        (Some(uri), _) => {
            photos::attach(
                host.get_ref(),
                ImageSource::DataUri(uri),
                STUDENT_FOLDER,
                |photo| insert_student(&pool, data, Some(photo)),
            )
            .await?
        }
        (None, Some(photo)) if !photo.url.is_empty() => {
            insert_student(&pool, data, Some(photo)).await?
        }
        _ => insert_student(&pool, data, None).await?,
    };

    info!(roll_no = %record.roll_no, "added student");
    Ok(DataResponse::ok(record.into()))
}

async fn get_student_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> ApiResult<DataResponse<StudentItem>> {
    let record = assert::assert_student(&pool, path.into_inner()).await?;
    Ok(DataResponse::ok(record.into()))
}

fn build_student_update(info: ModifyStudentRequest) -> ApiResult<UpdateStudent> {
    let update = UpdateStudent {
        full_name: non_blank(info.full_name),
        gender: non_blank(info.gender),
        guardian_name: non_blank(info.guardian_name),
        phone_number: non_blank(info.phone_number),
        dob: non_blank(info.dob)
            .map(|d| parse_date_field(&d, "dob"))
            .transpose()?,
        joining_date: non_blank(info.joining_date)
            .map(|d| parse_date_field(&d, "joining_date"))
            .transpose()?,
        farewell_date: info
            .farewell_date
            .map(|d| non_blank(Some(d)).map(|d| parse_date_field(&d, "farewell_date")).transpose())
            .transpose()?,
        course: non_blank(info.course),
        course_duration: non_blank(info.course_duration),
        address: non_blank(info.address),
        certificate: info.certificate,
    };

    if let Some(gender) = &update.gender {
        assert_gender_str(gender)?;
    }
    if let Some(phone_number) = &update.phone_number {
        assert_phone_str(phone_number)?;
    }
    if let Some(course_duration) = &update.course_duration {
        assert_duration_str(course_duration, "course_duration")?;
    }

    Ok(update)
}

async fn modify_student_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    info: web::Json<ModifyStudentRequest>,
) -> ApiResult<DataResponse<StudentItem>> {
    use crate::schema::students;

    let roll_no = path.into_inner();
    let update = build_student_update(info.into_inner())?;
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let mut conn = get_db_conn(&pool)?;
    let record = block(move || {
        conn.transaction(|conn| {
            let current = students::table
                .filter(students::roll_no.eq(&roll_no))
                .first::<StudentData>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Student not found"))?;

            diesel::update(students::table.find(current.id))
                .set(&update)
                .execute(conn)?;

            Ok(students::table.find(current.id).first::<StudentData>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(record.into()))
}

async fn delete_student_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    path: web::Path<String>,
) -> ApiResult<SimpleResponse> {
    use crate::schema::students;

    let record = assert::assert_student(&pool, path.into_inner()).await?;
    photos::discard(host.get_ref(), record.photo_public_id.as_deref()).await;

    let id = record.id;
    let mut conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(students::table.find(id)).execute(&mut conn)?;
        Ok(())
    })
    .await?;

    info!(roll_no = %record.roll_no, "deleted student");
    Ok(SimpleResponse::ok())
}

async fn set_student_photo(
    pool: &web::Data<DbPool>,
    id: i32,
    photo: Option<Photo>,
) -> ApiResult<StudentData> {
    use crate::schema::students;

    let (public_id, url) = match photo {
        Some(photo) => (Some(photo.public_id), Some(photo.url)),
        None => (None, None),
    };

    let mut conn = get_db_conn(pool)?;
    block(move || {
        diesel::update(students::table.find(id))
            .set((
                students::photo_public_id.eq(public_id),
                students::photo_url.eq(url),
            ))
            .execute(&mut conn)?;
        Ok(students::table.find(id).first::<StudentData>(&mut conn)?)
    })
    .await
}

async fn upload_student_photo_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    settings: web::Data<AppSettings>,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<DataResponse<StudentItem>> {
    let mut form = FormData::read(payload, settings.max_upload_bytes).await?;
    let source = form
        .take_file("photo")
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let record = assert::assert_student(&pool, path.into_inner()).await?;

    let record = photos::replace(
        host.get_ref(),
        source,
        STUDENT_FOLDER,
        record.photo_public_id,
        |photo| set_student_photo(&pool, record.id, Some(photo)),
    )
    .await?;

    Ok(DataResponse::ok(record.into()))
}

async fn delete_student_photo_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    path: web::Path<String>,
) -> ApiResult<DataResponse<StudentItem>> {
    let record = assert::assert_student(&pool, path.into_inner()).await?;
    if record.photo_url.is_none() {
        return Err(ApiError::bad_request("Student has no photo"));
    }

    let record = photos::detach(host.get_ref(), record.photo_public_id, || {
        set_student_photo(&pool, record.id, None)
    })
    .await?;

    Ok(DataResponse::ok(record.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_auth, init_app, multipart_body, test_pool, FakeHost};
    use actix_web::{http::StatusCode, test};
    use chrono::{Datelike, Local};
    use serde_json::{json, Value};

    fn student_body(name: &str) -> Value {
        json!({
            "full_name": name,
            "gender": "Female",
            "father_name": "Suresh",
            "phone_number": "9876543210",
            "dob": "2004-02-29",
            "course": "Hair Styling",
            "course_duration": "6 Months",
            "address": "4 Lake Road",
        })
    }

    #[actix_web::test]
    async fn test_add_student_assigns_roll_numbers() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);
        let year = Local::now().year();

        for (i, name) in ["Priya Sharma", "Kavya Rao"].iter().enumerate() {
            let req = test::TestRequest::post()
                .uri("/api/admin/students")
                .insert_header(("Authorization", auth.as_str()))
                .set_json(student_body(name))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["data"]["roll_no"], format!("{}{:03}", year, i + 1));
            assert_eq!(body["data"]["certificate"], false);
            assert_eq!(
                body["data"]["joining_date"],
                Local::now().date_naive().to_string()
            );
        }

        let req = test::TestRequest::get()
            .uri("/api/admin/students?name=RAO")
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let list = body["data"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["full_name"], "Kavya Rao");

        let req = test::TestRequest::post()
            .uri("/api/admin/students")
            .insert_header(("Authorization", auth.as_str()))
            .set_json(student_body("Élise Roux"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/admin/students?name=%C3%A9LISE")
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let list = body["data"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["full_name"], "Élise Roux");
    }

    #[actix_web::test]
    async fn test_add_student_validation() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let mut missing = student_body("Priya");
        missing.as_object_mut().unwrap().remove("address");
        let mut bad_phone = student_body("Priya");
        bad_phone["phone_number"] = json!("12345");
        let mut bad_duration = student_body("Priya");
        bad_duration["course_duration"] = json!("2 Weeks");

        for body in [missing, bad_phone, bad_duration] {
            let req = test::TestRequest::post()
                .uri("/api/admin/students")
                .insert_header(("Authorization", auth.as_str()))
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_modify_and_delete_student() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let req = test::TestRequest::post()
            .uri("/api/admin/students")
            .insert_header(("Authorization", auth.as_str()))
            .set_json(student_body("Priya"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let roll_no = body["data"]["roll_no"].as_str().unwrap().to_string();
        let uri = format!("/api/admin/students/{}", roll_no);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .set_json(json!({ "certificate": true, "farewell_date": "2026-09-30" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["certificate"], true);
        assert_eq!(body["data"]["farewell_date"], "2026-09-30");

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .set_json(json!({ "phone_number": "abc" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let (content_type, payload) = multipart_body(&[], &[("photo", "p.jpg", b"jpeg")]);
        let req = test::TestRequest::put()
            .uri(&format!("{}/photo", uri))
            .insert_header(("Authorization", auth.as_str()))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["photo"]["public_id"], "student-photos/img1");

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(host.destroyed(), vec!["student-photos/img1".to_string()]);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", auth.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_invalid_student_skips_upload() {
        let pool = test_pool();
        let host = FakeHost::new();
        let app = init_app!(pool, host);
        let auth = admin_auth!(app);

        let mut body = student_body("Priya");
        body["photo_base64"] = json!("data:image/png;base64,iVBORw0KGgo=");
        body["dob"] = json!("not a date");
        let req = test::TestRequest::post()
            .uri("/api/admin/students")
            .insert_header(("Authorization", auth.as_str()))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert!(host.uploaded().is_empty());
    }
}
