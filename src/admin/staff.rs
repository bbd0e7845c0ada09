use actix_multipart::Multipart;
use actix_web::web;
use diesel::{dsl, prelude::*};
use tracing::info;

use super::{requests::*, utils::AdminSession};
use crate::{
    config::AppSettings,
    database::{assert, block, fold_case, get_db_conn},
    error::{ApiError, ApiResult},
    form::FormData,
    images::{photos, ImageHost, ImageSource, Photo, STAFF_FOLDER},
    models::staff::{NewStaff, StaffData, UpdateStaff, FIRST_STAFF_ID},
    protocol::{DataResponse, SimpleResponse, StaffItem},
    utils::*,
    DbPool,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_staff)
        .service(add_staff)
        .service(get_staff)
        .service(modify_staff)
        .service(delete_staff)
        .service(upload_staff_photo)
        .service(delete_staff_photo);
}

crate::api_funcs! {
    (get, list_staff, "/staff", OK, DataResponse<Vec<StaffItem>>,
        (_session: AdminSession, pool: web::Data<DbPool>, query: web::Query<SearchByNameQuery>)),
    (post, add_staff, "/staff", CREATED, DataResponse<StaffItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         info: web::Json<AddStaffRequest>)),
    (get, get_staff, "/staff/{staff_id}", OK, DataResponse<StaffItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, path: web::Path<i32>)),
    (put, modify_staff, "/staff/{staff_id}", OK, DataResponse<StaffItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, path: web::Path<i32>,
         info: web::Json<ModifyStaffRequest>)),
    (delete, delete_staff, "/staff/{staff_id}", OK, SimpleResponse,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         path: web::Path<i32>)),
    (put, upload_staff_photo, "/staff/{staff_id}/photo", OK, DataResponse<StaffItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         settings: web::Data<AppSettings>, path: web::Path<i32>, payload: Multipart)),
    (delete, delete_staff_photo, "/staff/{staff_id}/photo", OK, DataResponse<StaffItem>,
        (_session: AdminSession, pool: web::Data<DbPool>, host: web::Data<dyn ImageHost>,
         path: web::Path<i32>)),
}

async fn list_staff_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    query: web::Query<SearchByNameQuery>,
) -> ApiResult<DataResponse<Vec<StaffItem>>> {
    use crate::schema::staff;

    let name = non_blank(query.into_inner().name).map(|n| n.to_lowercase());
    let pattern = get_str_pattern_opt(name);
    let mut conn = get_db_conn(&pool)?;
    let list = block(move || {
        Ok(staff::table
            .filter(fold_case(staff::name).like(pattern).escape('\\'))
            .order(staff::staff_id.asc())
            .load::<StaffData>(&mut conn)?)
    })
    .await?;

    Ok(DataResponse::ok(list.into_iter().map(StaffItem::from).collect()))
}

async fn insert_staff(
    pool: &web::Data<DbPool>,
    mut data: NewStaff,
    photo: Option<Photo>,
) -> ApiResult<StaffData> {
    use crate::schema::staff;

    if let Some(photo) = photo {
        data.photo_public_id = Some(photo.public_id).filter(|id| !id.is_empty());
        data.photo_url = Some(photo.url);
    }

    let mut conn = get_db_conn(pool)?;
    block(move || {
        conn.transaction(|conn| {
            let max_id = staff::table
                .select(dsl::max(staff::staff_id))
                .first::<Option<i32>>(conn)?;
            data.staff_id = max_id
                .unwrap_or(FIRST_STAFF_ID)
                .checked_add(1)
                .ok_or_else(|| ApiError::bad_request("No staff IDs left"))?;

            diesel::insert_into(staff::table)
                .values(&data)
                .execute(conn)?;

            Ok(staff::table
                .filter(staff::staff_id.eq(data.staff_id))
                .first::<StaffData>(conn)?)
        })
    })
    .await
}

async fn add_staff_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    info: web::Json<AddStaffRequest>,
) -> ApiResult<DataResponse<StaffItem>> {
    let info = info.into_inner();
    let (name, designation, dob, work_duration, gender, qualification) = match (
        non_blank(info.name),
        non_blank(info.designation),
        non_blank(info.dob),
        non_blank(info.work_duration),
        non_blank(info.gender),
        non_blank(info.qualification),
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) => (a, b, c, d, e, f),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    assert_duration_str(&work_duration, "work_duration")?;
    assert_gender_str(&gender)?;
    assert_qualification_str(&qualification)?;

    let data = NewStaff {
        staff_id: 0,
        name,
        designation,
        dob: parse_date_field(&dob, "dob")?,
        join_date: non_blank(info.join_date)
            .map(|d| parse_date_field(&d, "join_date"))
            .transpose()?,
        leave_date: non_blank(info.leave_date)
            .map(|d| parse_date_field(&d, "leave_date"))
            .transpose()?,
        guardian_name: non_blank(info.guardian_name).unwrap_or_default(),
        address: non_blank(info.address).unwrap_or_default(),
        work_duration,
        gender,
        qualification,
        photo_public_id: None,
        photo_url: None,
    };

    let record = match (non_blank(info.photo_base64), info.photo) {
        (Some(uri), _) => {
            photos::attach(
                host.get_ref(),
                ImageSource::DataUri(uri),
                STAFF_FOLDER,
                |photo| insert_staff(&pool, data, Some(photo)),
            )
            .await?
        }
        (None, Some(photo)) if !photo.url.is_empty() => {
            insert_staff(&pool, data, Some(photo)).await?
        }
        _ => insert_staff(&pool, data, None).await?,
    };

    info!(staff_id = record.staff_id, "added staff");
    Ok(DataResponse::ok(record.into()))
}

async fn get_staff_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> ApiResult<DataResponse<StaffItem>> {
    let record = assert::assert_staff(&pool, path.into_inner()).await?;
    Ok(DataResponse::ok(record.into()))
}

fn build_staff_update(info: ModifyStaffRequest) -> ApiResult<UpdateStaff> {
    if info.staff_id.is_some_and(|id| id <= 0) {
        return Err(ApiError::bad_request("staff_id must be a positive number"));
    }

    let update = UpdateStaff {
        staff_id: info.staff_id,
        name: non_blank(info.name),
        designation: non_blank(info.designation),
        dob: non_blank(info.dob)
            .map(|d| parse_date_field(&d, "dob"))
            .transpose()?,
        join_date: info
            .join_date
            .map(|d| non_blank(Some(d)).map(|d| parse_date_field(&d, "join_date")).transpose())
            .transpose()?,
        leave_date: info
            .leave_date
            .map(|d| non_blank(Some(d)).map(|d| parse_date_field(&d, "leave_date")).transpose())
            .transpose()?,
        guardian_name: non_blank(info.guardian_name),
        address: non_blank(info.address),
        work_duration: non_blank(info.work_duration),
        gender: non_blank(info.gender),
        qualification: non_blank(info.qualification),
    };

    if let Some(work_duration) = &update.work_duration {
        assert_duration_str(work_duration, "work_duration")?;
    }
    if let Some(gender) = &update.gender {
        assert_gender_str(gender)?;
    }
    if let Some(qualification) = &update.qualification {
        assert_qualification_str(qualification)?;
    }

    Ok(update)
}

async fn modify_staff_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    info: web::Json<ModifyStaffRequest>,
) -> ApiResult<DataResponse<StaffItem>> {
    use crate::schema::staff;

    let staff_id = path.into_inner();
    let update = build_staff_update(info.into_inner())?;
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let mut conn = get_db_conn(&pool)?;
    let record = block(move || {
        conn.transaction(|conn| {
            let current = staff::table
                .filter(staff::staff_id.eq(staff_id))
                .first::<StaffData>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Staff not found"))?;

            if let Some(new_id) = update.staff_id.filter(|id| *id != staff_id) {
                let taken = staff::table
                    .filter(staff::staff_id.eq(new_id))
                    .count()
                    .get_result::<i64>(conn)?;
                if taken > 0 {
                    return Err(ApiError::bad_request("Staff ID already exists"));
                }
            }

            diesel::update(staff::table.find(current.id))
                .set(&update)
                .execute(conn)?;

            Ok(staff::table.find(current.id).first::<StaffData>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(record.into()))
}

async fn delete_staff_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    path: web::Path<i32>,
) -> ApiResult<SimpleResponse> {
    use crate::schema::staff;

    let record = assert::assert_staff(&pool, path.into_inner()).await?;
    photos::discard(host.get_ref(), record.photo_public_id.as_deref()).await;

    let mut conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(staff::table.find(record.id)).execute(&mut conn)?;
        Ok(())
    })
    .await?;

    info!(staff_id = record.staff_id, "deleted staff");
    Ok(SimpleResponse::ok())
}

async fn set_staff_photo(
    pool: &web::Data<DbPool>,
    id: i32,
    photo: Option<Photo>,
) -> ApiResult<StaffData> {
    use crate::schema::staff;

    let (public_id, url) = match photo {
        Some(photo) => (Some(photo.public_id), Some(photo.url)),
        None => (None, None),
    };

    let mut conn = get_db_conn(pool)?;
    block(move || {
        diesel::update(staff::table.find(id))
            .set((staff::photo_public_id.eq(public_id), staff::photo_url.eq(url)))
            .execute(&mut conn)?;
        Ok(staff::table.find(id).first::<StaffData>(&mut conn)?)
    })
    .await
}

async fn upload_staff_photo_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    settings: web::Data<AppSettings>,
    path: web::Path<i32>,
    payload: Multipart,
) -> ApiResult<DataResponse<StaffItem>> {
    let mut form = FormData::read(payload, settings.max_upload_bytes).await?;
    let source = form
        .take_file("photo")
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let record = assert::assert_staff(&pool, path.into_inner()).await?;

    let record = photos::replace(
        host.get_ref(),
        source,
        STAFF_FOLDER,
        record.photo_public_id,
        |photo| set_staff_photo(&pool, record.id, Some(photo)),
    )
    .await?;

    Ok(DataResponse::ok(record.into()))
}

async fn delete_staff_photo_impl(
    _session: AdminSession,
    pool: web::Data<DbPool>,
    host: web::Data<dyn ImageHost>,
    path: web::Path<i32>,
) -> ApiResult<DataResponse<StaffItem>> {
    let record = assert::assert_staff(&pool, path.into_inner()).await?;
    if record.photo_url.is_none() {
        return Err(ApiError::bad_request("Staff has no photo"));
    }

    let record = photos::detach(host.get_ref(), record.photo_public_id, || {
        set_staff_photo(&pool, record.id, None)
    })
    .await?;

    Ok(DataResponse::ok(record.into()))
}
