//! Endpoints the marketing site calls without logging in.

mod requests;
mod responses;

use actix_web::web;
use anyhow::Context;
use diesel::{prelude::*, sqlite::Sqlite};
use serde_json::Value;

use crate::{
    database::{block, fold_case, get_db_conn},
    error::{ApiError, ApiResult},
    images::{ImageHost, GALLERY_FOLDER, GALLERY_MAX_RESULTS},
    models::{achievements::Achievement, staff::StaffData},
    protocol::{AchievementItem, DataResponse},
    schema::achievements,
    utils::{get_str_pattern, non_blank, parse_date_str},
    DbPool,
};

use self::{requests::*, responses::*};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `(page - 1) * limit` inside `i64`.
const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_staff)
        .service(list_achievements)
        .service(list_gallery);
}

crate::api_funcs! {
    (post, verify_staff, "/verification", OK, DataResponse<VerifiedStaff>,
        (pool: web::Data<DbPool>, info: web::Json<VerifyRequest>)),
    (get, list_achievements, "/achievements", OK, AchievementPageResponse,
        (pool: web::Data<DbPool>, query: web::Query<AchievementListQuery>)),
    (get, list_gallery, "/gallery", OK, GalleryResponse,
        (host: web::Data<dyn ImageHost>)),
}

fn parse_staff_id(value: &Value) -> Option<i32> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(id).ok()
}

async fn verify_staff_impl(
    pool: web::Data<DbPool>,
    info: web::Json<VerifyRequest>,
) -> ApiResult<DataResponse<VerifiedStaff>> {
    use crate::schema::staff;

    let info = info.into_inner();
    let (staff_id, dob) = match (
        info.staff_id.filter(|v| !v.is_null() && v.as_str() != Some("")),
        non_blank(info.dob),
    ) {
        (Some(staff_id), Some(dob)) => (staff_id, dob),
        _ => return Err(ApiError::bad_request("StaffID and DOB are required")),
    };

    let staff_id = parse_staff_id(&staff_id)
        .ok_or_else(|| ApiError::bad_request("StaffID must be a valid number"))?;
    let dob = parse_date_str(&dob).map_err(|_| ApiError::bad_request("Invalid date format for DOB"))?;

    let mut conn = get_db_conn(&pool)?;
    let data = block(move || {
        Ok(staff::table
            .filter(staff::staff_id.eq(staff_id))
            .filter(staff::dob.eq(dob))
            .first::<StaffData>(&mut conn)
            .optional()?)
    })
    .await?;

    let data = data.ok_or_else(|| ApiError::not_found("Invalid StaffID or DOB"))?;
    Ok(DataResponse::ok(data.into()))
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SortKey {
    Date,
    Title,
    StudentName,
    CreatedAt,
}

#[derive(Debug, PartialEq)]
struct ListParams {
    page: i64,
    limit: i64,
    sort_by: SortKey,
    ascending: bool,
    search: Option<String>,
}

impl From<AchievementListQuery> for ListParams {
    fn from(query: AchievementListQuery) -> Self {
        let number = |value: Option<String>| value.and_then(|v| v.trim().parse::<i64>().ok());

        Self {
            page: number(query.page).unwrap_or(1).clamp(1, MAX_PAGE),
            limit: number(query.limit)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            sort_by: match query.sort_by.as_deref().map(str::trim) {
                Some("title") => SortKey::Title,
                Some("student_name") | Some("studentName") => SortKey::StudentName,
                Some("created_at") | Some("createdAt") => SortKey::CreatedAt,
                _ => SortKey::Date,
            },
            ascending: number(query.sort_order) == Some(1),
            search: non_blank(query.search),
        }
    }
}

fn filtered_achievements(search: Option<&str>) -> achievements::BoxedQuery<'static, Sqlite> {
    let mut query = achievements::table.into_boxed();
    if let Some(search) = search {
        let pattern = get_str_pattern(search.to_lowercase());
        query = query.filter(
            fold_case(achievements::title)
                .like(pattern.clone())
                .escape('\\')
                .or(fold_case(achievements::student_name)
                    .like(pattern)
                    .escape('\\')),
        );
    }
    query
}

async fn list_achievements_impl(
    pool: web::Data<DbPool>,
    query: web::Query<AchievementListQuery>,
) -> ApiResult<AchievementPageResponse> {
    use crate::schema::achievements::dsl::*;

    let params = ListParams::from(query.into_inner());
    let (page, limit) = (params.page, params.limit);

    let mut conn = get_db_conn(&pool)?;
    let (total_items, list) = block(move || {
        let total_items = filtered_achievements(params.search.as_deref())
            .count()
            .get_result::<i64>(&mut conn)?;

        let query = filtered_achievements(params.search.as_deref());
        // id last, so equal keys keep a stable order across pages
        let query = match (params.sort_by, params.ascending) {
            (SortKey::Date, true) => query.order((date.asc(), id.asc())),
            (SortKey::Date, false) => query.order((date.desc(), id.desc())),
            (SortKey::Title, true) => query.order((title.asc(), id.asc())),
            (SortKey::Title, false) => query.order((title.desc(), id.desc())),
            (SortKey::StudentName, true) => query.order((student_name.asc(), id.asc())),
            (SortKey::StudentName, false) => query.order((student_name.desc(), id.desc())),
            (SortKey::CreatedAt, true) => query.order((created_at.asc(), id.asc())),
            (SortKey::CreatedAt, false) => query.order((created_at.desc(), id.desc())),
        };
        let list = query
            .offset((params.page - 1) * params.limit)
            .limit(params.limit)
            .load::<Achievement>(&mut conn)?;

        Ok((total_items, list))
    })
    .await?;

    Ok(AchievementPageResponse {
        success: true,
        err: "".to_string(),
        data: list.into_iter().map(AchievementItem::from).collect(),
        pagination: Pagination {
            current_page: page,
            total_pages: (total_items + limit - 1) / limit,
            total_items,
            items_per_page: limit,
        },
    })
}

async fn list_gallery_impl(host: web::Data<dyn ImageHost>) -> ApiResult<GalleryResponse> {
    let photos = host
        .list(GALLERY_FOLDER, GALLERY_MAX_RESULTS)
        .await
        .context("Failed to fetch photos")?;

    Ok(GalleryResponse {
        success: true,
        err: "".to_string(),
        photos,
    })
}
