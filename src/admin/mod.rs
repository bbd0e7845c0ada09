mod achievements;
mod gallery;
mod requests;
mod responses;
mod staff;
mod students;
mod utils;

use crate::{
    database::{block, get_db_conn},
    error::{ApiError, ApiResult},
    models::{
        admin_logins::AdminLoginData,
        administrators::{AdminData, NewAdmin, ROLE_ADMIN},
    },
    protocol::{DataResponse, SimpleResponse},
    utils::{generate_login_token, hash_password, non_blank},
    DbPool,
};
use actix_web::web;
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use self::{requests::*, responses::*, utils::AdminSession};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .configure(staff::config)
        .configure(students::config)
        .configure(achievements::config)
        .configure(gallery::config);
}

crate::api_funcs! {
    (post, register, "/register", CREATED, DataResponse<AuthItem>,
        (session: Option<AdminSession>, pool: web::Data<DbPool>, info: web::Json<RegisterRequest>)),
    (post, login, "/login", OK, DataResponse<AuthItem>,
        (pool: web::Data<DbPool>, info: web::Json<LoginRequest>)),
    (post, logout, "/logout", OK, SimpleResponse,
        (session: AdminSession, pool: web::Data<DbPool>)),
}

fn issue_token(conn: &mut SqliteConnection, admin: &AdminData) -> ApiResult<String> {
    use crate::schema::admin_logins;

    let token = generate_login_token(&admin.email, &admin.role);
    let data = AdminLoginData {
        token: token.clone(),
        admin_id: admin.id,
        login_time: Utc::now().naive_utc(),
    };
    diesel::insert_into(admin_logins::table)
        .values(&data)
        .execute(conn)?;
    Ok(token)
}

async fn register_impl(
    session: Option<AdminSession>,
    pool: web::Data<DbPool>,
    info: web::Json<RegisterRequest>,
) -> ApiResult<DataResponse<AuthItem>> {
    use crate::schema::administrators;

    let info = info.into_inner();
    let authenticated = session.is_some();
    let mut conn = get_db_conn(&pool)?;
    let (admin, token) = block(move || {
        // Write lock up front so two bootstrap registrations cannot both see an empty table.
        conn.immediate_transaction(|conn| {
            // Open only until the first admin exists.
            let admins = administrators::table
                .count()
                .get_result::<i64>(conn)?;
            if !authenticated && admins > 0 {
                return Err(ApiError::unauthorized("You are not logged in"));
            }

            let (name, email, password) = match (
                non_blank(info.name),
                non_blank(info.email).map(|email| email.to_lowercase()),
                info.password.filter(|p| !p.is_empty()),
            ) {
                (Some(name), Some(email), Some(password)) => (name, email, password),
                _ => return Err(ApiError::bad_request("Name, email and password are required")),
            };

            let res = administrators::table
                .filter(administrators::email.eq(&email))
                .count()
                .get_result::<i64>(conn)?;
            if res > 0 {
                return Err(ApiError::bad_request("Admin already exists"));
            }

            let data = NewAdmin {
                name,
                email: email.clone(),
                password: hash_password(&password),
                role: ROLE_ADMIN.to_string(),
            };
            diesel::insert_into(administrators::table)
                .values(&data)
                .execute(conn)?;

            let admin = administrators::table
                .filter(administrators::email.eq(&email))
                .first::<AdminData>(conn)?;
            let token = issue_token(conn, &admin)?;
            Ok((admin, token))
        })
    })
    .await?;

    info!(admin = %admin.email, "registered admin");
    Ok(DataResponse::ok(AuthItem {
        name: admin.name,
        email: admin.email,
        role: admin.role,
        token,
    }))
}

async fn login_impl(
    pool: web::Data<DbPool>,
    info: web::Json<LoginRequest>,
) -> ApiResult<DataResponse<AuthItem>> {
    use crate::schema::administrators;

    let info = info.into_inner();
    let (email, password) = match (
        non_blank(info.email).map(|email| email.to_lowercase()),
        info.password.filter(|p| !p.is_empty()),
    ) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let mut conn = get_db_conn(&pool)?;
    let (admin, token) = block(move || {
        conn.transaction(|conn| {
            let admin = administrators::table
                .filter(administrators::email.eq(&email))
                .filter(administrators::password.eq(hash_password(&password)))
                .first::<AdminData>(conn)
                .optional()?
                .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;
            let token = issue_token(conn, &admin)?;
            Ok((admin, token))
        })
    })
    .await?;

    Ok(DataResponse::ok(AuthItem {
        name: admin.name,
        email: admin.email,
        role: admin.role,
        token,
    }))
}

async fn logout_impl(session: AdminSession, pool: web::Data<DbPool>) -> ApiResult<SimpleResponse> {
    use crate::schema::admin_logins;

    let mut conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(admin_logins::table.filter(admin_logins::token.eq(session.token)))
            .execute(&mut conn)?;
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}
