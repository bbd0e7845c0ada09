use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use anyhow::anyhow;
use chrono::Utc;
use diesel::prelude::*;
use futures_util::future::LocalBoxFuture;

use crate::{
    config::AppSettings,
    database::{block, get_db_conn},
    error::{ApiError, ApiResult},
    models::admin_logins::AdminLoginData,
    utils::get_bearer_token,
    DbPool,
};

const DEFAULT_LOGIN_TTL_SECS: i64 = 3600;

pub async fn get_admin_from_token(
    token: String,
    pool: &web::Data<DbPool>,
    max_login_secs: i64,
) -> ApiResult<i32> {
    use crate::schema::admin_logins;

    let mut conn = get_db_conn(pool)?;
    let data = block(move || {
        Ok(admin_logins::table
            .filter(admin_logins::token.eq(token))
            .first::<AdminLoginData>(&mut conn)
            .optional()?)
    })
    .await?;

    if let Some(data) = data {
        let time_diff = Utc::now()
            .naive_utc()
            .signed_duration_since(data.login_time);
        if time_diff.num_seconds() <= max_login_secs {
            Ok(data.admin_id)
        } else {
            Err(ApiError::unauthorized("Login has expired"))
        }
    } else {
        Err(ApiError::unauthorized("No such login token"))
    }
}

/// A live admin login, taken from the bearer token of the request.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: i32,
    pub token: String,
}

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let pool = req
                .app_data::<web::Data<DbPool>>()
                .cloned()
                .ok_or_else(|| ApiError::from(anyhow!("DB pool is not configured")))?;
            let max_login_secs = req
                .app_data::<web::Data<AppSettings>>()
                .map_or(DEFAULT_LOGIN_TTL_SECS, |settings| settings.login_ttl_secs);

            let token = get_bearer_token(&req)?;
            let admin_id = get_admin_from_token(token.clone(), &pool, max_login_secs).await?;
            Ok(AdminSession { admin_id, token })
        })
    }
}
