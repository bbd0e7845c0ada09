/// Generates the actix route for each `<name>_impl` function.
///
/// `Ok` bodies are sent with `$status`, errors with the error's own status and
/// an envelope built by `$response::err`.
#[macro_export]
macro_rules! api_funcs {
    ( $( ( $method:ident, $func_name:ident, $url:literal, $status:ident, $response:ty,
           ( $( $arg:ident : $arg_ty:ty ),* $(,)? ) ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[actix_web::$method($url)]
                async fn $func_name( $( $arg: $arg_ty ),* ) -> actix_web::HttpResponse {
                    use actix_web::ResponseError;

                    match [<$func_name _impl>]( $( $arg ),* ).await {
                        Ok(response) => {
                            actix_web::HttpResponse::build(actix_web::http::StatusCode::$status)
                                .json(response)
                        }
                        Err(err) => {
                            let status = err.status_code();
                            if status.is_server_error() {
                                tracing::error!(
                                    handler = stringify!($func_name),
                                    error = %format!("{:#}", err),
                                    "request failed"
                                );
                            } else {
                                tracing::debug!(handler = stringify!($func_name), error = %err, "request rejected");
                            }
                            actix_web::HttpResponse::build(status).json(<$response>::err(err.to_string()))
                        }
                    }
                }
            }
        )+
    };
}

use actix_web::{http::header, HttpRequest};
use anyhow::Context;
use blake2::{Blake2b512, Digest};
use chrono::{DateTime, NaiveDate};

use crate::{
    error::{ApiError, ApiResult},
    models::staff::{QUALIFICATIONS, WORK_DURATIONS},
};

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];

/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp (its date part).
pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    const DATE_FMT: &str = "%Y-%m-%d";

    let s = s.as_ref().trim();
    match NaiveDate::parse_from_str(s, DATE_FMT) {
        Ok(date) => Ok(date),
        Err(_) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.date_naive())
            .with_context(|| format!("Invalid date {:?}", s)),
    }
}

pub fn parse_date_field(value: &str, field: &str) -> ApiResult<NaiveDate> {
    parse_date_str(value).map_err(|_| ApiError::bad_request(format!("Invalid date format for {}", field)))
}

/// `None` for absent or blank values.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// LIKE pattern matching `s` anywhere, with `\` as the escape character.
pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    let mut pattern = String::from("%");
    for c in s.as_ref().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}

fn assert_one_of(value: &str, allowed: &[&str], field: &str) -> ApiResult<()> {
    if !allowed.contains(&value) {
        return Err(ApiError::bad_request(format!(
            "{} must be one of: {}",
            field,
            allowed.join(", ")
        )));
    }
    Ok(())
}

pub fn assert_gender_str(gender: &str) -> ApiResult<()> {
    assert_one_of(gender, GENDERS, "gender")
}

pub fn assert_duration_str(duration: &str, field: &str) -> ApiResult<()> {
    assert_one_of(duration, WORK_DURATIONS, field)
}

pub fn assert_qualification_str(qualification: &str) -> ApiResult<()> {
    assert_one_of(qualification, QUALIFICATIONS, "qualification")
}

pub fn assert_phone_str(phone: &str) -> ApiResult<()> {
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::bad_request("Enter a valid 10-digit phone number"));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Blake2b512::digest(password.as_bytes()))
}

pub fn generate_login_token(email: &str, role: &str) -> String {
    let nonce = uuid::Uuid::new_v4();
    format!(
        "{:x}",
        Blake2b512::digest(format!("{}:{}:{}", role, email, nonce).as_bytes())
    )
}

/// The token of an `Authorization: Bearer <token>` header.
pub fn get_bearer_token(req: &HttpRequest) -> ApiResult<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("You are not logged in"))
}
