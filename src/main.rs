#[macro_use]
extern crate diesel;

mod admin;
mod config;
mod database;
mod error;
mod form;
mod images;
mod logging;
mod models;
mod protocol;
mod public;
mod schema;
#[cfg(test)]
mod test_utils;
mod utils;

use std::sync::Arc;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, SqliteConnection};
use tracing::info;

use crate::{
    config::Config,
    error::ApiError,
    images::{Cloudinary, ImageHost},
};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Every API route. Admin routes must be registered before the wider `/api` scope.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/admin").configure(admin::config))
        .service(web::scope("/api").configure(public::config));
}

/// JSON bodies up to `limit` bytes; malformed ones get the usual error envelope.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let pool = database::init_pool(&config.database_url, config.pool_size)?;
    let host: Arc<dyn ImageHost> = Arc::new(Cloudinary::new(config.cloudinary.clone()));
    let host = web::Data::from(host);
    let settings = web::Data::new(config.app_settings());
    let static_dir = config.static_dir.clone();

    info!(bind = %config.bind_addr, database = %config.database_url, "starting server");

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(host.clone())
            .app_data(settings.clone())
            .app_data(json_config(settings.max_upload_bytes))
            .configure(routes);

        // front-end build, served last so it never shadows the API
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("Failed to bind {}", config.bind_addr))?
    .run()
    .await
    .context("Server error")
}
