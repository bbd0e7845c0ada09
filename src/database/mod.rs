pub mod assert;
mod schema_sql;

use crate::{error::ApiResult, DbPool};
use actix_web::web;
use anyhow::Context;
use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection},
    sql_types::Text,
    SqliteConnection,
};
use r2d2::PooledConnection;

pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

diesel::define_sql_function! {
    /// Unicode lowercase, for case-insensitive matching beyond ASCII.
    fn fold_case(text: Text) -> Text;
}

#[derive(Debug)]
struct SqliteSetup;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)?;
        fold_case_utils::register_impl(conn, |text: String| text.to_lowercase())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool and makes sure every table exists.
pub fn init_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqliteSetup))
        .build(manager)
        .context("Failed to create pool")?;

    let mut conn = pool.get().context("DB connection")?;
    create_tables(&mut conn)?;

    Ok(pool)
}

pub fn create_tables(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    for statement in schema_sql::SCHEMA_STATEMENTS {
        conn.batch_execute(statement)
            .context("Failed to create schema")?;
    }
    Ok(())
}

pub fn get_db_conn(pool: &web::Data<DbPool>) -> anyhow::Result<DbConn> {
    pool.get().context("DB connection")
}

/// Runs diesel work on the blocking thread pool.
pub async fn block<F, R>(f: F) -> ApiResult<R>
where
    F: FnOnce() -> ApiResult<R> + Send + 'static,
    R: Send + 'static,
{
    web::block(f).await.context("Blocking task failed")?
}
