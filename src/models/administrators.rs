use crate::schema::administrators;
use diesel::prelude::*;

pub const ROLE_ADMIN: &str = "admin";

#[derive(Queryable)]
pub struct AdminData {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Insertable)]
#[diesel(table_name = administrators)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}
