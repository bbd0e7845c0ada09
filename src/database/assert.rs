use actix_web::web;
use diesel::prelude::*;

use crate::{
    database::{block, get_db_conn},
    error::{ApiError, ApiResult},
    models::{achievements::Achievement, staff::StaffData, students::StudentData},
    DbPool,
};

pub async fn assert_staff(pool: &web::Data<DbPool>, staff_id: i32) -> ApiResult<StaffData> {
    use crate::schema::staff;

    let mut conn = get_db_conn(pool)?;
    let data = block(move || {
        Ok(staff::table
            .filter(staff::staff_id.eq(staff_id))
            .first::<StaffData>(&mut conn)
            .optional()?)
    })
    .await?;

    data.ok_or_else(|| ApiError::not_found("Staff not found"))
}

pub async fn assert_student(pool: &web::Data<DbPool>, roll_no: String) -> ApiResult<StudentData> {
    use crate::schema::students;

    let mut conn = get_db_conn(pool)?;
    let data = block(move || {
        Ok(students::table
            .filter(students::roll_no.eq(roll_no))
            .first::<StudentData>(&mut conn)
            .optional()?)
    })
    .await?;

    data.ok_or_else(|| ApiError::not_found("Student not found"))
}

pub async fn assert_achievement(pool: &web::Data<DbPool>, id: i32) -> ApiResult<Achievement> {
    use crate::schema::achievements;

    let mut conn = get_db_conn(pool)?;
    let data = block(move || {
        Ok(achievements::table
            .find(id)
            .first::<Achievement>(&mut conn)
            .optional()?)
    })
    .await?;

    data.ok_or_else(|| ApiError::not_found("Achievement not found"))
}
