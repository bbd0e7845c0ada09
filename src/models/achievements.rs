use crate::schema::achievements;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct Achievement {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub photo_public_id: String,
    pub photo_url: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = achievements)]
pub struct NewAchievement {
    pub title: String,
    pub description: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub photo_public_id: String,
    pub photo_url: String,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = achievements)]
pub struct UpdateAchievement {
    pub title: Option<String>,
    pub description: Option<String>,
    pub student_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub photo_public_id: Option<String>,
    pub photo_url: Option<String>,
}

impl UpdateAchievement {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.student_name.is_none()
            && self.date.is_none()
            && self.photo_public_id.is_none()
            && self.photo_url.is_none()
    }
}
