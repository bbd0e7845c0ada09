use crate::schema::students;
use chrono::NaiveDate;
use diesel::prelude::*;

#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct StudentData {
    pub id: i32,
    pub roll_no: String,
    pub full_name: String,
    pub gender: String,
    pub guardian_name: String,
    pub phone_number: String,
    pub dob: NaiveDate,
    pub joining_date: NaiveDate,
    pub farewell_date: Option<NaiveDate>,
    pub course: String,
    pub course_duration: String,
    pub address: String,
    pub certificate: bool,
    pub photo_public_id: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent {
    pub roll_no: String,
    pub full_name: String,
    pub gender: String,
    pub guardian_name: String,
    pub phone_number: String,
    pub dob: NaiveDate,
    pub joining_date: NaiveDate,
    pub farewell_date: Option<NaiveDate>,
    pub course: String,
    pub course_duration: String,
    pub address: String,
    pub certificate: bool,
    pub photo_public_id: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(AsChangeset, Default, Clone)]
#[diesel(table_name = students)]
pub struct UpdateStudent {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub guardian_name: Option<String>,
    pub phone_number: Option<String>,
    pub dob: Option<NaiveDate>,
    pub joining_date: Option<NaiveDate>,
    pub farewell_date: Option<Option<NaiveDate>>,
    pub course: Option<String>,
    pub course_duration: Option<String>,
    pub address: Option<String>,
    pub certificate: Option<bool>,
}

impl UpdateStudent {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.gender.is_none()
            && self.guardian_name.is_none()
            && self.phone_number.is_none()
            && self.dob.is_none()
            && self.joining_date.is_none()
            && self.farewell_date.is_none()
            && self.course.is_none()
            && self.course_duration.is_none()
            && self.address.is_none()
            && self.certificate.is_none()
    }
}

/// Roll numbers are the four-digit year followed by a sequence that restarts every year.
pub fn next_roll_no<S: AsRef<str>>(year: i32, existing: &[S]) -> String {
    let prefix = year.to_string();
    let last = existing
        .iter()
        .filter_map(|roll_no| roll_no.as_ref().strip_prefix(prefix.as_str()))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix, last + 1)
}
