use crate::schema::staff;
use chrono::NaiveDate;
use diesel::prelude::*;

pub const WORK_DURATIONS: &[&str] = &["3 Months", "6 Months", "1 Year"];
pub const QUALIFICATIONS: &[&str] = &["8th", "10th", "12th", "Graduated"];

/// Staff ids are handed out from here upwards.
pub const FIRST_STAFF_ID: i32 = 1000;

#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct StaffData {
    pub id: i32,
    pub staff_id: i32,
    pub name: String,
    pub designation: String,
    pub dob: NaiveDate,
    pub join_date: Option<NaiveDate>,
    pub leave_date: Option<NaiveDate>,
    pub guardian_name: String,
    pub address: String,
    pub work_duration: String,
    pub gender: String,
    pub qualification: String,
    pub photo_public_id: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = staff)]
pub struct NewStaff {
    pub staff_id: i32,
    pub name: String,
    pub designation: String,
    pub dob: NaiveDate,
    pub join_date: Option<NaiveDate>,
    pub leave_date: Option<NaiveDate>,
    pub guardian_name: String,
    pub address: String,
    pub work_duration: String,
    pub gender: String,
    pub qualification: String,
    pub photo_public_id: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(AsChangeset, Default, Clone)]
#[diesel(table_name = staff)]
pub struct UpdateStaff {
    pub staff_id: Option<i32>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub dob: Option<NaiveDate>,
    pub join_date: Option<Option<NaiveDate>>,
    pub leave_date: Option<Option<NaiveDate>>,
    pub guardian_name: Option<String>,
    pub address: Option<String>,
    pub work_duration: Option<String>,
    pub gender: Option<String>,
    pub qualification: Option<String>,
}

impl UpdateStaff {
    pub fn is_empty(&self) -> bool {
        self.staff_id.is_none()
            && self.name.is_none()
            && self.designation.is_none()
            && self.dob.is_none()
            && self.join_date.is_none()
            && self.leave_date.is_none()
            && self.guardian_name.is_none()
            && self.address.is_none()
            && self.work_duration.is_none()
            && self.gender.is_none()
            && self.qualification.is_none()
    }
}
