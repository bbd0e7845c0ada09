use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    images::Photo,
    models::{achievements::Achievement, staff::StaffData, students::StudentData},
};

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

/// Single-record payload. `data` is left out of error bodies.
#[derive(Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub err: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            err: "".to_string(),
            data: Some(data),
        }
    }

    pub fn err<S: ToString>(err: S) -> Self {
        Self {
            success: false,
            err: err.to_string(),
            data: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaffItem {
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
    pub photo: Option<Photo>,
}

impl From<StaffData> for StaffItem {
    fn from(data: StaffData) -> Self {
        Self {
            staff_id: data.staff_id,
            name: data.name,
            designation: data.designation,
            dob: data.dob,
            join_date: data.join_date,
            leave_date: data.leave_date,
            guardian_name: data.guardian_name,
            address: data.address,
            work_duration: data.work_duration,
            gender: data.gender,
            qualification: data.qualification,
            photo: Photo::from_columns(data.photo_public_id, data.photo_url),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudentItem {
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
    pub photo: Option<Photo>,
}

impl From<StudentData> for StudentItem {
    fn from(data: StudentData) -> Self {
        Self {
            roll_no: data.roll_no,
            full_name: data.full_name,
            gender: data.gender,
            guardian_name: data.guardian_name,
            phone_number: data.phone_number,
            dob: data.dob,
            joining_date: data.joining_date,
            farewell_date: data.farewell_date,
            course: data.course,
            course_duration: data.course_duration,
            address: data.address,
            certificate: data.certificate,
            photo: Photo::from_columns(data.photo_public_id, data.photo_url),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AchievementItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub photo: Photo,
    pub created_at: NaiveDateTime,
}

impl From<Achievement> for AchievementItem {
    fn from(data: Achievement) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            student_name: data.student_name,
            date: data.date,
            photo: Photo {
                public_id: data.photo_public_id,
                url: data.photo_url,
            },
            created_at: data.created_at,
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(SimpleResponse::err("Staff not found")).unwrap();
        assert_eq!(body, json!({ "success": false, "err": "Staff not found" }));

        let body = serde_json::to_value(DataResponse::<u32>::err("nope")).unwrap();
        assert_eq!(body, json!({ "success": false, "err": "nope" }));
    }

    #[test]
    fn test_data_body_shape() {
        let body = serde_json::to_value(DataResponse::ok(7)).unwrap();
        assert_eq!(body, json!({ "success": true, "err": "", "data": 7 }));
    }
}
