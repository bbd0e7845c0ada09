use serde::Deserialize;

use crate::images::Photo;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchByNameQuery {
    pub name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AddStaffRequest {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub dob: Option<String>,
    pub join_date: Option<String>,
    pub leave_date: Option<String>,
    #[serde(alias = "father_name", alias = "husband_name")]
    pub guardian_name: Option<String>,
    pub address: Option<String>,
    pub work_duration: Option<String>,
    pub gender: Option<String>,
    pub qualification: Option<String>,
    /// Reference to a photo the client already uploaded.
    pub photo: Option<Photo>,
    /// `data:` URI to upload on the client's behalf.
    pub photo_base64: Option<String>,
}

/// Absent fields stay as they are. An empty `join_date`/`leave_date` clears it.
#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct ModifyStaffRequest {
    pub staff_id: Option<i32>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub dob: Option<String>,
    pub join_date: Option<String>,
    pub leave_date: Option<String>,
    #[serde(alias = "father_name", alias = "husband_name")]
    pub guardian_name: Option<String>,
    pub address: Option<String>,
    pub work_duration: Option<String>,
    pub gender: Option<String>,
    pub qualification: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AddStudentRequest {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    #[serde(alias = "father_name")]
    pub guardian_name: Option<String>,
    pub phone_number: Option<String>,
    pub dob: Option<String>,
    pub joining_date: Option<String>,
    pub farewell_date: Option<String>,
    pub course: Option<String>,
    pub course_duration: Option<String>,
    pub address: Option<String>,
    pub certificate: Option<bool>,
    pub photo: Option<Photo>,
    pub photo_base64: Option<String>,
}

/// Absent fields stay as they are. An empty `farewell_date` clears it.
#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct ModifyStudentRequest {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    #[serde(alias = "father_name")]
    pub guardian_name: Option<String>,
    pub phone_number: Option<String>,
    pub dob: Option<String>,
    pub joining_date: Option<String>,
    pub farewell_date: Option<String>,
    pub course: Option<String>,
    pub course_duration: Option<String>,
    pub address: Option<String>,
    pub certificate: Option<bool>,
}

#[derive(Deserialize)]
pub struct DeletePhotoRequest {
    #[serde(default)]
    pub public_id: Option<String>,
}
