use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    images::{HostedImage, Photo},
    models::staff::StaffData,
    protocol::AchievementItem,
};

/// What an anonymous verification may see of a staff record.
#[derive(Serialize, Debug)]
pub struct VerifiedStaff {
    pub name: String,
    pub staff_id: i32,
    pub join_date: Option<NaiveDate>,
    pub designation: String,
    pub dob: NaiveDate,
    pub guardian_name: String,
    pub address: String,
    pub photo: Option<Photo>,
    pub work_duration: String,
    pub gender: String,
    pub qualification: String,
}

impl From<StaffData> for VerifiedStaff {
    fn from(data: StaffData) -> Self {
        Self {
            name: data.name,
            staff_id: data.staff_id,
            join_date: data.join_date,
            designation: data.designation,
            dob: data.dob,
            guardian_name: data.guardian_name,
            address: data.address,
            photo: Photo::from_columns(data.photo_public_id, data.photo_url),
            work_duration: data.work_duration,
            gender: data.gender,
            qualification: data.qualification,
        }
    }
}

#[derive(Serialize, Debug, Default, PartialEq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

#[derive(Serialize, Default)]
pub struct AchievementPageResponse {
    pub success: bool,
    pub err: String,
    pub data: Vec<AchievementItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, Default)]
pub struct GalleryResponse {
    pub success: bool,
    pub err: String,
    pub photos: Vec<HostedImage>,
}

crate::impl_err_response! {
    AchievementPageResponse,
    GalleryResponse,
}
