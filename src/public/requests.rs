use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct VerifyRequest {
    /// Either a JSON number or a numeric string.
    #[serde(alias = "staffID", alias = "StaffID")]
    pub staff_id: Option<Value>,
    #[serde(alias = "DOB")]
    pub dob: Option<String>,
}

/// Raw listing parameters. Unparsable values fall back to the defaults.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AchievementListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<String>,
    pub search: Option<String>,
}
