use serde::{Deserialize, Serialize};

/// Raw RSVP form fields as submitted. Everything is optional here; the
/// validator decides what is missing or malformed.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub attendance: Option<String>,
    pub vegetarian: Option<String>,
    pub plus_one: Option<String>,
    pub plus_one_first_name: Option<String>,
    pub plus_one_last_name: Option<String>,
    pub plus_one_vegetarian: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RsvpResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
