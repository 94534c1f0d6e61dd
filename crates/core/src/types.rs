use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};

/// Delimiter the care-tips endpoint places between narrative sections
pub const CARE_SECTION_DELIMITER: &str = "---SECTION---";

/// Profile of the logged-in patient as returned by `/api/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair issued by login and refresh
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Intake record in the exact shape `/api/intake/` accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub user_id: String,
    #[serde(rename = "primarySymptoms")]
    pub primary_symptoms: String,
    pub duration: String,
    #[serde(rename = "urgencyLevel")]
    pub urgency_level: String,
    pub severity: String,
    #[serde(rename = "detailedDescription")]
    pub detailed_description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(rename = "insuranceProvider")]
    pub insurance_provider: String,
    #[serde(rename = "insurancePlan")]
    pub insurance_plan: String,
    #[serde(rename = "memberId")]
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub wait_time: String,
    #[serde(default)]
    pub accepted_insurances: Vec<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub match_reasons: Option<Vec<String>>,
    #[serde(rename = "specialtyMatch", default, skip_serializing_if = "Option::is_none")]
    pub specialty_match: Option<JsonValue>,
}

/// Filters for `/api/providers/match/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMatchQuery {
    pub symptoms: Vec<String>,
    pub insurance: Option<String>,
    pub location: Option<String>,
    pub urgency: Option<String>,
    pub limit: u32,
}

impl Default for ProviderMatchQuery {
    fn default() -> Self {
        Self {
            symptoms: Vec::new(),
            insurance: None,
            location: None,
            urgency: None,
            limit: 3,
        }
    }
}

impl ProviderMatchQuery {
    /// Query pairs in the order the backend documents them. Empty filters are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.symptoms.is_empty() {
            pairs.push(("symptoms", self.symptoms.join(", ")));
        }
        let optional = [
            ("insurance", &self.insurance),
            ("location", &self.location),
            ("urgency", &self.urgency),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareTipsRequest {
    pub provider_name: String,
    pub specialty: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareTipsResponse {
    #[serde(default)]
    pub tips: String,
}

/// AI narrative split into its delimited sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareSummary {
    pub sections: Vec<String>,
}

impl CareSummary {
    pub fn from_tips(tips: &str) -> Self {
        Self {
            sections: tips
                .split(CARE_SECTION_DELIMITER)
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }

    /// Why the provider suits the patient
    pub fn why(&self) -> &str {
        self.sections.first().map(String::as_str).unwrap_or("")
    }

    /// What to expect from the visit
    pub fn expect(&self) -> &str {
        self.sections.get(1).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Body of `PUT /api/bookings/confirm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub user_id: String,
    pub provider_id: String,
    pub appointment_time: String,
    pub status: BookingStatus,
    #[serde(rename = "outOfPocketCost", skip_serializing_if = "Option::is_none")]
    pub out_of_pocket_cost: Option<f64>,
}

/// Acknowledgement returned by the confirm, cancel and reschedule endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAck {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub provider_id: String,
    pub appointment_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub provider_details: Option<JsonValue>,
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_plan: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub insurance_coverage: Option<f64>,
    #[serde(default)]
    pub out_of_pocket_cost: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Booking {
    /// Appointment time as a naive timestamp, if the backend sent one we understand
    pub fn appointment_at(&self) -> Option<NaiveDateTime> {
        let raw = self.appointment_time.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// A new appointment time built from a `YYYY-MM-DD` date and `HH:MM` 24-hour time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentSlot(NaiveDateTime);

impl AppointmentSlot {
    pub fn parse(date: &str, time: &str) -> CoreResult<Self> {
        let date = date.trim();
        let time = time.trim();
        if date.len() != 10 {
            return Err(CoreError::invalid_input(
                "Invalid date format. Please use YYYY-MM-DD.",
            ));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            CoreError::invalid_input("Invalid date format. Please use YYYY-MM-DD.")
        })?;
        if time.len() != 5 {
            return Err(CoreError::invalid_input(
                "Invalid time format. Please use HH:MM (24-hour).",
            ));
        }
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            CoreError::invalid_input("Invalid time format. Please use HH:MM (24-hour).")
        })?;
        Ok(Self(NaiveDateTime::new(date, time)))
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Wire form expected by the reschedule endpoint
    pub fn to_wire(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:00").to_string()
    }
}

impl std::fmt::Display for AppointmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}
