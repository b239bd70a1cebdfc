//! API request/response models for appointments and their outcomes.

use crate::db::models::appointments::AppointmentDBResponse;
use crate::types::{AppointmentId, DentistId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Booking payload. Name and email snapshots default to the caller's account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub doctor_id: DentistId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum AppointmentStatus {
    Created,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AppointmentId,
    #[schema(value_type = String, format = "uuid")]
    pub patient_id: UserId,
    pub patient_name: String,
    pub patient_email: String,
    #[schema(value_type = String, format = "uuid")]
    pub doctor_id: DentistId,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub message: Option<String>,
    pub description: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<AppointmentDBResponse> for AppointmentResponse {
    fn from(db: AppointmentDBResponse) -> Self {
        let status = if db.description.is_some() {
            AppointmentStatus::Resolved
        } else {
            AppointmentStatus::Created
        };
        Self {
            id: db.id,
            patient_id: db.patient_id,
            patient_name: db.patient_name,
            patient_email: db.patient_email,
            doctor_id: db.dentist_id,
            doctor_name: db.dentist_name,
            date: db.date,
            time: db.time,
            message: db.message,
            description: db.description,
            status,
            created_at: db.created_at,
            resolved_at: db.resolved_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutcomeCreate {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResponse {
    #[schema(value_type = String, format = "uuid")]
    pub appointment_id: AppointmentId,
    pub description: String,
    pub resolved_at: Option<DateTime<Utc>>,
}
