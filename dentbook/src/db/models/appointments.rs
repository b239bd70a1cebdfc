//! Database models for appointments.

use crate::types::{AppointmentId, DentistId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating an appointment
#[derive(Debug, Clone)]
pub struct AppointmentCreateDBRequest {
    pub patient_id: UserId,
    pub patient_name: String,
    pub patient_email: String,
    pub dentist_id: DentistId,
    pub dentist_name: String,
    pub date: String,
    pub time: String,
    pub message: Option<String>,
}

/// Database response for an appointment
#[derive(Debug, Clone)]
pub struct AppointmentDBResponse {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub patient_name: String,
    pub patient_email: String,
    pub dentist_id: DentistId,
    pub dentist_name: String,
    pub date: String,
    pub time: String,
    pub message: Option<String>,
    /// Outcome written by the dentist; `None` until the appointment is resolved
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Filter for listing appointments. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<UserId>,
    pub dentist_id: Option<DentistId>,
}

impl AppointmentFilter {
    pub fn for_patient(patient_id: UserId) -> Self {
        Self {
            patient_id: Some(patient_id),
            dentist_id: None,
        }
    }

    pub fn for_dentist(dentist_id: DentistId) -> Self {
        Self {
            patient_id: None,
            dentist_id: Some(dentist_id),
        }
    }

    pub fn matches(&self, appointment: &AppointmentDBResponse) -> bool {
        self.patient_id.is_none_or(|id| id == appointment.patient_id) && self.dentist_id.is_none_or(|id| id == appointment.dentist_id)
    }
}
