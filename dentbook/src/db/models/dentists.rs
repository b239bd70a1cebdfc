//! Database models for dentist profiles.

use crate::types::{DentistId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating the profile linked to a freshly registered dentist.
///
/// The linked user id is assigned by the store when the user row is created.
#[derive(Debug, Clone)]
pub struct DentistCreateDBRequest {
    pub name: String,
    pub specialization: Option<String>,
    pub availability: Vec<String>,
}

/// Database response for a dentist profile
#[derive(Debug, Clone)]
pub struct DentistDBResponse {
    pub id: DentistId,
    pub user_id: UserId,
    pub name: String,
    pub specialization: Option<String>,
    pub availability: Vec<String>,
    pub created_at: DateTime<Utc>,
}
