//! API response models for the dentist directory.

use crate::db::models::dentists::DentistDBResponse;
use crate::types::{DentistId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DentistResponse {
    /// Profile id; this is the `doctorId` used when booking
    #[schema(value_type = String, format = "uuid")]
    pub id: DentistId,
    /// The dentist's user id; this is the id used to list their appointments
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub name: String,
    pub specialization: Option<String>,
    pub availability: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DentistDBResponse> for DentistResponse {
    fn from(db: DentistDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            specialization: db.specialization,
            availability: db.availability,
            created_at: db.created_at,
        }
    }
}
