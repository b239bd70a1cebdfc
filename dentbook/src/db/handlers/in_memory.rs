//! In-memory store implementation.
//!
//! Stores all records in concurrent maps. It's suitable for testing and single-process
//! deployments. Everything is lost on restart.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::{Result, StoreError},
    handlers::store::Store,
    models::{
        appointments::{AppointmentCreateDBRequest, AppointmentDBResponse, AppointmentFilter},
        dentists::{DentistCreateDBRequest, DentistDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{AppointmentId, DentistId, UserId, abbrev_uuid};

/// Record plus its insertion sequence number, so listings have a stable order.
#[derive(Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

/// In-memory implementation of the [`Store`] trait.
///
/// Email uniqueness is enforced through the `emails` index using the map's entry API, which
/// holds the shard lock across the check and the insert.
#[derive(Default)]
pub struct InMemoryStore {
    seq: AtomicU64,
    users: DashMap<UserId, Stored<UserDBResponse>>,
    emails: DashMap<String, UserId>,
    dentists: DashMap<DentistId, Stored<DentistDBResponse>>,
    appointments: DashMap<AppointmentId, Stored<AppointmentDBResponse>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

fn sorted<T: Clone>(mut rows: Vec<Stored<T>>) -> Vec<T> {
    rows.sort_by_key(|row| row.seq);
    rows.into_iter().map(|row| row.value).collect()
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    #[instrument(skip_all, fields(email = %request.email, role = %request.role), err)]
    async fn create_user(
        &self,
        request: &UserCreateDBRequest,
        profile: Option<&DentistCreateDBRequest>,
    ) -> Result<(UserDBResponse, Option<DentistDBResponse>)> {
        let slot = match self.emails.entry(request.email.clone()) {
            Entry::Occupied(_) => {
                return Err(StoreError::UniqueViolation {
                    constraint: Some("users_email_key".to_string()),
                    table: Some("users".to_string()),
                    message: format!("email {} already exists", request.email),
                });
            }
            Entry::Vacant(slot) => slot,
        };

        let now = Utc::now();
        let user = UserDBResponse {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            role: request.role,
            created_at: now,
        };
        let dentist = profile.map(|p| DentistDBResponse {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: p.name.clone(),
            specialization: p.specialization.clone(),
            availability: p.availability.clone(),
            created_at: now,
        });

        self.users.insert(
            user.id,
            Stored {
                seq: self.next_seq(),
                value: user.clone(),
            },
        );
        if let Some(dentist) = &dentist {
            self.dentists.insert(
                dentist.id,
                Stored {
                    seq: self.next_seq(),
                    value: dentist.clone(),
                },
            );
        }
        slot.insert(user.id);

        Ok((user, dentist))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.users.get(&id).map(|row| row.value.clone()))
    }

    #[instrument(skip(self), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        self.get_user(id).await
    }

    #[instrument(skip(self), err)]
    async fn list_dentists(&self) -> Result<Vec<DentistDBResponse>> {
        Ok(sorted(self.dentists.iter().map(|row| row.value().clone()).collect()))
    }

    #[instrument(skip(self), fields(dentist_id = %abbrev_uuid(&id)), err)]
    async fn get_dentist(&self, id: DentistId) -> Result<Option<DentistDBResponse>> {
        Ok(self.dentists.get(&id).map(|row| row.value.clone()))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    async fn get_dentist_by_user(&self, user_id: UserId) -> Result<Option<DentistDBResponse>> {
        Ok(self
            .dentists
            .iter()
            .find(|row| row.value.user_id == user_id)
            .map(|row| row.value.clone()))
    }

    #[instrument(skip_all, fields(patient_id = %abbrev_uuid(&request.patient_id), dentist_id = %abbrev_uuid(&request.dentist_id)), err)]
    async fn create_appointment(&self, request: &AppointmentCreateDBRequest) -> Result<AppointmentDBResponse> {
        let appointment = AppointmentDBResponse {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            patient_name: request.patient_name.clone(),
            patient_email: request.patient_email.clone(),
            dentist_id: request.dentist_id,
            dentist_name: request.dentist_name.clone(),
            date: request.date.clone(),
            time: request.time.clone(),
            message: request.message.clone(),
            description: None,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.appointments.insert(
            appointment.id,
            Stored {
                seq: self.next_seq(),
                value: appointment.clone(),
            },
        );
        Ok(appointment)
    }

    #[instrument(skip(self), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<AppointmentDBResponse>> {
        Ok(self.appointments.get(&id).map(|row| row.value.clone()))
    }

    #[instrument(skip(self), err)]
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDBResponse>> {
        Ok(sorted(
            self.appointments
                .iter()
                .filter(|row| filter.matches(&row.value))
                .map(|row| row.value().clone())
                .collect(),
        ))
    }

    #[instrument(skip(self, description), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn resolve_appointment(&self, id: AppointmentId, description: &str) -> Result<Option<AppointmentDBResponse>> {
        let mut row = self.appointments.get_mut(&id).ok_or(StoreError::NotFound)?;
        if row.value.description.is_some() {
            return Ok(None);
        }
        row.value.description = Some(description.to_string());
        row.value.resolved_at = Some(Utc::now());
        Ok(Some(row.value.clone()))
    }
}
