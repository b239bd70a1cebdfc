//! Base store trait for persistence operations.
//!
//! A store is the data access layer over the three collections the service owns: users,
//! dentist profiles and appointments. Handlers only ever talk to `dyn Store`, so the in-memory
//! and PostgreSQL backends are interchangeable.
//!
//! Each write is atomic on its own. Registering a dentist creates the user and the linked
//! profile in a single call, so no orphan dentist user can be observed.

use crate::db::{
    errors::Result,
    models::{
        appointments::{AppointmentCreateDBRequest, AppointmentDBResponse, AppointmentFilter},
        dentists::{DentistCreateDBRequest, DentistDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{AppointmentId, DentistId, UserId};

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Create a user, and its dentist profile when one is given.
    ///
    /// Fails with a unique violation on `users.email` if the email is taken.
    async fn create_user(
        &self,
        request: &UserCreateDBRequest,
        profile: Option<&DentistCreateDBRequest>,
    ) -> Result<(UserDBResponse, Option<DentistDBResponse>)>;

    /// Get a user by ID
    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    /// Get a user by (normalized) email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    /// List all dentist profiles, oldest first
    async fn list_dentists(&self) -> Result<Vec<DentistDBResponse>>;

    /// Get a dentist profile by its own ID
    async fn get_dentist(&self, id: DentistId) -> Result<Option<DentistDBResponse>>;

    /// Get the dentist profile linked to a user
    async fn get_dentist_by_user(&self, user_id: UserId) -> Result<Option<DentistDBResponse>>;

    /// Create an appointment
    async fn create_appointment(&self, request: &AppointmentCreateDBRequest) -> Result<AppointmentDBResponse>;

    /// Get an appointment by ID
    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<AppointmentDBResponse>>;

    /// List appointments matching the filter, oldest first
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDBResponse>>;

    /// Attach the outcome description to an appointment that has none yet.
    ///
    /// Returns `Ok(None)` if the appointment already carries an outcome, and
    /// `Err(StoreError::NotFound)` if it does not exist.
    async fn resolve_appointment(&self, id: AppointmentId, description: &str) -> Result<Option<AppointmentDBResponse>>;

    /// Release any held resources (connection pools)
    async fn close(&self) {}
}
