//! PostgreSQL store implementation.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
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

const APPOINTMENT_COLUMNS: &str = "id, patient_id, patient_name, patient_email, dentist_id, dentist_name, \
     appointment_date, appointment_time, message, description, created_at, resolved_at";

// Database entity models
#[derive(Debug, FromRow)]
struct User {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<User> for UserDBResponse {
    type Error = StoreError;

    fn try_from(user: User) -> Result<Self> {
        let role = user
            .role
            .parse()
            .map_err(|e: String| StoreError::Other(anyhow!("user {}: {e}", abbrev_uuid(&user.id))))?;
        Ok(Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role,
            created_at: user.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct DentistProfile {
    id: DentistId,
    user_id: UserId,
    name: String,
    specialization: Option<String>,
    availability: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<DentistProfile> for DentistDBResponse {
    fn from(row: DentistProfile) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            specialization: row.specialization,
            availability: row.availability,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct Appointment {
    id: AppointmentId,
    patient_id: UserId,
    patient_name: String,
    patient_email: String,
    dentist_id: DentistId,
    dentist_name: String,
    appointment_date: String,
    appointment_time: String,
    message: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl From<Appointment> for AppointmentDBResponse {
    fn from(row: Appointment) -> Self {
        Self {
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            patient_email: row.patient_email,
            dentist_id: row.dentist_id,
            dentist_name: row.dentist_name,
            date: row.appointment_date,
            time: row.appointment_time,
            message: row.message,
            description: row.description,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

/// [`Store`] backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply any pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::migrator().run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip_all, fields(email = %request.email, role = %request.role), err)]
    async fn create_user(
        &self,
        request: &UserCreateDBRequest,
        profile: Option<&DentistCreateDBRequest>,
    ) -> Result<(UserDBResponse, Option<DentistDBResponse>)> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, password_hash, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let dentist = match profile {
            Some(profile) => Some(
                sqlx::query_as::<_, DentistProfile>(
                    "INSERT INTO dentist_profiles (id, user_id, name, specialization, availability) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING id, user_id, name, specialization, availability, created_at",
                )
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(&profile.name)
                .bind(&profile.specialization)
                .bind(&profile.availability)
                .fetch_one(&mut *tx)
                .await?
                .into(),
            ),
            None => None,
        };

        tx.commit().await?;
        Ok((user.try_into()?, dentist))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        sqlx::query_as::<_, User>("SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        sqlx::query_as::<_, User>("SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_dentists(&self) -> Result<Vec<DentistDBResponse>> {
        let rows = sqlx::query_as::<_, DentistProfile>(
            "SELECT id, user_id, name, specialization, availability, created_at \
             FROM dentist_profiles ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(dentist_id = %abbrev_uuid(&id)), err)]
    async fn get_dentist(&self, id: DentistId) -> Result<Option<DentistDBResponse>> {
        let row = sqlx::query_as::<_, DentistProfile>(
            "SELECT id, user_id, name, specialization, availability, created_at FROM dentist_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    async fn get_dentist_by_user(&self, user_id: UserId) -> Result<Option<DentistDBResponse>> {
        let row = sqlx::query_as::<_, DentistProfile>(
            "SELECT id, user_id, name, specialization, availability, created_at FROM dentist_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip_all, fields(patient_id = %abbrev_uuid(&request.patient_id), dentist_id = %abbrev_uuid(&request.dentist_id)), err)]
    async fn create_appointment(&self, request: &AppointmentCreateDBRequest) -> Result<AppointmentDBResponse> {
        let query = format!(
            "INSERT INTO appointments (id, patient_id, patient_name, patient_email, dentist_id, dentist_name, \
             appointment_date, appointment_time, message) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {APPOINTMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Appointment>(&query)
            .bind(Uuid::new_v4())
            .bind(request.patient_id)
            .bind(&request.patient_name)
            .bind(&request.patient_email)
            .bind(request.dentist_id)
            .bind(&request.dentist_name)
            .bind(&request.date)
            .bind(&request.time)
            .bind(&request.message)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<AppointmentDBResponse>> {
        let query = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
        let row = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), err)]
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDBResponse>> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE ($1::uuid IS NULL OR patient_id = $1) AND ($2::uuid IS NULL OR dentist_id = $2) \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, Appointment>(&query)
            .bind(filter.patient_id)
            .bind(filter.dentist_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, description), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn resolve_appointment(&self, id: AppointmentId, description: &str) -> Result<Option<AppointmentDBResponse>> {
        let query = format!(
            "UPDATE appointments SET description = $2, resolved_at = NOW() \
             WHERE id = $1 AND description IS NULL RETURNING {APPOINTMENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(Some(row.into())),
            // Nothing updated: either already resolved or missing entirely
            None => match self.get_appointment(id).await? {
                Some(_) => Ok(None),
                None => Err(StoreError::NotFound),
            },
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn user_request(email: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            name: "Sam".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    fn profile_request(name: &str) -> DentistCreateDBRequest {
        DentistCreateDBRequest {
            name: name.to_string(),
            specialization: Some("Orthodontics".to_string()),
            availability: vec!["Mon 09:00-12:00".to_string(), "Thu 14:00-18:00".to_string()],
        }
    }

    async fn book(store: &PostgresStore, patient: &UserDBResponse, dentist: &DentistDBResponse, date: &str) -> AppointmentDBResponse {
        store
            .create_appointment(&AppointmentCreateDBRequest {
                patient_id: patient.id,
                patient_name: patient.name.clone(),
                patient_email: patient.email.clone(),
                dentist_id: dentist.id,
                dentist_name: dentist.name.clone(),
                date: date.to_string(),
                time: "10:00".to_string(),
                message: None,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_user(pool: PgPool) {
        let store = PostgresStore::new(pool);

        let (user, profile) = store.create_user(&user_request("sam@example.com", Role::Patient), None).await.unwrap();
        assert!(profile.is_none());
        assert_eq!(user.role, Role::Patient);

        let by_id = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "sam@example.com");
        let by_email = store.get_user_by_email("sam@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(store.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
        let store = PostgresStore::new(pool);
        store
            .create_user(&user_request("dr@example.com", Role::Dentist), Some(&profile_request("Dr. Lee")))
            .await
            .unwrap();

        let err = store
            .create_user(&user_request("dr@example.com", Role::Dentist), Some(&profile_request("Dr. Kim")))
            .await
            .unwrap_err();

        assert!(err.is_duplicate_email(), "unexpected error: {err:?}");
        // The rolled-back registration leaves no second profile behind
        let dentists = store.list_dentists().await.unwrap();
        assert_eq!(dentists.len(), 1);
        assert_eq!(dentists[0].name, "Dr. Lee");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dentist_profile_round_trips(pool: PgPool) {
        let store = PostgresStore::new(pool);

        let (user, profile) = store
            .create_user(&user_request("dr@example.com", Role::Dentist), Some(&profile_request("Dr. Lee")))
            .await
            .unwrap();
        let profile = profile.unwrap();
        assert_eq!(profile.user_id, user.id);

        let fetched = store.get_dentist(profile.id).await.unwrap().unwrap();
        assert_eq!(fetched.availability, vec!["Mon 09:00-12:00", "Thu 14:00-18:00"]);
        assert_eq!(fetched.specialization.as_deref(), Some("Orthodontics"));

        let by_user = store.get_dentist_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_user.id, profile.id);
        assert!(store.get_dentist(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_appointments_filters(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let (ann, _) = store.create_user(&user_request("ann@example.com", Role::Patient), None).await.unwrap();
        let (bob, _) = store.create_user(&user_request("bob@example.com", Role::Patient), None).await.unwrap();
        let (_, lee) = store
            .create_user(&user_request("lee@example.com", Role::Dentist), Some(&profile_request("Dr. Lee")))
            .await
            .unwrap();
        let (_, kim) = store
            .create_user(&user_request("kim@example.com", Role::Dentist), Some(&profile_request("Dr. Kim")))
            .await
            .unwrap();
        let (lee, kim) = (lee.unwrap(), kim.unwrap());

        let first = book(&store, &ann, &lee, "2030-01-01").await;
        let second = book(&store, &bob, &lee, "2030-01-02").await;
        let third = book(&store, &ann, &kim, "2030-01-03").await;

        let ids = |rows: Vec<AppointmentDBResponse>| rows.into_iter().map(|a| a.id).collect::<Vec<_>>();

        let for_ann = store.list_appointments(&AppointmentFilter::for_patient(ann.id)).await.unwrap();
        assert_eq!(ids(for_ann), vec![first.id, third.id]);

        let for_lee = store.list_appointments(&AppointmentFilter::for_dentist(lee.id)).await.unwrap();
        assert_eq!(ids(for_lee), vec![first.id, second.id]);

        let all = store.list_appointments(&AppointmentFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resolve_appointment_once(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let (ann, _) = store.create_user(&user_request("ann@example.com", Role::Patient), None).await.unwrap();
        let (_, lee) = store
            .create_user(&user_request("lee@example.com", Role::Dentist), Some(&profile_request("Dr. Lee")))
            .await
            .unwrap();
        let appointment = book(&store, &ann, &lee.unwrap(), "2030-01-01").await;
        assert!(appointment.description.is_none());

        let resolved = store.resolve_appointment(appointment.id, "Two fillings").await.unwrap().unwrap();
        assert_eq!(resolved.description.as_deref(), Some("Two fillings"));
        assert!(resolved.resolved_at.is_some());

        assert!(store.resolve_appointment(appointment.id, "Again").await.unwrap().is_none());
        let stored = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("Two fillings"));

        assert!(matches!(
            store.resolve_appointment(Uuid::new_v4(), "Missing").await,
            Err(StoreError::NotFound)
        ));
    }
}
