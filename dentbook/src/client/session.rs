//! Client-side login state.
//!
//! A [`Session`] owns the logged-in user and their token, and mirrors them to a JSON file so
//! the login survives restarts. It is created with [`Session::load`] and torn down with
//! [`Session::logout`]; nothing else holds login state.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use super::{ApiClient, ClientError, Result};
use crate::{
    api::models::{
        appointments::AppointmentResponse,
        auth::{AuthResponse, LoginRequest, RegisterRequest},
    },
    types::Role,
};

/// Screens of the booking front end, used to decide what the current user may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    Dentists,
    BookAppointment,
    Appointments,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    user: Option<AuthResponse>,
}

impl Session {
    /// Restore the session persisted at `path`. A missing file means logged out.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let user = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(serde_json::from_slice::<AuthResponse>(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), logged_in = user.is_some(), "Loaded session");
        Ok(Self { path, user })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user(&self) -> Option<&AuthResponse> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_dentist(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.role == Role::Dentist)
    }

    pub fn token(&self) -> Result<&str> {
        self.user.as_ref().map(|user| user.token.as_str()).ok_or(ClientError::NotLoggedIn)
    }

    pub fn can_view(&self, view: View) -> bool {
        match (view, &self.user) {
            (View::Home, _) => true,
            (View::Login | View::Register, user) => user.is_none(),
            (View::Appointments, user) => user.is_some(),
            (View::Dentists | View::BookAppointment, Some(user)) => user.role == Role::Patient,
            (View::Dentists | View::BookAppointment, None) => false,
        }
    }

    pub async fn login(&mut self, client: &ApiClient, email: &str, password: &str) -> Result<&AuthResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = client.login(&request).await?;
        self.store(user).await
    }

    pub async fn register(&mut self, client: &ApiClient, request: &RegisterRequest) -> Result<&AuthResponse> {
        let user = client.register(request).await?;
        self.store(user).await
    }

    /// Forget the user in memory and on disk.
    ///
    /// The file is removed first; if that fails the session stays logged in.
    pub async fn logout(&mut self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.user = None;
        info!("Logged out");
        Ok(())
    }

    /// The caller's appointments: their schedule for a dentist, their bookings for a patient.
    pub async fn appointments(&self, client: &ApiClient) -> Result<Vec<AppointmentResponse>> {
        let user = self.user.as_ref().ok_or(ClientError::NotLoggedIn)?;
        match user.role {
            Role::Dentist => client.list_for_doctor(&user.token, user.id).await,
            Role::Patient => client.list_for_patient(&user.token, user.id).await,
        }
    }

    async fn store(&mut self, user: AuthResponse) -> Result<&AuthResponse> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&user)?).await?;
        info!(role = %user.role, "Logged in as {}", user.email);
        Ok(self.user.insert(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use uuid::Uuid;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn auth_body(id: Uuid, role: &str) -> serde_json::Value {
        json!({"id": id, "name": "Sam", "email": "sam@example.com", "role": role, "token": "tok-123"})
    }

    async fn mock_login(server: &MockServer, id: Uuid, role: &str) {
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(id, role)))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load(dir.path().join("session.json")).await.unwrap();

        assert!(!session.is_logged_in());
        assert!(matches!(session.token(), Err(ClientError::NotLoggedIn)));
        assert!(session.can_view(View::Home));
        assert!(session.can_view(View::Login));
        assert!(session.can_view(View::Register));
        assert!(!session.can_view(View::Appointments));
        assert!(!session.can_view(View::Dentists));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        std::fs::write(&file, "not json").unwrap();

        assert!(matches!(Session::load(&file).await, Err(ClientError::Json(_))));
    }

    #[tokio::test]
    async fn test_login_persists_and_logout_clears() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mock_login(&server, id, "patient").await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("session.json");

        let mut session = Session::load(&file).await.unwrap();
        session.login(&client_for(&server), "sam@example.com", "pw").await.unwrap();
        assert_eq!(session.token().unwrap(), "tok-123");
        assert!(file.exists());

        let restored = Session::load(&file).await.unwrap();
        assert_eq!(restored.user().map(|u| u.id), Some(id));
        assert!(restored.can_view(View::BookAppointment));
        assert!(!restored.can_view(View::Login));

        session.logout().await.unwrap();
        assert!(!session.is_logged_in());
        assert!(!file.exists());
        // A second logout with nothing on disk is fine
        session.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_login_keeps_session_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");

        let mut session = Session::load(&file).await.unwrap();
        let err = session.login(&client_for(&server), "sam@example.com", "wrong").await.unwrap_err();

        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Invalid credentials"));
        assert!(!session.is_logged_in());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_dentist_appointments_use_doctor_listing() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mock_login(&server, id, "dentist").await;
        Mock::given(method("GET"))
            .and(path(format!("/api/appointments/doctor/{id}")))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let client = client_for(&server);

        let mut session = Session::load(dir.path().join("session.json")).await.unwrap();
        session.login(&client, "sam@example.com", "pw").await.unwrap();

        assert!(session.is_dentist());
        assert!(session.can_view(View::Appointments));
        assert!(!session.can_view(View::Dentists));
        assert!(session.appointments(&client).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_logout_keeps_user() {
        let server = MockServer::start().await;
        mock_login(&server, Uuid::new_v4(), "patient").await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");

        let mut session = Session::load(&file).await.unwrap();
        session.login(&client_for(&server), "sam@example.com", "pw").await.unwrap();

        // A directory in place of the file makes removal fail
        std::fs::remove_file(&file).unwrap();
        std::fs::create_dir(&file).unwrap();

        assert!(matches!(session.logout().await, Err(ClientError::Io(_))));
        assert!(session.is_logged_in());
    }
}
