//! Typed HTTP client for the dentbook API.
//!
//! [`ApiClient`] wraps one `reqwest` client and maps every route to a method. Non-2xx responses
//! become [`ClientError::Api`] carrying the server's `{message}` text. [`session::Session`] builds
//! on it to keep a logged-in user across runs.

pub mod session;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    api::models::{
        appointments::{AppointmentCreate, AppointmentResponse, OutcomeCreate, OutcomeResponse},
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        checkups::CheckupResponse,
        dentists::DentistResponse,
    },
    errors::ErrorBody,
    types::{AppointmentId, UserId},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not logged in")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Client for the server at `base_url`, e.g. `http://localhost:5000`.
    pub fn new(mut base_url: Url) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(Self::DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|error| error.message)
            .unwrap_or(body);
        Err(ClientError::Api { status, message })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        Self::send(self.request(Method::GET, path, Some(token))?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, token: Option<&str>, body: &B) -> Result<T> {
        Self::send(self.request(Method::POST, path, token)?.json(body)).await
    }

    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.post("api/users/register", None, request).await
    }

    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.post("api/users/login", None, request).await
    }

    #[instrument(skip_all)]
    pub async fn list_dentists(&self, token: &str) -> Result<Vec<DentistResponse>> {
        self.get("api/dentists", token).await
    }

    #[instrument(skip_all)]
    pub async fn create_appointment(&self, token: &str, request: &AppointmentCreate) -> Result<AppointmentResponse> {
        self.post("api/appointments", Some(token), request).await
    }

    /// Appointments booked with the dentist whose user id is `doctor_id`
    #[instrument(skip(self, token))]
    pub async fn list_for_doctor(&self, token: &str, doctor_id: UserId) -> Result<Vec<AppointmentResponse>> {
        self.get(&format!("api/appointments/doctor/{doctor_id}"), token).await
    }

    #[instrument(skip(self, token))]
    pub async fn list_for_patient(&self, token: &str, patient_id: UserId) -> Result<Vec<AppointmentResponse>> {
        self.get(&format!("api/appointments/patient/{patient_id}"), token).await
    }

    #[instrument(skip(self, token, description))]
    pub async fn attach_outcome(&self, token: &str, appointment_id: AppointmentId, description: &str) -> Result<AppointmentResponse> {
        let body = OutcomeCreate {
            description: description.to_string(),
        };
        self.post(&format!("api/appointments/{appointment_id}/results"), Some(token), &body)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn fetch_outcome(&self, token: &str, appointment_id: AppointmentId) -> Result<OutcomeResponse> {
        self.get(&format!("api/appointments/{appointment_id}/results"), token).await
    }

    #[instrument(skip_all)]
    pub async fn request_checkup(&self, token: &str) -> Result<CheckupResponse> {
        Self::send(self.request(Method::POST, "api/checkups/request", Some(token))?).await
    }

    #[instrument(skip_all)]
    pub async fn upload_checkup(&self, token: &str) -> Result<CheckupResponse> {
        Self::send(self.request(Method::POST, "api/checkups/upload", Some(token))?).await
    }
}
