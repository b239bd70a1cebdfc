//! Helpers shared by unit and HTTP tests.

use std::sync::Arc;

use axum_test::TestServer;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{password, session},
    config::{Config, DatabaseConfig},
    db::{
        InMemoryStore,
        models::{
            dentists::{DentistCreateDBRequest, DentistDBResponse},
            users::UserCreateDBRequest,
        },
    },
    types::Role,
};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

/// App state over a fresh in-memory store
pub fn create_test_state() -> AppState {
    AppState::builder()
        .store(Arc::new(InMemoryStore::new()))
        .config(create_test_config())
        .build()
}

/// Full router over a fresh in-memory store
pub fn create_test_app() -> (TestServer, AppState) {
    let state = create_test_state();
    let server = TestServer::new(crate::build_router(state.clone())).expect("Failed to create test server");
    (server, state)
}

async fn insert_user(state: &AppState, role: Role, profile: Option<DentistCreateDBRequest>) -> (CurrentUser, Option<DentistDBResponse>) {
    let suffix = Uuid::new_v4().simple().to_string();
    let request = UserCreateDBRequest {
        name: format!("Test {role} {}", &suffix[..8]),
        email: format!("{role}-{suffix}@example.com"),
        password_hash: password::hash_string(TEST_PASSWORD).expect("Failed to hash test password"),
        role,
    };
    let (user, dentist) = state
        .store
        .create_user(&request, profile.as_ref())
        .await
        .expect("Failed to create test user");
    (user.into(), dentist)
}

/// Create a user directly in the store. Dentists get a profile with no availability.
pub async fn create_test_user(state: &AppState, role: Role) -> CurrentUser {
    let profile = (role == Role::Dentist).then(|| DentistCreateDBRequest {
        name: "Dr. Test".to_string(),
        specialization: None,
        availability: vec![],
    });
    insert_user(state, role, profile).await.0
}

/// Create a dentist user plus profile with the given availability.
pub async fn create_test_dentist(state: &AppState, name: &str, availability: &[&str]) -> (CurrentUser, DentistDBResponse) {
    let profile = DentistCreateDBRequest {
        name: name.to_string(),
        specialization: Some("General".to_string()),
        availability: availability.iter().map(|day| day.to_string()).collect(),
    };
    let (user, dentist) = insert_user(state, Role::Dentist, Some(profile)).await;
    (user, dentist.expect("Dentist profile should be created"))
}

pub fn token_for(state: &AppState, user: &CurrentUser) -> String {
    session::create_session_token(user.id, user.role, &state.config).expect("Failed to create test token")
}

/// `Authorization` header name and value for a user
pub fn add_auth_headers(state: &AppState, user: &CurrentUser) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {}", token_for(state, user)))
}
