use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::extractors::ApiJson,
    api::models::auth::{AuthResponse, LoginRequest, RegisterRequest},
    auth::{password, session},
    db::models::{
        dentists::DentistCreateDBRequest,
        users::{UserCreateDBRequest, UserDBResponse},
    },
    errors::{Error, ErrorBody},
    types::Role,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_EXISTS: &str = "User already exists";

/// Emails are matched case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_response(user: UserDBResponse, state: &AppState) -> Result<AuthResponse, Error> {
    let token = session::create_session_token(user.id, user.role, &state.config)?;
    Ok(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    })
}

/// Register a new patient or dentist account
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    tag = "users",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input or user already exists", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);
    if name.is_empty() {
        return Err(Error::BadRequest {
            message: "Name is required".to_string(),
        });
    }
    if email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    let password_length = request.password.chars().count();
    if password_length < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password_length > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    // Cheap early exit; the store's unique constraint still decides races
    if state.store.get_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict {
            message: USER_EXISTS.to_string(),
        });
    }

    let password_hash = password::hash_password(request.password).await?;
    let create_request = UserCreateDBRequest {
        name: name.clone(),
        email,
        password_hash,
        role: request.role,
    };
    let profile = (request.role == Role::Dentist).then(|| DentistCreateDBRequest {
        name,
        specialization: request
            .specialization
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        availability: request.availability,
    });

    let (user, _profile) = state
        .store
        .create_user(&create_request, profile.as_ref())
        .await
        .map_err(|e| {
            if e.is_duplicate_email() {
                Error::Conflict {
                    message: USER_EXISTS.to_string(),
                }
            } else {
                Error::Database(e)
            }
        })?;

    tracing::info!(user_id = %crate::types::abbrev_uuid(&user.id), "Registered new {}", user.role);
    Ok((StatusCode::CREATED, Json(auth_response(user, &state)?)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    tag = "users",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    let invalid = || Error::Unauthenticated {
        message: INVALID_CREDENTIALS.to_string(),
    };

    let user = state
        .store
        .get_user_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(request.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    Ok(Json(auth_response(user, &state)?))
}
