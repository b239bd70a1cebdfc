//! Role guard for protected routes.
//!
//! [`authorize`] resolves the bearer token on a request to a [`CurrentUser`] and checks the
//! user's stored role against an allowed set. [`RequireRole`] wraps it as an axum extractor,
//! with the allowed set chosen by a marker type:
//!
//! ```ignore
//! async fn list_dentists(RequireRole { user, .. }: RequireRole<Patient>) -> Result<...> { ... }
//! ```

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    types::{Role, abbrev_uuid},
};

const NO_TOKEN: &str = "No token provided";
const TOKEN_REJECTED: &str = "Token failed or expired";

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is absent, not valid UTF-8, uses another scheme, or carries an
/// empty token.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Message for a caller whose role is not in `roles`, e.g. "Access denied: Not a patient or dentist".
pub fn access_denied_message(roles: &[Role]) -> String {
    let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
    format!("Access denied: Not a {}", names.join(" or "))
}

/// Authenticate the request and require the user's stored role to be one of `roles`.
#[instrument(skip_all, fields(roles = ?roles))]
pub async fn authorize(parts: &Parts, state: &AppState, roles: &[Role]) -> Result<CurrentUser> {
    let token = bearer_token(parts).ok_or_else(|| Error::Unauthenticated {
        message: NO_TOKEN.to_string(),
    })?;

    let claims = session::verify_session_token(token, &state.config).map_err(|e| {
        debug!("Token verification failed: {}", e);
        Error::Unauthenticated {
            message: TOKEN_REJECTED.to_string(),
        }
    })?;

    // The stored role is authoritative; a deleted user fails the same way as a wrong role
    let user = match state.store.get_user(claims.sub).await? {
        Some(user) if roles.contains(&user.role) => user,
        found => {
            trace!(
                user_id = %abbrev_uuid(&claims.sub),
                exists = found.is_some(),
                "Rejecting user outside required role set"
            );
            return Err(Error::Forbidden {
                message: access_denied_message(roles),
            });
        }
    };

    Ok(CurrentUser::from(user))
}

/// A set of roles a route accepts.
pub trait RoleSet: Send + Sync + 'static {
    const ROLES: &'static [Role];
}

/// Marker: patients only
pub struct Patient;

/// Marker: dentists only
pub struct Dentist;

/// Marker: any authenticated user
pub struct AnyRole;

impl RoleSet for Patient {
    const ROLES: &'static [Role] = &[Role::Patient];
}

impl RoleSet for Dentist {
    const ROLES: &'static [Role] = &[Role::Dentist];
}

impl RoleSet for AnyRole {
    const ROLES: &'static [Role] = &[Role::Patient, Role::Dentist];
}

/// Extractor yielding the authenticated user, rejecting anyone outside `R`'s role set.
pub struct RequireRole<R: RoleSet> {
    pub user: CurrentUser,
    _roles: PhantomData<fn() -> R>,
}

impl<R: RoleSet> RequireRole<R> {
    pub fn into_inner(self) -> CurrentUser {
        self.user
    }
}

impl<R: RoleSet> FromRequestParts<AppState> for RequireRole<R> {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = authorize(parts, state, R::ROLES).await?;
        Ok(Self {
            user,
            _roles: PhantomData,
        })
    }
}
