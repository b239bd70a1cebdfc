//! OpenAPI document for the REST API, served through Scalar at `/api/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::{
        handlers,
        models::{appointments, auth, checkups, dentists},
    },
    errors::ErrorBody,
    types::Role,
};

/// Registers the `bearer` scheme referenced by protected routes.
struct BearerSecurityAddon;

impl Modify for BearerSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by register or login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dentbook API",
        description = "Book appointments between patients and dentists, and record their outcomes."
    ),
    modifiers(&BearerSecurityAddon),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::dentists::list_dentists,
        handlers::appointments::create_appointment,
        handlers::appointments::list_for_doctor,
        handlers::appointments::list_for_patient,
        handlers::appointments::attach_outcome,
        handlers::appointments::fetch_outcome,
        handlers::checkups::request_checkup,
        handlers::checkups::upload_checkup,
    ),
    components(schemas(
        ErrorBody,
        Role,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        dentists::DentistResponse,
        appointments::AppointmentCreate,
        appointments::AppointmentStatus,
        appointments::AppointmentResponse,
        appointments::OutcomeCreate,
        appointments::OutcomeResponse,
        checkups::CheckupResponse,
    )),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "dentists", description = "Dentist directory"),
        (name = "appointments", description = "Booking and outcomes"),
        (name = "checkups", description = "Checkup acknowledgements"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/users/register",
            "/api/users/login",
            "/api/dentists",
            "/api/appointments",
            "/api/appointments/doctor/{doctor_id}",
            "/api/appointments/patient/{patient_id}",
            "/api/appointments/{id}/results",
            "/api/checkups/request",
            "/api/checkups/upload",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components should be present");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
