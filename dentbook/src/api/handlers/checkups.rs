//! Checkup endpoints. Both are acknowledgements only: nothing is stored.

use axum::Json;

use crate::{
    api::models::checkups::CheckupResponse,
    auth::current_user::{Dentist, Patient, RequireRole},
    errors::ErrorBody,
};

/// Request a checkup
#[utoipa::path(
    post,
    path = "/api/checkups/request",
    tag = "checkups",
    responses(
        (status = 200, description = "Request acknowledged", body = CheckupResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not a patient", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn request_checkup(_guard: RequireRole<Patient>) -> Json<CheckupResponse> {
    Json(CheckupResponse {
        message: "Checkup request submitted (for patients only)".to_string(),
    })
}

/// Upload checkup results
#[utoipa::path(
    post,
    path = "/api/checkups/upload",
    tag = "checkups",
    responses(
        (status = 200, description = "Upload acknowledged", body = CheckupResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not a dentist", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_checkup(_guard: RequireRole<Dentist>) -> Json<CheckupResponse> {
    Json(CheckupResponse {
        message: "Upload successful (for dentists only)".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use crate::test_utils::{add_auth_headers, create_test_state, create_test_user};
    use crate::types::Role;
    use axum::{http::StatusCode, routing::post};
    use axum_test::TestServer;

    fn create_server(state: AppState) -> TestServer {
        let app = axum::Router::new()
            .route("/api/checkups/request", post(request_checkup))
            .route("/api/checkups/upload", post(upload_checkup))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_checkups_are_role_gated() {
        let state = create_test_state();
        let patient = create_test_user(&state, Role::Patient).await;
        let dentist = create_test_user(&state, Role::Dentist).await;
        let server = create_server(state.clone());
        let (p_name, p_value) = add_auth_headers(&state, &patient);
        let (d_name, d_value) = add_auth_headers(&state, &dentist);

        let response = server.post("/api/checkups/request").add_header(&p_name, &p_value).await;
        response.assert_status_ok();
        let body: CheckupResponse = response.json();
        assert_eq!(body.message, "Checkup request submitted (for patients only)");

        let response = server.post("/api/checkups/upload").add_header(&d_name, &d_value).await;
        response.assert_status_ok();
        let body: CheckupResponse = response.json();
        assert_eq!(body.message, "Upload successful (for dentists only)");

        server
            .post("/api/checkups/request")
            .add_header(&d_name, &d_value)
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post("/api/checkups/upload")
            .add_header(&p_name, &p_value)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
