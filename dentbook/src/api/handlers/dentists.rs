use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::dentists::DentistResponse,
    auth::current_user::{Patient, RequireRole},
    errors::{Error, ErrorBody},
};

/// List all dentists patients can book with
#[utoipa::path(
    get,
    path = "/api/dentists",
    tag = "dentists",
    responses(
        (status = 200, description = "All dentist profiles, oldest first", body = Vec<DentistResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not a patient", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_dentists(State(state): State<AppState>, _guard: RequireRole<Patient>) -> Result<Json<Vec<DentistResponse>>, Error> {
    let dentists = state.store.list_dentists().await?;
    Ok(Json(dentists.into_iter().map(DentistResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add_auth_headers, create_test_dentist, create_test_state, create_test_user};
    use crate::types::Role;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn create_server(state: AppState) -> TestServer {
        let app = axum::Router::new()
            .route("/api/dentists", axum::routing::get(list_dentists))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_patient_lists_dentists_in_order() {
        let state = create_test_state();
        let (_, first) = create_test_dentist(&state, "Dr. First", &["Monday"]).await;
        let (_, second) = create_test_dentist(&state, "Dr. Second", &["Tuesday", "Friday"]).await;
        let patient = create_test_user(&state, Role::Patient).await;
        let server = create_server(state.clone());

        let (name, value) = add_auth_headers(&state, &patient);
        let response = server.get("/api/dentists").add_header(&name, &value).await;

        response.assert_status_ok();
        let body: Vec<DentistResponse> = response.json();
        assert_eq!(body, vec![DentistResponse::from(first), DentistResponse::from(second)]);
    }

    #[tokio::test]
    async fn test_dentist_cannot_list_dentists() {
        let state = create_test_state();
        let dentist = create_test_user(&state, Role::Dentist).await;
        let server = create_server(state.clone());

        let (name, value) = add_auth_headers(&state, &dentist);
        let response = server.get("/api/dentists").add_header(&name, &value).await;

        response.assert_status(StatusCode::FORBIDDEN);
        response.assert_json(&serde_json::json!({"message": "Access denied: Not a patient"}));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_list_dentists() {
        let server = create_server(create_test_state());

        let response = server.get("/api/dentists").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({"message": "No token provided"}));
    }
}
