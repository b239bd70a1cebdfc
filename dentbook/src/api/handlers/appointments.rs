use axum::{Json, extract::State, http::StatusCode};
use chrono::{NaiveDate, NaiveTime};

use crate::{
    AppState,
    api::extractors::{ApiJson, ApiPath},
    api::models::appointments::{AppointmentCreate, AppointmentResponse, OutcomeCreate, OutcomeResponse},
    auth::current_user::{Dentist, Patient, RequireRole},
    db::models::appointments::{AppointmentCreateDBRequest, AppointmentFilter},
    errors::{Error, ErrorBody},
    types::{AppointmentId, UserId, abbrev_uuid},
};

const OWN_APPOINTMENTS_ONLY: &str = "Access denied: You can only view your own appointments";

fn validate_slot(date: &str, time: &str) -> Result<(), Error> {
    let date_ok = date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if !date_ok {
        return Err(Error::BadRequest {
            message: format!("Invalid date '{date}', expected YYYY-MM-DD"),
        });
    }
    let time_ok = time.len() == 5 && NaiveTime::parse_from_str(time, "%H:%M").is_ok();
    if !time_ok {
        return Err(Error::BadRequest {
            message: format!("Invalid time '{time}', expected HH:MM"),
        });
    }
    Ok(())
}

/// Non-blank value, or the fallback
fn or_default(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn dentist_profile_not_found() -> Error {
    Error::NotFound {
        resource: "Dentist profile".to_string(),
        id: None,
    }
}

/// Book an appointment with a dentist
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = AppointmentCreate,
    tag = "appointments",
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid date or time", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not a patient", body = ErrorBody),
        (status = 404, description = "Dentist not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(patient_id = %abbrev_uuid(&guard.user.id)))]
pub async fn create_appointment(
    State(state): State<AppState>,
    guard: RequireRole<Patient>,
    ApiJson(request): ApiJson<AppointmentCreate>,
) -> Result<(StatusCode, Json<AppointmentResponse>), Error> {
    let patient = guard.into_inner();
    let date = request.date.trim();
    let time = request.time.trim();
    validate_slot(date, time)?;

    let dentist = state
        .store
        .get_dentist(request.doctor_id)
        .await?
        .ok_or_else(|| Error::not_found("Dentist", request.doctor_id))?;

    let create_request = AppointmentCreateDBRequest {
        patient_id: patient.id,
        patient_name: or_default(request.patient_name, &patient.name),
        patient_email: or_default(request.patient_email, &patient.email),
        dentist_id: dentist.id,
        dentist_name: or_default(request.doctor_name, &dentist.name),
        date: date.to_string(),
        time: time.to_string(),
        message: request.message.filter(|m| !m.trim().is_empty()),
    };

    let appointment = state.store.create_appointment(&create_request).await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// List the appointments booked with the calling dentist
#[utoipa::path(
    get,
    path = "/api/appointments/doctor/{doctor_id}",
    tag = "appointments",
    params(("doctor_id" = String, Path, description = "The dentist's user id")),
    responses(
        (status = 200, description = "Appointments, oldest first", body = Vec<AppointmentResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not a dentist, or not this dentist", body = ErrorBody),
        (status = 404, description = "Dentist profile not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(doctor_id = %abbrev_uuid(&doctor_id)))]
pub async fn list_for_doctor(
    State(state): State<AppState>,
    guard: RequireRole<Dentist>,
    ApiPath(doctor_id): ApiPath<UserId>,
) -> Result<Json<Vec<AppointmentResponse>>, Error> {
    if guard.user.id != doctor_id {
        return Err(Error::Forbidden {
            message: OWN_APPOINTMENTS_ONLY.to_string(),
        });
    }

    let profile = state
        .store
        .get_dentist_by_user(doctor_id)
        .await?
        .ok_or_else(dentist_profile_not_found)?;

    let appointments = state.store.list_appointments(&AppointmentFilter::for_dentist(profile.id)).await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// List the calling patient's appointments
#[utoipa::path(
    get,
    path = "/api/appointments/patient/{patient_id}",
    tag = "appointments",
    params(("patient_id" = String, Path, description = "The patient's user id")),
    responses(
        (status = 200, description = "Appointments, oldest first", body = Vec<AppointmentResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not a patient, or not this patient", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(patient_id = %abbrev_uuid(&patient_id)))]
pub async fn list_for_patient(
    State(state): State<AppState>,
    guard: RequireRole<Patient>,
    ApiPath(patient_id): ApiPath<UserId>,
) -> Result<Json<Vec<AppointmentResponse>>, Error> {
    if guard.user.id != patient_id {
        return Err(Error::Forbidden {
            message: OWN_APPOINTMENTS_ONLY.to_string(),
        });
    }

    let appointments = state.store.list_appointments(&AppointmentFilter::for_patient(patient_id)).await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// Attach the outcome of an appointment
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/results",
    request_body = OutcomeCreate,
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment resolved", body = AppointmentResponse),
        (status = 400, description = "Empty description, or outcome already attached", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not a dentist, or another dentist's appointment", body = ErrorBody),
        (status = 404, description = "Appointment not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(appointment_id = %abbrev_uuid(&id)))]
pub async fn attach_outcome(
    State(state): State<AppState>,
    guard: RequireRole<Dentist>,
    ApiPath(id): ApiPath<AppointmentId>,
    ApiJson(request): ApiJson<OutcomeCreate>,
) -> Result<Json<AppointmentResponse>, Error> {
    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| Error::not_found("Appointment", id))?;

    let profile = state
        .store
        .get_dentist_by_user(guard.user.id)
        .await?
        .ok_or_else(dentist_profile_not_found)?;
    if appointment.dentist_id != profile.id {
        return Err(Error::Forbidden {
            message: "Access denied: You can only resolve your own appointments".to_string(),
        });
    }

    let description = request.description.trim();
    if description.is_empty() {
        return Err(Error::BadRequest {
            message: "Description is required".to_string(),
        });
    }

    let resolved = state
        .store
        .resolve_appointment(id, description)
        .await?
        .ok_or_else(|| Error::Conflict {
            message: "Appointment already has an outcome".to_string(),
        })?;

    Ok(Json(resolved.into()))
}

/// Fetch the outcome of one of the caller's appointments
#[utoipa::path(
    get,
    path = "/api/appointments/{id}/results",
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment outcome", body = OutcomeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not a patient, or another patient's appointment", body = ErrorBody),
        (status = 404, description = "Appointment not found or not resolved yet", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(appointment_id = %abbrev_uuid(&id)))]
pub async fn fetch_outcome(
    State(state): State<AppState>,
    guard: RequireRole<Patient>,
    ApiPath(id): ApiPath<AppointmentId>,
) -> Result<Json<OutcomeResponse>, Error> {
    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| Error::not_found("Appointment", id))?;

    if appointment.patient_id != guard.user.id {
        return Err(Error::Forbidden {
            message: OWN_APPOINTMENTS_ONLY.to_string(),
        });
    }

    let description = appointment.description.ok_or_else(|| Error::NotFound {
        resource: "Appointment outcome".to_string(),
        id: None,
    })?;

    Ok(Json(OutcomeResponse {
        appointment_id: appointment.id,
        description,
        resolved_at: appointment.resolved_at,
    }))
}
