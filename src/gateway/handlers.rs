use axum::{Json, extract::State};
use std::sync::Arc;

use crate::prescription::{
    IssuePrescriptionRequest, PatientDetails, PatientId, PrescriptionResponse,
};

use super::state::AppState;
use super::types::{ApiError, ErrorResponse, JsonBody, PathParam, api_error};

/// Issue a prescription
///
/// POST /prescriptions
///
/// Registers the patient when the referenced id is unknown. Doctor and
/// medicaments must already exist.
#[utoipa::path(
    post,
    path = "/prescriptions",
    request_body = IssuePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription persisted", body = PrescriptionResponse),
        (status = 400, description = "Malformed body or invalid prescription (e.g. more than 10 medicaments)", body = ErrorResponse),
        (status = 404, description = "Doctor or medicament does not exist", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Prescriptions"
)]
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<IssuePrescriptionRequest>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    state
        .prescriptions
        .issue_prescription(req)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Patient details with prescription history
///
/// GET /prescriptions/{id_patient}
#[utoipa::path(
    get,
    path = "/prescriptions/{id_patient}",
    params(
        ("id_patient" = i32, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient with prescriptions ordered by due date", body = PatientDetails),
        (status = 400, description = "Patient id is not an integer", body = ErrorResponse),
        (status = 404, description = "Patient does not exist", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Prescriptions"
)]
pub async fn get_patient_details(
    State(state): State<Arc<AppState>>,
    PathParam(id_patient): PathParam<PatientId>,
) -> Result<Json<PatientDetails>, ApiError> {
    state
        .prescriptions
        .get_patient_details(id_patient)
        .await
        .map(Json)
        .map_err(api_error)
}
