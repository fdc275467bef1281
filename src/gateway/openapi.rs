//! OpenAPI Documentation
//!
//! Aggregates the handler annotations into one OpenAPI 3 document.
//! Export it with `cargo run --bin export_openapi`.

use utoipa::OpenApi;

use crate::gateway::types::ErrorResponse;
use crate::prescription::types::{
    DoctorRef, DoctorSummary, IssuePrescriptionRequest, MedicamentEntry, MedicamentSummary,
    PatientDetails, PatientRef, PatientSummary, PrescriptionDetails, PrescriptionResponse,
};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Prescription Service API",
        version = "1.0.0",
        description = "Issue prescriptions and read a patient's prescription history.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::create_prescription,
        crate::gateway::handlers::get_patient_details,
    ),
    components(
        schemas(
            IssuePrescriptionRequest,
            PatientRef,
            DoctorRef,
            MedicamentEntry,
            PrescriptionResponse,
            PatientDetails,
            PrescriptionDetails,
            PatientSummary,
            DoctorSummary,
            MedicamentSummary,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Prescriptions", description = "Prescription issuance and patient history")
    )
)]
pub struct ApiDoc;
