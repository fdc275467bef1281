//! Prescription error types

use std::fmt;

use thiserror::Error;

use super::models::MAX_MEDICAMENTS_PER_PRESCRIPTION;

/// Kind of record a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Patient,
    Doctor,
    Medicament,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
            EntityKind::Medicament => "medicament",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller input that breaks a prescription rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "too many medicaments: a prescription may contain at most {max} medicaments, got {got}",
        max = MAX_MEDICAMENTS_PER_PRESCRIPTION
    )]
    TooManyMedicaments { got: usize },

    #[error("a prescription must contain at least one medicament")]
    NoMedicaments,

    #[error("medicament {0} is listed more than once")]
    DuplicateMedicament(i32),

    #[error("due date {due_date} is before prescription date {date}")]
    DueDateBeforeDate {
        date: chrono::NaiveDate,
        due_date: chrono::NaiveDate,
    },

    #[error("{field} is required to register a new patient")]
    MissingPatientName { field: &'static str },
}

/// Failure reported by a store gateway
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the prescription service
#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl PrescriptionError {
    /// Error code for API responses
    pub fn code(&self) -> i32 {
        match self {
            PrescriptionError::Validation(_) => error_codes::INVALID_PARAMETER,
            PrescriptionError::NotFound(_) => error_codes::NOT_FOUND,
            PrescriptionError::Persistence(_) => error_codes::PERSISTENCE_ERROR,
        }
    }

    /// HTTP status for the API surface
    pub fn http_status(&self) -> u16 {
        match self {
            PrescriptionError::Validation(_) => 400,
            PrescriptionError::NotFound(_) => 404,
            PrescriptionError::Persistence(_) => 500,
        }
    }
}

/// Numeric codes carried in error bodies
pub mod error_codes {
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const NOT_FOUND: i32 = 4004;
    pub const PERSISTENCE_ERROR: i32 = 5000;
}
