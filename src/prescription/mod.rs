//! Prescription issuance and patient history
//!
//! - [`models`]: persistent records (patients, doctors, medicaments, prescriptions)
//! - [`store`]: data store gateway traits ([`PrescriptionStore`], [`UnitOfWork`])
//! - [`pg`]: PostgreSQL gateway
//! - [`memory`]: in-memory gateway with the same transactional behaviour
//! - [`service`]: the issue / get-details use cases
//! - [`types`]: request and response bodies

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod service;
pub mod store;
pub mod types;

pub use error::{EntityKind, PrescriptionError, StoreError, ValidationError};
pub use memory::MemoryStore;
pub use models::{
    Doctor, DoctorId, MAX_MEDICAMENTS_PER_PRESCRIPTION, Medicament, MedicamentId, Patient,
    PatientId, PatientRecord, PrescriptionId,
};
pub use pg::PgPrescriptionStore;
pub use service::PrescriptionService;
pub use store::{PrescriptionStore, UnitOfWork};
pub use types::{IssuePrescriptionRequest, PatientDetails, PrescriptionResponse};
