//! Prescription Service
//!
//! HTTP API for issuing medical prescriptions and reading a patient's
//! prescription history, backed by PostgreSQL.
//!
//! # Modules
//!
//! - [`prescription`] - Domain records, store gateways and the prescription service
//! - [`gateway`] - axum router, handlers and OpenAPI document
//! - [`db`] - PostgreSQL pool and bootstrap schema
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod prescription;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use prescription::{
    IssuePrescriptionRequest, MemoryStore, PatientDetails, PgPrescriptionStore,
    PrescriptionError, PrescriptionResponse, PrescriptionService, PrescriptionStore,
};
