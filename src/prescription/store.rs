//! Data store gateway
//!
//! The service only talks to the store through these two traits. Writes go
//! through a [`UnitOfWork`]: everything it stages becomes visible atomically
//! on [`UnitOfWork::commit`], and dropping it without committing discards
//! the staged changes.

use async_trait::async_trait;

use super::error::StoreError;
use super::models::{
    Doctor, DoctorId, Medicament, MedicamentId, NewPatient, NewPrescription, Patient, PatientId,
    PatientRecord, PrescriptionId,
};

#[async_trait]
pub trait PrescriptionStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Open a unit of work (one store transaction)
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Load a patient with every prescription, its doctor and its
    /// medicaments from a single snapshot.
    async fn load_patient_details(
        &self,
        id_patient: PatientId,
    ) -> Result<Option<PatientRecord>, StoreError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Staged reads and writes sharing one transaction.
///
/// Reads observe the unit's own staged inserts.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_patient_by_id(
        &mut self,
        id_patient: PatientId,
    ) -> Result<Option<Patient>, StoreError>;

    async fn find_doctor_by_id(&mut self, id_doctor: DoctorId)
    -> Result<Option<Doctor>, StoreError>;

    /// Returns only the medicaments that exist, in no particular order.
    async fn find_medicaments_by_ids(
        &mut self,
        ids: &[MedicamentId],
    ) -> Result<Vec<Medicament>, StoreError>;

    /// Stage a patient and return the id the store assigned to it
    async fn insert_patient(&mut self, patient: &NewPatient) -> Result<PatientId, StoreError>;

    /// Stage a prescription with its medicament entries
    async fn insert_prescription(
        &mut self,
        prescription: &NewPrescription,
    ) -> Result<PrescriptionId, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
