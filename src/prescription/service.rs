//! Prescription service
//!
//! Orchestrates the two use cases on top of a [`PrescriptionStore`]:
//!
//! ```text
//! issue:   validate → begin → resolve/stage patient → resolve doctor
//!          → bulk-resolve medicaments → stage prescription → commit
//! details: consistent nested read → project (due date ascending)
//! ```
//!
//! Every early return drops the open unit of work, which discards whatever
//! it staged.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{EntityKind, PrescriptionError, StoreError, ValidationError};
use super::models::{
    MedicamentId, NewPatient, NewPrescription, Patient, PatientId, PrescriptionMedicament,
};
use super::store::{PrescriptionStore, UnitOfWork};
use super::types::{
    DoctorSummary, IssuePrescriptionRequest, MedicamentSummary, PatientDetails, PatientRef,
    PatientSummary, PrescriptionResponse,
};

pub struct PrescriptionService {
    store: Arc<dyn PrescriptionStore>,
}

impl PrescriptionService {
    pub fn new(store: Arc<dyn PrescriptionStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// Validate and persist a prescription, registering the patient if needed
    pub async fn issue_prescription(
        &self,
        req: IssuePrescriptionRequest,
    ) -> Result<PrescriptionResponse, PrescriptionError> {
        // 1. Input rules, before touching the store
        req.validate()?;

        let mut uow = self.store.begin().await?;

        // 2. Patient: reuse or stage a new one
        let (patient, created) = resolve_patient(uow.as_mut(), &req.patient).await?;

        // 3. Doctor must exist
        let doctor = uow
            .find_doctor_by_id(req.doctor.id_doctor)
            .await?
            .ok_or_else(|| {
                tracing::warn!(id_doctor = req.doctor.id_doctor, "Unknown doctor");
                PrescriptionError::NotFound(EntityKind::Doctor)
            })?;

        // 4. Every medicament must exist (one bulk lookup)
        let ids = req.distinct_medicament_ids();
        let found = uow.find_medicaments_by_ids(&ids).await?;
        if found.len() != ids.len() {
            tracing::warn!(
                requested = ids.len(),
                found = found.len(),
                "Unknown medicament in prescription"
            );
            return Err(PrescriptionError::NotFound(EntityKind::Medicament));
        }
        let medicaments: HashMap<MedicamentId, _> =
            found.into_iter().map(|m| (m.id_medicament, m)).collect();

        // 5. One entry per request line, request order kept
        let new_prescription = NewPrescription {
            date: req.date,
            due_date: req.due_date,
            id_patient: patient.id_patient,
            id_doctor: doctor.id_doctor,
            medicaments: req
                .medicaments
                .iter()
                .map(|m| PrescriptionMedicament {
                    id_medicament: m.id_medicament,
                    dose: m.dose.clone(),
                    details: m.details.clone(),
                })
                .collect(),
        };

        // 6. Stage and commit as one unit
        let id_prescription = uow.insert_prescription(&new_prescription).await?;
        uow.commit().await.map_err(|e| {
            tracing::error!(error = %e, "Prescription commit failed");
            PrescriptionError::Persistence(e)
        })?;

        tracing::info!(
            id_prescription,
            id_patient = patient.id_patient,
            id_doctor = doctor.id_doctor,
            medicaments = new_prescription.medicaments.len(),
            new_patient = created,
            "Prescription issued"
        );

        // 7. Fully resolved result
        let summaries = new_prescription
            .medicaments
            .into_iter()
            .filter_map(|entry| {
                medicaments
                    .get(&entry.id_medicament)
                    .map(|m| MedicamentSummary {
                        id_medicament: m.id_medicament,
                        name: m.name.clone(),
                        dose: entry.dose,
                        details: entry.details,
                    })
            })
            .collect();

        Ok(PrescriptionResponse {
            id_prescription,
            date: new_prescription.date,
            due_date: new_prescription.due_date,
            patient: PatientSummary::from(&patient),
            doctor: DoctorSummary::from(&doctor),
            medicaments: summaries,
        })
    }

    /// Patient with every prescription, ordered by due date ascending
    pub async fn get_patient_details(
        &self,
        id_patient: PatientId,
    ) -> Result<PatientDetails, PrescriptionError> {
        let record = self
            .store
            .load_patient_details(id_patient)
            .await?
            .ok_or_else(|| {
                tracing::debug!(id_patient, "Patient not found");
                PrescriptionError::NotFound(EntityKind::Patient)
            })?;

        Ok(PatientDetails::from(record))
    }
}

/// Look the patient up by id; stage a new one when absent.
/// Returns the patient and whether it was created.
async fn resolve_patient(
    uow: &mut dyn UnitOfWork,
    patient_ref: &PatientRef,
) -> Result<(Patient, bool), PrescriptionError> {
    if let Some(id_patient) = patient_ref.id_patient {
        if let Some(existing) = uow.find_patient_by_id(id_patient).await? {
            return Ok((existing, false));
        }
    }

    let first_name = patient_ref.first_name.trim();
    let last_name = patient_ref.last_name.trim();
    if first_name.is_empty() {
        return Err(ValidationError::MissingPatientName {
            field: "firstName",
        }
        .into());
    }
    if last_name.is_empty() {
        return Err(ValidationError::MissingPatientName { field: "lastName" }.into());
    }

    let new_patient = NewPatient {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    };
    let id_patient = uow.insert_patient(&new_patient).await?;
    tracing::debug!(
        id_patient,
        requested_id = ?patient_ref.id_patient,
        "Staged new patient"
    );
    Ok((new_patient.with_id(id_patient), true))
}
