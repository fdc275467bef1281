//! In-memory store gateway
//!
//! Same unit-of-work contract as the PostgreSQL gateway: ids are drawn from
//! shared sequences when a row is staged (gaps appear on rollback, as with
//! `SERIAL`), staged rows stay private to their unit of work, and commit
//! applies them under one lock. Foreign keys and the link-table primary key
//! are checked on insert.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::error::StoreError;
use super::models::{
    Doctor, DoctorId, Medicament, MedicamentId, NewPatient, NewPrescription, Patient, PatientId,
    PatientRecord, PrescribedMedicament, PrescriptionId, PrescriptionRecord,
};
use super::store::{PrescriptionStore, UnitOfWork};

#[derive(Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    doctors: BTreeMap<DoctorId, Doctor>,
    medicaments: BTreeMap<MedicamentId, Medicament>,
    prescriptions: BTreeMap<PrescriptionId, NewPrescription>,
    patient_seq: PatientId,
    prescription_seq: PrescriptionId,
}

impl Tables {
    fn next_patient_id(&mut self) -> PatientId {
        self.patient_seq += 1;
        self.patient_seq
    }

    fn next_prescription_id(&mut self) -> PrescriptionId {
        self.prescription_seq += 1;
        self.prescription_seq
    }
}

/// Shared in-memory tables. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_commit: Arc<AtomicBool>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a doctor (doctors are provisioned outside the service)
    pub fn add_doctor(&self, first_name: &str, last_name: &str) -> DoctorId {
        let mut tables = self.tables();
        let id_doctor = tables.doctors.keys().next_back().copied().unwrap_or(0) + 1;
        tables.doctors.insert(
            id_doctor,
            Doctor {
                id_doctor,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        id_doctor
    }

    /// Register a medicament (medicaments are provisioned outside the service)
    pub fn add_medicament(&self, name: &str, description: &str, kind: &str) -> MedicamentId {
        let mut tables = self.tables();
        let id_medicament = tables.medicaments.keys().next_back().copied().unwrap_or(0) + 1;
        tables.medicaments.insert(
            id_medicament,
            Medicament {
                id_medicament,
                name: name.to_string(),
                description: description.to_string(),
                kind: kind.to_string(),
            },
        );
        id_medicament
    }

    pub fn add_patient(&self, first_name: &str, last_name: &str) -> PatientId {
        let mut tables = self.tables();
        let id_patient = tables.next_patient_id();
        tables.patients.insert(
            id_patient,
            Patient {
                id_patient,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        id_patient
    }

    pub fn patient_count(&self) -> usize {
        self.tables().patients.len()
    }

    pub fn prescription_count(&self) -> usize {
        self.tables().prescriptions.len()
    }

    /// Make every subsequent commit fail, as if the transaction aborted
    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Make every store call fail, as if the connection were lost
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrescriptionStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        self.check_available()?;
        Ok(Box::new(MemoryUnitOfWork {
            store: self.clone(),
            staged_patients: Vec::new(),
            staged_prescriptions: Vec::new(),
        }))
    }

    async fn load_patient_details(
        &self,
        id_patient: PatientId,
    ) -> Result<Option<PatientRecord>, StoreError> {
        self.check_available()?;
        let tables = self.tables();

        let Some(patient) = tables.patients.get(&id_patient).cloned() else {
            return Ok(None);
        };

        let mut prescriptions = Vec::new();
        for (id_prescription, stored) in &tables.prescriptions {
            if stored.id_patient != id_patient {
                continue;
            }
            let doctor = tables
                .doctors
                .get(&stored.id_doctor)
                .cloned()
                .ok_or_else(|| dangling("doctor", stored.id_doctor))?;
            let mut medicaments = Vec::with_capacity(stored.medicaments.len());
            for entry in &stored.medicaments {
                let medicament = tables
                    .medicaments
                    .get(&entry.id_medicament)
                    .cloned()
                    .ok_or_else(|| dangling("medicament", entry.id_medicament))?;
                medicaments.push(PrescribedMedicament {
                    medicament,
                    dose: entry.dose.clone(),
                    details: entry.details.clone(),
                });
            }
            prescriptions.push(PrescriptionRecord {
                id_prescription: *id_prescription,
                date: stored.date,
                due_date: stored.due_date,
                doctor,
                medicaments,
            });
        }

        Ok(Some(PatientRecord {
            patient,
            prescriptions,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

fn dangling(kind: &str, id: i32) -> StoreError {
    StoreError::Constraint(format!("dangling {} reference {}", kind, id))
}

struct MemoryUnitOfWork {
    store: MemoryStore,
    staged_patients: Vec<Patient>,
    staged_prescriptions: Vec<(PrescriptionId, NewPrescription)>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_patient_by_id(
        &mut self,
        id_patient: PatientId,
    ) -> Result<Option<Patient>, StoreError> {
        self.store.check_available()?;
        if let Some(staged) = self
            .staged_patients
            .iter()
            .find(|p| p.id_patient == id_patient)
        {
            return Ok(Some(staged.clone()));
        }
        Ok(self.store.tables().patients.get(&id_patient).cloned())
    }

    async fn find_doctor_by_id(
        &mut self,
        id_doctor: DoctorId,
    ) -> Result<Option<Doctor>, StoreError> {
        self.store.check_available()?;
        Ok(self.store.tables().doctors.get(&id_doctor).cloned())
    }

    async fn find_medicaments_by_ids(
        &mut self,
        ids: &[MedicamentId],
    ) -> Result<Vec<Medicament>, StoreError> {
        self.store.check_available()?;
        let wanted: HashSet<MedicamentId> = ids.iter().copied().collect();
        let tables = self.store.tables();
        Ok(tables
            .medicaments
            .values()
            .filter(|m| wanted.contains(&m.id_medicament))
            .cloned()
            .collect())
    }

    async fn insert_patient(&mut self, patient: &NewPatient) -> Result<PatientId, StoreError> {
        self.store.check_available()?;
        let id_patient = self.store.tables().next_patient_id();
        self.staged_patients.push(patient.clone().with_id(id_patient));
        Ok(id_patient)
    }

    async fn insert_prescription(
        &mut self,
        prescription: &NewPrescription,
    ) -> Result<PrescriptionId, StoreError> {
        self.store.check_available()?;
        let mut tables = self.store.tables();

        let patient_known = tables.patients.contains_key(&prescription.id_patient)
            || self
                .staged_patients
                .iter()
                .any(|p| p.id_patient == prescription.id_patient);
        if !patient_known {
            return Err(dangling("patient", prescription.id_patient));
        }
        if !tables.doctors.contains_key(&prescription.id_doctor) {
            return Err(dangling("doctor", prescription.id_doctor));
        }
        let mut seen = HashSet::new();
        for entry in &prescription.medicaments {
            if !tables.medicaments.contains_key(&entry.id_medicament) {
                return Err(dangling("medicament", entry.id_medicament));
            }
            if !seen.insert(entry.id_medicament) {
                return Err(StoreError::Constraint(format!(
                    "duplicate key (id_prescription, id_medicament={})",
                    entry.id_medicament
                )));
            }
        }

        let id_prescription = tables.next_prescription_id();
        self.staged_prescriptions
            .push((id_prescription, prescription.clone()));
        Ok(id_prescription)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.store.check_available()?;
        if self.store.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "transaction aborted during commit".to_string(),
            ));
        }

        let MemoryUnitOfWork {
            store,
            staged_patients,
            staged_prescriptions,
        } = *self;
        let mut tables = store.tables();
        for patient in staged_patients {
            tables.patients.insert(patient.id_patient, patient);
        }
        for (id, prescription) in staged_prescriptions {
            tables.prescriptions.insert(id, prescription);
        }
        Ok(())
    }
}
