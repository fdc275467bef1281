//! Persistent records of the prescription store
//!
//! Relations are plain foreign-key ids. Nested shapes are only produced by
//! the explicit read in [`PatientRecord`].

use chrono::NaiveDate;

pub type PatientId = i32;
pub type DoctorId = i32;
pub type MedicamentId = i32;
pub type PrescriptionId = i32;

/// Upper bound of medicament entries on one prescription
pub const MAX_MEDICAMENTS_PER_PRESCRIPTION: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id_patient: PatientId,
    pub first_name: String,
    pub last_name: String,
}

/// Patient that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
}

impl NewPatient {
    pub fn with_id(self, id_patient: PatientId) -> Patient {
        Patient {
            id_patient,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id_doctor: DoctorId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medicament {
    pub id_medicament: MedicamentId,
    pub name: String,
    pub description: String,
    pub kind: String,
}

/// One medicament line of a prescription, as written to the link table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionMedicament {
    pub id_medicament: MedicamentId,
    pub dose: String,
    pub details: String,
}

/// Prescription staged for insertion. `medicaments` order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrescription {
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub id_patient: PatientId,
    pub id_doctor: DoctorId,
    pub medicaments: Vec<PrescriptionMedicament>,
}

/// Link entry resolved to its medicament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescribedMedicament {
    pub medicament: Medicament,
    pub dose: String,
    pub details: String,
}

/// Prescription with its doctor and medicaments resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionRecord {
    pub id_prescription: PrescriptionId,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub doctor: Doctor,
    pub medicaments: Vec<PrescribedMedicament>,
}

/// Patient with every prescription, loaded in one consistent read.
/// Prescriptions come back in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub patient: Patient,
    pub prescriptions: Vec<PrescriptionRecord>,
}
