//! Request and response bodies of the prescription API
//!
//! Field names follow the wire format (`camelCase`, `idPatient`, ...).

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ValidationError;
use super::models::{
    Doctor, DoctorId, MAX_MEDICAMENTS_PER_PRESCRIPTION, MedicamentId, Patient, PatientId,
    PatientRecord, PrescribedMedicament, PrescriptionId, PrescriptionRecord,
};

// ============================================================================
// Requests
// ============================================================================

/// Issue a prescription
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuePrescriptionRequest {
    #[schema(value_type = String, format = Date, example = "2024-05-01")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-06-01")]
    pub due_date: NaiveDate,
    pub patient: PatientRef,
    pub doctor: DoctorRef,
    pub medicaments: Vec<MedicamentEntry>,
}

/// Existing patient id, or the names of a patient to register
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    #[serde(default)]
    pub id_patient: Option<PatientId>,
    #[serde(default)]
    #[schema(example = "Anna")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Kowalska")]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRef {
    #[schema(example = 1)]
    pub id_doctor: DoctorId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicamentEntry {
    #[schema(example = 5)]
    pub id_medicament: MedicamentId,
    #[schema(example = "10mg")]
    pub dose: String,
    #[schema(example = "after meal")]
    pub details: String,
}

impl IssuePrescriptionRequest {
    /// Checks that need no store access
    pub fn validate(&self) -> Result<(), ValidationError> {
        let count = self.medicaments.len();
        if count > MAX_MEDICAMENTS_PER_PRESCRIPTION {
            return Err(ValidationError::TooManyMedicaments { got: count });
        }
        if count == 0 {
            return Err(ValidationError::NoMedicaments);
        }

        let mut seen = HashSet::with_capacity(count);
        for entry in &self.medicaments {
            if !seen.insert(entry.id_medicament) {
                return Err(ValidationError::DuplicateMedicament(entry.id_medicament));
            }
        }

        if self.due_date < self.date {
            return Err(ValidationError::DueDateBeforeDate {
                date: self.date,
                due_date: self.due_date,
            });
        }
        Ok(())
    }

    /// Medicament ids in request order, without repeats
    pub fn distinct_medicament_ids(&self) -> Vec<MedicamentId> {
        let mut seen = HashSet::with_capacity(self.medicaments.len());
        self.medicaments
            .iter()
            .map(|m| m.id_medicament)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id_patient: PatientId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id_doctor: DoctorId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicamentSummary {
    pub id_medicament: MedicamentId,
    pub name: String,
    pub dose: String,
    pub details: String,
}

/// Prescription as persisted by `POST /prescriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionResponse {
    pub id_prescription: PrescriptionId,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub patient: PatientSummary,
    pub doctor: DoctorSummary,
    pub medicaments: Vec<MedicamentSummary>,
}

/// One prescription inside [`PatientDetails`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetails {
    pub id_prescription: PrescriptionId,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub doctor: DoctorSummary,
    pub medicaments: Vec<MedicamentSummary>,
}

/// Patient with prescriptions ordered by due date, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    pub id_patient: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub prescriptions: Vec<PrescriptionDetails>,
}

impl From<&Patient> for PatientSummary {
    fn from(p: &Patient) -> Self {
        Self {
            id_patient: p.id_patient,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
        }
    }
}

impl From<&Doctor> for DoctorSummary {
    fn from(d: &Doctor) -> Self {
        Self {
            id_doctor: d.id_doctor,
            first_name: d.first_name.clone(),
            last_name: d.last_name.clone(),
        }
    }
}

impl From<PrescribedMedicament> for MedicamentSummary {
    fn from(pm: PrescribedMedicament) -> Self {
        Self {
            id_medicament: pm.medicament.id_medicament,
            name: pm.medicament.name,
            dose: pm.dose,
            details: pm.details,
        }
    }
}

impl From<PrescriptionRecord> for PrescriptionDetails {
    fn from(p: PrescriptionRecord) -> Self {
        Self {
            id_prescription: p.id_prescription,
            date: p.date,
            due_date: p.due_date,
            doctor: DoctorSummary::from(&p.doctor),
            medicaments: p.medicaments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<PatientRecord> for PatientDetails {
    fn from(record: PatientRecord) -> Self {
        let mut prescriptions: Vec<PrescriptionDetails> =
            record.prescriptions.into_iter().map(Into::into).collect();
        // Stable: equal due dates keep store (id) order
        prescriptions.sort_by_key(|p| p.due_date);

        Self {
            id_patient: record.patient.id_patient,
            first_name: record.patient.first_name,
            last_name: record.patient.last_name,
            prescriptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescription::models::Medicament;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(ids: &[MedicamentId]) -> IssuePrescriptionRequest {
        IssuePrescriptionRequest {
            date: day(2024, 5, 1),
            due_date: day(2024, 6, 1),
            patient: PatientRef {
                id_patient: None,
                first_name: "Anna".to_string(),
                last_name: "Kowalska".to_string(),
            },
            doctor: DoctorRef { id_doctor: 1 },
            medicaments: ids
                .iter()
                .map(|&id| MedicamentEntry {
                    id_medicament: id,
                    dose: "10mg".to_string(),
                    details: "after meal".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_medicament_count() {
        assert!(request(&[1]).validate().is_ok());
        assert!(request(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).validate().is_ok());
        assert_eq!(
            request(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]).validate(),
            Err(ValidationError::TooManyMedicaments { got: 11 })
        );
        assert_eq!(request(&[]).validate(), Err(ValidationError::NoMedicaments));
    }

    #[test]
    fn test_validate_duplicates_and_dates() {
        assert_eq!(
            request(&[3, 4, 3]).validate(),
            Err(ValidationError::DuplicateMedicament(3))
        );

        let mut req = request(&[1]);
        req.due_date = day(2024, 4, 30);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::DueDateBeforeDate { .. })
        ));

        // Same-day due date is allowed
        req.due_date = req.date;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "date": "2024-05-01",
            "dueDate": "2024-06-01",
            "patient": { "idPatient": null, "firstName": "Anna", "lastName": "Kowalska" },
            "doctor": { "idDoctor": 1 },
            "medicaments": [ { "idMedicament": 5, "dose": "10mg", "details": "after meal" } ]
        }"#;
        let req: IssuePrescriptionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.patient.id_patient, None);
        assert_eq!(req.due_date, day(2024, 6, 1));
        assert_eq!(req.medicaments[0].id_medicament, 5);

        // Existing patient may be referenced by id alone
        let json = r#"{ "date": "2024-05-01", "dueDate": "2024-06-01",
            "patient": { "idPatient": 7 }, "doctor": { "idDoctor": 1 }, "medicaments": [] }"#;
        let req: IssuePrescriptionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.patient.id_patient, Some(7));
        assert!(req.patient.first_name.is_empty());
    }

    #[test]
    fn test_patient_details_orders_by_due_date() {
        let doctor = Doctor {
            id_doctor: 1,
            first_name: "Jan".to_string(),
            last_name: "Nowak".to_string(),
        };
        let prescription = |id, due: NaiveDate| PrescriptionRecord {
            id_prescription: id,
            date: day(2023, 1, 1),
            due_date: due,
            doctor: doctor.clone(),
            medicaments: vec![PrescribedMedicament {
                medicament: Medicament {
                    id_medicament: 5,
                    name: "Ibuprofen".to_string(),
                    description: String::new(),
                    kind: String::new(),
                },
                dose: "10mg".to_string(),
                details: "after meal".to_string(),
            }],
        };
        let record = PatientRecord {
            patient: Patient {
                id_patient: 3,
                first_name: "Anna".to_string(),
                last_name: "Kowalska".to_string(),
            },
            prescriptions: vec![
                prescription(1, day(2024, 1, 1)),
                prescription(2, day(2023, 6, 1)),
                prescription(3, day(2024, 1, 1)),
            ],
        };

        let details = PatientDetails::from(record);
        let ids: Vec<_> = details
            .prescriptions
            .iter()
            .map(|p| p.id_prescription)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(details.prescriptions[0].medicaments[0].name, "Ibuprofen");
    }

    #[test]
    fn test_serialize_camel_case() {
        let summary = MedicamentSummary {
            id_medicament: 5,
            name: "Ibuprofen".to_string(),
            dose: "10mg".to_string(),
            details: "after meal".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["idMedicament"], 5);
        assert_eq!(json["dose"], "10mg");
    }
}
