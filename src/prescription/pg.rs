//! PostgreSQL store gateway

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::error::StoreError;
use super::models::{
    Doctor, DoctorId, Medicament, MedicamentId, NewPatient, NewPrescription, Patient, PatientId,
    PatientRecord, PrescribedMedicament, PrescriptionId, PrescriptionRecord,
};
use super::store::{PrescriptionStore, UnitOfWork};

/// Prescription store backed by a PostgreSQL pool
pub struct PgPrescriptionStore {
    pool: PgPool,
}

impl PgPrescriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrescriptionStore for PgPrescriptionStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn load_patient_details(
        &self,
        id_patient: PatientId,
    ) -> Result<Option<PatientRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Both selects must see the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"SELECT id_patient, first_name, last_name
               FROM patients WHERE id_patient = $1"#,
        )
        .bind(id_patient)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let patient = patient_from_row(&row)?;

        let rows = sqlx::query(
            r#"SELECT p.id_prescription, p.date, p.due_date,
                      d.id_doctor, d.first_name AS doctor_first_name,
                      d.last_name AS doctor_last_name,
                      m.id_medicament, m.name, m.description, m.type,
                      pm.dose, pm.details
               FROM prescriptions p
               JOIN doctors d ON d.id_doctor = p.id_doctor
               LEFT JOIN prescription_medicaments pm
                      ON pm.id_prescription = p.id_prescription
               LEFT JOIN medicaments m ON m.id_medicament = pm.id_medicament
               WHERE p.id_patient = $1
               ORDER BY p.id_prescription, pm.position"#,
        )
        .bind(id_patient)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut prescriptions: Vec<PrescriptionRecord> = Vec::new();
        for row in &rows {
            let id_prescription: PrescriptionId = row.try_get("id_prescription")?;
            let is_new = prescriptions
                .last()
                .is_none_or(|last| last.id_prescription != id_prescription);
            if is_new {
                prescriptions.push(PrescriptionRecord {
                    id_prescription,
                    date: row.try_get("date")?,
                    due_date: row.try_get("due_date")?,
                    doctor: Doctor {
                        id_doctor: row.try_get("id_doctor")?,
                        first_name: row.try_get("doctor_first_name")?,
                        last_name: row.try_get("doctor_last_name")?,
                    },
                    medicaments: Vec::new(),
                });
            }

            // LEFT JOIN: a prescription row without entries carries NULLs here
            let id_medicament: Option<MedicamentId> = row.try_get("id_medicament")?;
            if let (Some(id_medicament), Some(current)) = (id_medicament, prescriptions.last_mut())
            {
                current.medicaments.push(PrescribedMedicament {
                    medicament: Medicament {
                        id_medicament,
                        name: row.try_get("name")?,
                        description: row.try_get("description")?,
                        kind: row.try_get("type")?,
                    },
                    dose: row.try_get("dose")?,
                    details: row.try_get("details")?,
                });
            }
        }

        Ok(Some(PatientRecord {
            patient,
            prescriptions,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_patient_by_id(
        &mut self,
        id_patient: PatientId,
    ) -> Result<Option<Patient>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id_patient, first_name, last_name
               FROM patients WHERE id_patient = $1"#,
        )
        .bind(id_patient)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(patient_from_row).transpose()?)
    }

    async fn find_doctor_by_id(
        &mut self,
        id_doctor: DoctorId,
    ) -> Result<Option<Doctor>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id_doctor, first_name, last_name
               FROM doctors WHERE id_doctor = $1"#,
        )
        .bind(id_doctor)
        .fetch_optional(&mut *self.tx)
        .await?;

        let doctor = match row {
            Some(r) => Some(Doctor {
                id_doctor: r.try_get("id_doctor")?,
                first_name: r.try_get("first_name")?,
                last_name: r.try_get("last_name")?,
            }),
            None => None,
        };
        Ok(doctor)
    }

    async fn find_medicaments_by_ids(
        &mut self,
        ids: &[MedicamentId],
    ) -> Result<Vec<Medicament>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT id_medicament, name, description, type
               FROM medicaments WHERE id_medicament = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut medicaments = Vec::with_capacity(rows.len());
        for r in &rows {
            medicaments.push(Medicament {
                id_medicament: r.try_get("id_medicament")?,
                name: r.try_get("name")?,
                description: r.try_get("description")?,
                kind: r.try_get("type")?,
            });
        }
        Ok(medicaments)
    }

    async fn insert_patient(&mut self, patient: &NewPatient) -> Result<PatientId, StoreError> {
        let id: PatientId = sqlx::query_scalar(
            r#"INSERT INTO patients (first_name, last_name) VALUES ($1, $2)
               RETURNING id_patient"#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn insert_prescription(
        &mut self,
        prescription: &NewPrescription,
    ) -> Result<PrescriptionId, StoreError> {
        let id: PrescriptionId = sqlx::query_scalar(
            r#"INSERT INTO prescriptions (date, due_date, id_patient, id_doctor)
               VALUES ($1, $2, $3, $4)
               RETURNING id_prescription"#,
        )
        .bind(prescription.date)
        .bind(prescription.due_date)
        .bind(prescription.id_patient)
        .bind(prescription.id_doctor)
        .fetch_one(&mut *self.tx)
        .await?;

        for (position, entry) in prescription.medicaments.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO prescription_medicaments
                       (id_prescription, id_medicament, position, dose, details)
                   VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(id)
            .bind(entry.id_medicament)
            .bind(position as i16)
            .bind(&entry.dose)
            .bind(&entry.details)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}

fn patient_from_row(row: &PgRow) -> Result<Patient, sqlx::Error> {
    Ok(Patient {
        id_patient: row.try_get("id_patient")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    })
}
