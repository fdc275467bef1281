//! Bootstrap DDL for the prescription tables.
//!
//! Every statement is `IF NOT EXISTS`, so this is safe to run on each start.
//! Schema evolution is left to the operator's own tooling.

use sqlx::PgPool;

const CREATE_PATIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    id_patient  SERIAL PRIMARY KEY,
    first_name  VARCHAR(100) NOT NULL,
    last_name   VARCHAR(100) NOT NULL
)"#;

const CREATE_DOCTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS doctors (
    id_doctor   SERIAL PRIMARY KEY,
    first_name  VARCHAR(100) NOT NULL,
    last_name   VARCHAR(100) NOT NULL
)"#;

const CREATE_MEDICAMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS medicaments (
    id_medicament  SERIAL PRIMARY KEY,
    name           VARCHAR(100) NOT NULL,
    description    VARCHAR(100) NOT NULL DEFAULT '',
    type           VARCHAR(100) NOT NULL DEFAULT ''
)"#;

const CREATE_PRESCRIPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS prescriptions (
    id_prescription  SERIAL PRIMARY KEY,
    date             DATE NOT NULL,
    due_date         DATE NOT NULL,
    id_patient       INTEGER NOT NULL REFERENCES patients (id_patient),
    id_doctor        INTEGER NOT NULL REFERENCES doctors (id_doctor),
    CHECK (due_date >= date)
)"#;

const CREATE_PRESCRIPTION_MEDICAMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS prescription_medicaments (
    id_prescription  INTEGER NOT NULL REFERENCES prescriptions (id_prescription) ON DELETE CASCADE,
    id_medicament    INTEGER NOT NULL REFERENCES medicaments (id_medicament),
    position         SMALLINT NOT NULL,
    dose             VARCHAR(100) NOT NULL,
    details          VARCHAR(100) NOT NULL,
    PRIMARY KEY (id_prescription, id_medicament)
)"#;

const CREATE_PRESCRIPTIONS_PATIENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS prescriptions_id_patient_idx ON prescriptions (id_patient)";

/// Initialize the prescription schema
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing prescription schema...");

    for statement in [
        CREATE_PATIENTS_TABLE,
        CREATE_DOCTORS_TABLE,
        CREATE_MEDICAMENTS_TABLE,
        CREATE_PRESCRIPTIONS_TABLE,
        CREATE_PRESCRIPTION_MEDICAMENTS_TABLE,
        CREATE_PRESCRIPTIONS_PATIENT_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Prescription schema ready");
    Ok(())
}
