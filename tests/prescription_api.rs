//! HTTP-level tests for the prescription endpoints, driven through the
//! router against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use prescription_service::gateway::{build_router, state::AppState};
use prescription_service::prescription::{MemoryStore, PrescriptionService};

/// Router over a store seeded with doctor 1 and medicaments 1..=12
fn app() -> (MemoryStore, Router) {
    let store = MemoryStore::new();
    store.add_doctor("Jan", "Nowak");
    for i in 1..=12 {
        store.add_medicament(&format!("Medicament {i}"), "", "tablet");
    }
    let service = Arc::new(PrescriptionService::new(Arc::new(store.clone())));
    let router = build_router(Arc::new(AppState::new(service)));
    (store, router)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_prescription(router: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/prescriptions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn get_details(router: &Router, id_patient: i64) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/prescriptions/{id_patient}"))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

fn prescription_body(id_patient: Value, due_date: &str, medicaments: Value) -> Value {
    json!({
        "date": "2023-01-01",
        "dueDate": due_date,
        "patient": { "idPatient": id_patient, "firstName": "Anna", "lastName": "Kowalska" },
        "doctor": { "idDoctor": 1 },
        "medicaments": medicaments
    })
}

#[tokio::test]
async fn issue_for_new_patient_returns_created_prescription() {
    let (store, router) = app();
    let body = prescription_body(
        Value::Null,
        "2024-06-01",
        json!([{ "idMedicament": 5, "dose": "10mg", "details": "after meal" }]),
    );

    let (status, resp) = post_prescription(&router, body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(resp["idPrescription"].as_i64().unwrap() > 0);
    assert!(resp["patient"]["idPatient"].as_i64().unwrap() > 0);
    assert_eq!(resp["patient"]["firstName"], "Anna");
    assert_eq!(resp["doctor"]["idDoctor"], 1);
    assert_eq!(resp["medicaments"].as_array().unwrap().len(), 1);
    assert_eq!(resp["medicaments"][0]["idMedicament"], 5);
    assert_eq!(resp["medicaments"][0]["dose"], "10mg");
    assert_eq!(resp["medicaments"][0]["details"], "after meal");
    assert_eq!(store.patient_count(), 1);
}

#[tokio::test]
async fn eleven_medicaments_is_bad_request() {
    let (store, router) = app();
    let medicaments: Vec<Value> = (1..=11)
        .map(|id| json!({ "idMedicament": id, "dose": "1", "details": "-" }))
        .collect();

    let (status, resp) =
        post_prescription(&router, prescription_body(Value::Null, "2024-06-01", json!(medicaments)))
            .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 1001);
    assert!(resp["msg"].as_str().unwrap().contains("10"), "{resp}");
    assert_eq!(store.patient_count(), 0);
    assert_eq!(store.prescription_count(), 0);
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let (store, router) = app();
    let mut body = prescription_body(
        Value::Null,
        "2024-06-01",
        json!([{ "idMedicament": 1, "dose": "1", "details": "-" }]),
    );
    body["doctor"]["idDoctor"] = json!(99);

    let (status, resp) = post_prescription(&router, body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["msg"], "doctor not found");
    assert_eq!(store.patient_count(), 0);
}

#[tokio::test]
async fn unknown_medicament_is_not_found() {
    let (store, router) = app();
    let body = prescription_body(
        Value::Null,
        "2024-06-01",
        json!([
            { "idMedicament": 1, "dose": "1", "details": "-" },
            { "idMedicament": 500, "dose": "1", "details": "-" }
        ]),
    );

    let (status, resp) = post_prescription(&router, body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["msg"], "medicament not found");
    assert_eq!(store.prescription_count(), 0);
}

#[tokio::test]
async fn failed_commit_is_internal_error() {
    let (store, router) = app();
    store.set_fail_commit(true);
    let body = prescription_body(
        Value::Null,
        "2024-06-01",
        json!([{ "idMedicament": 1, "dose": "1", "details": "-" }]),
    );

    let (status, resp) = post_prescription(&router, body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["code"], 5000);
    assert_eq!(store.patient_count(), 0);
}

#[tokio::test]
async fn details_list_prescriptions_by_due_date() {
    let (_, router) = app();

    let (status, first) = post_prescription(
        &router,
        prescription_body(
            Value::Null,
            "2024-01-01",
            json!([{ "idMedicament": 1, "dose": "5ml", "details": "morning" }]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id_patient = first["patient"]["idPatient"].as_i64().unwrap();

    let (status, second) = post_prescription(
        &router,
        prescription_body(
            json!(id_patient),
            "2023-06-01",
            json!([
                { "idMedicament": 2, "dose": "1 tablet", "details": "evening" },
                { "idMedicament": 3, "dose": "2 tablets", "details": "with water" }
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["patient"]["idPatient"], id_patient);

    let (status, details) = get_details(&router, id_patient).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["idPatient"], id_patient);
    assert_eq!(details["firstName"], "Anna");
    assert_eq!(details["lastName"], "Kowalska");
    let prescriptions = details["prescriptions"].as_array().unwrap();
    assert_eq!(prescriptions.len(), 2);
    assert_eq!(prescriptions[0]["dueDate"], "2023-06-01");
    assert_eq!(prescriptions[0]["idPrescription"], second["idPrescription"]);
    assert_eq!(prescriptions[1]["dueDate"], "2024-01-01");
    assert_eq!(prescriptions[0]["doctor"]["firstName"], "Jan");
    assert_eq!(prescriptions[0]["medicaments"].as_array().unwrap().len(), 2);
    assert_eq!(prescriptions[1]["medicaments"][0]["name"], "Medicament 1");
    assert_eq!(prescriptions[1]["medicaments"][0]["dose"], "5ml");
}

#[tokio::test]
async fn details_for_unknown_patient_is_not_found() {
    let (_, router) = app();

    let (status, resp) = get_details(&router, 42).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["code"], 4004);
    assert_eq!(resp["msg"], "patient not found");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (store, router) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/prescriptions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{ "date": "not a date" }"#))
        .unwrap();

    let (status, resp) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 1001);
    assert!(resp["msg"].as_str().unwrap().starts_with("Invalid JSON"), "{resp}");
    assert_eq!(store.patient_count(), 0);
}

#[tokio::test]
async fn missing_medicaments_field_is_bad_request() {
    let (store, router) = app();
    let mut body = prescription_body(Value::Null, "2024-06-01", json!([]));
    body.as_object_mut().unwrap().remove("medicaments");

    let (status, resp) = post_prescription(&router, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 1001);
    assert!(resp["msg"].as_str().unwrap().contains("medicaments"), "{resp}");
    assert_eq!(store.patient_count(), 0);
}

#[tokio::test]
async fn non_numeric_patient_id_is_bad_request() {
    let (_, router) = app();
    let request = Request::builder()
        .uri("/prescriptions/abc")
        .body(Body::empty())
        .unwrap();

    let (status, resp) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 1001);
}
