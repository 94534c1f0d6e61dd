//! Integration tests for the typed carelink endpoints

use carelink_core::{
    AppointmentSlot, BookingConfirmation, BookingStatus, CareTipsRequest, CredentialPair,
    CredentialStore, IntakeDraft, IntakeWizard, LoginRequest, MemoryCredentialStore,
    ProviderMatchQuery, RegisterRequest,
};
use carelink_http::{CareClient, ClientError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(server: &MockServer, store: Arc<MemoryCredentialStore>) -> CareClient {
    CareClient::builder()
        .base_url(server.uri())
        .credential_store(store)
        .build()
        .unwrap()
}

fn logged_in() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_pair(CredentialPair::new(
        "A1", "R1",
    )))
}

fn provider_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "specialty": "Cardiology",
        "address": "12 MG Road",
        "phone": "9876543210",
        "email": "clinic@example.com",
        "rating": 4.6,
        "wait_time": "2 days",
        "accepted_insurances": ["Star Health"],
        "match_score": 0.92
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = CareClient::builder()
        .base_url("http://localhost:8000/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = CareClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_stores_tokens_and_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({ "email": "asha@example.com", "password": "s3cret-pass" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u-1",
            "name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "9876543210"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with(&mock_server, store.clone());

    let user = client
        .login(&LoginRequest {
            email: "asha@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.id, "u-1");

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.access_token.as_deref(), Some("A1"));
    assert_eq!(snapshot.refresh_token.as_deref(), Some("R1"));
    assert_eq!(snapshot.user, Some(user.clone()));
    assert_eq!(client.current_user().await.unwrap(), Some(user));

    client.logout().await.unwrap();
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.access_token, None);
    assert_eq!(snapshot.refresh_token, None);
    assert_eq!(snapshot.user, None);
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with(&mock_server, store.clone());

    let err = client
        .login(&LoginRequest {
            email: "asha@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Invalid credentials"));
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_login_rolls_back_when_profile_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "refresh_token": "R1"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with(&mock_server, store.clone());

    let err = client
        .login(&LoginRequest {
            email: "asha@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ServerError { status: 500, .. }));
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_register_email_in_use() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Email already registered" })),
        )
        .mount(&mock_server)
        .await;

    let client = CareClient::new(mock_server.uri()).unwrap();
    let err = client
        .register(&RegisterRequest {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            password: "s3cret-pass".into(),
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EmailInUse(_)));
}

#[tokio::test]
async fn test_register_returns_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(body_json(json!({
            "name": "Asha Rao",
            "email": "asha@example.com",
            "password": "s3cret-pass",
            "phone": "9876543210"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-9",
            "name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "9876543210"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CareClient::new(mock_server.uri()).unwrap();
    let user = client
        .register(&RegisterRequest {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            password: "s3cret-pass".into(),
            phone: Some("9876543210".into()),
        })
        .await
        .unwrap();
    assert_eq!(user.id, "u-9");
}

#[tokio::test]
async fn test_submit_intake_from_wizard() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/intake/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_id": "intake-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut wizard = IntakeWizard::new(IntakeDraft::default());
    {
        let draft = wizard.draft_mut();
        draft.name = "Asha Rao".into();
        draft.phone_number = "9876543210".into();
        draft.age = "34".into();
        draft.email = "asha@example.com".into();
        draft.add_symptom("Chest pain");
        draft.add_symptom("Shortness of breath");
        draft.duration = "2-3 days".into();
        draft.urgency_level = "High".into();
        draft.severity = "7".into();
        draft.detailed_description = "pain when climbing stairs".into();
        draft.address = "12 MG Road".into();
        draft.city = "Bengaluru".into();
        draft.state = "Karnataka".into();
        draft.pincode = "560001".into();
        draft.insurance_provider = "Star Health".into();
        draft.insurance_plan = "Family Floater".into();
        draft.member_id = "SH-1001".into();
    }
    let submission = wizard.finish("u-1").unwrap();

    let client = client_with(&mock_server, logged_in());
    let record = client.submit_intake(&submission).await.unwrap();
    assert_eq!(record["_id"], "intake-1");

    let received = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["primarySymptoms"], "Chest pain, Shortness of breath");
    assert_eq!(body["user_id"], "u-1");
}

#[tokio::test]
async fn test_match_providers_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/providers/match/"))
        .and(query_param("symptoms", "Chest pain, Fever"))
        .and(query_param("insurance", "Star Health"))
        .and(query_param("limit", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([provider_json("p-1", "Dr. Mehta")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CareClient::new(mock_server.uri()).unwrap();
    let query = ProviderMatchQuery {
        symptoms: vec!["Chest pain".into(), "Fever".into()],
        insurance: Some("Star Health".into()),
        ..ProviderMatchQuery::default()
    };
    let providers = client.match_providers(&query).await.unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id, "p-1");
    assert_eq!(providers[0].match_score, Some(0.92));
}

#[tokio::test]
async fn test_provider_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/providers/p-404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Provider not found" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/providers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            provider_json("p-1", "Dr. Mehta"),
            provider_json("p-2", "Dr. Iyer")
        ])))
        .mount(&mock_server)
        .await;

    let client = CareClient::new(mock_server.uri()).unwrap();
    let err = client.provider("p-404").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "Provider not found"));

    let all = client.list_providers().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_care_tips_sections() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ai/gemini-care-tips/"))
        .and(body_json(json!({
            "provider_name": "Dr. Mehta",
            "specialty": "Cardiology",
            "question": "chest pain"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tips": "Experienced with chest pain.\n---SECTION---\nExpect an ECG."
        })))
        .mount(&mock_server)
        .await;

    let client = CareClient::new(mock_server.uri()).unwrap();
    let summary = client
        .care_tips(&CareTipsRequest {
            provider_name: "Dr. Mehta".into(),
            specialty: "Cardiology".into(),
            question: "chest pain".into(),
        })
        .await
        .unwrap();
    assert_eq!(summary.why(), "Experienced with chest pain.");
    assert_eq!(summary.expect(), "Expect an ECG.");
}

#[tokio::test]
async fn test_confirm_and_list_bookings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/bookings/confirm"))
        .and(header("authorization", "Bearer A1"))
        .and(body_json(json!({
            "user_id": "u-1",
            "provider_id": "p-1",
            "appointment_time": "2026-11-02T10:30:00",
            "status": "confirmed",
            "outOfPocketCost": 250.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Booking confirmed successfully",
            "booking_id": "b-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/user/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "b-1",
            "user_id": "u-1",
            "provider_id": "p-1",
            "appointment_time": "2026-11-02T10:30:00",
            "status": "confirmed"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, logged_in());
    let ack = client
        .confirm_booking(&BookingConfirmation {
            user_id: "u-1".into(),
            provider_id: "p-1".into(),
            appointment_time: "2026-11-02T10:30:00".into(),
            status: BookingStatus::Confirmed,
            out_of_pocket_cost: Some(250.0),
        })
        .await
        .unwrap();
    assert_eq!(ack.booking_id.as_deref(), Some("b-1"));

    let bookings = client.user_bookings("u-1").await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, "b-1");
    assert!(bookings[0].appointment_at().is_some());
}

#[tokio::test]
async fn test_cancel_encodes_booking_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/bookings/cancel/b%201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Booking cancelled and deleted successfully"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, logged_in());
    let ack = client.cancel_booking("b 1").await.unwrap();
    assert_eq!(ack.message, "Booking cancelled and deleted successfully");
}

#[tokio::test]
async fn test_reschedule_sends_new_time() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/bookings/reschedule/b-1"))
        .and(query_param("new_time", "2026-11-05T14:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Booking rescheduled successfully"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, logged_in());
    let slot = AppointmentSlot::parse("2026-11-05", "14:00").unwrap();
    let ack = client.reschedule_booking("b-1", &slot).await.unwrap();
    assert_eq!(ack.message, "Booking rescheduled successfully");
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bookings/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "detail": "Admins only" })))
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, logged_in());
    let result = client.all_bookings().await;
    assert!(matches!(result, Err(ClientError::Forbidden(ref m)) if m == "Admins only"));
}
