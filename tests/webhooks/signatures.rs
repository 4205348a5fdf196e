//! Rejected deliveries must leave no trace: no ledger row, no state change.

#[path = "../common/mod.rs"]
mod common;

use axum::http::StatusCode;
use common::*;

fn assert_untouched(app: &TestApp, survey_id: &str) {
    assert_eq!(app.ledger_count(), 0);
    assert!(!app.get_survey(survey_id).is_paid);
}

#[tokio::test]
async fn test_missing_signature_header() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let payload = checkout_completed_payload("evt_1", &survey.id, Some(&owner.id));

    let (status, body) = send(app.router(), webhook_request(payload, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_SIGNATURE");
    assert_untouched(&app, &survey.id);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let payload = checkout_completed_payload("evt_1", &survey.id, Some(&owner.id));

    let timestamp = now().to_string();
    let signature = compute_stripe_signature(&payload, "whsec_attacker", &timestamp);
    let header = format!("t={},v1={}", timestamp, signature);

    let (status, body) = send(app.router(), webhook_request(payload, Some(header))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SIGNATURE_INVALID");
    assert_untouched(&app, &survey.id);
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let other = app.survey(&owner.id);

    let signed = checkout_completed_payload("evt_1", &other.id, None);
    let header = signature_header(&signed);
    let tampered = checkout_completed_payload("evt_1", &survey.id, None);

    let (status, body) = send(app.router(), webhook_request(tampered, Some(header))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SIGNATURE_INVALID");
    assert_untouched(&app, &survey.id);
    assert!(!app.get_survey(&other.id).is_paid);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let payload = checkout_completed_payload("evt_1", &survey.id, None);

    // 10 minutes ago - beyond the 5-minute tolerance
    let timestamp = (now() - 600).to_string();
    let signature = compute_stripe_signature(&payload, TEST_WEBHOOK_SECRET, &timestamp);
    let header = format!("t={},v1={}", timestamp, signature);

    let (status, body) = send(app.router(), webhook_request(payload, Some(header))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SIGNATURE_INVALID");
    assert_untouched(&app, &survey.id);
}

#[tokio::test]
async fn test_garbage_signature_header_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let payload = checkout_completed_payload("evt_1", &survey.id, None);

    let (status, body) = send(app.router(), webhook_request(payload, Some("v1=deadbeef".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SIGNATURE_INVALID");
    assert_untouched(&app, &survey.id);
}

#[tokio::test]
async fn test_out_of_range_timestamps_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);

    for timestamp in [i64::MIN, i64::MAX] {
        let payload = checkout_completed_payload("evt_1", &survey.id, Some(&owner.id));
        let header = format!("t={},v1={}", timestamp, "0".repeat(64));

        let (status, body) = send(app.router(), webhook_request(payload, Some(header))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "t={}", timestamp);
        assert_eq!(body["code"], "SIGNATURE_INVALID");
    }
    assert_untouched(&app, &survey.id);
}

#[tokio::test]
async fn test_signed_garbage_is_invalid_payload() {
    let app = TestApp::new();
    let payload = b"not json at all".to_vec();
    let header = signature_header(&payload);

    let (status, body) = send(app.router(), webhook_request(payload, Some(header))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYLOAD");
    assert_eq!(app.ledger_count(), 0);
}
