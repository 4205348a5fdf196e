//! Survey authoring, owner detail view and the status endpoint

#[path = "../common/mod.rs"]
mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_create_survey_applies_defaults() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner@example.com");

    let (status, body) = send(
        app.router(),
        json_request(
            "POST",
            "/api/surveys",
            Some(&token),
            &json!({"title": "  ", "durationHours": 72, "questions": ["  How did it go?  "]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let survey = &body["survey"];
    assert_eq!(survey["title"], "Untitled Survey");
    assert_eq!(survey["durationHours"], 24);
    assert_eq!(survey["ownerId"], owner.id.as_str());
    assert_eq!(survey["isPaid"], false);
    assert!(survey["paidAt"].is_null());
    assert_eq!(
        survey["expiresAt"].as_i64().unwrap() - survey["createdAt"].as_i64().unwrap(),
        ONE_DAY
    );
    assert_eq!(body["questions"][0]["text"], "How did it go?");
}

#[tokio::test]
async fn test_create_survey_48_hours() {
    let app = TestApp::new();
    let (_, token) = app.user("owner@example.com");

    let (status, body) = send(
        app.router(),
        json_request(
            "POST",
            "/api/surveys",
            Some(&token),
            &json!({"title": "Offsite", "durationHours": 48, "questions": ["Where should we go?"]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["survey"]["durationHours"], 48);
}

#[tokio::test]
async fn test_create_survey_validation() {
    let app = TestApp::new();
    let (_, token) = app.user("owner@example.com");

    for body in [
        json!({"questions": []}),
        json!({"questions": ["hey"]}),
        json!({"questions": ["q one?", "q two?", "q three", "q four", "q five", "q six"]}),
        json!({"title": "x".repeat(61), "questions": ["A fine question"]}),
    ] {
        let (status, resp) = send(app.router(), json_request("POST", "/api/surveys", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(resp["code"], "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_create_survey_requires_auth() {
    let app = TestApp::new();

    let (status, body) = send(
        app.router(),
        json_request("POST", "/api/surveys", None, &json!({"questions": ["A fine question"]})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_status_reflects_paid_flag() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let uri = format!("/api/surveys/{}/status", survey.id);

    let (status, body) = send(app.router(), get_request(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["surveyId"], survey.id.as_str());
    assert_eq!(body["isPaid"], false);
    assert_eq!(body["canUnlock"], true);
    assert_eq!(body["unlockDeadline"], survey.expires_at + 30 * ONE_DAY);

    {
        let conn = app.state.db.get().unwrap();
        queries::mark_survey_paid(&conn, &survey.id, 1_750_000_000).unwrap();
    }

    let (_, body) = send(app.router(), get_request(&uri, Some(&token))).await;
    assert_eq!(body["isPaid"], true);
    assert_eq!(body["paidAt"], 1_750_000_000);
    assert_eq!(body["canUnlock"], false);
}

#[tokio::test]
async fn test_status_is_owner_only() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner@example.com");
    let (_, other_token) = app.user("other@example.com");
    let survey = app.survey(&owner.id);

    let (status, body) = send(
        app.router(),
        get_request(&format!("/api/surveys/{}/status", survey.id), Some(&other_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(
        app.router(),
        get_request(&format!("/api/surveys/{}/status", survey.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_detail_hides_responses_until_paid() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner@example.com");
    let survey = app.survey(&owner.id);
    let question = app.questions(&survey.id).remove(0);

    let (status, _) = send(
        app.router(),
        json_request(
            "POST",
            &format!("/api/s/{}/responses", survey.id),
            None,
            &json!({"answers": [{"questionId": question.id, "answer": "Shipped on time"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/surveys/{}", survey.id);
    let (status, body) = send(app.router(), get_request(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responseCount"], 1);
    assert!(body.get("responses").is_none());
    assert_eq!(body["status"]["isPaid"], false);

    {
        let conn = app.state.db.get().unwrap();
        queries::mark_survey_paid(&conn, &survey.id, now()).unwrap();
    }

    let (_, body) = send(app.router(), get_request(&uri, Some(&token))).await;
    assert_eq!(body["responses"][0]["answer"], "Shipped on time");
    assert_eq!(body["responses"][0]["questionId"], question.id.as_str());
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = send(app.router(), get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
