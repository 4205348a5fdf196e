#[path = "../common/mod.rs"]
mod common;

use common::*;
use rusqlite::Connection;

fn setup() -> (Connection, User) {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", true).unwrap();
    init_db(&conn).unwrap();
    let user = queries::create_user(&conn, "Owner@Example.com").unwrap();
    (conn, user)
}

#[test]
fn test_init_db_is_idempotent() {
    let (conn, _) = setup();
    init_db(&conn).unwrap();
}

#[test]
fn test_user_email_is_normalized() {
    let (conn, user) = setup();
    assert_eq!(user.email, "owner@example.com");
    assert!(queries::create_user(&conn, "OWNER@example.com").is_err());
}

#[test]
fn test_session_token_resolves_user() {
    let (conn, user) = setup();
    let token = queries::create_session(&conn, &user.id).unwrap();

    let found = queries::get_user_by_session_token(&conn, &token).unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(queries::get_user_by_session_token(&conn, "nope").unwrap().is_none());
}

#[test]
fn test_survey_window_matches_duration() {
    let (conn, user) = setup();
    let mut input = test_survey_input();
    input.duration = SurveyDuration::TwoDays;

    let survey = queries::create_survey_at(&conn, &user.id, &input, 1_000).unwrap();

    assert_eq!(survey.duration_hours, 48);
    assert_eq!(survey.expires_at, 1_000 + 48 * 3600);
    assert!(!survey.is_paid);
    assert!(survey.paid_at.is_none());

    let questions = queries::list_questions(&conn, &survey.id).unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].text, "What went well this sprint?");
}

#[test]
fn test_mark_paid_only_once() {
    let (conn, user) = setup();
    let survey = queries::create_survey(&conn, &user.id, &test_survey_input()).unwrap();

    assert!(queries::mark_survey_paid(&conn, &survey.id, 100).unwrap());
    assert!(!queries::mark_survey_paid(&conn, &survey.id, 200).unwrap());

    let survey = queries::get_survey_by_id(&conn, &survey.id).unwrap().unwrap();
    assert!(survey.is_paid);
    assert_eq!(survey.paid_at, Some(100));
}

#[test]
fn test_mark_paid_unknown_survey() {
    let (conn, _) = setup();
    assert!(!queries::mark_survey_paid(&conn, "missing", 100).unwrap());
}

#[test]
fn test_paid_flag_cannot_be_reverted() {
    let (conn, user) = setup();
    let survey = queries::create_survey(&conn, &user.id, &test_survey_input()).unwrap();
    queries::mark_survey_paid(&conn, &survey.id, 100).unwrap();

    let revert = conn.execute(
        "UPDATE surveys SET is_paid = 0, paid_at = NULL WHERE id = ?1",
        [&survey.id],
    );
    assert!(revert.is_err());

    let restamp = conn.execute("UPDATE surveys SET paid_at = 999 WHERE id = ?1", [&survey.id]);
    assert!(restamp.is_err());

    let survey = queries::get_survey_by_id(&conn, &survey.id).unwrap().unwrap();
    assert!(survey.is_paid);
    assert_eq!(survey.paid_at, Some(100));
}

#[test]
fn test_paid_at_tracks_paid_flag() {
    let (conn, user) = setup();
    let survey = queries::create_survey(&conn, &user.id, &test_survey_input()).unwrap();

    let paid_without_time = conn.execute("UPDATE surveys SET is_paid = 1 WHERE id = ?1", [&survey.id]);
    assert!(paid_without_time.is_err());

    let time_without_paid = conn.execute("UPDATE surveys SET paid_at = 5 WHERE id = ?1", [&survey.id]);
    assert!(time_without_paid.is_err());
}

#[test]
fn test_duration_is_constrained() {
    let (conn, user) = setup();
    let result = conn.execute(
        "INSERT INTO surveys (id, owner_id, title, duration_hours, expires_at, created_at)
         VALUES ('s1', ?1, 't', 72, 0, 0)",
        [&user.id],
    );
    assert!(result.is_err());
}

#[test]
fn test_ledger_records_each_event_once() {
    let (conn, _) = setup();

    assert!(queries::try_record_webhook_event(&conn, "evt_1", "checkout.session.completed").unwrap());
    assert!(!queries::try_record_webhook_event(&conn, "evt_1", "checkout.session.completed").unwrap());
    assert!(queries::try_record_webhook_event(&conn, "evt_2", "charge.refunded").unwrap());

    assert_eq!(queries::count_webhook_events(&conn).unwrap(), 2);
    let record = queries::get_webhook_event(&conn, "evt_2").unwrap().unwrap();
    assert_eq!(record.event_type, "charge.refunded");
}

#[test]
fn test_delete_survey_cascades() {
    let (conn, user) = setup();
    let survey = queries::create_survey(&conn, &user.id, &test_survey_input()).unwrap();
    let question = queries::list_questions(&conn, &survey.id).unwrap().remove(0);
    queries::create_responses(&conn, &survey.id, &[(question.id, "Great".into())]).unwrap();

    assert!(queries::delete_survey(&conn, &survey.id).unwrap());
    assert!(!queries::delete_survey(&conn, &survey.id).unwrap());
    assert_eq!(queries::count_responses(&conn, &survey.id).unwrap(), 0);
    assert!(queries::list_questions(&conn, &survey.id).unwrap().is_empty());
}
