use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::crypto::{generate_session_token, hash_secret};
use crate::error::Result;
use crate::models::*;
use crate::util::now;

use super::from_row::{
    QUESTION_COLS, RESPONSE_COLS, SURVEY_COLS, USER_COLS, WEBHOOK_EVENT_COLS, query_all, query_one,
};

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Users & Sessions ============

pub fn create_user(conn: &Connection, email: &str) -> Result<User> {
    let id = gen_id();
    let created_at = now();
    let email = email.trim().to_lowercase();

    conn.execute(
        "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
        params![&id, &email, created_at],
    )?;

    Ok(User {
        id,
        email,
        created_at,
    })
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(Into::into)
}

/// Create a bearer session for `user_id`. Returns the raw token; only its hash is stored.
pub fn create_session(conn: &Connection, user_id: &str) -> Result<String> {
    let token = generate_session_token();
    conn.execute(
        "INSERT INTO user_sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![hash_secret(&token), user_id, now()],
    )?;
    Ok(token)
}

pub fn get_user_by_session_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM users
             WHERE id = (SELECT user_id FROM user_sessions WHERE token_hash = ?1)",
            USER_COLS
        ),
        &[&hash_secret(token)],
    )
}

// ============ Surveys ============

pub fn create_survey(conn: &Connection, owner_id: &str, input: &NewSurvey) -> Result<Survey> {
    create_survey_at(conn, owner_id, input, now())
}

/// Create a survey as if it had been created at `created_at`; its collection
/// window ends `input.duration` later.
pub fn create_survey_at(
    conn: &Connection,
    owner_id: &str,
    input: &NewSurvey,
    created_at: i64,
) -> Result<Survey> {
    let survey = Survey {
        id: gen_id(),
        owner_id: owner_id.to_string(),
        title: input.title.clone(),
        duration_hours: input.duration.hours(),
        expires_at: created_at + input.duration.seconds(),
        unlock_deadline: input.unlock_deadline,
        is_paid: false,
        paid_at: None,
        created_at,
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO surveys (id, owner_id, title, duration_hours, expires_at, unlock_deadline, is_paid, paid_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7)",
        params![
            &survey.id,
            &survey.owner_id,
            &survey.title,
            survey.duration_hours,
            survey.expires_at,
            survey.unlock_deadline,
            survey.created_at,
        ],
    )?;
    for (position, text) in input.questions.iter().enumerate() {
        tx.execute(
            "INSERT INTO questions (id, survey_id, text, position) VALUES (?1, ?2, ?3, ?4)",
            params![gen_id(), &survey.id, text, position as i64],
        )?;
    }
    tx.commit()?;

    Ok(survey)
}

pub fn get_survey_by_id(conn: &Connection, id: &str) -> Result<Option<Survey>> {
    query_one(
        conn,
        &format!("SELECT {} FROM surveys WHERE id = ?1", SURVEY_COLS),
        &[&id],
    )
}

/// Atomically flip a survey to paid.
/// Returns true if this call set the flag, false if the survey was already
/// paid or does not exist.
pub fn mark_survey_paid(conn: &Connection, id: &str, paid_at: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE surveys SET is_paid = 1, paid_at = ?1 WHERE id = ?2 AND is_paid = 0",
        params![paid_at, id],
    )?;
    Ok(affected > 0)
}

pub fn delete_survey(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM surveys WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Questions & Responses ============

pub fn list_questions(conn: &Connection, survey_id: &str) -> Result<Vec<Question>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM questions WHERE survey_id = ?1 ORDER BY position",
            QUESTION_COLS
        ),
        &[&survey_id],
    )
}

/// Store answers `(question_id, answer)` for one submission.
pub fn create_responses(
    conn: &Connection,
    survey_id: &str,
    answers: &[(String, String)],
) -> Result<usize> {
    let created_at = now();
    let tx = conn.unchecked_transaction()?;
    for (question_id, answer) in answers {
        tx.execute(
            "INSERT INTO responses (id, survey_id, question_id, answer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![gen_id(), survey_id, question_id, answer, created_at],
        )?;
    }
    tx.commit()?;
    Ok(answers.len())
}

pub fn list_responses(conn: &Connection, survey_id: &str) -> Result<Vec<Response>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM responses WHERE survey_id = ?1 ORDER BY created_at, rowid",
            RESPONSE_COLS
        ),
        &[&survey_id],
    )
}

pub fn count_responses(conn: &Connection, survey_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM responses WHERE survey_id = ?1",
        params![survey_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Webhook Ledger ============

/// Record a payment event id in the dedupe ledger.
/// Returns true if the event is new, false if it was already recorded.
pub fn try_record_webhook_event(conn: &Connection, event_id: &str, event_type: &str) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO webhook_events (event_id, event_type, received_at) VALUES (?1, ?2, ?3)",
        params![event_id, event_type, now()],
    )?;
    Ok(affected > 0)
}

pub fn get_webhook_event(conn: &Connection, event_id: &str) -> Result<Option<WebhookEventRecord>> {
    query_one(
        conn,
        &format!("SELECT {} FROM webhook_events WHERE event_id = ?1", WEBHOOK_EVENT_COLS),
        &[&event_id],
    )
}

pub fn count_webhook_events(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM webhook_events", [], |row| row.get(0))
        .map_err(Into::into)
}
