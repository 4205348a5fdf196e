//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
///
/// Implementing this trait allows using the `query_one` and `query_all`
/// helper functions.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str = "id, email, created_at";

pub const SURVEY_COLS: &str = "id, owner_id, title, duration_hours, expires_at, unlock_deadline, is_paid, paid_at, created_at";

pub const QUESTION_COLS: &str = "id, survey_id, text, position";

pub const RESPONSE_COLS: &str = "id, survey_id, question_id, answer, created_at";

pub const WEBHOOK_EVENT_COLS: &str = "event_id, event_type, received_at";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl FromRow for Survey {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Survey {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            duration_hours: row.get(3)?,
            expires_at: row.get(4)?,
            unlock_deadline: row.get(5)?,
            is_paid: row.get::<_, i32>(6)? != 0,
            paid_at: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl FromRow for Question {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Question {
            id: row.get(0)?,
            survey_id: row.get(1)?,
            text: row.get(2)?,
            position: row.get(3)?,
        })
    }
}

impl FromRow for Response {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Response {
            id: row.get(0)?,
            survey_id: row.get(1)?,
            question_id: row.get(2)?,
            answer: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for WebhookEventRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WebhookEventRecord {
            event_id: row.get(0)?,
            event_type: row.get(1)?,
            received_at: row.get(2)?,
        })
    }
}
