use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Survey owners
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );

        -- Bearer sessions (token stored hashed)
        CREATE TABLE IF NOT EXISTS user_sessions (
            token_hash TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_user_sessions_user ON user_sessions(user_id);

        -- Surveys
        -- is_paid flips 0 -> 1 exactly once, from the payment webhook
        -- paid_at is set iff is_paid
        CREATE TABLE IF NOT EXISTS surveys (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            duration_hours INTEGER NOT NULL CHECK (duration_hours IN (24, 48)),
            expires_at INTEGER NOT NULL,
            unlock_deadline INTEGER,
            is_paid INTEGER NOT NULL DEFAULT 0 CHECK (is_paid IN (0, 1)),
            paid_at INTEGER,
            created_at INTEGER NOT NULL,
            CHECK ((is_paid = 0 AND paid_at IS NULL) OR (is_paid = 1 AND paid_at IS NOT NULL))
        );
        CREATE INDEX IF NOT EXISTS idx_surveys_owner ON surveys(owner_id);

        -- Paid flag is monotonic
        CREATE TRIGGER IF NOT EXISTS surveys_paid_is_final
        BEFORE UPDATE OF is_paid, paid_at ON surveys
        WHEN OLD.is_paid = 1
        BEGIN
            SELECT RAISE(ABORT, 'paid surveys cannot be modified');
        END;

        CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            survey_id TEXT NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE(survey_id, position)
        );

        -- Anonymous answers, one row per answered question
        CREATE TABLE IF NOT EXISTS responses (
            id TEXT PRIMARY KEY,
            survey_id TEXT NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
            question_id TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            answer TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_responses_survey ON responses(survey_id);

        -- Payment webhook dedupe ledger (append-only)
        CREATE TABLE IF NOT EXISTS webhook_events (
            event_id TEXT PRIMARY KEY,
            event_type TEXT NOT NULL,
            received_at INTEGER NOT NULL
        );
        "#,
    )
}
