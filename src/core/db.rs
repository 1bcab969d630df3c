use std::path::Path;

use anyhow::Result;
use rusqlite::Connection as SqliteConnection;
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "meetsync.sqlite";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meeting (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    host_id TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
    response_deadline TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'awaiting_selection', 'finalized', 'expired')),
    finalized_start TEXT,
    finalized_end TEXT,
    meeting_link TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meeting_participant (
    meeting_id TEXT NOT NULL REFERENCES meeting(id) ON DELETE CASCADE,
    participant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('host', 'invitee')),
    PRIMARY KEY (meeting_id, participant_id)
);

CREATE INDEX IF NOT EXISTS idx_meeting_participant_participant
    ON meeting_participant(participant_id);

CREATE TABLE IF NOT EXISTS response_window (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meeting_id TEXT NOT NULL REFERENCES meeting(id) ON DELETE CASCADE,
    participant_id TEXT NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_response_window_meeting
    ON response_window(meeting_id, participant_id);

CREATE TABLE IF NOT EXISTS confirmed_participant (
    meeting_id TEXT NOT NULL REFERENCES meeting(id) ON DELETE CASCADE,
    participant_id TEXT NOT NULL,
    PRIMARY KEY (meeting_id, participant_id)
);

CREATE TABLE IF NOT EXISTS auth (
    id TEXT PRIMARY KEY,
    service TEXT NOT NULL,
    refresh_token TEXT NOT NULL
);
"#;

/// Open the database in `db_dir`, creating the file if needed.
pub async fn async_db(db_dir: &str) -> Result<Connection> {
    let path = Path::new(db_dir).join(DB_FILE_NAME);
    let db = Connection::open(path).await?;
    db.call(|conn| {
        configure(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// In-memory database with the schema applied. Used by tests and the
/// one-shot CLI helpers.
pub async fn memory_db() -> Result<Connection> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        configure(conn)?;
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

fn configure(conn: &mut SqliteConnection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}

pub fn initialize_db(conn: &mut SqliteConnection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Bring an existing database up to the current schema. Every statement
/// in the schema is idempotent so this is safe to run repeatedly.
pub fn migrate_db(conn: &mut SqliteConnection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()
}
