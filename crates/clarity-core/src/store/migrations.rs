//! Schema creation and versioned migrations.

use rusqlite::Connection;

use crate::error::PersistenceError;

/// Bring the database up to the current schema. Safe to call on every open;
/// existing data is never touched twice.
pub(crate) fn run(conn: &Connection) -> Result<(), PersistenceError> {
    let current = schema_version(conn)?;

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i32, PersistenceError> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn migrate_v1(conn: &Connection) -> Result<(), PersistenceError> {
    tracing::info!("running database migration v1");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per audio file in the recordings directory.
        CREATE TABLE IF NOT EXISTS recordings (
            id TEXT PRIMARY KEY NOT NULL,
            filename TEXT NOT NULL,
            filepath TEXT NOT NULL,
            duration_ms INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            is_starred INTEGER NOT NULL DEFAULT 0,
            starred_at TEXT
        );

        CREATE TABLE IF NOT EXISTS transcriptions (
            id TEXT PRIMARY KEY NOT NULL,
            recording_id TEXT NOT NULL REFERENCES recordings(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            language TEXT,
            confidence REAL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enhanced_audio (
            id TEXT PRIMARY KEY NOT NULL,
            recording_id TEXT NOT NULL REFERENCES recordings(id) ON DELETE CASCADE,
            voice_id TEXT NOT NULL,
            filepath TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_recordings_filename ON recordings(filename);
        CREATE INDEX IF NOT EXISTS idx_transcriptions_recording ON transcriptions(recording_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_enhanced_audio_recording ON enhanced_audio(recording_id, created_at);

        INSERT INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}
