//! Local persistence: SQLite metadata reconciled with the recordings
//! directory.
//!
//! The directory listing is authoritative for which recordings exist; the
//! metadata table is a secondary index that heals itself on read. Files and
//! rows are kept in lockstep: mutations that touch both move the file first
//! and only then update the row.

mod enhanced_audio;
mod migrations;
mod models;
mod recordings;
mod transcriptions;

pub use models::{EnhancedAudio, Recording, Transcription};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::PersistenceError;

/// Audio file extensions the library scan recognizes.
const AUDIO_EXTENSIONS: &[&str] = &["wav", "m4a", "mp3", "ogg", "flac"];

/// The recording library: a flat directory of audio files plus SQLite
/// metadata (recordings, transcriptions, enhanced audio).
pub struct Library {
    conn: Mutex<Connection>,
    audio_dir: PathBuf,
}

impl Library {
    /// Open (or create) the library. Schema bootstrap is idempotent.
    pub fn open(
        db_path: impl AsRef<Path>,
        audio_dir: impl Into<PathBuf>,
    ) -> Result<Self, PersistenceError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let audio_dir = audio_dir.into();
        fs::create_dir_all(&audio_dir)?;

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        migrations::run(&conn)?;
        tracing::info!(db = %db_path.display(), "library opened");

        Ok(Self {
            conn: Mutex::new(conn),
            audio_dir,
        })
    }

    /// The flat directory of recorded audio files.
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Where synthesized audio lands; kept out of the recordings scan.
    pub fn enhanced_dir(&self) -> PathBuf {
        self.audio_dir.join("enhanced")
    }

    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// Audio files currently on disk, extension-filtered, top level only.
    pub(crate) fn scan_audio_files(&self) -> Result<Vec<PathBuf>, PersistenceError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.audio_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Remove a file, treating "already gone" as success. Other failures are
/// logged, not surfaced; the row-level operation has already happened.
pub(crate) fn remove_file_best_effort(path: &str) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path, "could not remove file: {e}"),
    }
}
