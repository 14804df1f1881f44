//! Enhanced-audio rows: synthesized renditions of a recording's transcript.
//! The latest row is the active one; rows and files are deleted together.

use rusqlite::{Connection, params};

use super::models::EnhancedAudio;
use super::{Library, remove_file_best_effort};
use crate::error::PersistenceError;

impl Library {
    pub fn save_enhanced_audio(&self, audio: &EnhancedAudio) -> Result<(), PersistenceError> {
        self.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT INTO enhanced_audio (id, recording_id, voice_id, filepath, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    audio.id,
                    audio.recording_id,
                    audio.voice_id,
                    audio.filepath,
                    audio.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// The active (most recent) enhanced audio for a recording, if any.
    pub fn latest_enhanced_audio(
        &self,
        recording_id: &str,
    ) -> Result<Option<EnhancedAudio>, PersistenceError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recording_id, voice_id, filepath, created_at \
                 FROM enhanced_audio WHERE recording_id = ?1 \
                 ORDER BY created_at DESC LIMIT 1",
            )?;
            let result = stmt.query_row(params![recording_id], map_enhanced);
            match result {
                Ok(audio) => Ok(Some(audio)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Delete one enhanced-audio entry: row first, then the file
    /// (best-effort). Unknown ids are a no-op.
    pub fn delete_enhanced_audio(&self, id: &str) -> Result<(), PersistenceError> {
        let existing = self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recording_id, voice_id, filepath, created_at \
                 FROM enhanced_audio WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], map_enhanced);
            match result {
                Ok(audio) => Ok(Some(audio)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })?;

        let Some(audio) = existing else {
            return Ok(());
        };

        self.with_connection(|conn| {
            conn.execute("DELETE FROM enhanced_audio WHERE id = ?1", params![id])?;
            Ok(())
        })?;
        remove_file_best_effort(&audio.filepath);
        Ok(())
    }
}

pub(super) fn select_for_recording(
    conn: &Connection,
    recording_id: &str,
) -> Result<Vec<EnhancedAudio>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT id, recording_id, voice_id, filepath, created_at \
         FROM enhanced_audio WHERE recording_id = ?1",
    )?;
    let rows = stmt.query_map(params![recording_id], map_enhanced)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

fn map_enhanced(row: &rusqlite::Row<'_>) -> rusqlite::Result<EnhancedAudio> {
    Ok(EnhancedAudio {
        id: row.get(0)?,
        recording_id: row.get(1)?,
        voice_id: row.get(2)?,
        filepath: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Recording;
    use tempfile::tempdir;

    fn library_with_recording(dir: &std::path::Path) -> (Library, Recording) {
        let library = Library::open(dir.join("clarity.db"), dir.join("rec")).unwrap();
        let recording = Recording::new("memo.wav", "/tmp/memo.wav", 1000);
        library.save_recording(&recording, None).unwrap();
        (library, recording)
    }

    #[test]
    fn latest_enhanced_audio_is_active() {
        let dir = tempdir().unwrap();
        let (library, recording) = library_with_recording(dir.path());

        let mut old = EnhancedAudio::new(recording.id.clone(), "voice-1", "/tmp/a.mp3");
        old.created_at = "2026-01-01T00:00:00+00:00".to_string();
        library.save_enhanced_audio(&old).unwrap();

        let mut new = EnhancedAudio::new(recording.id.clone(), "voice-2", "/tmp/b.mp3");
        new.created_at = "2026-02-01T00:00:00+00:00".to_string();
        library.save_enhanced_audio(&new).unwrap();

        let active = library.latest_enhanced_audio(&recording.id).unwrap().unwrap();
        assert_eq!(active.voice_id, "voice-2");
    }

    #[test]
    fn delete_enhanced_audio_removes_row_and_file() {
        let dir = tempdir().unwrap();
        let (library, recording) = library_with_recording(dir.path());

        let file = dir.path().join("enhanced.mp3");
        std::fs::write(&file, b"ID3").unwrap();
        let audio =
            EnhancedAudio::new(recording.id.clone(), "voice-1", file.to_string_lossy());
        library.save_enhanced_audio(&audio).unwrap();

        library.delete_enhanced_audio(&audio.id).unwrap();
        assert!(!file.exists());
        assert!(library.latest_enhanced_audio(&recording.id).unwrap().is_none());

        // Idempotent.
        library.delete_enhanced_audio(&audio.id).unwrap();
    }
}
