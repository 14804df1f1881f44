//! Transcription rows. Append-only: a re-transcription inserts a new row
//! and readers take the latest.

use rusqlite::{Connection, params};

use super::Library;
use super::models::Transcription;
use crate::error::PersistenceError;

impl Library {
    pub fn save_transcription(&self, transcription: &Transcription) -> Result<(), PersistenceError> {
        self.with_connection(|conn| insert_transcription(conn, transcription))
    }

    /// The most recent transcription for a recording, if any.
    pub fn transcription_for(
        &self,
        recording_id: &str,
    ) -> Result<Option<Transcription>, PersistenceError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recording_id, text, language, confidence, created_at \
                 FROM transcriptions WHERE recording_id = ?1 \
                 ORDER BY created_at DESC LIMIT 1",
            )?;
            let result = stmt.query_row(params![recording_id], |row| {
                Ok(Transcription {
                    id: row.get(0)?,
                    recording_id: row.get(1)?,
                    text: row.get(2)?,
                    language: row.get(3)?,
                    confidence: row.get(4)?,
                    created_at: row.get(5)?,
                })
            });
            match result {
                Ok(transcription) => Ok(Some(transcription)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}

pub(super) fn insert_transcription(
    conn: &Connection,
    transcription: &Transcription,
) -> Result<(), PersistenceError> {
    conn.execute(
        r#"
        INSERT INTO transcriptions (id, recording_id, text, language, confidence, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            transcription.id,
            transcription.recording_id,
            transcription.text,
            transcription.language,
            transcription.confidence,
            transcription.created_at,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Recording;
    use tempfile::tempdir;

    #[test]
    fn latest_transcription_wins() {
        let dir = tempdir().unwrap();
        let library = Library::open(dir.path().join("clarity.db"), dir.path().join("rec")).unwrap();
        let recording = Recording::new("memo.wav", "/tmp/memo.wav", 1000);
        library.save_recording(&recording, None).unwrap();

        let mut first = Transcription::new(recording.id.clone(), "first pass", None, None);
        first.created_at = "2026-01-01T00:00:00+00:00".to_string();
        library.save_transcription(&first).unwrap();

        let mut second =
            Transcription::new(recording.id.clone(), "second pass", Some("en".into()), Some(0.9));
        second.created_at = "2026-02-01T00:00:00+00:00".to_string();
        library.save_transcription(&second).unwrap();

        let latest = library.transcription_for(&recording.id).unwrap().unwrap();
        assert_eq!(latest.text, "second pass");
        assert_eq!(latest.language.as_deref(), Some("en"));
    }

    #[test]
    fn missing_transcription_is_none() {
        let dir = tempdir().unwrap();
        let library = Library::open(dir.path().join("clarity.db"), dir.path().join("rec")).unwrap();
        assert!(library.transcription_for("nobody").unwrap().is_none());
    }

    #[test]
    fn transcript_text_with_quotes_round_trips() {
        // Names and transcripts are data, never SQL.
        let dir = tempdir().unwrap();
        let library = Library::open(dir.path().join("clarity.db"), dir.path().join("rec")).unwrap();
        let recording = Recording::new("it's a memo'); --.wav", "/tmp/x.wav", 1000);
        let tricky = "Robert'); DROP TABLE transcriptions; --";
        library.save_recording(&recording, Some(tricky)).unwrap();

        let stored = library.transcription_for(&recording.id).unwrap().unwrap();
        assert_eq!(stored.text, tricky);
    }
}
