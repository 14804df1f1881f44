//! Recording rows: reconciliation with the audio directory and CRUD.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use super::models::{Recording, now_rfc3339};
use super::{Library, enhanced_audio, remove_file_best_effort};
use crate::error::PersistenceError;

impl Library {
    /// Insert a recording row and, when transcript text is supplied, an
    /// associated transcription row.
    pub fn save_recording(
        &self,
        recording: &Recording,
        transcription_text: Option<&str>,
    ) -> Result<(), PersistenceError> {
        self.with_connection(|conn| {
            insert_recording(conn, recording)?;
            if let Some(text) = transcription_text {
                let transcription =
                    super::Transcription::new(recording.id.clone(), text, None, None);
                super::transcriptions::insert_transcription(conn, &transcription)?;
            }
            Ok(())
        })
    }

    /// Enumerate the library, reconciling disk against metadata.
    ///
    /// Every audio file on disk appears exactly once in the result. Files
    /// without a metadata row get a fabricated default row that is
    /// persisted, so the next call reads it back instead of fabricating
    /// again. Rows whose file is gone are skipped (the directory decides
    /// what exists) but left in place.
    ///
    /// Order: starred recordings first, most recently starred leading;
    /// then unstarred, most recently created leading.
    pub fn list_recordings(&self) -> Result<Vec<Recording>, PersistenceError> {
        let files = self.scan_audio_files()?;
        self.with_connection(|conn| {
            let mut by_filename: HashMap<String, Recording> = select_all(conn)?
                .into_iter()
                .map(|r| (r.filename.clone(), r))
                .collect();

            let mut results = Vec::with_capacity(files.len());
            for path in &files {
                let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                match by_filename.remove(filename) {
                    Some(row) => results.push(row),
                    None => {
                        let fabricated = fabricate_recording(path, filename);
                        tracing::debug!(file = filename, "adopting untracked audio file");
                        insert_recording(conn, &fabricated)?;
                        results.push(fabricated);
                    }
                }
            }

            for filename in by_filename.into_keys() {
                tracing::debug!(file = %filename, "metadata row has no backing file; skipped");
            }

            sort_recordings(&mut results);
            Ok(results)
        })
    }

    /// Look up a recording by id.
    pub fn get_recording(&self, id: &str) -> Result<Option<Recording>, PersistenceError> {
        self.with_connection(|conn| select_one(conn, "id = ?1", id))
    }

    /// Look up a recording by id or, failing that, by filename (the two are
    /// used interchangeably by callers).
    pub fn find_recording(&self, key: &str) -> Result<Option<Recording>, PersistenceError> {
        self.with_connection(|conn| {
            if let Some(found) = select_one(conn, "id = ?1", key)? {
                return Ok(Some(found));
            }
            select_one(conn, "filename = ?1", key)
        })
    }

    /// Delete a recording: its row (transcriptions and enhanced-audio rows
    /// cascade) and its files. Idempotent — deleting an unknown id is a
    /// no-op, and a missing file is not an error.
    pub fn delete_recording(&self, id: &str) -> Result<(), PersistenceError> {
        let Some(recording) = self.get_recording(id)? else {
            tracing::debug!(id, "delete of unknown recording; nothing to do");
            return Ok(());
        };

        // Capture enhanced-audio paths before the cascade removes the rows.
        let enhanced =
            self.with_connection(|conn| enhanced_audio::select_for_recording(conn, id))?;

        self.with_connection(|conn| {
            conn.execute("DELETE FROM recordings WHERE id = ?1", params![id])?;
            Ok(())
        })?;

        remove_file_best_effort(&recording.filepath);
        for item in enhanced {
            remove_file_best_effort(&item.filepath);
        }
        Ok(())
    }

    /// Star or unstar a recording. Starring stamps `starred_at` so starred
    /// recordings sort by recency of the star.
    pub fn star_recording(&self, id: &str, starred: bool) -> Result<(), PersistenceError> {
        self.with_connection(|conn| {
            let starred_at = starred.then(now_rfc3339);
            let changed = conn.execute(
                "UPDATE recordings SET is_starred = ?1, starred_at = ?2 WHERE id = ?3",
                params![starred, starred_at, id],
            )?;
            if changed == 0 {
                return Err(PersistenceError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }

    /// Rename a recording, keeping file and row in lockstep: the file is
    /// moved first, and the row is only updated once the move succeeded. A
    /// failed move leaves the row exactly as it was.
    pub fn rename_recording(
        &self,
        id: &str,
        new_name: &str,
    ) -> Result<Recording, PersistenceError> {
        let recording = self
            .get_recording(id)?
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;

        let old_path = PathBuf::from(&recording.filepath);
        let new_filename = filename_with_extension(new_name, &old_path);
        let new_path = match old_path.parent() {
            Some(parent) => parent.join(&new_filename),
            None => PathBuf::from(&new_filename),
        };

        std::fs::rename(&old_path, &new_path)?;

        let update = self.with_connection(|conn| {
            conn.execute(
                "UPDATE recordings SET filename = ?1, filepath = ?2 WHERE id = ?3",
                params![new_filename, new_path.to_string_lossy(), id],
            )?;
            Ok(())
        });
        if let Err(e) = update {
            // Put the file back so row and file stay consistent.
            let _ = std::fs::rename(&new_path, &old_path);
            return Err(e);
        }

        Ok(Recording {
            filename: new_filename,
            filepath: new_path.to_string_lossy().into_owned(),
            ..recording
        })
    }
}

pub(super) fn insert_recording(
    conn: &Connection,
    recording: &Recording,
) -> Result<(), PersistenceError> {
    conn.execute(
        r#"
        INSERT INTO recordings (id, filename, filepath, duration_ms, created_at, is_starred, starred_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            recording.id,
            recording.filename,
            recording.filepath,
            recording.duration_ms,
            recording.created_at,
            recording.is_starred,
            recording.starred_at,
        ],
    )?;
    Ok(())
}

fn select_one(
    conn: &Connection,
    predicate: &str,
    value: &str,
) -> Result<Option<Recording>, PersistenceError> {
    let sql = format!(
        "SELECT id, filename, filepath, duration_ms, created_at, is_starred, starred_at \
         FROM recordings WHERE {predicate} LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![value], map_recording);
    match result {
        Ok(recording) => Ok(Some(recording)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn select_all(conn: &Connection) -> Result<Vec<Recording>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, filepath, duration_ms, created_at, is_starred, starred_at \
         FROM recordings",
    )?;
    let rows = stmt.query_map([], map_recording)?;
    let mut recordings = Vec::new();
    for row in rows {
        recordings.push(row?);
    }
    Ok(recordings)
}

fn map_recording(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recording> {
    Ok(Recording {
        id: row.get(0)?,
        filename: row.get(1)?,
        filepath: row.get(2)?,
        duration_ms: row.get(3)?,
        created_at: row.get(4)?,
        is_starred: row.get(5)?,
        starred_at: row.get(6)?,
    })
}

/// Default row for an audio file that has no metadata yet. The filename is
/// the id so a rebuilt database maps the same files to the same ids.
fn fabricate_recording(path: &Path, filename: &str) -> Recording {
    Recording {
        id: filename.to_string(),
        filename: filename.to_string(),
        filepath: path.to_string_lossy().into_owned(),
        duration_ms: 0,
        created_at: now_rfc3339(),
        is_starred: false,
        starred_at: None,
    }
}

fn sort_recordings(recordings: &mut [Recording]) {
    recordings.sort_by(|a, b| {
        b.is_starred.cmp(&a.is_starred).then_with(|| {
            if a.is_starred && b.is_starred {
                b.starred_at.cmp(&a.starred_at)
            } else {
                b.created_at.cmp(&a.created_at)
            }
        })
    });
}

/// Carry the old file's extension over unless the new name brings its own.
fn filename_with_extension(new_name: &str, old_path: &Path) -> String {
    if Path::new(new_name).extension().is_some() {
        return new_name.to_string();
    }
    match old_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{new_name}.{ext}"),
        None => new_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_library(dir: &Path) -> Library {
        Library::open(dir.join("clarity.db"), dir.join("recordings")).unwrap()
    }

    fn touch_audio(library: &Library, name: &str) -> PathBuf {
        let path = library.audio_dir().join(name);
        std::fs::write(&path, b"RIFF").unwrap();
        path
    }

    fn saved_recording(library: &Library, name: &str, duration_ms: i64) -> Recording {
        let path = touch_audio(library, name);
        let recording = Recording::new(name, path.to_string_lossy(), duration_ms);
        library.save_recording(&recording, None).unwrap();
        recording
    }

    #[test]
    fn open_is_idempotent() {
        let dir = tempdir().unwrap();
        let first = open_library(dir.path());
        saved_recording(&first, "memo.wav", 1200);
        drop(first);

        let second = open_library(dir.path());
        assert_eq!(second.list_recordings().unwrap().len(), 1);
    }

    #[test]
    fn untracked_file_gets_a_persisted_default_row() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        touch_audio(&library, "orphan.wav");

        let first = library.list_recordings().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "orphan.wav");
        assert_eq!(first[0].duration_ms, 0);
        assert!(!first[0].is_starred);

        // Second call reads the persisted row back: same mapping, no
        // duplicates.
        let second = library.list_recordings().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].created_at, first[0].created_at);

        let rows: i64 = library
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM recordings", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn rows_without_files_are_skipped() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let ghost = Recording::new(
            "ghost.wav",
            library.audio_dir().join("ghost.wav").to_string_lossy(),
            1000,
        );
        library.save_recording(&ghost, None).unwrap();
        saved_recording(&library, "real.wav", 1000);

        let listed = library.list_recordings().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "real.wav");

        // The ghost row survives; only the listing ignores it.
        assert!(library.get_recording(&ghost.id).unwrap().is_some());
    }

    #[test]
    fn starred_recordings_lead_most_recent_star_first() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let a = saved_recording(&library, "a.wav", 1000);
        let b = saved_recording(&library, "b.wav", 1000);
        saved_recording(&library, "newest.wav", 1000);

        library.star_recording(&a.id, true).unwrap();
        library.star_recording(&b.id, true).unwrap(); // starred later than a

        let listed = library.list_recordings().unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["b.wav", "a.wav", "newest.wav"]);
    }

    #[test]
    fn unstarring_restores_created_order() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let mut early = Recording::new(
            "early.wav",
            touch_audio(&library, "early.wav").to_string_lossy(),
            1000,
        );
        early.created_at = "2026-01-01T00:00:00+00:00".to_string();
        library.save_recording(&early, None).unwrap();

        let mut late = Recording::new(
            "late.wav",
            touch_audio(&library, "late.wav").to_string_lossy(),
            1000,
        );
        late.created_at = "2026-02-01T00:00:00+00:00".to_string();
        library.save_recording(&late, None).unwrap();

        library.star_recording(&early.id, true).unwrap();
        library.star_recording(&early.id, false).unwrap();

        let listed = library.list_recordings().unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["late.wav", "early.wav"]);
        assert!(listed.iter().all(|r| !r.is_starred));
    }

    #[test]
    fn delete_twice_is_a_no_op_and_leaves_others_alone() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let doomed = saved_recording(&library, "doomed.wav", 1000);
        let keeper = saved_recording(&library, "keeper.wav", 1000);

        library.delete_recording(&doomed.id).unwrap();
        assert!(!Path::new(&doomed.filepath).exists());

        // Second delete: no error, no side effects.
        library.delete_recording(&doomed.id).unwrap();

        let listed = library.list_recordings().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keeper.id);
    }

    #[test]
    fn delete_removes_transcriptions_with_the_recording() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let path = touch_audio(&library, "spoken.wav");
        let recording = Recording::new("spoken.wav", path.to_string_lossy(), 3000);
        library
            .save_recording(&recording, Some("hello there"))
            .unwrap();
        assert!(library.transcription_for(&recording.id).unwrap().is_some());

        library.delete_recording(&recording.id).unwrap();

        let orphans: i64 = library
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM transcriptions", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn rename_moves_file_then_row() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let recording = saved_recording(&library, "draft.wav", 1000);

        let renamed = library.rename_recording(&recording.id, "Meeting notes").unwrap();
        assert_eq!(renamed.filename, "Meeting notes.wav");
        assert!(Path::new(&renamed.filepath).exists());
        assert!(!Path::new(&recording.filepath).exists());

        let stored = library.get_recording(&recording.id).unwrap().unwrap();
        assert_eq!(stored.filename, "Meeting notes.wav");
    }

    #[test]
    fn rename_with_failed_move_leaves_the_row_untouched() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        // Row exists but the file does not, so the move must fail.
        let recording = Recording::new(
            "missing.wav",
            library.audio_dir().join("missing.wav").to_string_lossy(),
            1000,
        );
        library.save_recording(&recording, None).unwrap();

        let result = library.rename_recording(&recording.id, "renamed");
        assert!(matches!(result, Err(PersistenceError::Io(_))));

        let stored = library.get_recording(&recording.id).unwrap().unwrap();
        assert_eq!(stored.filename, "missing.wav");
        assert_eq!(stored.filepath, recording.filepath);
    }

    #[test]
    fn save_then_list_preserves_name_and_duration() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let recording = saved_recording(&library, "Test.wav", 5000);

        let listed = library.list_recordings().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, recording.id);
        assert_eq!(listed[0].filename, "Test.wav");
        assert_eq!(listed[0].duration_ms, 5000);
    }

    #[test]
    fn find_recording_accepts_id_or_filename() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let recording = saved_recording(&library, "findme.wav", 1000);

        let by_id = library.find_recording(&recording.id).unwrap().unwrap();
        assert_eq!(by_id.filename, "findme.wav");
        let by_name = library.find_recording("findme.wav").unwrap().unwrap();
        assert_eq!(by_name.id, recording.id);
        assert!(library.find_recording("nope").unwrap().is_none());
    }

    #[test]
    fn star_unknown_recording_is_an_error() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path());
        let result = library.star_recording("nope", true);
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    }

    #[test]
    fn extension_carries_over_on_rename() {
        assert_eq!(
            filename_with_extension("notes", Path::new("/x/old.wav")),
            "notes.wav"
        );
        assert_eq!(
            filename_with_extension("notes.mp3", Path::new("/x/old.wav")),
            "notes.mp3"
        );
        assert_eq!(filename_with_extension("notes", Path::new("/x/old")), "notes");
    }
}
