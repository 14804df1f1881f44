//! Row types for the library's metadata tables.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A voice memo: one audio file plus its metadata row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub filename: String,
    pub filepath: String,
    pub duration_ms: i64,
    pub created_at: String,
    pub is_starred: bool,
    pub starred_at: Option<String>,
}

impl Recording {
    pub fn new(
        filename: impl Into<String>,
        filepath: impl Into<String>,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            filepath: filepath.into(),
            duration_ms,
            created_at: now_rfc3339(),
            is_starred: false,
            starred_at: None,
        }
    }
}

/// One transcription of a recording. A recording can accumulate several;
/// only the latest by `created_at` is read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub id: String,
    pub recording_id: String,
    pub text: String,
    pub language: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: String,
}

impl Transcription {
    pub fn new(
        recording_id: impl Into<String>,
        text: impl Into<String>,
        language: Option<String>,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recording_id: recording_id.into(),
            text: text.into(),
            language,
            confidence,
            created_at: now_rfc3339(),
        }
    }
}

/// A synthesized rendition of a recording's transcript. The latest row by
/// `created_at` is the active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAudio {
    pub id: String,
    pub recording_id: String,
    pub voice_id: String,
    pub filepath: String,
    pub created_at: String,
}

impl EnhancedAudio {
    pub fn new(
        recording_id: impl Into<String>,
        voice_id: impl Into<String>,
        filepath: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recording_id: recording_id.into(),
            voice_id: voice_id.into(),
            filepath: filepath.into(),
            created_at: now_rfc3339(),
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
