//! Error taxonomy for the clarity core library.
//!
//! Recorder and store errors abort the current action; the remote-service
//! errors are the ones callers degrade on (a failed translation still shows
//! the original transcript, a failed synthesis keeps the transcript).

use thiserror::Error;

/// Errors from microphone capture.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The platform denied access to an input device, or none exists.
    #[error("microphone unavailable: {0}")]
    Permission(String),

    /// The audio session could not be configured, or one is already active.
    #[error("audio session error: {0}")]
    Session(String),

    /// `stop` was called without a prior `start`.
    #[error("no active recording")]
    NoActiveRecording,
}

/// Errors from the hosted transcription service.
///
/// A job that completes without a usable transcript is *not* an error here;
/// it is reported as a soft failure inside [`crate::remote::Transcript`].
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("audio upload failed: {0}")]
    Upload(String),

    #[error("job submission failed: {0}")]
    Submission(String),

    #[error("transcription timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("transcription cancelled")]
    Cancelled,

    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the translation service.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("translation service returned no translations")]
    EmptyResponse,

    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the speech-synthesis service.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("speech synthesis returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("speech synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to write synthesized audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the local store (SQLite metadata plus the audio directory).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no recording with id {0}")]
    NotFound(String),
}

/// Errors from the orchestration flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A newer session started; this result was discarded, not applied.
    #[error("superseded by a newer session")]
    Superseded,

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
