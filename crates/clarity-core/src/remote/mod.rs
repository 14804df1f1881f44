//! Clients for the hosted speech services.
//!
//! Each client owns its configuration (endpoint + credentials) and shares
//! one pooled HTTP client. All calls are sequential awaits; the only retry
//! anywhere is the fixed-interval job poll in [`TranscriptionClient`].

mod synthesis;
mod transcription;
mod translation;
mod voice_gender;

pub use synthesis::{SynthesisClient, SynthesizedAudio, Voice, VoiceChoice, VoicePreset};
pub use transcription::{Transcript, TranscriptionClient, Utterance, Word};
pub use translation::TranslationClient;
pub use voice_gender::VoiceGenderClient;

use once_cell::sync::OnceCell;
use std::time::Duration;

/// Timeout applied to every service request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Shared connection-pooling HTTP client.
pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    static CLIENT: OnceCell<reqwest::Client> = OnceCell::new();
    CLIENT
        .get_or_try_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
        })
        .cloned()
}
