//! Orchestration of the transcription and synthesis flows.
//!
//! One transcription session at a time: beginning a new session cancels the
//! previous session's poll, and a session whose result arrives after it has
//! been superseded discards that result instead of applying it.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::FlowError;
use crate::remote::{
    SynthesisClient, Transcript, TranscriptionClient, TranslationClient, VoiceChoice,
    VoiceGenderClient, VoicePreset,
};
use crate::store::{EnhancedAudio, Library, Recording, Transcription};

/// Progress stages reported to the presentation layer, so a slow
/// translation never blocks display of the already-available transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Transcribing,
    Translating,
    Done,
    Synthesizing,
    Ready,
}

/// What a transcription session produced.
#[derive(Debug, Clone)]
pub struct TranscriptionOutcome {
    pub transcript: Transcript,
    /// English rendition when the detected language wasn't English and the
    /// translation call succeeded; `None` means "show the original only".
    pub translation: Option<String>,
}

pub struct TranscriptionFlow {
    transcription: TranscriptionClient,
    translation: TranslationClient,
    synthesis: SynthesisClient,
    voice_gender: VoiceGenderClient,
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

impl TranscriptionFlow {
    /// Build the flow from configuration; synthesized audio lands in the
    /// library's enhanced-audio directory.
    pub fn new(config: &Config, library: &Library) -> Result<Self, FlowError> {
        Ok(Self {
            transcription: TranscriptionClient::new(config.transcription.clone())?,
            translation: TranslationClient::new(config.translation.clone())?,
            synthesis: SynthesisClient::new(config.synthesis.clone(), library.enhanced_dir())?,
            voice_gender: VoiceGenderClient::new(config.voice_gender.clone())
                .map_err(crate::error::TranscriptionError::from)?,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        })
    }

    /// Run the full transcription flow for a saved recording: upload,
    /// submit, poll to completion, translate non-English transcripts to
    /// English, persist the transcription.
    ///
    /// A soft provider failure comes back inside the outcome. A session
    /// superseded mid-flight returns [`FlowError::Superseded`] and persists
    /// nothing. Translation failure degrades to the original text only.
    pub async fn transcribe_recording(
        &self,
        library: &Library,
        recording: &Recording,
        on_stage: &(dyn Fn(Stage) + Send + Sync),
    ) -> Result<TranscriptionOutcome, FlowError> {
        let (generation, cancel) = self.begin_session();

        on_stage(Stage::Uploading);
        let upload_url = self
            .transcription
            .upload(Path::new(&recording.filepath))
            .await?;
        let job_id = self.transcription.submit(&upload_url).await?;

        on_stage(Stage::Transcribing);
        let transcript = self.transcription.poll_until_done(&job_id, &cancel).await?;

        if !self.is_current(generation) {
            tracing::debug!(%job_id, "discarding transcript from superseded session");
            return Err(FlowError::Superseded);
        }

        let mut translation = None;
        if transcript.is_usable() && needs_translation(transcript.language.as_deref()) {
            on_stage(Stage::Translating);
            let source = transcript.language.as_deref().unwrap_or_default();
            match self
                .translation
                .translate_to_english(&transcript.text, source)
                .await
            {
                Ok(text) => translation = Some(text),
                Err(e) => tracing::warn!("translation failed; showing original only: {e}"),
            }
        }

        if !self.is_current(generation) {
            tracing::debug!(%job_id, "discarding transcript from superseded session");
            return Err(FlowError::Superseded);
        }

        if transcript.is_usable() {
            let row = Transcription::new(
                recording.id.clone(),
                transcript.text.clone(),
                transcript.language.clone(),
                transcript.confidence,
            );
            library.save_transcription(&row)?;
        }

        on_stage(Stage::Done);
        Ok(TranscriptionOutcome {
            transcript,
            translation,
        })
    }

    /// Synthesize speech for a transcript and record the result.
    ///
    /// With no explicit voice, gender detection on the source audio picks
    /// the preset, falling back to the female voice when detection is
    /// unavailable or inconclusive.
    pub async fn synthesize_recording(
        &self,
        library: &Library,
        recording: &Recording,
        text: &str,
        voice: Option<VoiceChoice>,
        on_stage: &(dyn Fn(Stage) + Send + Sync),
    ) -> Result<EnhancedAudio, FlowError> {
        on_stage(Stage::Synthesizing);

        let choice = match voice {
            Some(choice) => choice,
            None => {
                let preset = self
                    .voice_gender
                    .detect(Path::new(&recording.filepath))
                    .await
                    .unwrap_or(VoicePreset::Female);
                VoiceChoice::Preset(preset)
            }
        };

        let audio = self.synthesis.synthesize(text, &choice).await?;
        let row = EnhancedAudio::new(
            recording.id.clone(),
            audio.voice_id,
            audio.path.to_string_lossy().into_owned(),
        );
        library.save_enhanced_audio(&row)?;

        on_stage(Stage::Ready);
        Ok(row)
    }

    /// List the synthesis voices available to this account.
    pub async fn list_voices(&self) -> Result<Vec<crate::remote::Voice>, FlowError> {
        Ok(self.synthesis.list_voices().await?)
    }

    fn begin_session(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap();
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        (generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// English transcripts stay as-is; an unknown source language can't be
/// translated, so it also stays.
fn needs_translation(language: Option<&str>) -> bool {
    match language {
        Some(lang) => !lang.to_ascii_lowercase().starts_with("en"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn english_and_unknown_languages_skip_translation() {
        assert!(!needs_translation(Some("en")));
        assert!(!needs_translation(Some("en_us")));
        assert!(!needs_translation(Some("EN")));
        assert!(!needs_translation(None));
        assert!(needs_translation(Some("es")));
        assert!(needs_translation(Some("de")));
    }

    #[test]
    fn new_session_cancels_and_supersedes_the_previous_one() {
        let dir = tempdir().unwrap();
        let library =
            Library::open(dir.path().join("clarity.db"), dir.path().join("rec")).unwrap();
        let flow = TranscriptionFlow::new(&Config::default(), &library).unwrap();

        let (first_generation, first_token) = flow.begin_session();
        assert!(flow.is_current(first_generation));
        assert!(!first_token.is_cancelled());

        let (second_generation, second_token) = flow.begin_session();
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(!flow.is_current(first_generation));
        assert!(flow.is_current(second_generation));
    }
}
