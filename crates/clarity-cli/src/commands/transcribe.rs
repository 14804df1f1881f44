//! `clarity transcribe` — run the upload → poll → translate flow.

use anyhow::Result;

use clarity_core::config::TRANSCRIPTION_KEY_ENV;
use clarity_core::{Config, Library, Recording, TranscriptionFlow};

use crate::app;

pub async fn run(config: &Config, id: &str) -> Result<()> {
    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, id)?;
    transcribe_and_print(config, &library, &recording).await
}

pub async fn transcribe_and_print(
    config: &Config,
    library: &Library,
    recording: &Recording,
) -> Result<()> {
    app::require_key(
        &config.transcription.api_key,
        "transcription",
        "transcription-key",
        TRANSCRIPTION_KEY_ENV,
    );

    let flow = TranscriptionFlow::new(config, library)?;
    let outcome = flow
        .transcribe_recording(library, recording, &app::print_stage)
        .await?;

    match &outcome.transcript.error {
        Some(message) => {
            // Soft failure: the memo itself is saved and playable.
            println!("\nTranscription unavailable: {message}");
        }
        None => {
            if let Some(language) = &outcome.transcript.language {
                println!("\nDetected language: {language}");
            }
            println!("\n{}", outcome.transcript.text);
            if let Some(translation) = &outcome.translation {
                println!("\nEnglish translation:\n{translation}");
            }
        }
    }
    Ok(())
}
