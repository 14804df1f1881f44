//! `clarity speak` — synthesize a memo's transcript into enhanced audio.

use anyhow::Result;
use clap::Args;

use clarity_core::config::SYNTHESIS_KEY_ENV;
use clarity_core::{Config, TranscriptionFlow, VoiceChoice, VoicePreset};

use crate::app;

#[derive(Args)]
pub struct SpeakArgs {
    /// Recording id or filename
    pub id: String,

    /// Voice to use: "female", "male", or a provider voice id
    #[arg(long)]
    pub voice: Option<String>,

    /// Text to synthesize (defaults to the memo's latest transcript)
    #[arg(long)]
    pub text: Option<String>,
}

pub async fn run(config: &Config, args: SpeakArgs) -> Result<()> {
    app::require_key(
        &config.synthesis.api_key,
        "speech synthesis",
        "synthesis-key",
        SYNTHESIS_KEY_ENV,
    );

    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, &args.id)?;

    let text = match args.text {
        Some(text) => text,
        None => library
            .transcription_for(&recording.id)?
            .map(|t| t.text)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no transcript for '{}'; run `clarity transcribe {}` first",
                    recording.filename,
                    recording.id
                )
            })?,
    };

    let voice = args.voice.as_deref().map(parse_voice);
    let flow = TranscriptionFlow::new(config, &library)?;
    let audio = flow
        .synthesize_recording(&library, &recording, &text, voice, &app::print_stage)
        .await?;

    println!("Enhanced audio written to {}", audio.filepath);
    Ok(())
}

/// `clarity voices` — list the synthesis voices on this account.
pub async fn voices(config: &Config) -> Result<()> {
    app::require_key(
        &config.synthesis.api_key,
        "speech synthesis",
        "synthesis-key",
        SYNTHESIS_KEY_ENV,
    );

    let library = app::open_library(config)?;
    let flow = TranscriptionFlow::new(config, &library)?;
    for voice in flow.list_voices().await? {
        println!("{}  {}", voice.id, voice.name);
    }
    Ok(())
}

fn parse_voice(raw: &str) -> VoiceChoice {
    match raw.to_ascii_lowercase().as_str() {
        "female" => VoiceChoice::Preset(VoicePreset::Female),
        "male" => VoiceChoice::Preset(VoicePreset::Male),
        _ => VoiceChoice::Id(raw.to_string()),
    }
}
