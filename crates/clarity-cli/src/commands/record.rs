//! `clarity record` — capture a memo, save it, optionally transcribe it.

use anyhow::Result;
use clap::Args;

use clarity_core::{Config, Recorder, RecorderConfig, Recording, list_input_devices};

use crate::app;
use crate::commands::transcribe;

#[derive(Args)]
pub struct RecordArgs {
    /// Name for the saved memo (defaults to the recorded filename)
    #[arg(long)]
    pub name: Option<String>,

    /// Input device name (see `clarity devices`; defaults to the system
    /// default)
    #[arg(long)]
    pub device: Option<String>,

    /// Transcribe immediately after saving
    #[arg(long)]
    pub transcribe: bool,
}

pub async fn run(config: &Config, args: RecordArgs) -> Result<()> {
    let library = app::open_library(config)?;

    let mut recorder_config = RecorderConfig::new();
    if let Some(device) = &args.device {
        recorder_config = recorder_config.with_device(device.clone());
    }
    let mut recorder = Recorder::new(recorder_config);

    recorder.start(library.audio_dir())?;
    println!("Recording... press Enter to stop.");
    if let Err(e) = app::wait_for_enter() {
        recorder.discard();
        return Err(e);
    }
    let finished = recorder.stop()?;

    let filename = finished
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut recording = Recording::new(
        filename,
        finished.path.to_string_lossy().into_owned(),
        finished.duration_ms,
    );
    library.save_recording(&recording, None)?;
    if let Some(name) = &args.name {
        recording = library.rename_recording(&recording.id, name)?;
    }

    println!(
        "Saved {} ({})",
        recording.filename,
        app::format_duration(recording.duration_ms)
    );

    if args.transcribe {
        transcribe::transcribe_and_print(config, &library, &recording).await?;
    }
    Ok(())
}

/// `clarity devices` — list audio input devices.
pub fn devices() -> Result<()> {
    for device in list_input_devices()? {
        let marker = if device.is_default { " (default)" } else { "" };
        println!("{}{marker}", device.name);
    }
    Ok(())
}
