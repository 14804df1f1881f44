//! Library browsing and maintenance: list, show, star, rename, delete.

use anyhow::Result;

use clarity_core::Config;

use crate::app;

pub fn list(config: &Config) -> Result<()> {
    let library = app::open_library(config)?;
    let recordings = library.list_recordings()?;

    if recordings.is_empty() {
        println!("No recordings yet.");
        return Ok(());
    }

    for recording in recordings {
        let star = if recording.is_starred { "*" } else { " " };
        println!(
            "{star} {:<38}  {:>6}  {}  {}",
            recording.id,
            app::format_duration(recording.duration_ms),
            app::format_date(&recording.created_at),
            recording.filename,
        );
    }
    Ok(())
}

pub fn show(config: &Config, id: &str) -> Result<()> {
    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, id)?;

    println!("{}", recording.filename);
    println!("  id:       {}", recording.id);
    println!("  file:     {}", recording.filepath);
    println!(
        "  duration: {}",
        app::format_duration(recording.duration_ms)
    );
    println!("  created:  {}", app::format_date(&recording.created_at));
    if recording.is_starred {
        let starred_at = recording.starred_at.as_deref().unwrap_or_default();
        println!("  starred:  {}", app::format_date(starred_at));
    }

    match library.transcription_for(&recording.id)? {
        Some(transcription) => {
            if let Some(language) = &transcription.language {
                println!("\nTranscript ({language}):");
            } else {
                println!("\nTranscript:");
            }
            println!("{}", transcription.text);
        }
        None => println!("\nNo transcript yet (run `clarity transcribe {}`).", recording.id),
    }

    if let Some(enhanced) = library.latest_enhanced_audio(&recording.id)? {
        println!("\nEnhanced audio: {} (voice {})", enhanced.filepath, enhanced.voice_id);
    }
    Ok(())
}

pub fn star(config: &Config, id: &str, starred: bool) -> Result<()> {
    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, id)?;
    library.star_recording(&recording.id, starred)?;
    if starred {
        println!("Starred {}", recording.filename);
    } else {
        println!("Unstarred {}", recording.filename);
    }
    Ok(())
}

pub fn rename(config: &Config, id: &str, new_name: &str) -> Result<()> {
    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, id)?;
    let renamed = library.rename_recording(&recording.id, new_name)?;
    println!("Renamed {} -> {}", recording.filename, renamed.filename);
    Ok(())
}

pub fn delete(config: &Config, id: &str) -> Result<()> {
    let library = app::open_library(config)?;
    let recording = app::resolve_recording(&library, id)?;
    library.delete_recording(&recording.id)?;
    println!("Deleted {}", recording.filename);
    Ok(())
}
