//! Shared helpers for the CLI commands.

use std::io::Write;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use clarity_core::{Config, Library, Recording, Stage};

/// Open the library at the configured location.
pub fn open_library(config: &Config) -> Result<Library> {
    Ok(Library::open(config.db_path(), config.audio_dir())?)
}

/// Resolve a recording by id or filename, or fail with a readable message.
pub fn resolve_recording(library: &Library, key: &str) -> Result<Recording> {
    library
        .find_recording(key)?
        .ok_or_else(|| anyhow::anyhow!("no recording matching '{key}' (try `clarity list`)"))
}

/// Exit with guidance when a required API key is missing.
pub fn require_key(value: &str, service: &str, flag: &str, env_var: &str) -> String {
    if !value.is_empty() {
        return value.to_string();
    }
    eprintln!("Error: no {service} API key configured.");
    eprintln!("\nSet your key with:");
    eprintln!("  clarity config --{flag} YOUR_KEY\n");
    eprintln!("Or set the {env_var} environment variable.");
    std::process::exit(1);
}

/// Block until the user presses Enter, without echoing input.
pub fn wait_for_enter() -> Result<()> {
    std::io::stdout().flush()?;
    enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.code == KeyCode::Enter => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        }
    };
    disable_raw_mode()?;
    result
}

/// Print a flow stage transition.
pub fn print_stage(stage: Stage) {
    let label = match stage {
        Stage::Uploading => "Uploading audio...",
        Stage::Transcribing => "Transcribing...",
        Stage::Translating => "Translating to English...",
        Stage::Done => "Transcript ready.",
        Stage::Synthesizing => "Synthesizing speech...",
        Stage::Ready => "Enhanced audio ready.",
    };
    println!("{label}");
}

/// Format milliseconds as `m:ss`.
pub fn format_duration(ms: i64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Render an RFC 3339 timestamp as a short local-ish date.
pub fn format_date(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format_as_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(5000), "0:05");
        assert_eq!(format_duration(65_000), "1:05");
        assert_eq!(format_duration(600_000), "10:00");
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(format_date("not a date"), "not a date");
        assert_eq!(
            format_date("2026-03-04T10:30:00+00:00"),
            "2026-03-04 10:30"
        );
    }
}
