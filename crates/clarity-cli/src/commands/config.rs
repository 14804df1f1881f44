//! `clarity config` — show or update the configuration file.
//!
//! Editing loads the file without environment overrides so keys exported
//! only in the shell never get written to disk.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use clarity_core::Config;
use clarity_core::config::{
    SYNTHESIS_KEY_ENV, TRANSCRIPTION_KEY_ENV, TRANSLATION_KEY_ENV, VOICE_GENDER_KEY_ENV,
};

#[derive(Args)]
pub struct ConfigArgs {
    /// Set the transcription service API key
    #[arg(long, value_name = "KEY")]
    pub transcription_key: Option<String>,

    /// Set the translation service API key
    #[arg(long, value_name = "KEY")]
    pub translation_key: Option<String>,

    /// Set the speech-synthesis service API key
    #[arg(long, value_name = "KEY")]
    pub synthesis_key: Option<String>,

    /// Set the voice-gender detection API key
    #[arg(long, value_name = "KEY")]
    pub voice_gender_key: Option<String>,

    /// Set the directory recordings and the database live in
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load_file();
    let mut changed = false;

    if let Some(key) = args.transcription_key {
        config.transcription.api_key = key;
        changed = true;
    }
    if let Some(key) = args.translation_key {
        config.translation.api_key = key;
        changed = true;
    }
    if let Some(key) = args.synthesis_key {
        config.synthesis.api_key = key;
        changed = true;
    }
    if let Some(key) = args.voice_gender_key {
        config.voice_gender.api_key = key;
        changed = true;
    }
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = Some(dir);
        changed = true;
    }

    if changed {
        config.save()?;
        if let Some(path) = Config::config_path() {
            println!("Configuration saved to {}", path.display());
        }
        return Ok(());
    }

    // No flags: show the current state, with env overrides applied the way
    // the other commands see them.
    let effective = Config::load();
    if let Some(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
    println!("Data dir:    {}", effective.data_dir().display());
    println!();
    print_key("Transcription", &effective.transcription.api_key, TRANSCRIPTION_KEY_ENV);
    print_key("Translation", &effective.translation.api_key, TRANSLATION_KEY_ENV);
    print_key("Synthesis", &effective.synthesis.api_key, SYNTHESIS_KEY_ENV);
    print_key("Voice gender", &effective.voice_gender.api_key, VOICE_GENDER_KEY_ENV);
    Ok(())
}

fn print_key(label: &str, value: &str, env_var: &str) {
    let status = if value.is_empty() {
        format!("not set (flag or {env_var})")
    } else {
        "configured".to_string()
    };
    println!("{label:<14} {status}");
}
