//! Application configuration: service credentials, endpoints, and storage
//! paths.
//!
//! Configuration lives in a TOML file under the user's config directory and
//! every API key can be overridden through its environment variable, so
//! nothing secret needs to be written to disk. Credentials are injected into
//! the service clients at construction; no client carries a built-in key.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable holding the transcription service API key.
pub const TRANSCRIPTION_KEY_ENV: &str = "ASSEMBLYAI_API_KEY";
/// Environment variable holding the translation service API key.
pub const TRANSLATION_KEY_ENV: &str = "DEEPL_API_KEY";
/// Environment variable holding the speech-synthesis service API key.
pub const SYNTHESIS_KEY_ENV: &str = "ELEVENLABS_API_KEY";
/// Environment variable holding the voice-gender detection API key.
pub const VOICE_GENDER_KEY_ENV: &str = "VOICE_GENDER_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub voice_gender: VoiceGenderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Transcription service (upload / submit / poll) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_transcription_url")]
    pub base_url: String,
    /// Seconds between job status checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Status checks before the job is declared timed out (~3 minutes at
    /// the default interval).
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

/// Translation service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_translation_url")]
    pub base_url: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

/// Speech-synthesis service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_synthesis_url")]
    pub base_url: String,
    #[serde(default = "default_female_voice")]
    pub female_voice_id: String,
    #[serde(default = "default_male_voice")]
    pub male_voice_id: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
}

/// Voice-gender detection settings. Detection is skipped entirely when no
/// key is configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceGenderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_voice_gender_url")]
    pub endpoint: String,
}

/// Where recordings and the metadata database live.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_transcription_url() -> String {
    "https://api.assemblyai.com/v2".to_string()
}

fn default_poll_interval() -> u64 {
    3
}

fn default_max_poll_attempts() -> u32 {
    60
}

fn default_translation_url() -> String {
    "https://api-free.deepl.com/v2".to_string()
}

fn default_target_lang() -> String {
    "EN-US".to_string()
}

fn default_synthesis_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_female_voice() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_male_voice() -> String {
    "iP95p4xoKVk53GoZ742B".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.5
}

fn default_voice_gender_url() -> String {
    "https://zylalabs.com/api/2298/voice+gender+recognition+api/2191/gender+by+file".to_string()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_transcription_url(),
            poll_interval_secs: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_translation_url(),
            target_lang: default_target_lang(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_synthesis_url(),
            female_voice_id: default_female_voice(),
            male_voice_id: default_male_voice(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
        }
    }
}

impl Default for VoiceGenderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_voice_gender_url(),
        }
    }
}

impl Config {
    /// Path of the configuration file, if a config directory exists.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clarity").join("config.toml"))
    }

    /// Load configuration from disk and apply environment overrides.
    ///
    /// Missing or unreadable files fall back to defaults; a malformed file
    /// is logged and ignored rather than aborting startup.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env_overrides();
        config
    }

    /// Load only what is written in the configuration file, without
    /// environment overrides. Used when editing the file so transient env
    /// keys are never persisted.
    pub fn load_file() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(raw) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring malformed config file: {e}");
                Self::default()
            }
        }
    }

    /// Write the configuration file, creating its directory if needed.
    pub fn save(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        let path = Self::config_path().context("no config directory on this platform")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = env_key(TRANSCRIPTION_KEY_ENV) {
            self.transcription.api_key = key;
        }
        if let Some(key) = env_key(TRANSLATION_KEY_ENV) {
            self.translation.api_key = key;
        }
        if let Some(key) = env_key(SYNTHESIS_KEY_ENV) {
            self.synthesis.api_key = key;
        }
        if let Some(key) = env_key(VOICE_GENDER_KEY_ENV) {
            self.voice_gender.api_key = key;
        }
    }

    /// Root directory for recordings and the database.
    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("clarity"),
        }
    }

    /// The flat directory of recorded audio files.
    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir().join("recordings")
    }

    /// SQLite database path.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("clarity.db")
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.transcription.poll_interval_secs, 3);
        assert_eq!(config.transcription.max_poll_attempts, 60);
        assert_eq!(config.translation.target_lang, "EN-US");
        assert!(config.synthesis.api_key.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let raw = r#"
            [transcription]
            api_key = "abc123"
            poll_interval_secs = 1
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.transcription.api_key, "abc123");
        assert_eq!(config.transcription.poll_interval_secs, 1);
        assert_eq!(config.transcription.base_url, "https://api.assemblyai.com/v2");
    }

    #[test]
    fn data_dir_override_wins() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/clarity-test"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/clarity-test/clarity.db"));
        assert_eq!(config.audio_dir(), PathBuf::from("/tmp/clarity-test/recordings"));
    }
}
