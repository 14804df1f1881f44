//! Client for the hosted speech-synthesis service.
//!
//! The service returns raw audio bytes for a text + voice pair; the bytes
//! are written verbatim to the enhanced-audio directory (whatever container
//! the provider produces is treated as opaque).

use std::path::PathBuf;

use serde::Deserialize;

use super::http_client;
use crate::config::SynthesisConfig;
use crate::error::SynthesisError;

/// A built-in voice preset, resolved to a configured voice id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePreset {
    Female,
    Male,
}

/// How the caller picks a synthesis voice.
#[derive(Debug, Clone)]
pub enum VoiceChoice {
    Preset(VoicePreset),
    Id(String),
}

/// A voice offered by the synthesis provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    #[serde(rename = "voice_id")]
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<Voice>,
}

/// A synthesized audio file on local disk.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub voice_id: String,
    pub path: PathBuf,
}

pub struct SynthesisClient {
    client: reqwest::Client,
    config: SynthesisConfig,
    output_dir: PathBuf,
}

impl SynthesisClient {
    pub fn new(
        config: SynthesisConfig,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, SynthesisError> {
        Ok(Self {
            client: http_client()?,
            config,
            output_dir: output_dir.into(),
        })
    }

    /// Resolve a voice choice to the provider voice id.
    pub fn resolve_voice(&self, choice: &VoiceChoice) -> String {
        match choice {
            VoiceChoice::Preset(VoicePreset::Female) => self.config.female_voice_id.clone(),
            VoiceChoice::Preset(VoicePreset::Male) => self.config.male_voice_id.clone(),
            VoiceChoice::Id(id) => id.clone(),
        }
    }

    /// Synthesize speech for `text` and write the returned audio under the
    /// output directory; returns the voice used and the local path.
    pub async fn synthesize(
        &self,
        text: &str,
        choice: &VoiceChoice,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        let voice_id = self.resolve_voice(choice);
        let body = serde_json::json!({
            "text": text,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
            },
        });

        let response = self
            .client
            .post(format!("{}/text-to-speech/{voice_id}", self.config.base_url))
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SynthesisError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let filename = format!("enhanced_{}.mp3", chrono::Utc::now().timestamp_millis());
        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(path = %path.display(), voice = %voice_id, "synthesized audio written");

        Ok(SynthesizedAudio { voice_id, path })
    }

    /// List the voices available to this account.
    pub async fn list_voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        let response = self
            .client
            .get(format!("{}/voices", self.config.base_url))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SynthesisError::Api { status, body });
        }

        let parsed: VoicesResponse = response.json().await?;
        Ok(parsed.voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;

    #[test]
    fn presets_resolve_to_configured_voice_ids() {
        let mut config = SynthesisConfig::default();
        config.female_voice_id = "voice-f".to_string();
        config.male_voice_id = "voice-m".to_string();
        let client = SynthesisClient::new(config, "/tmp/out").unwrap();

        assert_eq!(
            client.resolve_voice(&VoiceChoice::Preset(VoicePreset::Female)),
            "voice-f"
        );
        assert_eq!(
            client.resolve_voice(&VoiceChoice::Preset(VoicePreset::Male)),
            "voice-m"
        );
        assert_eq!(
            client.resolve_voice(&VoiceChoice::Id("custom".to_string())),
            "custom"
        );
    }
}
