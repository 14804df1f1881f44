//! Best-effort voice-gender detection, used only to pick a default
//! synthesis voice when the caller didn't choose one.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use super::http_client;
use super::synthesis::VoicePreset;
use crate::config::VoiceGenderConfig;

#[derive(Deserialize)]
struct GenderResponse {
    gender: Option<String>,
}

pub struct VoiceGenderClient {
    client: reqwest::Client,
    config: VoiceGenderConfig,
}

impl VoiceGenderClient {
    pub fn new(config: VoiceGenderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Detect the dominant voice gender in a recording.
    ///
    /// Never fails: an unconfigured client, a service error, or an
    /// unrecognized answer all come back as `None` and synthesis proceeds
    /// with the fallback voice.
    pub async fn detect(&self, path: &Path) -> Option<VoicePreset> {
        if !self.is_configured() {
            return None;
        }
        match self.request(path).await {
            Ok(preset) => preset,
            Err(e) => {
                tracing::warn!("voice gender detection failed: {e}");
                None
            }
        }
    }

    async fn request(&self, path: &Path) -> anyhow::Result<Option<VoicePreset>> {
        let bytes = tokio::fs::read(path).await?;
        let form = reqwest::multipart::Form::new().text("file", BASE64.encode(bytes));

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", &self.config.api_key)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("gender detection returned {}", response.status());
        }

        let parsed: GenderResponse = response.json().await?;
        Ok(parsed.gender.as_deref().and_then(parse_gender))
    }
}

fn parse_gender(raw: &str) -> Option<VoicePreset> {
    match raw.to_ascii_lowercase().as_str() {
        "male" => Some(VoicePreset::Male),
        "female" => Some(VoicePreset::Female),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_strings_parse_case_insensitively() {
        assert_eq!(parse_gender("Male"), Some(VoicePreset::Male));
        assert_eq!(parse_gender("FEMALE"), Some(VoicePreset::Female));
        assert_eq!(parse_gender("unknown"), None);
        assert_eq!(parse_gender(""), None);
    }
}
