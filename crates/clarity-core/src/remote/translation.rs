//! Client for the hosted translation service.

use serde::Deserialize;

use super::http_client;
use crate::config::TranslationConfig;
use crate::error::TranslationError;

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
struct TranslatedText {
    text: String,
}

pub struct TranslationClient {
    client: reqwest::Client,
    config: TranslationConfig,
}

impl TranslationClient {
    pub fn new(config: TranslationConfig) -> Result<Self, TranslationError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Translate `text` from `source_lang` into English.
    ///
    /// A failure here is not fatal to the transcription flow; the caller
    /// falls back to showing the original-language text.
    pub async fn translate_to_english(
        &self,
        text: &str,
        source_lang: &str,
    ) -> Result<String, TranslationError> {
        let body = serde_json::json!({
            "text": [text],
            "source_lang": source_lang.to_uppercase(),
            "target_lang": self.config.target_lang,
        });

        let response = self
            .client
            .post(format!("{}/translate", self.config.base_url))
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.config.api_key),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranslationError::Api { status, body });
        }

        let parsed: TranslateResponse = response.json().await?;
        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(TranslationError::EmptyResponse)
    }
}
