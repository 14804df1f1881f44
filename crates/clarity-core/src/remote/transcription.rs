//! Client for the hosted transcription service.
//!
//! The provider exposes three endpoints: raw byte upload, job submission
//! (with language auto-detection and speaker diarization), and job status.
//! Jobs are asynchronous; [`TranscriptionClient::poll_until_done`] drives a
//! job to a terminal state at a fixed interval, honoring a cancellation
//! token so a superseding session can abandon a stale job.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::http_client;
use crate::config::TranscriptionConfig;
use crate::error::TranscriptionError;

/// A finished transcription result.
///
/// `error` set alongside empty `text` means the job finished without a
/// usable transcript — a soft failure the caller renders inline instead of
/// aborting the action.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub text: String,
    /// Detected source language code (e.g. `en`, `es`).
    pub language: Option<String>,
    pub confidence: Option<f64>,
    pub utterances: Vec<Utterance>,
    pub error: Option<String>,
}

impl Transcript {
    /// Whether the job produced text worth persisting or translating.
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && !self.text.trim().is_empty()
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn from_completed(job: JobResponse) -> Self {
        let utterances = job.utterances.unwrap_or_default();
        let text = if utterances.is_empty() {
            job.text.unwrap_or_default()
        } else {
            format_utterances(&utterances)
        };
        Self {
            text,
            language: job.language_code,
            confidence: job.confidence,
            utterances,
            error: None,
        }
    }
}

/// One diarized span of speech from a completed job.
#[derive(Debug, Clone, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobResponse {
    pub(crate) status: JobStatus,
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) language_code: Option<String>,
    #[serde(default)]
    pub(crate) confidence: Option<f64>,
    #[serde(default)]
    pub(crate) utterances: Option<Vec<Utterance>>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

pub struct TranscriptionClient {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl TranscriptionClient {
    pub fn new(config: TranscriptionConfig) -> Result<Self, TranscriptionError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Upload a local audio file as an opaque byte stream; returns the
    /// provider URL referencing the uploaded audio.
    pub async fn upload(&self, path: &Path) -> Result<String, TranscriptionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TranscriptionError::Upload(format!("cannot read {}: {e}", path.display())))?;

        let response = self
            .client
            .post(format!("{}/upload", self.config.base_url))
            .header("Authorization", &self.config.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::Upload(format!("{status}: {body}")));
        }

        let parsed: UploadResponse = response.json().await?;
        Ok(parsed.upload_url)
    }

    /// Submit a transcription job for previously uploaded audio, with
    /// language auto-detection and speaker diarization enabled.
    pub async fn submit(&self, audio_url: &str) -> Result<String, TranscriptionError> {
        let body = serde_json::json!({
            "audio_url": audio_url,
            "language_detection": true,
            "speaker_labels": true,
            "format_text": true,
        });

        let response = self
            .client
            .post(format!("{}/transcript", self.config.base_url))
            .header("Authorization", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::Submission(format!("{status}: {body}")));
        }

        let parsed: SubmitResponse = response.json().await?;
        Ok(parsed.id)
    }

    /// Poll a job at the configured fixed interval until it completes.
    ///
    /// Terminal outcomes: a completed job yields the transcript; a job the
    /// provider marks as failed — or any status-check request that errors —
    /// yields a soft-failure [`Transcript`]; exhausting the attempt budget
    /// is [`TranscriptionError::Timeout`]; cancelling the token is
    /// [`TranscriptionError::Cancelled`].
    pub async fn poll_until_done(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        let url = format!("{}/transcript/{job_id}", self.config.base_url);
        let mut source = HttpJobSource { client: self, url };
        poll_job(
            &mut source,
            Duration::from_secs(self.config.poll_interval_secs),
            self.config.max_poll_attempts,
            cancel,
        )
        .await
    }

    /// Upload, submit, and poll in one call.
    pub async fn transcribe(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        let upload_url = self.upload(path).await?;
        let job_id = self.submit(&upload_url).await?;
        self.poll_until_done(&job_id, cancel).await
    }

    async fn fetch_job(&self, url: &str) -> Result<JobResponse, TranscriptionError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", &self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::Submission(format!(
                "status check returned {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

/// Source of job status snapshots, separated from HTTP so the poll loop is
/// testable with scripted responses.
pub(crate) trait JobSource {
    async fn fetch(&mut self) -> Result<JobResponse, TranscriptionError>;
}

struct HttpJobSource<'a> {
    client: &'a TranscriptionClient,
    url: String,
}

impl JobSource for HttpJobSource<'_> {
    async fn fetch(&mut self) -> Result<JobResponse, TranscriptionError> {
        self.client.fetch_job(&self.url).await
    }
}

pub(crate) async fn poll_job<S: JobSource>(
    source: &mut S,
    interval: Duration,
    max_attempts: u32,
    cancel: &CancellationToken,
) -> Result<Transcript, TranscriptionError> {
    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return Err(TranscriptionError::Cancelled);
        }

        let job = match source.fetch().await {
            Ok(job) => job,
            Err(e) => {
                // A single failed status check ends the job as a soft
                // failure rather than retrying around network errors.
                tracing::warn!("transcription status check failed: {e}");
                return Ok(Transcript::failed(format!("status check failed: {e}")));
            }
        };

        match job.status {
            JobStatus::Completed => return Ok(Transcript::from_completed(job)),
            JobStatus::Error => {
                let message = job
                    .error
                    .unwrap_or_else(|| "transcription failed".to_string());
                tracing::warn!("transcription job failed: {message}");
                return Ok(Transcript::failed(message));
            }
            JobStatus::Queued | JobStatus::Processing => {
                tracing::debug!(attempt, status = ?job.status, "transcription pending");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(TranscriptionError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Err(TranscriptionError::Timeout {
        attempts: max_attempts,
    })
}

/// Render diarized utterances as one `Speaker N: text` line per utterance.
///
/// Provider speaker labels are single letters; `A` maps to speaker 1, `B`
/// to speaker 2, and so on. The mapping depends only on the label, so the
/// same job renders identically on every run. Unexpected labels are kept
/// verbatim.
pub(crate) fn format_utterances(utterances: &[Utterance]) -> String {
    utterances
        .iter()
        .map(|u| format!("Speaker {}: {}", speaker_ordinal(&u.speaker), u.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn speaker_ordinal(label: &str) -> String {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => ((c as u32 - 'A' as u32) + 1).to_string(),
        _ => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn pending(status: JobStatus) -> JobResponse {
        JobResponse {
            status,
            text: None,
            language_code: None,
            confidence: None,
            utterances: None,
            error: None,
        }
    }

    fn completed(text: &str) -> JobResponse {
        JobResponse {
            status: JobStatus::Completed,
            text: Some(text.to_string()),
            language_code: Some("en".to_string()),
            confidence: Some(0.93),
            utterances: None,
            error: None,
        }
    }

    fn utterance(speaker: &str, text: &str) -> Utterance {
        Utterance {
            speaker: speaker.to_string(),
            text: text.to_string(),
            start: 0,
            end: 0,
            confidence: 1.0,
            words: Vec::new(),
        }
    }

    struct Scripted {
        responses: VecDeque<Result<JobResponse, TranscriptionError>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<JobResponse, TranscriptionError>>) -> Self {
            Self {
                responses: responses.into(),
            }
        }
    }

    impl JobSource for Scripted {
        async fn fetch(&mut self) -> Result<JobResponse, TranscriptionError> {
            self.responses.pop_front().expect("polled past end of script")
        }
    }

    /// Reports `processing` forever, counting how often it was asked.
    struct NeverDone {
        polls: u32,
    }

    impl JobSource for NeverDone {
        async fn fetch(&mut self) -> Result<JobResponse, TranscriptionError> {
            self.polls += 1;
            Ok(pending(JobStatus::Processing))
        }
    }

    #[tokio::test]
    async fn poll_resolves_after_queued_and_processing() {
        let mut source = Scripted::new(vec![
            Ok(pending(JobStatus::Queued)),
            Ok(pending(JobStatus::Processing)),
            Ok(completed("hello world")),
        ]);
        let transcript = poll_job(&mut source, Duration::ZERO, 60, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(transcript.text, "hello world");
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert!(transcript.is_usable());
    }

    #[tokio::test]
    async fn poll_times_out_after_attempt_budget() {
        let mut source = NeverDone { polls: 0 };
        let result = poll_job(&mut source, Duration::ZERO, 60, &CancellationToken::new()).await;
        assert!(matches!(
            result,
            Err(TranscriptionError::Timeout { attempts: 60 })
        ));
        assert_eq!(source.polls, 60);
    }

    #[tokio::test]
    async fn provider_error_status_is_a_soft_failure() {
        let mut source = Scripted::new(vec![Ok(JobResponse {
            status: JobStatus::Error,
            error: Some("audio too short".to_string()),
            ..pending(JobStatus::Error)
        })]);
        let transcript = poll_job(&mut source, Duration::ZERO, 60, &CancellationToken::new())
            .await
            .unwrap();
        assert!(transcript.text.is_empty());
        assert_eq!(transcript.error.as_deref(), Some("audio too short"));
        assert!(!transcript.is_usable());
    }

    #[tokio::test]
    async fn failed_status_check_is_a_soft_failure() {
        let mut source = Scripted::new(vec![
            Ok(pending(JobStatus::Queued)),
            Err(TranscriptionError::Submission("boom".to_string())),
        ]);
        let transcript = poll_job(&mut source, Duration::ZERO, 60, &CancellationToken::new())
            .await
            .unwrap();
        assert!(transcript.text.is_empty());
        assert!(transcript.error.is_some());
    }

    #[tokio::test]
    async fn cancellation_stops_the_poll() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut source = NeverDone { polls: 0 };
        let result = poll_job(&mut source, Duration::ZERO, 60, &cancel).await;
        assert!(matches!(result, Err(TranscriptionError::Cancelled)));
        assert_eq!(source.polls, 0);
    }

    #[test]
    fn speaker_labels_map_to_stable_ordinals() {
        let utterances = vec![
            utterance("A", "first"),
            utterance("B", "second"),
            utterance("A", "third"),
        ];
        assert_eq!(
            format_utterances(&utterances),
            "Speaker 1: first\nSpeaker 2: second\nSpeaker 1: third"
        );
        // Same input, same output.
        assert_eq!(format_utterances(&utterances), format_utterances(&utterances));
    }

    #[test]
    fn unexpected_speaker_labels_pass_through() {
        let utterances = vec![utterance("42", "hi"), utterance("AB", "there")];
        assert_eq!(
            format_utterances(&utterances),
            "Speaker 42: hi\nSpeaker AB: there"
        );
    }

    #[test]
    fn completed_job_with_utterances_formats_speakers() {
        let job = JobResponse {
            status: JobStatus::Completed,
            text: Some("raw unformatted text".to_string()),
            language_code: Some("en".to_string()),
            confidence: Some(0.9),
            utterances: Some(vec![utterance("A", "hello"), utterance("B", "hi")]),
            error: None,
        };
        let transcript = Transcript::from_completed(job);
        assert_eq!(transcript.text, "Speaker 1: hello\nSpeaker 2: hi");
        assert_eq!(transcript.utterances.len(), 2);
    }
}
