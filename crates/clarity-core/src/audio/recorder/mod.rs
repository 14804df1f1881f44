//! Microphone recorder: capture to a timestamped WAV file.

mod config;
mod stream;

pub use config::RecorderConfig;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::RecorderError;

/// A finalized recording on disk.
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub path: PathBuf,
    pub duration_ms: i64,
}

/// Captures microphone input and writes it out as 16-bit PCM WAV.
///
/// At most one recording can be active per recorder: `start` while active
/// is a session error (callers stop or discard the previous session first),
/// and `stop` without a start reports `NoActiveRecording`.
pub struct Recorder {
    config: RecorderConfig,
    active: Option<ActiveRecording>,
}

struct ActiveRecording {
    // Held to keep the capture alive; dropped on stop/discard.
    _stream: cpal::Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: u16,
    path: PathBuf,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Begin capturing to a timestamped file under `output_dir`; returns
    /// the path the recording will be written to.
    pub fn start(&mut self, output_dir: &Path) -> Result<PathBuf, RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::Session(
                "a recording is already in progress".to_string(),
            ));
        }

        std::fs::create_dir_all(output_dir).map_err(|e| {
            RecorderError::Session(format!("cannot create {}: {e}", output_dir.display()))
        })?;

        let device = self.resolve_device()?;
        let supported = device
            .default_input_config()
            .map_err(|e| RecorderError::Session(e.to_string()))?;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();

        let samples = Arc::new(Mutex::new(Vec::new()));
        stream::reset_stream_error_count();
        let built = match sample_format {
            SampleFormat::F32 => {
                stream::build_stream::<f32>(&device, &stream_config, samples.clone())
            }
            SampleFormat::I16 => {
                stream::build_stream::<i16>(&device, &stream_config, samples.clone())
            }
            SampleFormat::U16 => {
                stream::build_stream::<u16>(&device, &stream_config, samples.clone())
            }
            other => Err(RecorderError::Session(format!(
                "unsupported sample format {other:?}"
            ))),
        }?;
        built
            .play()
            .map_err(|e| RecorderError::Session(e.to_string()))?;

        let path = output_dir.join(format!(
            "recording_{}.wav",
            chrono::Utc::now().timestamp_millis()
        ));
        tracing::info!(path = %path.display(), "recording started");

        self.active = Some(ActiveRecording {
            _stream: built,
            samples,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
            path: path.clone(),
        });
        Ok(path)
    }

    /// Stop the active recording and finalize the WAV file.
    pub fn stop(&mut self) -> Result<FinishedRecording, RecorderError> {
        let active = self.active.take().ok_or(RecorderError::NoActiveRecording)?;
        let ActiveRecording {
            _stream,
            samples,
            sample_rate,
            channels,
            path,
        } = active;
        drop(_stream);

        let samples = samples.lock().unwrap();
        write_wav(&path, &samples, sample_rate, channels)?;

        let frames = samples.len() as u64 / u64::from(channels.max(1));
        let duration_ms = (frames * 1000 / u64::from(sample_rate.max(1))) as i64;
        tracing::info!(path = %path.display(), duration_ms, "recording stopped");

        Ok(FinishedRecording { path, duration_ms })
    }

    /// Tear down the active recording without writing anything.
    pub fn discard(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(path = %active.path.display(), "recording discarded");
        }
    }

    fn resolve_device(&self) -> Result<cpal::Device, RecorderError> {
        let host = cpal::default_host();
        match &self.config.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| RecorderError::Permission(e.to_string()))?
                .find(|d| d.name().is_ok_and(|n| &n == name))
                .ok_or_else(|| {
                    RecorderError::Permission(format!("input device '{name}' not found"))
                }),
            None => host.default_input_device().ok_or_else(|| {
                RecorderError::Permission(
                    "no default input device; check microphone access".to_string(),
                )
            }),
        }
    }
}

fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), RecorderError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| RecorderError::Session(format!("cannot create {}: {e}", path.display())))?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(value)
            .map_err(|e| RecorderError::Session(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| RecorderError::Session(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stop_without_start_reports_no_active_recording() {
        let mut recorder = Recorder::new(RecorderConfig::new());
        assert!(matches!(
            recorder.stop(),
            Err(RecorderError::NoActiveRecording)
        ));
    }

    #[test]
    fn written_wav_duration_matches_sample_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("five_seconds.wav");
        // 5 seconds of mono silence at 16 kHz.
        let samples = vec![0.0_f32; 16_000 * 5];
        write_wav(&path, &samples, 16_000, 1).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        let frames = reader.duration();
        let duration_ms = u64::from(frames) * 1000 / u64::from(spec.sample_rate);
        assert_eq!(duration_ms, 5000);
    }

    #[test]
    fn samples_are_clamped_into_pcm_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clipped.wav");
        write_wav(&path, &[2.0, -2.0, 0.0], 8_000, 1).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let values: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(values, vec![i16::MAX, -i16::MAX, 0]);
    }
}
