//! Input stream construction shared across sample formats.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::DeviceTrait;
use cpal::{Device, Stream, StreamConfig};

use crate::error::RecorderError;

/// Stream errors seen during the current recording session. These are
/// common with some backends and non-fatal; reporting is rate-limited so a
/// flaky device doesn't flood the log.
static STREAM_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

pub(super) fn reset_stream_error_count() {
    STREAM_ERROR_COUNT.store(0, Ordering::Relaxed);
}

/// Build an input stream that appends converted f32 samples to `samples`.
pub(super) fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<f32>>>,
) -> Result<Stream, RecorderError>
where
    T: cpal::Sample + cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let err_fn = |err| {
        let count = STREAM_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
        if count == 0 {
            tracing::warn!("audio stream error (non-fatal, further ones suppressed): {err}");
        } else if count % 1000 == 0 {
            tracing::warn!("audio stream: {count} non-fatal errors so far");
        }
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut samples = samples.lock().unwrap();
                samples.extend(data.iter().map(|&s| -> f32 { cpal::Sample::from_sample(s) }));
            },
            err_fn,
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                RecorderError::Permission("input device is no longer available".to_string())
            }
            other => RecorderError::Session(other.to_string()),
        })
}
