//! Audio recorder configuration.

/// Configuration for the audio recorder.
#[derive(Debug, Clone, Default)]
pub struct RecorderConfig {
    /// Device name to use (None = system default)
    pub device_name: Option<String>,
}

impl RecorderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input device by name.
    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }
}
