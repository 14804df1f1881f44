//! Audio input device enumeration.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::RecorderError;

/// An available audio input device.
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// List the audio input devices on this system.
///
/// # Errors
/// `RecorderError::Permission` when enumeration fails or no input device
/// exists — on most platforms both mean microphone access is unavailable.
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>, RecorderError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices_iter = host
        .input_devices()
        .map_err(|e| RecorderError::Permission(e.to_string()))?;

    let mut devices = Vec::new();
    for device in devices_iter {
        if let Ok(name) = device.name() {
            devices.push(InputDeviceInfo {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
            });
        }
    }

    if devices.is_empty() {
        return Err(RecorderError::Permission(
            "no audio input devices found".to_string(),
        ));
    }

    Ok(devices)
}
