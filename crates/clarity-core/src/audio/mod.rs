//! Microphone capture and input device enumeration.

mod devices;
mod recorder;

pub use devices::{InputDeviceInfo, list_input_devices};
pub use recorder::{FinishedRecording, Recorder, RecorderConfig};
