pub mod audio;
pub mod config;
pub mod error;
pub mod flow;
pub mod remote;
pub mod store;

pub use audio::{FinishedRecording, InputDeviceInfo, Recorder, RecorderConfig, list_input_devices};
pub use config::Config;
pub use error::{
    FlowError, PersistenceError, RecorderError, SynthesisError, TranscriptionError,
    TranslationError,
};
pub use flow::{Stage, TranscriptionFlow, TranscriptionOutcome};
pub use remote::{
    SynthesisClient, Transcript, TranscriptionClient, TranslationClient, Utterance, Voice,
    VoiceChoice, VoicePreset,
};
pub use store::{EnhancedAudio, Library, Recording, Transcription};
