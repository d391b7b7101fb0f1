//! Audio I/O around the effects core: sources (WAV files, microphone,
//! speech synthesis) and sinks (device playback, WAV files).

pub mod capture;
pub mod codec;
pub mod convert;
pub mod devices;
pub mod error;
pub mod playback;
pub mod source;
pub mod speech;

pub use capture::{capture_fixed_duration, CancelHandle, Recorder};
pub use codec::{decode_file, encode_file, SampleFormat};
pub use devices::{list_devices, DeviceConfig, DeviceInfo};
pub use error::{DeviceError, EngineError};
pub use playback::{play, Playback};
pub use source::{AudioSource, Microphone, Speech, WavFile};
pub use speech::{synthesize_speech, Voice};
