use thiserror::Error;

/// Failures talking to the audio host.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no {0} device matched (and no default available)")]
    NotFound(&'static str),
    #[error("unsupported {direction} sample format: {format}")]
    SampleFormat {
        direction: &'static str,
        format: String,
    },
    #[error("no {direction} stream config supports {rate} Hz or the device's own rate")]
    UnsupportedRate {
        direction: &'static str,
        rate: u32,
    },
    #[error("audio worker exited before the stream started")]
    WorkerGone,
    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("mp3: {0}")]
    Mp3(#[from] minimp3::Error),
    #[error("no audio frames found")]
    NoFrames,
}

/// Everything a source or sink can fail with. The effects core never
/// inspects these.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("speech synthesis failed: {0}")]
    Speech(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fx(#[from] vox_fx::FxError),
}

impl From<hound::Error> for EngineError {
    fn from(e: hound::Error) -> Self {
        EngineError::Codec(e.into())
    }
}

impl From<minimp3::Error> for EngineError {
    fn from(e: minimp3::Error) -> Self {
        EngineError::Codec(e.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
