use crate::capture::{Recorder, DEFAULT_CAPTURE_RATE, DEFAULT_CAPTURE_SECS};
use crate::codec;
use crate::devices::DeviceConfig;
use crate::error::Result;
use crate::speech::{self, Voice};
use std::path::PathBuf;
use vox_fx::SampleBuffer;

/// Anything that can hand over a complete mono buffer.
pub trait AudioSource {
    fn describe(&self) -> String;
    fn load(&self) -> Result<SampleBuffer>;
}

pub struct WavFile {
    pub path: PathBuf,
}

impl AudioSource for WavFile {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
    fn load(&self) -> Result<SampleBuffer> {
        codec::decode_file(&self.path)
    }
}

pub struct Microphone {
    pub seconds: f64,
    pub sample_rate: u32,
    pub recorder: Recorder,
}

impl Microphone {
    pub fn new(device: DeviceConfig) -> Self {
        Self {
            seconds: DEFAULT_CAPTURE_SECS,
            sample_rate: DEFAULT_CAPTURE_RATE,
            recorder: Recorder::new(device),
        }
    }
}

impl AudioSource for Microphone {
    fn describe(&self) -> String {
        format!("microphone, {}s at {} Hz", self.seconds, self.sample_rate)
    }
    fn load(&self) -> Result<SampleBuffer> {
        self.recorder.capture_fixed_duration(self.seconds, self.sample_rate)
    }
}

pub struct Speech {
    pub text: String,
    pub voice: Voice,
}

impl AudioSource for Speech {
    fn describe(&self) -> String {
        format!("speech ({} voice)", self.voice.id())
    }
    fn load(&self) -> Result<SampleBuffer> {
        speech::synthesize_speech(&self.text, &self.voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn microphone_defaults_to_five_seconds() {
        let mic = Microphone::new(DeviceConfig::default());
        assert_eq!(mic.seconds, 5.0);
        assert_eq!(mic.sample_rate, 44100);
    }

    #[test]
    fn sources_are_object_safe() {
        let sources: Vec<Box<dyn AudioSource>> = vec![
            Box::new(WavFile { path: "voice.mp3".into() }),
            Box::new(Speech { text: String::new(), voice: Voice::Female }),
        ];
        assert!(matches!(sources[0].load(), Err(EngineError::UnsupportedFormat(_))));
        assert!(matches!(sources[1].load(), Err(EngineError::InvalidInput(_))));
        assert_eq!(sources[1].describe(), "speech (en+f3 voice)");
    }
}
