use crate::error::{FxError, Result};

/// A complete mono signal held in memory.
///
/// Samples are nominally in [-1, 1] but nothing enforces it; stages such as
/// reverb and volume are allowed to leave that range.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FxError::invalid("sample_rate", 0.0, "must be positive"));
        }
        Ok(Self { samples, sample_rate })
    }

    /// `len` zero samples at `sample_rate`.
    pub fn silence(len: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// A new buffer at the same rate as `self`. Rate validity is inherited.
    pub fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self { samples, sample_rate: self.sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value, 0 for an empty buffer.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}
