use super::effect::Effect;
use crate::buffer::SampleBuffer;
use crate::error::Result;

/// Linear gain. No clipping: this is the last stage and its output may
/// leave [-1, 1]; sinks decide how to handle that.
pub fn volume(input: &SampleBuffer, gain: f64) -> Result<SampleBuffer> {
    let g = gain as f32;
    let out = input.samples().iter().map(|&x| x * g).collect();
    Ok(input.with_samples(out))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    pub gain: f64,
}

impl Default for Volume {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl Effect for Volume {
    fn name(&self) -> &'static str {
        "volume"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        volume(input, self.gain)
    }
}
