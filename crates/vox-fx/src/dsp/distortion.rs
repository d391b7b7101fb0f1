use super::effect::Effect;
use crate::buffer::SampleBuffer;
use crate::error::Result;

/// Gain then hard clip to [-1, 1].
pub fn distortion(input: &SampleBuffer, amount: f64) -> Result<SampleBuffer> {
    let g = amount as f32;
    let out = input.samples().iter().map(|&x| (x * g).clamp(-1.0, 1.0)).collect();
    Ok(input.with_samples(out))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    pub amount: f64,
}

impl Effect for Distortion {
    fn name(&self) -> &'static str {
        "distortion"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        distortion(input, self.amount)
    }
}
