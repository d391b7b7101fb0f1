//! Single-tap feedback comb used as a cheap reverb.

use super::effect::Effect;
use crate::buffer::SampleBuffer;
use crate::error::Result;

/// Feedback delay in seconds.
pub const REVERB_DELAY_SECS: f64 = 0.03;

/// `amount` is on a 0..=10 scale; decay is `amount / 10`. At 10 the
/// feedback is unity and the tail never decays. No limiter is applied.
pub fn reverb(input: &SampleBuffer, amount: f64) -> Result<SampleBuffer> {
    let decay = (amount / 10.0) as f32;
    let delay = (REVERB_DELAY_SECS * input.sample_rate() as f64) as usize;

    let mut work = input.samples().to_vec();
    // Recursive: work[i - delay] already holds feedback, so order matters.
    for i in delay..work.len() {
        let fb = decay * work[i - delay];
        work[i] += fb;
    }
    Ok(input.with_samples(work))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reverb {
    pub amount: f64,
}

impl Effect for Reverb {
    fn name(&self) -> &'static str {
        "reverb"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        reverb(input, self.amount)
    }
}
