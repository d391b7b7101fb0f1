//! Fixed single-tap echo: no feedback, half-level repeat after 100 ms.

use super::effect::Effect;
use crate::buffer::SampleBuffer;
use crate::error::Result;

pub const ECHO_DELAY_SECS: f64 = 0.1;
pub const ECHO_MIX: f32 = 0.5;

pub fn echo(input: &SampleBuffer) -> Result<SampleBuffer> {
    let delay = (ECHO_DELAY_SECS * input.sample_rate() as f64) as usize;
    let src = input.samples();
    let out = src
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let delayed = if i >= delay { src[i - delay] } else { 0.0 };
            x + ECHO_MIX * delayed
        })
        .collect();
    Ok(input.with_samples(out))
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Echo;

impl Effect for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        echo(input)
    }
}
