//! Pitch and speed by index selection.
//!
//! Both stages walk positions `i * factor` for `i = 0, 1, ..` while the
//! position is below the input length and gather the sample at a derived
//! index. There is no interpolation and no band limiting, so aliasing is
//! part of the sound. The two differ only in how a fractional position
//! becomes an index: pitch floors, speed rounds half to even and drops
//! indices that land past the end. Outputs are not interchangeable.

use super::effect::Effect;
use crate::buffer::SampleBuffer;
use crate::error::{FxError, Result};

/// Longest output a single resampling stage may produce.
const MAX_OUTPUT_LEN: f64 = u32::MAX as f64;

fn check_factor(name: &'static str, factor: f64, input_len: usize) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(FxError::invalid(name, factor, "must be finite and greater than zero"));
    }
    if input_len as f64 / factor > MAX_OUTPUT_LEN {
        return Err(FxError::invalid(name, factor, "too small for this buffer"));
    }
    Ok(())
}

fn select(input: &SampleBuffer, factor: f64, to_index: impl Fn(f64) -> f64) -> SampleBuffer {
    let src = input.samples();
    let len = src.len() as f64;
    let mut out = Vec::with_capacity((len / factor).ceil() as usize);

    let mut i: u64 = 0;
    loop {
        let pos = i as f64 * factor;
        if pos >= len {
            break;
        }
        let idx = to_index(pos) as usize;
        if idx < src.len() {
            out.push(src[idx]);
        }
        i += 1;
    }
    input.with_samples(out)
}

/// Playback-rate style pitch change: `factor > 1` raises pitch and shortens
/// the signal, `factor < 1` lowers and lengthens it.
pub fn pitch_shift(input: &SampleBuffer, factor: f64) -> Result<SampleBuffer> {
    check_factor("pitch_factor", factor, input.len())?;
    Ok(select(input, factor, f64::floor))
}

/// Duration change using rounded positions. Indices at or beyond the input
/// length are dropped, never wrapped.
pub fn speed_change(input: &SampleBuffer, factor: f64) -> Result<SampleBuffer> {
    check_factor("speed_factor", factor, input.len())?;
    Ok(select(input, factor, f64::round_ties_even))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchShift {
    pub factor: f64,
}

impl Effect for PitchShift {
    fn name(&self) -> &'static str {
        "pitch"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        pitch_shift(input, self.factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChange {
    pub factor: f64,
}

impl Effect for SpeedChange {
    fn name(&self) -> &'static str {
        "speed"
    }
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        speed_change(input, self.factor)
    }
}
