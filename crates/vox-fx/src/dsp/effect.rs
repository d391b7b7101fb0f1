use crate::buffer::SampleBuffer;
use crate::error::Result;

/// Whole-buffer effect interface.
/// - apply() never mutates `input`; it returns a new buffer.
/// - the output keeps `input.sample_rate()`.
/// - an empty input yields an empty output.
pub trait Effect: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer>;
}
