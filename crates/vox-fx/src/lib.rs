//! Whole-buffer voice effects.
//!
//! A mono [`SampleBuffer`] goes through a fixed chain (pitch, speed, reverb,
//! echo, distortion, volume) configured by an [`EffectConfig`]. Every stage
//! is a pure function returning a new buffer at the input's sample rate.

pub mod buffer;
pub mod config;
pub mod dsp;
pub mod error;
pub mod pipeline;

pub use buffer::SampleBuffer;
pub use config::{EffectConfig, Param};
pub use error::FxError;
pub use pipeline::{apply, apply_optional, EffectsPipeline, Stage};
