//! The individual stages. Each one is a pure function over a buffer, also
//! wrapped in a small struct implementing [`Effect`] for the pipeline.

pub mod distortion;
pub mod echo;
pub mod effect;
pub mod gain;
pub mod resample;
pub mod reverb;

pub use distortion::{distortion, Distortion};
pub use echo::{echo, Echo};
pub use effect::Effect;
pub use gain::{volume, Volume};
pub use resample::{pitch_shift, speed_change, PitchShift, SpeedChange};
pub use reverb::{reverb, Reverb};
