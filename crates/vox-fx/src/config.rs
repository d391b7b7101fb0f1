use crate::error::{FxError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One value per `apply` call. Amounts are used exactly as given; the
/// pipeline does not clamp them into their domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub pitch_factor: f64,       // 0.5..=2.0
    pub speed_factor: f64,       // 0.5..=2.0
    pub reverb_enabled: bool,
    pub reverb_amount: f64,      // 0..=10, decay = amount / 10
    pub echo_enabled: bool,
    pub distortion_enabled: bool,
    pub distortion_amount: f64,  // 1..=10
    pub volume: f64,             // 0.5..=2.0
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            pitch_factor: 1.0,
            speed_factor: 1.0,
            reverb_enabled: false,
            reverb_amount: 0.0,
            echo_enabled: false,
            distortion_enabled: false,
            distortion_amount: 1.0,
            volume: 1.0,
        }
    }
}

/// The tunable values of an [`EffectConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Pitch,
    Speed,
    ReverbAmount,
    DistortionAmount,
    Volume,
}

impl Param {
    pub const ALL: [Param; 5] = [
        Param::Pitch,
        Param::Speed,
        Param::ReverbAmount,
        Param::DistortionAmount,
        Param::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::Pitch => "pitch_factor",
            Param::Speed => "speed_factor",
            Param::ReverbAmount => "reverb_amount",
            Param::DistortionAmount => "distortion_amount",
            Param::Volume => "volume",
        }
    }

    /// Documented range of the parameter.
    pub fn domain(self) -> RangeInclusive<f64> {
        match self {
            Param::Pitch | Param::Speed | Param::Volume => 0.5..=2.0,
            Param::ReverbAmount => 0.0..=10.0,
            Param::DistortionAmount => 1.0..=10.0,
        }
    }
}

impl EffectConfig {
    pub fn get(&self, p: Param) -> f64 {
        match p {
            Param::Pitch => self.pitch_factor,
            Param::Speed => self.speed_factor,
            Param::ReverbAmount => self.reverb_amount,
            Param::DistortionAmount => self.distortion_amount,
            Param::Volume => self.volume,
        }
    }

    /// Strict check of every value against [`Param::domain`]. Opt-in: the
    /// pipeline only rejects values it cannot compute with.
    pub fn check_domains(&self) -> Result<()> {
        for p in Param::ALL {
            let v = self.get(p);
            if !p.domain().contains(&v) {
                return Err(FxError::invalid(p.name(), v, "outside documented domain"));
            }
        }
        Ok(())
    }

    pub fn with_reverb(mut self, amount: f64) -> Self {
        self.reverb_enabled = true;
        self.reverb_amount = amount;
        self
    }

    pub fn with_echo(mut self) -> Self {
        self.echo_enabled = true;
        self
    }

    pub fn with_distortion(mut self, amount: f64) -> Self {
        self.distortion_enabled = true;
        self.distortion_amount = amount;
        self
    }
}
