use crate::buffer::SampleBuffer;
use crate::config::EffectConfig;
use crate::dsp::{Distortion, Echo, Effect, PitchShift, Reverb, SpeedChange, Volume};
use crate::error::Result;
use tracing::{debug, trace};

/// One planned step. Order of variants is the order of execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Pitch(PitchShift),
    Speed(SpeedChange),
    Reverb(Reverb),
    Echo(Echo),
    Distortion(Distortion),
    Volume(Volume),
}

impl Stage {
    fn effect(&self) -> &dyn Effect {
        match self {
            Stage::Pitch(fx) => fx,
            Stage::Speed(fx) => fx,
            Stage::Reverb(fx) => fx,
            Stage::Echo(fx) => fx,
            Stage::Distortion(fx) => fx,
            Stage::Volume(fx) => fx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.effect().name()
    }
}

/// Fixed-order serial chain built from an [`EffectConfig`].
///
/// Pitch and speed always run, then reverb, echo and distortion when
/// enabled, then volume. The order is not configurable: none of these
/// stages commute.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsPipeline {
    stages: Vec<Stage>,
}

impl EffectsPipeline {
    pub fn from_config(cfg: &EffectConfig) -> Self {
        let mut stages = Vec::with_capacity(6);
        stages.push(Stage::Pitch(PitchShift { factor: cfg.pitch_factor }));
        stages.push(Stage::Speed(SpeedChange { factor: cfg.speed_factor }));
        if cfg.reverb_enabled {
            stages.push(Stage::Reverb(Reverb { amount: cfg.reverb_amount }));
        }
        if cfg.echo_enabled {
            stages.push(Stage::Echo(Echo));
        }
        if cfg.distortion_enabled {
            stages.push(Stage::Distortion(Distortion { amount: cfg.distortion_amount }));
        }
        stages.push(Stage::Volume(Volume { gain: cfg.volume }));
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order. The caller's buffer is only read.
    pub fn apply(&self, input: &SampleBuffer) -> Result<SampleBuffer> {
        debug!(
            len = input.len(),
            sample_rate = input.sample_rate(),
            stages = self.stages.len(),
            "applying effects"
        );
        let mut current = input.clone();
        for stage in &self.stages {
            let next = stage.effect().apply(&current)?;
            trace!(stage = stage.name(), before = current.len(), after = next.len());
            current = next;
        }
        Ok(current)
    }
}

/// Plan and run the pipeline for `cfg` in one call.
pub fn apply(input: &SampleBuffer, cfg: &EffectConfig) -> Result<SampleBuffer> {
    EffectsPipeline::from_config(cfg).apply(input)
}

/// No audio loaded means nothing to produce; callers must not play or save.
pub fn apply_optional(
    input: Option<&SampleBuffer>,
    cfg: &EffectConfig,
) -> Result<Option<SampleBuffer>> {
    match input {
        Some(buf) => apply(buf, cfg).map(Some),
        None => {
            debug!("no input buffer, skipping effects");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cfg: &EffectConfig) -> Vec<&'static str> {
        EffectsPipeline::from_config(cfg).stages().iter().map(Stage::name).collect()
    }

    #[test]
    fn default_plan_is_pitch_speed_volume() {
        assert_eq!(names(&EffectConfig::default()), ["pitch", "speed", "volume"]);
    }

    #[test]
    fn full_plan_keeps_fixed_order() {
        let cfg = EffectConfig::default().with_distortion(3.0).with_echo().with_reverb(2.0);
        assert_eq!(
            names(&cfg),
            ["pitch", "speed", "reverb", "echo", "distortion", "volume"]
        );
    }

    #[test]
    fn disabled_stage_ignores_amount() {
        let cfg = EffectConfig { reverb_amount: 10.0, distortion_amount: 10.0, ..Default::default() };
        assert_eq!(names(&cfg), ["pitch", "speed", "volume"]);
    }

    #[test]
    fn absent_input_produces_nothing() {
        let out = apply_optional(None, &EffectConfig::default().with_echo()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn bad_factor_surfaces_from_apply() {
        let b = SampleBuffer::new(vec![0.1; 8], 100).unwrap();
        let cfg = EffectConfig { speed_factor: 0.0, ..Default::default() };
        assert!(apply(&b, &cfg).is_err());
    }

    #[test]
    fn pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EffectsPipeline>();
    }
}
