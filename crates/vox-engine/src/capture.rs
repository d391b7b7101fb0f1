//! Fixed-duration microphone capture.

use crate::convert::resample_linear;
use crate::devices::{pick_device, select_stream, DeviceConfig, Direction};
use crate::error::{DeviceError, EngineError, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use vox_fx::SampleBuffer;

pub const DEFAULT_CAPTURE_SECS: f64 = 5.0;
pub const DEFAULT_CAPTURE_RATE: u32 = 44100;

/// Extra time allowed past the requested duration before giving up on a
/// device that stopped delivering frames.
const STALL_GRACE: Duration = Duration::from_secs(3);
const POLL: Duration = Duration::from_millis(10);

/// Stops an in-progress capture from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Re-arm after a cancelled operation so the handle can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Recorder {
    device: DeviceConfig,
    cancel: CancelHandle,
}

impl Recorder {
    pub fn new(device: DeviceConfig) -> Self {
        Self { device, cancel: CancelHandle::default() }
    }

    /// Share `cancel` with other operations, e.g. one interrupt handler.
    pub fn with_cancel(device: DeviceConfig, cancel: CancelHandle) -> Self {
        Self { device, cancel }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Block until `seconds * sample_rate` mono frames are captured. A
    /// cancelled capture returns the frames gathered so far.
    pub fn capture_fixed_duration(&self, seconds: f64, sample_rate: u32) -> Result<SampleBuffer> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(EngineError::InvalidInput(format!("capture length {seconds}s")));
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidInput("capture sample rate 0".into()));
        }
        let target = (seconds * sample_rate as f64) as usize;
        if target == 0 {
            return Ok(SampleBuffer::new(Vec::new(), sample_rate)?);
        }

        let dev = pick_device(&self.device, Direction::Input)?;
        let choice = select_stream(&dev, Direction::Input, sample_rate)?;
        let cfg = choice.config();
        // Frame count at the rate the device really runs at.
        let device_target = (seconds * choice.sample_rate as f64) as usize;
        info!(
            device = %dev.name().unwrap_or_default(),
            channels = cfg.channels,
            sample_rate = choice.sample_rate,
            seconds,
            "recording"
        );

        let captured = Arc::new(Mutex::new(Vec::with_capacity(device_target)));
        let done = Arc::new(AtomicBool::new(false));

        let stream = match choice.format {
            cpal::SampleFormat::F32 => build_capture::<f32>(&dev, &cfg, device_target, &captured, &done)?,
            cpal::SampleFormat::I16 => build_capture::<i16>(&dev, &cfg, device_target, &captured, &done)?,
            cpal::SampleFormat::U16 => build_capture::<u16>(&dev, &cfg, device_target, &captured, &done)?,
            other => {
                return Err(DeviceError::SampleFormat {
                    direction: "input",
                    format: format!("{other:?}"),
                }
                .into())
            }
        };
        stream.play().map_err(DeviceError::from)?;

        let deadline = Instant::now() + Duration::from_secs_f64(seconds) + STALL_GRACE;
        while !done.load(Ordering::Acquire) {
            if self.cancel.is_cancelled() {
                info!("capture cancelled");
                break;
            }
            if Instant::now() > deadline {
                warn!("input device stalled, keeping partial capture");
                break;
            }
            std::thread::sleep(POLL);
        }
        drop(stream);

        let mut samples = std::mem::take(&mut *captured.lock());
        if choice.sample_rate != sample_rate {
            samples = resample_linear(&samples, choice.sample_rate, sample_rate);
            samples.truncate(target);
        }
        Ok(SampleBuffer::new(samples, sample_rate)?)
    }
}

/// Convenience wrapper: default devices, not cancellable.
pub fn capture_fixed_duration(seconds: f64, sample_rate: u32) -> Result<SampleBuffer> {
    Recorder::new(DeviceConfig::default()).capture_fixed_duration(seconds, sample_rate)
}

fn build_capture<T>(
    dev: &cpal::Device,
    cfg: &cpal::StreamConfig,
    target: usize,
    captured: &Arc<Mutex<Vec<f32>>>,
    done: &Arc<AtomicBool>,
) -> std::result::Result<cpal::Stream, DeviceError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = cfg.channels.max(1) as usize;
    let captured = Arc::clone(captured);
    let done = Arc::clone(done);
    let stream = dev.build_input_stream::<T, _, _>(
        cfg,
        move |data: &[T], _| {
            if done.load(Ordering::Relaxed) {
                return;
            }
            let mut buf = captured.lock();
            for frame in data.chunks(channels) {
                if buf.len() >= target {
                    break;
                }
                buf.push(mix_frame(frame));
            }
            if buf.len() >= target {
                done.store(true, Ordering::Release);
            }
        },
        move |err| warn!("input stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

fn mix_frame<T>(frame: &[T]) -> f32
where
    T: Sample,
    f32: FromSample<T>,
{
    let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
    sum / frame.len() as f32
}
