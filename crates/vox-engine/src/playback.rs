//! Fire-and-forget device playback.
//!
//! cpal streams are not `Send` on every host, so the stream is built and
//! owned by a dedicated worker thread; the caller only gets a handle.

use crate::convert::resample_linear;
use crate::devices::{pick_device, select_stream, DeviceConfig, Direction};
use crate::error::{DeviceError, EngineError, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vox_fx::SampleBuffer;

const POLL: Duration = Duration::from_millis(10);
/// Time left for the device to drain its own buffer after the last frame.
const TAIL: Duration = Duration::from_millis(150);
const STALL_GRACE: Duration = Duration::from_secs(3);

pub struct Playback {
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl Playback {
    fn finished() -> Self {
        Self {
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Ask the worker to close the stream early.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Block until the whole buffer has been played (or `stop` was called).
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("playback worker panicked");
            }
        }
    }
}

/// Start playing `buffer` and return once the stream is running. Device
/// errors that happen while opening the stream are returned here; anything
/// later is logged by the worker.
pub fn play(buffer: &SampleBuffer, device: &DeviceConfig) -> Result<Playback> {
    if buffer.is_empty() {
        debug!("nothing to play");
        return Ok(Playback::finished());
    }

    let samples: Arc<[f32]> = buffer.samples().into();
    let sample_rate = buffer.sample_rate();
    let duration = Duration::from_secs_f64(buffer.duration_secs());
    let device = device.clone();

    let stop = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let (started_tx, started_rx) = mpsc::sync_channel::<std::result::Result<(), DeviceError>>(1);

    let worker = {
        let stop = Arc::clone(&stop);
        let finished = Arc::clone(&finished);
        std::thread::Builder::new()
            .name("vox-playback".into())
            .spawn(move || {
                let drained = Arc::new(AtomicBool::new(false));
                match open_output(&device, sample_rate, samples, &drained) {
                    Ok(stream) => {
                        let _ = started_tx.send(Ok(()));
                        let deadline = Instant::now() + duration + STALL_GRACE;
                        while !drained.load(Ordering::Acquire) && !stop.load(Ordering::Acquire) {
                            if Instant::now() > deadline {
                                warn!("output device stalled, abandoning playback");
                                break;
                            }
                            std::thread::sleep(POLL);
                        }
                        if !stop.load(Ordering::Acquire) {
                            std::thread::sleep(TAIL);
                        }
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = started_tx.send(Err(e));
                    }
                }
                finished.store(true, Ordering::Release);
            })?
    };

    match started_rx.recv() {
        Ok(Ok(())) => Ok(Playback { worker: Some(worker), stop, finished }),
        Ok(Err(e)) => {
            let _ = worker.join();
            Err(EngineError::Device(e))
        }
        Err(_) => {
            let _ = worker.join();
            Err(DeviceError::WorkerGone.into())
        }
    }
}

fn open_output(
    device: &DeviceConfig,
    sample_rate: u32,
    samples: Arc<[f32]>,
    drained: &Arc<AtomicBool>,
) -> std::result::Result<cpal::Stream, DeviceError> {
    let dev = pick_device(device, Direction::Output)?;
    let choice = select_stream(&dev, Direction::Output, sample_rate)?;
    let cfg = choice.config();
    let samples: Arc<[f32]> = if choice.sample_rate == sample_rate {
        samples
    } else {
        resample_linear(&samples, sample_rate, choice.sample_rate).into()
    };
    info!(
        device = %dev.name().unwrap_or_default(),
        channels = cfg.channels,
        sample_rate = choice.sample_rate,
        "playing"
    );

    let stream = match choice.format {
        cpal::SampleFormat::F32 => build_playback::<f32>(&dev, &cfg, samples, drained)?,
        cpal::SampleFormat::I16 => build_playback::<i16>(&dev, &cfg, samples, drained)?,
        cpal::SampleFormat::U16 => build_playback::<u16>(&dev, &cfg, samples, drained)?,
        other => {
            return Err(DeviceError::SampleFormat {
                direction: "output",
                format: format!("{other:?}"),
            })
        }
    };
    stream.play()?;
    Ok(stream)
}

fn build_playback<T>(
    dev: &cpal::Device,
    cfg: &cpal::StreamConfig,
    samples: Arc<[f32]>,
    drained: &Arc<AtomicBool>,
) -> std::result::Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = cfg.channels.max(1) as usize;
    let drained = Arc::clone(drained);
    let mut cursor = 0usize;
    let stream = dev.build_output_stream::<T, _, _>(
        cfg,
        move |out: &mut [T], _| {
            cursor = fill_frames(out, channels, &samples, cursor);
            if cursor >= samples.len() {
                drained.store(true, Ordering::Release);
            }
        },
        move |err| warn!("output stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

/// Copy mono samples from `cursor` into every channel of `out`, padding with
/// silence past the end. Returns the new cursor.
fn fill_frames<T>(out: &mut [T], channels: usize, samples: &[f32], mut cursor: usize) -> usize
where
    T: Sample + FromSample<f32>,
{
    for frame in out.chunks_mut(channels) {
        let v = match samples.get(cursor) {
            Some(&s) => {
                cursor += 1;
                T::from_sample(s.clamp(-1.0, 1.0))
            }
            None => T::EQUILIBRIUM,
        };
        frame.fill(v);
    }
    cursor
}
