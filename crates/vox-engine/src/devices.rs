use crate::error::DeviceError;
use cpal::traits::{DeviceTrait, HostTrait};

/// Which devices capture and playback should open.
#[derive(Debug, Clone, Default)]
pub struct DeviceConfig {
    pub input_name: Option<String>,       // match by substring (case-insensitive)
    pub output_name: Option<String>,
    pub input_index: Option<usize>,       // explicit index among capable devices
    pub output_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub is_default_input: bool,
    pub is_default_output: bool,
}

pub fn list_devices() -> Result<Vec<DeviceInfo>, DeviceError> {
    let host = cpal::default_host();

    let default_in  = host.default_input_device().map(|d| d.name().unwrap_or_default());
    let default_out = host.default_output_device().map(|d| d.name().unwrap_or_default());

    let mut out = Vec::new();
    for dev in host.devices()? {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        let is_default_input  = default_in.as_deref() == Some(name.as_str());
        let is_default_output = default_out.as_deref() == Some(name.as_str());
        out.push(DeviceInfo { name, is_default_input, is_default_output });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Input,
    Output,
}

impl Direction {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }

    fn supports(self, dev: &cpal::Device) -> bool {
        match self {
            Direction::Input => dev.supported_input_configs().is_ok(),
            Direction::Output => dev.supported_output_configs().is_ok(),
        }
    }
}

/// Explicit index first, then name substring, then the host default.
pub(crate) fn pick_device(cfg: &DeviceConfig, dir: Direction) -> Result<cpal::Device, DeviceError> {
    let host = cpal::default_host();
    let (name_substr, index) = match dir {
        Direction::Input => (cfg.input_name.as_deref(), cfg.input_index),
        Direction::Output => (cfg.output_name.as_deref(), cfg.output_index),
    };

    if let Some(idx) = index {
        if let Some(dev) = host.devices()?.filter(|d| dir.supports(d)).nth(idx) {
            return Ok(dev);
        }
        tracing::warn!(index = idx, "no {} device at index, falling back", dir.label());
    }

    if let Some(q) = name_substr {
        let qn = q.to_lowercase();
        for dev in host.devices()? {
            let name = dev.name().unwrap_or_default();
            if name.to_lowercase().contains(&qn) && dir.supports(&dev) {
                return Ok(dev);
            }
        }
        tracing::warn!(query = q, "no {} device matched name, falling back", dir.label());
    }

    let fallback = match dir {
        Direction::Input => host.default_input_device(),
        Direction::Output => host.default_output_device(),
    };
    fallback.ok_or(DeviceError::NotFound(dir.label()))
}

/// One supported stream config range, reduced to what selection needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConfigRange {
    pub channels: u16,
    pub min_rate: u32,
    pub max_rate: u32,
    pub format: cpal::SampleFormat,
}

impl From<cpal::SupportedStreamConfigRange> for ConfigRange {
    fn from(r: cpal::SupportedStreamConfigRange) -> Self {
        Self {
            channels: r.channels(),
            min_rate: r.min_sample_rate().0,
            max_rate: r.max_sample_rate().0,
            format: r.sample_format(),
        }
    }
}

impl ConfigRange {
    fn contains(&self, rate: u32) -> bool {
        (self.min_rate..=self.max_rate).contains(&rate)
    }
}

/// The stream to open. `sample_rate` may differ from the rate asked for, in
/// which case the caller converts at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StreamChoice {
    pub channels: u16,
    pub sample_rate: u32,
    pub format: cpal::SampleFormat,
}

impl StreamChoice {
    pub(crate) fn config(&self) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        }
    }
}

fn format_rank(format: cpal::SampleFormat) -> Option<u8> {
    match format {
        cpal::SampleFormat::F32 => Some(0),
        cpal::SampleFormat::I16 => Some(1),
        cpal::SampleFormat::U16 => Some(2),
        _ => None,
    }
}

/// Prefer a range that runs at `wanted` Hz; otherwise one that runs at the
/// device's `native` rate. Among candidates, f32 beats i16 beats u16, then
/// the device's own channel count wins, then fewer channels.
pub(crate) fn choose_stream(
    dir: Direction,
    ranges: &[ConfigRange],
    wanted: u32,
    native: u32,
    native_channels: u16,
) -> Result<StreamChoice, DeviceError> {
    let best_at = |rate: u32| {
        ranges
            .iter()
            .filter(|r| r.contains(rate))
            .filter_map(|r| format_rank(r.format).map(|rank| (rank, r)))
            .min_by_key(|&(rank, r)| (rank, r.channels != native_channels, r.channels))
            .map(|(_, r)| StreamChoice { channels: r.channels, sample_rate: rate, format: r.format })
    };
    best_at(wanted)
        .or_else(|| best_at(native))
        .ok_or(DeviceError::UnsupportedRate { direction: dir.label(), rate: wanted })
}

/// Open-able stream for `dev` closest to `wanted` Hz.
pub(crate) fn select_stream(
    dev: &cpal::Device,
    dir: Direction,
    wanted: u32,
) -> Result<StreamChoice, DeviceError> {
    let (ranges, default): (Vec<ConfigRange>, _) = match dir {
        Direction::Input => (
            dev.supported_input_configs()?.map(ConfigRange::from).collect(),
            dev.default_input_config()?,
        ),
        Direction::Output => (
            dev.supported_output_configs()?.map(ConfigRange::from).collect(),
            dev.default_output_config()?,
        ),
    };
    let choice = choose_stream(dir, &ranges, wanted, default.sample_rate().0, default.channels())?;
    if choice.sample_rate != wanted {
        tracing::info!(
            wanted,
            device_rate = choice.sample_rate,
            "{} device cannot run at the requested rate, converting",
            dir.label()
        );
    }
    Ok(choice)
}
