use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vox_engine::{
    AudioSource, CancelHandle, DeviceConfig, DeviceInfo, Microphone, Playback, Recorder,
    SampleFormat, Speech, WavFile,
};
use vox_fx::EffectConfig;

#[derive(Parser)]
#[command(name="vox", version, about="Voice changer: pitch, speed, reverb, echo, distortion, volume")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List audio devices
    Devices,
    /// Apply effects to a WAV file
    Process {
        input: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Record from the microphone, then apply effects
    Record {
        #[arg(long, default_value_t = vox_engine::capture::DEFAULT_CAPTURE_SECS)]
        seconds: f64,
        #[arg(long, default_value_t = vox_engine::capture::DEFAULT_CAPTURE_RATE)]
        rate: u32,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Synthesize speech, then apply effects
    Speak {
        text: String,
        /// male, female, or a synthesizer voice id
        #[arg(long, default_value = "male")]
        voice: String,
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug, Default)]
struct EffectArgs {
    /// JSON preset; flags given on the command line override it
    #[arg(long)]
    preset: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    pitch: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<f64>,
    /// Enable reverb with this amount (0-10)
    #[arg(long, value_name = "AMOUNT", allow_negative_numbers = true)]
    reverb: Option<f64>,
    /// Enable the 100 ms echo
    #[arg(long)]
    echo: bool,
    /// Enable distortion with this amount (1-10)
    #[arg(long, value_name = "AMOUNT", allow_negative_numbers = true)]
    distortion: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    volume: Option<f64>,
    /// Reject values outside their documented ranges
    #[arg(long)]
    strict: bool,
}

impl EffectArgs {
    fn to_config(&self) -> Result<EffectConfig> {
        let mut cfg = match &self.preset {
            Some(path) => load_preset(path)?,
            None => EffectConfig::default(),
        };
        if let Some(p) = self.pitch { cfg.pitch_factor = p; }
        if let Some(s) = self.speed { cfg.speed_factor = s; }
        if let Some(a) = self.reverb { cfg = cfg.with_reverb(a); }
        if self.echo { cfg = cfg.with_echo(); }
        if let Some(a) = self.distortion { cfg = cfg.with_distortion(a); }
        if let Some(v) = self.volume { cfg.volume = v; }
        if self.strict {
            cfg.check_domains()?;
        }
        Ok(cfg)
    }
}

fn load_preset(path: &Path) -> Result<EffectConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading preset {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing preset {}", path.display()))
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    effects: EffectArgs,
    /// Save the result as WAV
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write 32-bit float samples instead of 16-bit PCM
    #[arg(long)]
    float: bool,
    /// Play the result (default when no --output is given)
    #[arg(long)]
    play: bool,
    /// Input device: index from `vox devices` or a name substring
    #[arg(long, value_name = "DEVICE")]
    input_device: Option<String>,
    /// Output device: index from `vox devices` or a name substring
    #[arg(long, value_name = "DEVICE")]
    output_device: Option<String>,
}

impl RunArgs {
    fn devices(&self) -> DeviceConfig {
        let mut cfg = DeviceConfig::default();
        if let Some(d) = &self.input_device {
            match d.parse::<usize>() {
                Ok(i) => cfg.input_index = Some(i),
                Err(_) => cfg.input_name = Some(d.clone()),
            }
        }
        if let Some(d) = &self.output_device {
            match d.parse::<usize>() {
                Ok(i) => cfg.output_index = Some(i),
                Err(_) => cfg.output_name = Some(d.clone()),
            }
        }
        cfg
    }

    fn sample_format(&self) -> SampleFormat {
        if self.float { SampleFormat::Float32 } else { SampleFormat::Pcm16 }
    }
}

fn run(source: &dyn AudioSource, args: &RunArgs, interrupt: &CancelHandle) -> Result<()> {
    let cfg = args.effects.to_config()?;
    let what = source.describe();
    info!(source = %what, "loading");
    let input = source.load().with_context(|| format!("loading {what}"))?;
    // A Ctrl-C that cut the recording short must not also cut playback.
    interrupt.reset();

    let output = vox_fx::apply(&input, &cfg).context("applying effects")?;
    info!(
        input_len = input.len(),
        output_len = output.len(),
        peak = output.peak(),
        "effects applied"
    );

    if let Some(path) = &args.output {
        vox_engine::encode_file(path, &output, args.sample_format())
            .with_context(|| format!("saving {}", path.display()))?;
        println!("saved {}", path.display());
    }
    if args.play || args.output.is_none() {
        let playback = vox_engine::play(&output, &args.devices()).context("starting playback")?;
        wait_playback(playback, interrupt);
    }
    Ok(())
}

/// `[*I *O]` style markers for default devices, empty when neither.
fn default_marks(d: &DeviceInfo) -> String {
    let marks: Vec<&str> = [(d.is_default_input, "*I"), (d.is_default_output, "*O")]
        .into_iter()
        .filter_map(|(on, mark)| on.then_some(mark))
        .collect();
    if marks.is_empty() {
        String::new()
    } else {
        format!("[{}] ", marks.join(" "))
    }
}

fn print_devices() -> Result<()> {
    let list = vox_engine::list_devices().context("enumerating devices")?;
    if list.is_empty() {
        println!("(no devices found)");
        return Ok(());
    }
    for (i, d) in list.iter().enumerate() {
        println!("{}{:>2}  {}", default_marks(d), i, d.name);
    }
    Ok(())
}

/// First Ctrl-C cancels the capture or playback in progress; a second one
/// exits.
fn install_interrupt(interrupt: CancelHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        if interrupt.is_cancelled() {
            std::process::exit(130);
        }
        interrupt.cancel();
    })
    .context("installing Ctrl-C handler")
}

fn wait_playback(playback: Playback, interrupt: &CancelHandle) {
    while !playback.is_finished() {
        if interrupt.is_cancelled() {
            info!("playback interrupted");
            playback.stop();
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    playback.wait();
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let interrupt = CancelHandle::default();
    install_interrupt(interrupt.clone())?;
    match cli.cmd {
        Command::Devices => print_devices(),
        Command::Process { input, run: args } => run(&WavFile { path: input }, &args, &interrupt),
        Command::Record { seconds, rate, run: args } => {
            let mic = Microphone {
                seconds,
                sample_rate: rate,
                recorder: Recorder::with_cancel(args.devices(), interrupt.clone()),
            };
            run(&mic, &args, &interrupt)
        }
        Command::Speak { text, voice, run: args } => {
            let voice = voice.parse().context("parsing --voice")?;
            run(&Speech { text, voice }, &args, &interrupt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn run_args(cli: Cli) -> RunArgs {
        match cli.cmd {
            Command::Process { run, .. } | Command::Record { run, .. } | Command::Speak { run, .. } => run,
            Command::Devices => panic!("no run args"),
        }
    }

    #[test]
    fn flags_build_config() {
        let args = run_args(parse(&[
            "vox", "process", "in.wav", "--pitch", "1.5", "--reverb", "3", "--echo", "--volume", "0.8",
        ]));
        let cfg = args.effects.to_config().unwrap();
        assert_eq!(cfg.pitch_factor, 1.5);
        assert_eq!(cfg.speed_factor, 1.0);
        assert!(cfg.reverb_enabled && cfg.echo_enabled && !cfg.distortion_enabled);
        assert_eq!(cfg.reverb_amount, 3.0);
        assert_eq!(cfg.volume, 0.8);
    }

    #[test]
    fn negative_values_parse_and_strict_rejects_them() {
        let args = run_args(parse(&["vox", "process", "in.wav", "--speed", "-1"]));
        assert_eq!(args.effects.to_config().unwrap().speed_factor, -1.0);

        let args = run_args(parse(&["vox", "process", "in.wav", "--speed", "-1", "--strict"]));
        assert!(args.effects.to_config().is_err());
    }

    #[test]
    fn record_defaults() {
        match parse(&["vox", "record"]).cmd {
            Command::Record { seconds, rate, run } => {
                assert_eq!(seconds, 5.0);
                assert_eq!(rate, 44100);
                assert!(run.output.is_none());
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn device_selector_index_or_name() {
        let args = run_args(parse(&[
            "vox", "speak", "hello", "--input-device", "2", "--output-device", "USB",
        ]));
        let d = args.devices();
        assert_eq!(d.input_index, Some(2));
        assert_eq!(d.output_name.as_deref(), Some("USB"));
        assert!(d.input_name.is_none() && d.output_index.is_none());
    }

    #[test]
    fn preset_is_overridden_by_flags() {
        let path = std::env::temp_dir().join(format!("vox-preset-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "pitch_factor": 0.7, "distortion_enabled": true, "distortion_amount": 6 }"#)
            .unwrap();
        let effects = EffectArgs {
            preset: Some(path.clone()),
            pitch: Some(1.2),
            ..Default::default()
        };
        let cfg = effects.to_config().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.pitch_factor, 1.2);
        assert!(cfg.distortion_enabled);
        assert_eq!(cfg.distortion_amount, 6.0);
    }

    #[test]
    fn missing_preset_has_context() {
        let effects = EffectArgs { preset: Some("/nonexistent/vox.json".into()), ..Default::default() };
        let err = effects.to_config().unwrap_err();
        assert!(format!("{err:#}").contains("reading preset"));
    }

    #[test]
    fn default_markers() {
        let dev = |i, o| DeviceInfo { name: "hw".into(), is_default_input: i, is_default_output: o };
        assert_eq!(default_marks(&dev(false, false)), "");
        assert_eq!(default_marks(&dev(true, false)), "[*I] ");
        assert_eq!(default_marks(&dev(false, true)), "[*O] ");
        assert_eq!(default_marks(&dev(true, true)), "[*I *O] ");
    }

    #[test]
    fn interrupted_playback_returns() {
        let silent = vox_fx::SampleBuffer::new(Vec::new(), 8000).unwrap();
        let playback = vox_engine::play(&silent, &DeviceConfig::default()).unwrap();
        let interrupt = CancelHandle::default();
        interrupt.cancel();
        wait_playback(playback, &interrupt);
    }

    #[test]
    fn float_flag_selects_format() {
        let args = run_args(parse(&["vox", "process", "in.wav", "-o", "out.wav", "--float"]));
        assert_eq!(args.sample_format(), SampleFormat::Float32);
        assert_eq!(args.output.as_deref(), Some(Path::new("out.wav")));
    }
}
