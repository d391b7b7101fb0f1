//! Text to speech through the system `espeak-ng` (or `espeak`) binary.

use crate::codec;
use crate::error::{EngineError, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};
use vox_fx::SampleBuffer;

const SYNTHESIZERS: [&str; 2] = ["espeak-ng", "espeak"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Voice {
    #[default]
    Male,
    Female,
    /// Any voice name the synthesizer understands, passed through as-is.
    Id(String),
}

impl Voice {
    pub fn id(&self) -> &str {
        match self {
            Voice::Male => "en+m3",
            Voice::Female => "en+f3",
            Voice::Id(id) => id,
        }
    }
}

impl FromStr for Voice {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EngineError::InvalidInput("empty voice id".into()));
        }
        Ok(match s.to_ascii_lowercase().as_str() {
            "male" => Voice::Male,
            "female" => Voice::Female,
            _ => Voice::Id(s.to_string()),
        })
    }
}

fn scratch_path() -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("vox-speech-{}-{n}.wav", std::process::id()))
}

/// Render `text` with `voice` and load the result as a buffer.
pub fn synthesize_speech(text: &str, voice: &Voice) -> Result<SampleBuffer> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EngineError::InvalidInput("no text to speak".into()));
    }

    let wav = scratch_path();
    let result = run_synthesizer(&SYNTHESIZERS, text, voice, &wav)
        .and_then(|()| codec::decode_file(&wav));
    if let Err(e) = std::fs::remove_file(&wav) {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %wav.display(), "could not remove speech scratch file: {e}");
        }
    }
    result
}

fn run_synthesizer(programs: &[&str], text: &str, voice: &Voice, wav: &Path) -> Result<()> {
    for &program in programs {
        // Text goes through stdin so a leading '-' is never read as a flag.
        let child = Command::new(program)
            .arg("-v")
            .arg(voice.id())
            .arg("-w")
            .arg(wav)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match child {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(program, "synthesizer not installed");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // Reap the child before surfacing a stdin error: a synthesizer that
        // exits early breaks the pipe, and its stderr names the cause.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Speech(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written?;
        debug!(program, voice = voice.id(), "speech rendered");
        return Ok(());
    }
    Err(EngineError::Speech(format!(
        "none of {} is installed",
        programs.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_voices_parse_case_insensitively() {
        assert_eq!("Male".parse::<Voice>().unwrap(), Voice::Male);
        assert_eq!(" FEMALE ".parse::<Voice>().unwrap(), Voice::Female);
        assert_eq!("de+f2".parse::<Voice>().unwrap(), Voice::Id("de+f2".into()));
        assert!("  ".parse::<Voice>().is_err());
    }

    #[test]
    fn voice_ids() {
        assert_eq!(Voice::Male.id(), "en+m3");
        assert_eq!(Voice::Female.id(), "en+f3");
        assert_eq!(Voice::Id("mb-en1".into()).id(), "mb-en1");
    }

    #[test]
    fn empty_text_is_rejected_before_spawning() {
        assert!(matches!(
            synthesize_speech("   ", &Voice::Male),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[cfg(unix)]
    fn failing_synthesizer() -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = std::env::temp_dir().join(format!("vox-fake-tts-{}.sh", std::process::id()));
        std::fs::write(&path, "#!/bin/sh\necho 'Failed to load voice' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn synthesizer_failure_reports_stderr() {
        let fake = failing_synthesizer();
        let program = fake.to_str().unwrap();
        let wav = scratch_path();
        // Large enough to overflow the pipe buffer of a child that never reads.
        let text = "hello ".repeat(200_000);
        let res = run_synthesizer(&[program], &text, &Voice::Id("xx".into()), &wav);
        std::fs::remove_file(&fake).unwrap();
        match res {
            Err(EngineError::Speech(msg)) => assert!(msg.contains("Failed to load voice"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_synthesizers_are_named() {
        let res = run_synthesizer(&["vox-no-such-tts"], "hi", &Voice::Male, &scratch_path());
        match res {
            Err(EngineError::Speech(msg)) => assert!(msg.contains("vox-no-such-tts")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scratch_paths_are_unique() {
        assert_ne!(scratch_path(), scratch_path());
    }
}
