//! File codecs. WAV is read and written, MP3 is read only; anything else
//! is rejected up front by extension.

use crate::error::{CodecError, EngineError, Result};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use vox_fx::SampleBuffer;

/// On-disk sample encoding when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    Pcm16,
    Float32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Wav,
    Mp3,
}

impl Container {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => Ok(Container::Wav),
            Some(ext) if ext.eq_ignore_ascii_case("mp3") => Ok(Container::Mp3),
            Some(ext) => Err(EngineError::UnsupportedFormat(ext.to_string())),
            None => Err(EngineError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
        }
    }
}

fn ensure_wav(path: &Path) -> Result<()> {
    match Container::from_path(path)? {
        Container::Wav => Ok(()),
        Container::Mp3 => Err(EngineError::UnsupportedFormat("mp3 (decode only)".into())),
    }
}

pub fn decode_file(path: &Path) -> Result<SampleBuffer> {
    let buf = match Container::from_path(path)? {
        Container::Wav => decode_wav(hound::WavReader::open(path)?)?,
        Container::Mp3 => decode_mp3(std::fs::File::open(path)?)?,
    };
    debug!(path = %path.display(), len = buf.len(), rate = buf.sample_rate(), "decoded");
    Ok(buf)
}

pub fn decode_reader<R: Read>(reader: R) -> Result<SampleBuffer> {
    decode_wav(hound::WavReader::new(reader)?)
}

fn decode_wav<R: Read>(mut reader: hound::WavReader<R>) -> Result<SampleBuffer> {
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };
    if spec.channels > 1 {
        info!(channels = spec.channels, "downmixing wav to mono");
    }
    let samples = downmix(interleaved, spec.channels as usize);
    Ok(SampleBuffer::new(samples, spec.sample_rate)?)
}

/// Decode an MP3 stream. The rate of the first frame is taken as the rate
/// of the whole stream.
pub fn decode_mp3<R: Read>(reader: R) -> Result<SampleBuffer> {
    let mut decoder = minimp3::Decoder::new(reader);
    let mut samples = Vec::new();
    let mut rate: Option<u32> = None;
    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let frame_rate = frame.sample_rate as u32;
                match rate {
                    None => {
                        if frame.channels > 1 {
                            info!(channels = frame.channels, "downmixing mp3 to mono");
                        }
                        rate = Some(frame_rate);
                    }
                    Some(r) if r != frame_rate => {
                        warn!(expected = r, found = frame_rate, "mp3 frame rate changed mid-stream");
                    }
                    Some(_) => {}
                }
                let pcm = frame.data.iter().map(|&s| s as f32 / 32768.0).collect();
                samples.extend(downmix(pcm, frame.channels));
            }
            Err(minimp3::Error::SkippedData) => continue,
            Err(minimp3::Error::Eof) | Err(minimp3::Error::InsufficientData) => break,
            Err(e) => return Err(e.into()),
        }
    }
    let rate = rate.ok_or(CodecError::NoFrames)?;
    Ok(SampleBuffer::new(samples, rate)?)
}

/// Average each interleaved frame into one mono sample.
pub fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub fn encode_file(path: &Path, buffer: &SampleBuffer, format: SampleFormat) -> Result<()> {
    ensure_wav(path)?;
    let writer = hound::WavWriter::create(path, wav_spec(buffer, format))?;
    write_samples(writer, buffer, format)?;
    debug!(path = %path.display(), len = buffer.len(), ?format, "encoded");
    Ok(())
}

pub fn encode_writer<W: Write + Seek>(out: W, buffer: &SampleBuffer, format: SampleFormat) -> Result<()> {
    let writer = hound::WavWriter::new(out, wav_spec(buffer, format))?;
    write_samples(writer, buffer, format)
}

fn wav_spec(buffer: &SampleBuffer, format: SampleFormat) -> hound::WavSpec {
    let (bits_per_sample, sample_format) = match format {
        SampleFormat::Pcm16 => (16, hound::SampleFormat::Int),
        SampleFormat::Float32 => (32, hound::SampleFormat::Float),
    };
    hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format,
    }
}

fn write_samples<W: Write + Seek>(
    mut writer: hound::WavWriter<W>,
    buffer: &SampleBuffer,
    format: SampleFormat,
) -> Result<()> {
    match format {
        SampleFormat::Pcm16 => {
            for &s in buffer.samples() {
                writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
            }
        }
        SampleFormat::Float32 => {
            for &s in buffer.samples() {
                writer.write_sample(s)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(buffer: &SampleBuffer, format: SampleFormat) -> Vec<u8> {
        let mut cur = Cursor::new(Vec::new());
        encode_writer(&mut cur, buffer, format).unwrap();
        cur.into_inner()
    }

    #[test]
    fn float_wav_is_lossless() {
        let input = SampleBuffer::new(vec![0.0, 0.5, -0.25, 1.5, -2.0], 22050).unwrap();
        let back = decode_reader(Cursor::new(encoded(&input, SampleFormat::Float32))).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn pcm16_clips_and_quantizes() {
        let input = SampleBuffer::new(vec![0.5, -0.5, 3.0, -3.0], 44100).unwrap();
        let back = decode_reader(Cursor::new(encoded(&input, SampleFormat::Pcm16))).unwrap();
        assert_eq!(back.sample_rate(), 44100);
        let s = back.samples();
        assert!((s[0] - 0.5).abs() < 1e-4);
        assert!((s[1] + 0.5).abs() < 1e-4);
        assert!((s[2] - 1.0).abs() < 1e-4);
        assert!((s[3] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn stereo_is_averaged() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cur = Cursor::new(Vec::new());
        {
            let mut w = hound::WavWriter::new(&mut cur, spec).unwrap();
            for s in [1.0f32, 0.0, 0.5, -0.5, -1.0, -0.5] {
                w.write_sample(s).unwrap();
            }
            w.finalize().unwrap();
        }
        cur.set_position(0);
        let mono = decode_reader(cur).unwrap();
        assert_eq!(mono.samples(), &[0.5, 0.0, -0.75]);
        assert_eq!(mono.sample_rate(), 8000);
    }

    #[test]
    fn empty_buffer_encodes() {
        let input = SampleBuffer::new(Vec::new(), 16000).unwrap();
        let back = decode_reader(Cursor::new(encoded(&input, SampleFormat::Pcm16))).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn rejects_non_wav_paths() {
        let buf = SampleBuffer::silence(4, 8000).unwrap();
        for p in ["out.ogg", "out.FLAC", "out"] {
            assert!(matches!(
                encode_file(Path::new(p), &buf, SampleFormat::Pcm16),
                Err(EngineError::UnsupportedFormat(_))
            ));
        }
        assert!(matches!(
            decode_file(Path::new("in.ogg")),
            Err(EngineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn mp3_is_decoded_by_extension_but_not_encoded() {
        assert_eq!(Container::from_path(Path::new("a/b.MP3")).unwrap(), Container::Mp3);
        assert_eq!(Container::from_path(Path::new("take.wav")).unwrap(), Container::Wav);
        // Reaches the filesystem rather than being rejected by extension.
        assert!(matches!(
            decode_file(Path::new("/nonexistent/vox/take.mp3")),
            Err(EngineError::Io(_))
        ));
        let buf = SampleBuffer::silence(4, 8000).unwrap();
        assert!(matches!(
            encode_file(Path::new("out.mp3"), &buf, SampleFormat::Pcm16),
            Err(EngineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn mp3_without_frames_is_a_codec_error() {
        let res = decode_mp3(Cursor::new(vec![0u8; 64]));
        assert!(matches!(res, Err(EngineError::Codec(_))));
        let res = decode_mp3(Cursor::new(Vec::new()));
        assert!(matches!(res, Err(EngineError::Codec(CodecError::NoFrames))));
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let res = decode_reader(Cursor::new(b"not a wav file at all".to_vec()));
        assert!(matches!(res, Err(EngineError::Codec(_))));
    }
}
