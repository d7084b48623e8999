//! Audio file decoding and encoding.
//!
//! `.wav` is read with `hound`, `.mp3` with `symphonia`. Multi-channel input
//! is downmixed to mono. Output is always 16-bit mono WAV.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::buffer::AudioBuffer;
use crate::error::{VocalSwapError, VocalSwapResult};
use crate::wav::EncodedWav;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// RIFF/WAVE.
    Wav,
    /// MPEG layer III.
    Mp3,
}

impl AudioFormat {
    /// Detects the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> VocalSwapResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            _ => Err(VocalSwapError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

/// Decodes an audio file into a mono buffer at its native sample rate.
///
/// # Errors
/// [`VocalSwapError::UnsupportedFormat`] for unknown extensions,
/// [`VocalSwapError::MissingAsset`] when the file does not exist and
/// [`VocalSwapError::Decode`] when the content cannot be parsed.
pub fn decode(path: &Path) -> VocalSwapResult<AudioBuffer> {
    let format = AudioFormat::from_path(path)?;
    if !path.is_file() {
        return Err(VocalSwapError::missing_asset(path));
    }

    let buffer = match format {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_with_symphonia(path, format)?,
    };

    debug!(
        path = %path.display(),
        sample_rate = buffer.sample_rate(),
        seconds = buffer.duration_seconds(),
        "decoded audio"
    );
    Ok(buffer)
}

/// Encodes `buffer` to `path` as 16-bit mono WAV, creating parent
/// directories.
///
/// # Errors
/// [`VocalSwapError::UnsupportedFormat`] for anything but `.wav`; MP3 output
/// has no encoder.
pub fn encode(buffer: &AudioBuffer, path: &Path) -> VocalSwapResult<EncodedWav> {
    match AudioFormat::from_path(path)? {
        AudioFormat::Wav => {}
        AudioFormat::Mp3 => {
            return Err(VocalSwapError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: "mp3".to_string(),
            })
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let result = EncodedWav::from_buffer(buffer)?;
    std::fs::write(path, &result.bytes)?;
    debug!(path = %path.display(), samples = result.num_samples, "encoded WAV");
    Ok(result)
}

fn decode_wav(path: &Path) -> VocalSwapResult<AudioBuffer> {
    let reader = hound::WavReader::open(path).map_err(|e| decode_error(path, e))?;
    let spec = reader.spec();

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| decode_error(path, e))?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|e| decode_error(path, e))?,
    };

    Ok(AudioBuffer::from_interleaved(
        &interleaved,
        spec.channels,
        spec.sample_rate,
    ))
}

fn decode_with_symphonia(path: &Path, format: AudioFormat) -> VocalSwapResult<AudioBuffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(path, e))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| VocalSwapError::decode(path, "no audio track found"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(path, e))?;

    let mut interleaved: Vec<f64> = Vec::new();
    let mut channels: u16 = 1;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decode_error(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!(path = %path.display(), error = msg, "skipping corrupt packet");
                continue;
            }
            Err(e) => return Err(decode_error(path, e)),
        };

        let spec = *decoded.spec();
        channels = spec.channels.count() as u16;
        sample_rate.get_or_insert(spec.rate);

        let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        samples.copy_interleaved_ref(decoded);
        interleaved.extend(samples.samples().iter().map(|&s| f64::from(s)));
    }

    let sample_rate =
        sample_rate.ok_or_else(|| VocalSwapError::decode(path, "sample rate not specified"))?;

    Ok(AudioBuffer::from_interleaved(
        &interleaved,
        channels,
        sample_rate,
    ))
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> VocalSwapError {
    VocalSwapError::decode(PathBuf::from(path), err.to_string())
}
