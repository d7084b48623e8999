//! Deterministic mono WAV encoding.
//!
//! Output is 16-bit PCM with a bare 44-byte header: no timestamps, no LIST
//! chunk, so identical samples always give identical bytes. The BLAKE3 hash
//! of the PCM payload identifies a rendered track across re-runs.

use std::io::{self, Write};

use crate::buffer::AudioBuffer;

const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = BITS_PER_SAMPLE / 8;
const HEADER_LEN: usize = 44;

/// An encoded WAV file and its identity.
#[derive(Debug, Clone)]
pub struct EncodedWav {
    /// Complete file bytes.
    pub bytes: Vec<u8>,
    /// BLAKE3 hash of the PCM payload only.
    pub pcm_hash: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
}

impl EncodedWav {
    /// Encodes a mono buffer.
    pub fn from_buffer(buffer: &AudioBuffer) -> io::Result<Self> {
        let pcm = pcm16_bytes(buffer.samples());
        let pcm_hash = blake3::hash(&pcm).to_hex().to_string();

        let mut bytes = Vec::with_capacity(HEADER_LEN + pcm.len());
        write_mono_wav(&mut bytes, buffer.sample_rate(), &pcm)?;

        Ok(Self {
            bytes,
            pcm_hash,
            sample_rate: buffer.sample_rate(),
            num_samples: buffer.len(),
        })
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples as f64 / self.sample_rate as f64
    }
}

/// Writes a mono 16-bit RIFF/WAVE stream around `pcm`.
pub fn write_mono_wav<W: Write>(writer: &mut W, sample_rate: u32, pcm: &[u8]) -> io::Result<()> {
    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "PCM payload too large for WAV"))?;
    let byte_rate = sample_rate.saturating_mul(u32::from(BLOCK_ALIGN));

    writer.write_all(b"RIFF")?;
    writer.write_all(&(36 + data_len).to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM
    writer.write_all(&1u16.to_le_bytes())?; // mono
    writer.write_all(&sample_rate.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    writer.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    writer.write_all(b"data")?;
    writer.write_all(&data_len.to_le_bytes())?;
    writer.write_all(pcm)
}

/// Little-endian 16-bit PCM. Samples are clamped to [-1, 1]; NaN and
/// infinities become zero.
pub fn pcm16_bytes(samples: &[f64]) -> Vec<u8> {
    samples
        .iter()
        .map(|&s| if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 })
        .flat_map(|s| ((s * i16::MAX as f64).round() as i16).to_le_bytes())
        .collect()
}
