use crate::core::error::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

/// Sample rate of the narration PCM returned by the speech model.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const BYTES_PER_FRAME: usize = 2;

/// Decoded mono audio, normalized to [-1.0, 1.0].
///
/// Samples are shared, so clones are cheap and never copy audio data.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        1
    }

    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Decodes base64 raw PCM (signed 16-bit little-endian, mono) into a buffer.
pub fn decode_pcm(base64_pcm: &str, sample_rate: u32) -> Result<AudioBuffer, DecodeError> {
    if sample_rate == 0 {
        return Err(DecodeError::ZeroSampleRate);
    }
    let bytes = STANDARD.decode(base64_pcm.trim())?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() % BYTES_PER_FRAME != 0 {
        return Err(DecodeError::PartialFrame(bytes.len()));
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(BYTES_PER_FRAME)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    log::debug!(
        "Decoded {} PCM frames at {} Hz",
        samples.len(),
        sample_rate
    );
    Ok(AudioBuffer::new(samples, sample_rate))
}
