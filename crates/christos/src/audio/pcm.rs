//! Raw PCM decoding
//!
//! Converts the base64 payload returned by the speech synthesis service into
//! a normalized multi-channel sample buffer ready for playback. The wire
//! format is raw signed 16-bit little-endian PCM, interleaved by channel,
//! with no container or header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{ChristosError, Result};

use super::types::{AudioSpec, PcmBuffer};

/// Decode a base64 speech payload into raw PCM bytes.
///
/// Input must use the standard base64 alphabet (padding accepted). Anything
/// else fails with [`ChristosError::Decode`] rather than being passed along
/// to the sample interpreter.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload)
        .map_err(|e| ChristosError::Decode(format!("Invalid base64 payload: {}", e)))
}

/// Interpret raw bytes as interleaved s16le samples and normalize to f32.
///
/// The byte length must be an exact multiple of one frame
/// (`2 * spec.channels` bytes); trailing partial frames are a
/// [`ChristosError::Format`], never silently truncated.
///
/// Each integer sample is divided by 32768.0, so output values lie in
/// [-1.0, 32767/32768]. The divisor is 32768 (not 32767) to match the
/// synthesis service's own reference decoder bit-for-bit.
pub fn to_pcm_buffer(bytes: &[u8], spec: AudioSpec) -> Result<PcmBuffer> {
    if spec.channels == 0 {
        return Err(ChristosError::Format(
            "Channel count must be at least 1".to_string(),
        ));
    }

    let frame_bytes = 2 * spec.channels as usize;
    if bytes.len() % frame_bytes != 0 {
        return Err(ChristosError::Format(format!(
            "PCM byte length {} is not a multiple of the {}-byte frame ({} channels, 16-bit)",
            bytes.len(),
            frame_bytes,
            spec.channels
        )));
    }

    let frame_count = bytes.len() / frame_bytes;
    let mut channels: Vec<Vec<f32>> = (0..spec.channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in bytes.chunks_exact(frame_bytes) {
        for (ch, sample) in frame.chunks_exact(2).enumerate() {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            channels[ch].push(value as f32 / 32768.0);
        }
    }

    Ok(PcmBuffer::new(channels, spec.sample_rate))
}

/// Decode a base64 payload straight to a normalized buffer.
///
/// Convenience composition of [`decode_payload`] and [`to_pcm_buffer`].
pub fn decode_to_buffer(payload: &str, spec: AudioSpec) -> Result<PcmBuffer> {
    let bytes = decode_payload(payload)?;
    to_pcm_buffer(&bytes, spec)
}
