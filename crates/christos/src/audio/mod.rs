//! Audio subsystem
//!
//! Raw PCM decoding and speech playback.

pub mod engine;
pub mod pcm;
pub mod types;

pub use engine::SpeechEngine;
pub use pcm::{decode_payload, decode_to_buffer, to_pcm_buffer};
pub use types::{AudioCommand, AudioEvent, AudioSpec, PcmBuffer, PcmSource};
