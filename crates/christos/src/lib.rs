//! Christos — Speech Audio Engine
//!
//! Raw PCM decoding and speech playback.
//!
//! ## Quick start
//!
//! ```no_run
//! use christos::audio::pcm::{decode_payload, to_pcm_buffer};
//! use christos::audio::SpeechEngine;
//! ```

pub mod audio;
pub mod config;
pub mod error;
