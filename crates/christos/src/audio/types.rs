//! Shared audio types
//!
//! Pure data types used across the audio subsystem.

use std::fmt;
use std::time::Duration;

use rodio::{ChannelCount, SampleRate, Source};

use crate::config::speech;

/// Sample format of a raw PCM payload
///
/// Supplied by the caller per decode; for synthesized speech it is fixed by
/// the service contract (see [`AudioSpec::speech`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioSpec {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// The fixed format of synthesized speech (24 kHz, mono)
    pub fn speech() -> Self {
        Self {
            sample_rate: speech::SAMPLE_RATE,
            channels: speech::CHANNELS,
        }
    }

    /// Size of one interleaved frame in bytes (16-bit samples)
    pub fn frame_bytes(&self) -> usize {
        2 * self.channels as usize
    }
}

impl fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel_str = if self.channels == 1 { "Mono" } else { "Stereo" };
        write!(f, "{} Hz · {}", self.sample_rate, channel_str)
    }
}

/// A normalized multi-channel sample buffer
///
/// One ordered f32 sequence per channel, every value in [-1.0, 1.0), at a
/// fixed sample rate. Owned by the caller; playback consumes it by value.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Build a buffer from per-channel sample sequences.
    ///
    /// All channels must have equal length; the decoder guarantees this.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(
            channels.windows(2).all(|w| w[0].len() == w[1].len()),
            "channel lengths must match"
        );
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Samples of a single channel
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Playback duration at the buffer's sample rate
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// The spec this buffer was decoded with
    pub fn spec(&self) -> AudioSpec {
        AudioSpec::new(self.sample_rate, self.channel_count())
    }
}

/// A playable source over a [`PcmBuffer`]
///
/// Re-interleaves the per-channel sequences frame by frame, which is the
/// sample order rodio expects.
pub struct PcmSource {
    buffer: PcmBuffer,
    position: usize,
}

impl PcmSource {
    pub fn new(buffer: PcmBuffer) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }
}

impl Iterator for PcmSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let channels = self.buffer.channel_count() as usize;
        if channels == 0 {
            return None;
        }
        let frame = self.position / channels;
        if frame >= self.buffer.frame_count() {
            return None;
        }
        let channel = self.position % channels;
        self.position += 1;
        Some(self.buffer.channel(channel)[frame])
    }
}

impl Source for PcmSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        ChannelCount::new(self.buffer.channel_count().max(1)).unwrap_or(ChannelCount::MIN)
    }

    fn sample_rate(&self) -> SampleRate {
        SampleRate::new(self.buffer.sample_rate()).unwrap_or(SampleRate::MIN)
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.buffer.duration())
    }
}

/// Commands sent to the speech engine
pub enum AudioCommand {
    /// Start playing a buffer, preempting any current utterance
    Play { buffer: PcmBuffer, token: u64 },
    /// Stop playback without emitting a completion
    Stop,
    /// Set volume (0.0..=2.0)
    SetVolume(f32),
    /// Shut down the engine thread
    Shutdown,
}

impl fmt::Debug for AudioCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCommand::Play { buffer, token } => f
                .debug_struct("Play")
                .field("token", token)
                .field("frames", &buffer.frame_count())
                .finish(),
            AudioCommand::Stop => write!(f, "Stop"),
            AudioCommand::SetVolume(v) => write!(f, "SetVolume({})", v),
            AudioCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Events emitted by the speech engine
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// Playback of an utterance started
    Started { token: u64, spec: AudioSpec },
    /// An utterance played to its natural end.
    ///
    /// Emitted exactly once per token, and never for utterances that were
    /// stopped or preempted before draining.
    Finished { token: u64 },
    /// Playback was stopped explicitly
    Stopped,
    /// An error occurred
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- AudioSpec ---

    #[test]
    fn speech_spec_matches_contract() {
        let spec = AudioSpec::speech();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
    }

    #[test]
    fn spec_display() {
        assert_eq!(AudioSpec::new(24_000, 1).to_string(), "24000 Hz · Mono");
        assert_eq!(AudioSpec::new(44_100, 2).to_string(), "44100 Hz · Stereo");
    }

    #[test]
    fn frame_bytes() {
        assert_eq!(AudioSpec::new(24_000, 1).frame_bytes(), 2);
        assert_eq!(AudioSpec::new(24_000, 2).frame_bytes(), 4);
    }

    // --- PcmBuffer ---

    #[test]
    fn empty_buffer() {
        let buf = PcmBuffer::new(vec![vec![]], 24_000);
        assert!(buf.is_empty());
        assert_eq!(buf.frame_count(), 0);
        assert_eq!(buf.duration(), Duration::ZERO);
    }

    #[test]
    fn buffer_shape() {
        let buf = PcmBuffer::new(vec![vec![0.0, 0.5], vec![0.1, -0.5]], 48_000);
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frame_count(), 2);
        assert_eq!(buf.sample_rate(), 48_000);
        assert_eq!(buf.channel(1), &[0.1, -0.5]);
    }

    #[test]
    fn buffer_duration() {
        let buf = PcmBuffer::new(vec![vec![0.0; 24_000]], 24_000);
        assert_eq!(buf.duration(), Duration::from_secs(1));
    }

    #[test]
    fn buffer_duration_zero_rate_does_not_panic() {
        let buf = PcmBuffer::new(vec![vec![0.0; 10]], 0);
        assert_eq!(buf.duration(), Duration::ZERO);
    }

    #[test]
    fn buffer_spec_round_trip() {
        let buf = PcmBuffer::new(vec![vec![0.0], vec![0.0]], 24_000);
        assert_eq!(buf.spec(), AudioSpec::new(24_000, 2));
    }

    // --- PcmSource ---

    #[test]
    fn source_interleaves_frame_major() {
        let buf = PcmBuffer::new(vec![vec![0.1, 0.2], vec![-0.1, -0.2]], 24_000);
        let samples: Vec<f32> = PcmSource::new(buf).collect();
        assert_eq!(samples, vec![0.1, -0.1, 0.2, -0.2]);
    }

    #[test]
    fn source_mono_passthrough() {
        let buf = PcmBuffer::new(vec![vec![0.25, 0.5, 0.75]], 24_000);
        let samples: Vec<f32> = PcmSource::new(buf).collect();
        assert_eq!(samples, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn source_exhaustion_is_stable() {
        let buf = PcmBuffer::new(vec![vec![0.0]], 24_000);
        let mut source = PcmSource::new(buf);
        assert!(source.next().is_some());
        assert!(source.next().is_none());
        assert!(source.next().is_none());
    }

    #[test]
    fn source_empty_buffer_yields_nothing() {
        let buf = PcmBuffer::new(vec![vec![]], 24_000);
        assert_eq!(PcmSource::new(buf).count(), 0);
    }

    #[test]
    fn source_reports_format() {
        let buf = PcmBuffer::new(vec![vec![0.0; 100], vec![0.0; 100]], 44_100);
        let source = PcmSource::new(buf);
        assert_eq!(source.channels(), ChannelCount::new(2).unwrap());
        assert_eq!(source.sample_rate(), SampleRate::new(44_100).unwrap());
        assert!(source.current_span_len().is_none());
        assert!(source.total_duration().is_some());
    }

    // --- AudioCommand / AudioEvent ---

    #[test]
    fn command_debug_omits_samples() {
        let cmd = AudioCommand::Play {
            buffer: PcmBuffer::new(vec![vec![0.0; 512]], 24_000),
            token: 7,
        };
        let debug = format!("{:?}", cmd);
        assert!(debug.contains("token: 7"));
        assert!(debug.contains("frames: 512"));

        assert_eq!(format!("{:?}", AudioCommand::Stop), "Stop");
        assert_eq!(format!("{:?}", AudioCommand::SetVolume(0.5)), "SetVolume(0.5)");
        assert_eq!(format!("{:?}", AudioCommand::Shutdown), "Shutdown");
    }

    #[test]
    fn event_equality() {
        assert_eq!(
            AudioEvent::Finished { token: 3 },
            AudioEvent::Finished { token: 3 }
        );
        assert_ne!(
            AudioEvent::Finished { token: 3 },
            AudioEvent::Finished { token: 4 }
        );
    }

    #[test]
    fn event_clone() {
        let evt = AudioEvent::Started {
            token: 1,
            spec: AudioSpec::speech(),
        };
        assert_eq!(evt.clone(), evt);
    }
}
