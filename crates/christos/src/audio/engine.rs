//! Speech playback engine
//!
//! Runs playback on a dedicated thread, accepting commands via crossbeam
//! channels and emitting events back. Each utterance is identified by a
//! caller-supplied token; `Finished { token }` fires exactly once when the
//! utterance drains naturally, and never when it is stopped or preempted.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use rodio::{DeviceSinkBuilder, Player};

use crate::error::ChristosError;

use super::types::{AudioCommand, AudioEvent, PcmBuffer, PcmSource};

/// Poll interval for end-of-utterance detection
const TICK: Duration = Duration::from_millis(100);

/// Speech engine that manages playback on a dedicated thread
pub struct SpeechEngine {
    cmd_tx: Sender<AudioCommand>,
    event_rx: Receiver<AudioEvent>,
    thread: Option<JoinHandle<()>>,
}

impl SpeechEngine {
    /// Create a new engine, spawning the engine thread.
    ///
    /// Blocks until the audio output stream is initialized (or fails).
    pub fn new() -> Result<Self, ChristosError> {
        let (cmd_tx, cmd_rx) = bounded::<AudioCommand>(16);
        let (event_tx, event_rx) = bounded::<AudioEvent>(64);
        let (init_tx, init_rx) = bounded::<Result<(), String>>(1);

        let thread = thread::Builder::new()
            .name("speech-engine".to_string())
            .spawn(move || {
                Self::run(cmd_rx, event_tx, init_tx);
            })
            .map_err(|e| ChristosError::Audio(format!("Failed to spawn audio thread: {}", e)))?;

        let init_result = init_rx
            .recv()
            .map_err(|_| ChristosError::Audio("Audio thread terminated during init".to_string()))?;

        init_result.map_err(ChristosError::Audio)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    /// Send a command to the engine
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// Play a buffer, preempting any current utterance
    pub fn play(&self, buffer: PcmBuffer, token: u64) {
        self.send(AudioCommand::Play { buffer, token });
    }

    /// Stop playback (no `Finished` is emitted for the cut utterance)
    pub fn stop(&self) {
        self.send(AudioCommand::Stop);
    }

    /// Set volume (clamped to 0.0..=2.0)
    pub fn set_volume(&self, volume: f32) {
        self.send(AudioCommand::SetVolume(volume));
    }

    /// Non-blocking poll for the next event
    pub fn try_recv_event(&self) -> Option<AudioEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Get a reference to the event receiver for use with `select!`
    pub fn event_receiver(&self) -> &Receiver<AudioEvent> {
        &self.event_rx
    }

    /// Graceful shutdown (consumes self)
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// The engine's main loop, running on the dedicated thread
    fn run(
        cmd_rx: Receiver<AudioCommand>,
        event_tx: Sender<AudioEvent>,
        init_tx: Sender<Result<(), String>>,
    ) {
        // Create audio output on this thread (cpal streams may be !Send)
        let mut stream = match DeviceSinkBuilder::open_default_sink() {
            Ok(s) => s,
            Err(e) => {
                let _ = init_tx.send(Err(format!("Failed to open audio output: {}", e)));
                return;
            }
        };
        stream.log_on_drop(false);

        // `stream` must be declared before `sink` so Rust drops sink first
        let sink = Player::connect_new(stream.mixer());

        let _ = init_tx.send(Ok(()));

        let mut current_volume: f32 = 1.0;
        // Token of the utterance currently in the sink, if any
        let mut current: Option<u64> = None;

        loop {
            match cmd_rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCommand::Play { buffer, token } => {
                        // Preempt: the old utterance is cut and its token
                        // will never receive a Finished event.
                        sink.stop();
                        let spec = buffer.spec();
                        sink.append(PcmSource::new(buffer));
                        sink.set_volume(current_volume);
                        sink.play();
                        current = Some(token);
                        let _ = event_tx.send(AudioEvent::Started { token, spec });
                    }
                    AudioCommand::Stop => {
                        sink.stop();
                        if current.take().is_some() {
                            let _ = event_tx.send(AudioEvent::Stopped);
                        }
                    }
                    AudioCommand::SetVolume(vol) => {
                        current_volume = vol.clamp(0.0, 2.0);
                        sink.set_volume(current_volume);
                    }
                    AudioCommand::Shutdown => {
                        sink.stop();
                        break;
                    }
                },
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    // Natural end of the current utterance
                    if let Some(token) = current {
                        if sink.empty() {
                            current = None;
                            let _ = event_tx.send(AudioEvent::Finished { token });
                        }
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }
    }
}

impl Drop for SpeechEngine {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::types::AudioSpec;

    /// A short silent mono utterance (50ms at 24 kHz)
    fn short_buffer() -> PcmBuffer {
        PcmBuffer::new(vec![vec![0.0; 1200]], 24_000)
    }

    /// A longer silent mono utterance (2s at 24 kHz)
    fn long_buffer() -> PcmBuffer {
        PcmBuffer::new(vec![vec![0.0; 48_000]], 24_000)
    }

    /// Helper: wait for the next event within a timeout
    fn wait_for_event(engine: &SpeechEngine, timeout_ms: u64) -> Option<AudioEvent> {
        engine
            .event_receiver()
            .recv_timeout(Duration::from_millis(timeout_ms))
            .ok()
    }

    /// Helper: try to create an engine; return None if audio hardware is unavailable
    fn try_engine() -> Option<SpeechEngine> {
        SpeechEngine::new().ok()
    }

    // --- Lifecycle ---

    #[test]
    fn create_and_shutdown() {
        let Some(engine) = try_engine() else { return };
        engine.shutdown();
    }

    #[test]
    fn drop_triggers_shutdown() {
        let Some(engine) = try_engine() else { return };
        drop(engine);
        // If we get here without hanging, shutdown worked
    }

    #[test]
    fn create_multiple_engines_sequentially() {
        for _ in 0..3 {
            let Some(engine) = try_engine() else { return };
            engine.shutdown();
        }
    }

    // --- Play / Finished ---

    #[test]
    fn play_emits_started_with_spec() {
        let Some(engine) = try_engine() else { return };

        engine.play(short_buffer(), 1);

        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Started { token, spec }) => {
                assert_eq!(token, 1);
                assert_eq!(spec, AudioSpec::speech());
            }
            other => panic!("Expected Started event, got {:?}", other),
        }

        engine.shutdown();
    }

    #[test]
    fn short_utterance_finishes_naturally() {
        let Some(engine) = try_engine() else { return };

        engine.play(short_buffer(), 42);

        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Started { token: 42, .. }) => {}
            other => panic!("Expected Started, got {:?}", other),
        }

        match wait_for_event(&engine, 3000) {
            Some(AudioEvent::Finished { token }) => assert_eq!(token, 42),
            other => panic!("Expected Finished, got {:?}", other),
        }

        engine.shutdown();
    }

    #[test]
    fn finished_fires_once() {
        let Some(engine) = try_engine() else { return };

        engine.play(short_buffer(), 5);
        let _ = wait_for_event(&engine, 2000); // Started
        match wait_for_event(&engine, 3000) {
            Some(AudioEvent::Finished { token: 5 }) => {}
            other => panic!("Expected Finished, got {:?}", other),
        }

        // No further events after the single completion
        std::thread::sleep(Duration::from_millis(400));
        assert!(engine.try_recv_event().is_none());

        engine.shutdown();
    }

    #[test]
    fn empty_buffer_finishes_immediately() {
        let Some(engine) = try_engine() else { return };

        engine.play(PcmBuffer::new(vec![vec![]], 24_000), 9);
        let _ = wait_for_event(&engine, 2000); // Started

        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Finished { token: 9 }) => {}
            other => panic!("Expected Finished for empty buffer, got {:?}", other),
        }

        engine.shutdown();
    }

    // --- Stop / preemption ---

    #[test]
    fn stop_emits_stopped_not_finished() {
        let Some(engine) = try_engine() else { return };

        engine.play(long_buffer(), 1);
        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Started { .. }) => {}
            other => panic!("Expected Started, got {:?}", other),
        }

        engine.stop();
        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Stopped) => {}
            other => panic!("Expected Stopped, got {:?}", other),
        }

        // The cut utterance must not also report completion
        std::thread::sleep(Duration::from_millis(400));
        assert!(engine.try_recv_event().is_none());

        engine.shutdown();
    }

    #[test]
    fn stop_when_idle_emits_nothing() {
        let Some(engine) = try_engine() else { return };

        engine.stop();
        std::thread::sleep(Duration::from_millis(300));
        assert!(engine.try_recv_event().is_none());

        engine.shutdown();
    }

    #[test]
    fn play_preempts_without_finishing_old_token() {
        let Some(engine) = try_engine() else { return };

        engine.play(long_buffer(), 1);
        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Started { token: 1, .. }) => {}
            other => panic!("Expected Started(1), got {:?}", other),
        }

        engine.play(short_buffer(), 2);
        match wait_for_event(&engine, 2000) {
            Some(AudioEvent::Started { token: 2, .. }) => {}
            other => panic!("Expected Started(2), got {:?}", other),
        }

        // Only the second utterance completes
        match wait_for_event(&engine, 3000) {
            Some(AudioEvent::Finished { token }) => assert_eq!(token, 2),
            other => panic!("Expected Finished(2), got {:?}", other),
        }

        engine.shutdown();
    }

    // --- Volume ---

    #[test]
    fn set_volume_does_not_crash() {
        let Some(engine) = try_engine() else { return };
        engine.set_volume(0.5);
        engine.set_volume(0.0);
        engine.set_volume(5.0); // clamped to 2.0
        engine.set_volume(-1.0); // clamped to 0.0
        engine.shutdown();
    }

    #[test]
    fn set_volume_during_playback() {
        let Some(engine) = try_engine() else { return };

        engine.play(short_buffer(), 1);
        let _ = wait_for_event(&engine, 2000);
        engine.set_volume(0.2);
        engine.set_volume(1.0);

        engine.shutdown();
    }

    // --- Raw send ---

    #[test]
    fn send_raw_shutdown_command() {
        let Some(engine) = try_engine() else { return };

        engine.send(AudioCommand::Shutdown);
        std::thread::sleep(Duration::from_millis(200));
        drop(engine);
    }

    // --- Sequential utterances ---

    #[test]
    fn sequential_utterances_each_complete() {
        let Some(engine) = try_engine() else { return };

        for token in 10..13 {
            engine.play(short_buffer(), token);
            match wait_for_event(&engine, 2000) {
                Some(AudioEvent::Started { token: t, .. }) => assert_eq!(t, token),
                other => panic!("Expected Started({}), got {:?}", token, other),
            }
            match wait_for_event(&engine, 3000) {
                Some(AudioEvent::Finished { token: t }) => assert_eq!(t, token),
                other => panic!("Expected Finished({}), got {:?}", token, other),
            }
        }

        engine.shutdown();
    }
}
