//! Application controller
//!
//! Owns the speech engine, bookmark store, and providers, and processes
//! commands from all frontends through a single crossbeam channel. All
//! snapshot mutation happens here; persistence runs as an explicit side
//! effect after each mutation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use christos::audio::pcm::decode_to_buffer;
use christos::audio::types::{AudioEvent, AudioSpec};
use christos::audio::SpeechEngine;

use crate::data::{BookmarkStore, Settings};
use crate::providers::gemini::GeminiClient;
use crate::providers::traits::ScriptureProvider;

use super::state::{AppCommand, AppSnapshot, SpeechPhase};

/// Poll interval of the controller loop
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct AppController {
    cmd_rx: Receiver<AppCommand>,
    cmd_tx: Sender<AppCommand>,
    shared_state: Arc<Mutex<AppSnapshot>>,
    engine: Option<SpeechEngine>,
    scripture: Arc<dyn ScriptureProvider>,
    gemini: GeminiClient,
    bookmarks: BookmarkStore,
    settings: Settings,
    /// Overrides the default bookmarks file location (used by tests)
    bookmarks_path: Option<PathBuf>,
    /// Monotonically increasing counter to discard stale chapter loads
    load_generation: u64,
    /// Next utterance token handed to the engine
    next_token: u64,
    /// Utterances currently in the engine, token -> reference
    utterances: HashMap<u64, String>,
}

impl AppController {
    pub fn new(
        cmd_rx: Receiver<AppCommand>,
        cmd_tx: Sender<AppCommand>,
        shared_state: Arc<Mutex<AppSnapshot>>,
        scripture: Arc<dyn ScriptureProvider>,
        gemini: GeminiClient,
    ) -> Self {
        Self {
            cmd_rx,
            cmd_tx,
            shared_state,
            engine: None,
            scripture,
            gemini,
            bookmarks: BookmarkStore::new(),
            settings: Settings::default(),
            bookmarks_path: None,
            load_generation: 0,
            next_token: 1,
            utterances: HashMap::new(),
        }
    }

    /// Store bookmarks at a custom path instead of the config directory
    pub fn with_bookmarks_path(mut self, path: PathBuf) -> Self {
        self.bookmarks_path = Some(path);
        self
    }

    /// Run the controller event loop (blocking, call from a dedicated thread)
    pub fn run(&mut self) {
        // The app stays usable as a reader without audio output; speak
        // requests fail with a visible error instead.
        match SpeechEngine::new() {
            Ok(engine) => self.engine = Some(engine),
            Err(e) => eprintln!("Audio output unavailable: {e}"),
        }

        self.settings = Settings::load().unwrap_or_else(|e| {
            eprintln!("Failed to load settings: {e}");
            Settings::default()
        });

        let loaded = match &self.bookmarks_path {
            Some(path) => BookmarkStore::load_from(path),
            None => BookmarkStore::load(),
        };
        self.bookmarks = loaded.unwrap_or_else(|e| {
            eprintln!("Failed to load bookmarks: {e}");
            BookmarkStore::new()
        });

        {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            state.bookmark_count = self.bookmarks.count();
            state.volume = self.settings.volume;
        }
        if let Some(engine) = &self.engine {
            engine.set_volume(self.settings.volume);
        }

        loop {
            match self.cmd_rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }

            self.poll_engine_events();
        }

        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
    }

    /// Handle a single command. Returns true if the loop should exit.
    fn handle_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::Shutdown => return true,

            AppCommand::Navigate(route) => {
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.route = route;
            }
            AppCommand::OpenChapter { book, chapter } => {
                self.start_chapter_load(book, chapter);
            }
            AppCommand::ToggleBookmark { reference, text } => {
                match self.bookmarks.toggle(&reference, &text) {
                    Ok(_) => self.save_bookmarks(),
                    Err(e) => eprintln!("Bookmark toggle failed: {e}"),
                }
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.bookmark_count = self.bookmarks.count();
            }
            AppCommand::Speak { reference, text } => {
                self.start_speech(reference, text);
            }
            AppCommand::StopSpeaking => {
                if let Some(engine) = &self.engine {
                    engine.stop();
                }
            }
            AppCommand::SetVolume(volume) => {
                let volume = volume.clamp(0.0, 2.0);
                if let Some(engine) = &self.engine {
                    engine.set_volume(volume);
                }
                {
                    let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                    state.volume = volume;
                }
                self.settings.volume = volume;
                if let Err(e) = self.settings.save() {
                    eprintln!("Failed to save settings: {e}");
                }
            }
            AppCommand::InternalChapterLoaded { generation, result } => {
                self.handle_chapter_loaded(generation, result);
            }
            AppCommand::InternalSpeechSynthesized { reference, result } => {
                self.handle_speech_synthesized(reference, result);
            }
        }
        false
    }

    /// Fetch the chapter on a worker thread, then send the result back.
    ///
    /// Each call increments `load_generation`; stale results from earlier
    /// calls are discarded in `handle_chapter_loaded`.
    fn start_chapter_load(&mut self, book: String, chapter: u32) {
        self.load_generation += 1;
        let generation = self.load_generation;

        {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            state.book = book.clone();
            state.chapter = chapter;
            state.is_loading = true;
            state.last_error = None;
        }

        let scripture = Arc::clone(&self.scripture);
        let translation = self.settings.translation.clone();
        let cmd_tx = self.cmd_tx.clone();

        std::thread::Builder::new()
            .name("chapter-load".into())
            .spawn(move || {
                let result = scripture
                    .chapter(&book, chapter, Some(&translation))
                    .map_err(|e| e.to_string());
                let _ = cmd_tx.send(AppCommand::InternalChapterLoaded { generation, result });
            })
            .expect("Failed to spawn chapter-load thread");
    }

    /// Handle the loaded chapter — update the reader (or store the error).
    ///
    /// Results with a stale `generation` are silently discarded.
    fn handle_chapter_loaded(
        &mut self,
        generation: u64,
        result: Result<crate::providers::types::Chapter, String>,
    ) {
        if generation != self.load_generation {
            // A newer OpenChapter was issued while this load was in flight.
            return;
        }

        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.is_loading = false;
        match result {
            Ok(chapter) => {
                state.chapter_data = Some(chapter);
                state.last_error = None;
            }
            Err(e) => {
                eprintln!("Chapter load failed: {e}");
                state.chapter_data = None;
                state.last_error = Some(e);
            }
        }
    }

    /// Start synthesis for a verse unless one is already in flight.
    ///
    /// This is the only concurrency guard in the speak path: a second
    /// request for the same reference never issues a second synthesis call.
    fn start_speech(&mut self, reference: String, text: String) {
        {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            if state.speaking.contains_key(&reference) {
                return;
            }
            state
                .speaking
                .insert(reference.clone(), SpeechPhase::Synthesizing);
        }

        let gemini = self.gemini.clone();
        let cmd_tx = self.cmd_tx.clone();

        std::thread::Builder::new()
            .name("speech-synthesize".into())
            .spawn(move || {
                let result = gemini.synthesize(&text).map_err(|e| e.to_string());
                let _ = cmd_tx.send(AppCommand::InternalSpeechSynthesized { reference, result });
            })
            .expect("Failed to spawn speech-synthesize thread");
    }

    /// Handle the synthesis result: decode and hand off to the engine.
    ///
    /// An empty payload is a silent no-op. Decode and format failures clear
    /// the speaking flag and surface as `last_error`.
    fn handle_speech_synthesized(
        &mut self,
        reference: String,
        result: Result<Option<String>, String>,
    ) {
        let payload = match result {
            Err(e) => {
                eprintln!("Speech synthesis failed: {e}");
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.speaking.remove(&reference);
                state.last_error = Some(e);
                return;
            }
            Ok(None) => {
                // The service produced no audio; treated as silence.
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.speaking.remove(&reference);
                return;
            }
            Ok(Some(payload)) => payload,
        };

        {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            state
                .speaking
                .insert(reference.clone(), SpeechPhase::Decoding);
        }

        let buffer = match decode_to_buffer(&payload, AudioSpec::speech()) {
            Ok(buffer) => buffer,
            Err(e) => {
                eprintln!("Speech decode failed: {e}");
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.speaking.remove(&reference);
                state.last_error = Some(e.to_string());
                return;
            }
        };

        let Some(engine) = &self.engine else {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            state.speaking.remove(&reference);
            state.last_error = Some("Audio output is unavailable".to_string());
            return;
        };

        let token = self.next_token;
        self.next_token += 1;

        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        // Playback preempts: tracking of any previous utterance ends here,
        // whether or not the sink has finished with its audio.
        for (_, preempted) in self.utterances.drain() {
            state.speaking.remove(&preempted);
        }
        self.utterances.insert(token, reference.clone());
        state.speaking.insert(reference, SpeechPhase::Playing);
        drop(state);

        engine.play(buffer, token);
    }

    /// Poll speech engine events
    fn poll_engine_events(&mut self) {
        let Some(engine) = &self.engine else { return };

        while let Some(event) = engine.try_recv_event() {
            match event {
                AudioEvent::Started { .. } => {}
                AudioEvent::Finished { token } => {
                    if let Some(reference) = self.utterances.remove(&token) {
                        let mut state =
                            self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                        state.speaking.remove(&reference);
                    }
                }
                AudioEvent::Stopped => {
                    let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                    for (_, reference) in self.utterances.drain() {
                        state.speaking.remove(&reference);
                    }
                }
                AudioEvent::Error(ref e) => {
                    eprintln!("Engine error: {e}");
                    let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                    for (_, reference) in self.utterances.drain() {
                        state.speaking.remove(&reference);
                    }
                    state.last_error = Some(e.clone());
                }
            }
        }
    }

    fn save_bookmarks(&mut self) {
        let result = match &self.bookmarks_path {
            Some(path) => self.bookmarks.save_to(path),
            None => self.bookmarks.save(),
        };
        if let Err(e) = result {
            eprintln!("Failed to save bookmarks: {e}");
        }
    }
}
