//! Christos CLI — scripture reading and devotional companion

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};

use christos::audio::types::AudioEvent;
use christos::audio::{decode_to_buffer, AudioSpec, SpeechEngine};
use christos_app::app::{AppCommand, AppController, AppSnapshot, Route};
use christos_app::config::generative::API_KEY_ENV;
use christos_app::data::{BookmarkStore, Settings};
use christos_app::providers::{
    BibleApiProvider, ChatTurn, Chapter, GeminiClient, ScriptureProvider, BOOKS,
};

#[derive(Parser)]
#[command(name = "christos", about = "Scripture reading and devotional companion", version)]
struct Cli {
    /// Translation code (e.g. kjv, web); defaults to the saved setting
    #[arg(long, global = true)]
    translation: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a chapter
    Read { book: String, chapter: u32 },
    /// Read a passage aloud
    Listen { reference: Vec<String> },
    /// Explain a verse's context, theology, and application
    Explain { reference: Vec<String> },
    /// Generate a daily devotional
    Devotional {
        /// Optional theme to focus on
        #[arg(long)]
        theme: Option<String>,
    },
    /// Generate the advent devotional for a December day (1-25)
    Advent { day: u8 },
    /// Take a multiple-choice quiz on a Bible book
    Quiz { book: String },
    /// Chat with the counselor (interactive)
    Counsel,
    /// Manage bookmarked verses
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// List the books of the Bible
    Books,
    /// Interactive reader shell
    Shell,
}

#[derive(Subcommand)]
enum BookmarkAction {
    /// List bookmarks, most recent first
    List,
    /// Add or remove a bookmark for a verse reference
    Toggle { reference: Vec<String> },
}

fn main() {
    let cli = Cli::parse();

    let translation = cli.translation.clone().unwrap_or_else(|| {
        Settings::load()
            .map(|s| s.translation)
            .unwrap_or_else(|_| "kjv".to_string())
    });

    let result = match cli.command {
        Command::Read { book, chapter } => run_read(&book, chapter, &translation),
        Command::Listen { reference } => run_listen(&reference.join(" "), &translation),
        Command::Explain { reference } => run_explain(&reference.join(" "), &translation),
        Command::Devotional { theme } => run_devotional(theme.as_deref()),
        Command::Advent { day } => run_advent(day),
        Command::Quiz { book } => run_quiz(&book),
        Command::Counsel => run_counsel(),
        Command::Bookmark { action } => run_bookmark(action, &translation),
        Command::Books => {
            for book in BOOKS {
                println!("{book}");
            }
            Ok(())
        }
        Command::Shell => run_shell(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn gemini_client() -> Result<GeminiClient, Box<dyn std::error::Error>> {
    let key = std::env::var(API_KEY_ENV)
        .map_err(|_| format!("{API_KEY_ENV} is not set"))?;
    Ok(GeminiClient::new(key)?)
}

fn print_chapter(chapter: &Chapter) {
    println!("{} ({})", chapter.reference, chapter.translation_name);
    println!();
    for verse in &chapter.verses {
        println!("{:>3}  {}", verse.verse, verse.text);
    }
}

fn run_read(book: &str, chapter: u32, translation: &str) -> CliResult {
    let provider = BibleApiProvider::new()?;
    let chapter = provider.chapter(book, chapter, Some(translation))?;
    print_chapter(&chapter);
    Ok(())
}

fn run_listen(reference: &str, translation: &str) -> CliResult {
    let provider = BibleApiProvider::new()?;
    let passage = provider.passage(reference, Some(translation))?;
    let text = passage.text.trim();
    if text.is_empty() {
        return Err("Passage has no text".into());
    }

    println!("{}", passage.reference);
    println!("{text}");

    let gemini = gemini_client()?;
    eprintln!("Synthesizing...");
    let Some(payload) = gemini.synthesize(text)? else {
        println!("The service returned no audio.");
        return Ok(());
    };

    let buffer = decode_to_buffer(&payload, AudioSpec::speech())?;
    let duration = buffer.duration();

    let engine = SpeechEngine::new()?;
    if let Ok(settings) = Settings::load() {
        engine.set_volume(settings.volume);
    }
    engine.play(buffer, 1);

    // Wait for natural completion, with a margin over the clip length
    let deadline = duration + Duration::from_secs(5);
    loop {
        match engine.event_receiver().recv_timeout(deadline) {
            Ok(AudioEvent::Finished { .. }) => break,
            Ok(AudioEvent::Error(e)) => {
                engine.shutdown();
                return Err(e.into());
            }
            Ok(_) => continue,
            Err(_) => {
                engine.shutdown();
                return Err("Playback did not complete".into());
            }
        }
    }

    engine.shutdown();
    Ok(())
}

fn run_explain(reference: &str, translation: &str) -> CliResult {
    let provider = BibleApiProvider::new()?;
    let passage = provider.passage(reference, Some(translation))?;
    let gemini = gemini_client()?;
    let explanation = gemini.verse_explanation(&passage.reference, passage.text.trim())?;
    println!("{explanation}");
    Ok(())
}

fn print_devotional(devotional: &christos_app::providers::Devotional) {
    println!("# {}", devotional.title);
    println!();
    println!("Scripture: {}", devotional.scripture);
    println!();
    println!("{}", devotional.reflection);
    println!();
    println!("Prayer: {}", devotional.prayer);
    println!();
    println!("Application: {}", devotional.application);
}

fn run_devotional(theme: Option<&str>) -> CliResult {
    let gemini = gemini_client()?;
    let devotional = gemini.daily_devotional(theme)?;
    print_devotional(&devotional);
    Ok(())
}

fn run_advent(day: u8) -> CliResult {
    let gemini = gemini_client()?;
    let devotional = gemini.advent_reflection(day)?;
    print_devotional(&devotional);
    Ok(())
}

fn run_quiz(book: &str) -> CliResult {
    let gemini = gemini_client()?;
    eprintln!("Generating quiz for {book}...");
    let questions = gemini.quiz(book)?;

    let stdin = io::stdin();
    let mut score = 0;
    for (i, question) in questions.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, question.question);
        for (j, option) in question.options.iter().enumerate() {
            println!("   {}) {}", j + 1, option);
        }

        let choice = loop {
            print!("Answer (1-4): ");
            io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                return Ok(());
            }
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=4).contains(&n) => break n - 1,
                _ => println!("Please enter a number from 1 to 4."),
            }
        };

        if choice == question.correct_answer {
            score += 1;
            println!("Correct! {}", question.explanation);
        } else {
            println!(
                "Incorrect. The answer was: {}. {}",
                question.options[question.correct_answer], question.explanation
            );
        }
    }

    println!();
    println!("Score: {score}/{}", questions.len());
    Ok(())
}

fn run_counsel() -> CliResult {
    let gemini = gemini_client()?;
    let stdin = io::stdin();
    let mut history: Vec<ChatTurn> = Vec::new();

    println!("Christos AI counselor. Type your message, or an empty line to quit.");
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        match gemini.counseling_reply(message, &history) {
            Ok(reply) => {
                println!();
                println!("{reply}");
                println!();
                history.push(ChatTurn::user(message));
                history.push(ChatTurn::model(reply));
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}

fn run_bookmark(action: BookmarkAction, translation: &str) -> CliResult {
    let mut store = BookmarkStore::load()?;

    match action {
        BookmarkAction::List => {
            if store.is_empty() {
                println!("No bookmarks yet.");
                return Ok(());
            }
            for bookmark in store.sorted() {
                println!("{} — {}", bookmark.reference, bookmark.text);
            }
        }
        BookmarkAction::Toggle { reference } => {
            let reference = reference.join(" ");
            if store.is_bookmarked(&reference) {
                store.toggle(&reference, "")?;
                println!("Removed bookmark for {reference}");
            } else {
                // Capture the verse text at bookmark time
                let provider = BibleApiProvider::new()?;
                let passage = provider.passage(&reference, Some(translation))?;
                store.toggle(&passage.reference, passage.text.trim())?;
                println!("Bookmarked {}", passage.reference);
            }
            store.save()?;
        }
    }
    Ok(())
}

// =============================================================================
// Interactive shell (drives the app controller)
// =============================================================================

const SHELL_HELP: &str = "Commands:
  go <view>           switch view (home, reader, bookmarks, ...)
  open <book> <ch>    load a chapter
  show                print the current view
  bookmark <verse>    toggle a bookmark for a loaded verse
  speak <verse>       read a loaded verse aloud
  stop                cut speech playback
  volume <0.0-2.0>    set playback volume
  help                this text
  quit";

fn run_shell() -> CliResult {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(64);
    let shared_state = Arc::new(Mutex::new(AppSnapshot::default()));

    let scripture: Arc<dyn ScriptureProvider> = Arc::new(BibleApiProvider::new()?);
    let gemini = gemini_client()?;

    let mut controller = AppController::new(
        cmd_rx,
        cmd_tx.clone(),
        shared_state.clone(),
        scripture,
        gemini,
    );
    let controller_thread = std::thread::Builder::new()
        .name("app-controller".into())
        .spawn(move || controller.run())?;

    println!("Christos shell. Type 'help' for commands.");
    let stdin = io::stdin();
    loop {
        print!("christos> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => println!("{SHELL_HELP}"),
            ["go", name] => match Route::from_name(name) {
                Some(route) => {
                    let _ = cmd_tx.send(AppCommand::Navigate(route));
                }
                None => println!("Unknown view '{name}'"),
            },
            ["open", rest @ ..] if rest.len() >= 2 => {
                let (chapter_str, book_parts) = rest.split_last().unwrap();
                match chapter_str.parse::<u32>() {
                    Ok(chapter) => {
                        let _ = cmd_tx.send(AppCommand::OpenChapter {
                            book: book_parts.join(" "),
                            chapter,
                        });
                        let _ = cmd_tx.send(AppCommand::Navigate(Route::Reader));
                        println!("Loading...");
                    }
                    Err(_) => println!("Usage: open <book> <chapter>"),
                }
            }
            ["show"] => print_snapshot(&shared_state),
            ["bookmark", verse] => {
                match verse_from_snapshot(&shared_state, verse) {
                    Some((reference, text)) => {
                        let _ = cmd_tx.send(AppCommand::ToggleBookmark { reference, text });
                    }
                    None => println!("No such verse in the loaded chapter."),
                }
            }
            ["speak", verse] => match verse_from_snapshot(&shared_state, verse) {
                Some((reference, text)) => {
                    let _ = cmd_tx.send(AppCommand::Speak { reference, text });
                }
                None => println!("No such verse in the loaded chapter."),
            },
            ["stop"] => {
                let _ = cmd_tx.send(AppCommand::StopSpeaking);
            }
            ["volume", value] => match value.parse::<f32>() {
                Ok(volume) => {
                    let _ = cmd_tx.send(AppCommand::SetVolume(volume));
                }
                Err(_) => println!("Usage: volume <0.0-2.0>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }

    let _ = cmd_tx.send(AppCommand::Shutdown);
    let _ = controller_thread.join();
    Ok(())
}

/// Resolve a verse number against the loaded chapter
fn verse_from_snapshot(
    shared_state: &Arc<Mutex<AppSnapshot>>,
    verse: &str,
) -> Option<(String, String)> {
    let number: u32 = verse.parse().ok()?;
    let state = shared_state.lock().unwrap_or_else(|e| e.into_inner());
    let chapter = state.chapter_data.as_ref()?;
    let verse = chapter.verses.iter().find(|v| v.verse == number)?;
    Some((chapter.verse_reference(number), verse.text.clone()))
}

fn print_snapshot(shared_state: &Arc<Mutex<AppSnapshot>>) {
    let state = shared_state.lock().unwrap_or_else(|e| e.into_inner());
    println!("View: {}   Bookmarks: {}", state.route, state.bookmark_count);
    if let Some(ref e) = state.last_error {
        println!("Error: {e}");
    }
    if state.is_loading {
        println!("Loading {} {}...", state.book, state.chapter);
        return;
    }
    match state.chapter_data {
        Some(ref chapter) => {
            print_chapter(chapter);
            if !state.speaking.is_empty() {
                let mut refs: Vec<&String> = state.speaking.keys().collect();
                refs.sort();
                println!();
                for reference in refs {
                    println!("Speaking: {reference}");
                }
            }
        }
        None => println!("No chapter loaded. Try: open John 3"),
    }
}
