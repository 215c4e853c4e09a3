use crate::repl::{self, LineReader, Mode, ReplCommand};
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use parley_core::config::{Config, DEFAULT_CHAT_MODEL};
use parley_core::{SpeechStore, SpeechStudio, Voice, create_provider};
use std::sync::Arc;

const HELP: &str = "
🗣️  Speech Generation Commands:

    • Tell me what to create: \"Write a story about a brave knight\"
    • Ask for specific content: \"Create a product description for a new phone\"
    • Request educational content: \"Explain how photosynthesis works\"

📋 Special Commands:
    • 'help' - Show this help
    • 'recent' - Show recent speech tasks
    • 'clear' - Clear audio folder
    • 'voices' - Show available voices
    • 'voice <name>' - Change voice (alloy, echo, fable, onyx, nova, shimmer)
    • 'quit' or 'exit' - Exit the program

💡 Both transcript and audio files are saved for each task.
";

pub async fn run(config: &Config) -> Result<()> {
    let client = Arc::new(create_provider(config, DEFAULT_CHAT_MODEL));
    let studio = SpeechStudio::new(client.clone(), client, SpeechStore::new(&config.audio_dir))
        .with_max_completion_tokens(config.transcript_max_tokens);

    let mut voice = config.voice.parse::<Voice>().unwrap_or_else(|e| {
        tracing::warn!("{}; using {}", e, Voice::default());
        Voice::default()
    });

    println!("🤖 Using AI model: {}", style(studio.model()).cyan());
    repl::print_banner(
        "🗣️  AI Speech Generator",
        &[
            "Tell me what content to create and I'll generate transcript + audio!",
            "Type 'help' for commands or 'quit' to exit",
        ],
    );
    match studio.store().recent(5) {
        Ok(recent) => repl::print_recent_summary("📁 Recent tasks:", &recent),
        Err(e) => tracing::warn!("Could not list speech tasks: {}", e),
    }
    println!("🎤 Current voice: {}", voice);
    println!();

    let mut reader = LineReader::new(Mode::Speech)?;
    loop {
        let Some(line) = reader.read("📝 What content should I create? ")? else {
            println!();
            repl::goodbye();
            break;
        };

        match ReplCommand::parse(&line, Mode::Speech) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                repl::goodbye();
                break;
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Recent => show_recent(studio.store()),
            ReplCommand::Clear => clear(studio.store()),
            ReplCommand::Voices => show_voices(),
            ReplCommand::Voice(name) => match name.parse::<Voice>() {
                Ok(chosen) => {
                    voice = chosen;
                    println!("🎤 Voice changed to: {}", voice);
                }
                Err(e) => repl::print_error("Error", e),
            },
            ReplCommand::Input(prompt) => {
                println!("📝 Generating transcript for: '{}'...", prompt);
                match studio.create(&prompt, voice).await {
                    Ok(report) => {
                        println!("📁 Created task folder: {}", report.task.name());
                        println!("{} Transcript saved: transcript.json", style("✅").green());
                        println!("📊 Word count: {} words", report.word_count);
                        println!("{} Audio saved: audio.mp3", style("✅").green());
                        println!("📊 Audio size: {} bytes", report.audio_bytes);
                        println!("📊 Transcript size: {} bytes", report.transcript_bytes);
                        println!("📄 Preview: {}", report.preview);
                    }
                    Err(e) => repl::print_error("Error creating speech", e),
                }
            }
        }
        println!();
    }

    reader.save();
    Ok(())
}

fn show_voices() {
    println!("🎤 Available Voices:");
    for voice in Voice::ALL {
        println!("   • {}: {}", style(voice).bold(), voice.description());
    }
    println!();
    println!("💡 Use 'voice <name>' to change voice (e.g., 'voice fable')");
}

fn show_recent(store: &SpeechStore) {
    match store.recent(10) {
        Ok(names) if names.is_empty() => println!("📁 No tasks found."),
        Ok(names) => {
            println!("📁 Recent tasks:");
            repl::print_numbered(&names);
        }
        Err(e) => repl::print_error("Error listing tasks", e),
    }
}

fn clear(store: &SpeechStore) {
    let count = match store.count() {
        Ok(0) => {
            println!("📁 No audio tasks to clear.");
            return;
        }
        Ok(count) => count,
        Err(e) => {
            repl::print_error("Error listing tasks", e);
            return;
        }
    };

    let confirmed = Confirm::new()
        .with_prompt(format!("🗑️  Are you sure you want to delete {} audio tasks?", count))
        .default(false)
        .interact()
        .unwrap_or(false);
    if !confirmed {
        println!("❌ Cancelled.");
        return;
    }

    match store.clear() {
        Ok(deleted) => println!("🗑️  Deleted {} audio tasks.", deleted),
        Err(e) => repl::print_error("Error clearing tasks", e),
    }
}
