use crate::repl::{self, LineReader, Mode, ReplCommand};
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use parley_core::config::{Config, DEFAULT_IMAGE_MODEL};
use parley_core::{ImageStore, ImageStudio, create_provider};
use std::sync::Arc;

const HELP: &str = "
🎨 Image Generation Commands:

    • Just type what you want to see: \"a sunset over mountains\"
    • Be descriptive: \"a realistic photo of a golden retriever in a park\"
    • Specify style: \"a watercolor painting of flowers\"

📋 Special Commands:
    • 'help' - Show this help
    • 'recent' - Show recent images
    • 'clear' - Clear images folder
    • 'quit' or 'exit' - Exit the program

💡 Tips:
    • Use descriptive language for better results
    • Specify art styles, colors, lighting, etc.
    • The model may rewrite your prompt to improve it
";

pub async fn run(config: &Config) -> Result<()> {
    let provider = Arc::new(create_provider(config, DEFAULT_IMAGE_MODEL));
    let model = config.model_or(DEFAULT_IMAGE_MODEL);
    let studio = ImageStudio::new(provider, ImageStore::new(&config.images_dir));

    repl::print_banner(
        &format!("🎨 AI Image Generator ({})", model),
        &[
            "Type what you want to see and I'll generate an image!",
            "Type 'help' for commands or 'quit' to exit",
        ],
    );
    match studio.store().recent(5) {
        Ok(recent) => repl::print_recent_summary("📸 Recent images:", &recent),
        Err(e) => tracing::warn!("Could not list images: {}", e),
    }
    println!();

    let mut reader = LineReader::new(Mode::Image)?;
    loop {
        let Some(line) = reader.read("🎨 Describe your image: ")? else {
            println!();
            repl::goodbye();
            break;
        };

        match ReplCommand::parse(&line, Mode::Image) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                repl::goodbye();
                break;
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Recent => show_recent(studio.store()),
            ReplCommand::Clear => clear(studio.store()),
            ReplCommand::Input(prompt) => {
                println!("🎨 Generating image: '{}'...", prompt);
                match studio.create(&prompt).await {
                    Ok(report) => {
                        let name = report
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        println!("{} Image saved: {}", style("✅").green(), name);
                        if let Some(revised) = &report.revised_prompt {
                            println!("🔄 Revised prompt: {}", revised);
                        }
                        println!("📊 File size: {} bytes", report.bytes);
                    }
                    Err(e) => repl::print_error("Error generating image", e),
                }
            }
            other => tracing::debug!(?other, "Ignoring command outside its mode"),
        }
        println!();
    }

    reader.save();
    Ok(())
}

fn show_recent(store: &ImageStore) {
    match store.recent(10) {
        Ok(names) if names.is_empty() => println!("📁 No images found."),
        Ok(names) => {
            println!("📸 Recent images:");
            repl::print_numbered(&names);
        }
        Err(e) => repl::print_error("Error listing images", e),
    }
}

fn clear(store: &ImageStore) {
    let count = match store.count() {
        Ok(0) => {
            println!("📁 No images to clear.");
            return;
        }
        Ok(count) => count,
        Err(e) => {
            repl::print_error("Error listing images", e);
            return;
        }
    };

    let confirmed = Confirm::new()
        .with_prompt(format!("🗑️  Are you sure you want to delete {} images?", count))
        .default(false)
        .interact()
        .unwrap_or(false);
    if !confirmed {
        println!("❌ Cancelled.");
        return;
    }

    match store.clear() {
        Ok(deleted) => println!("🗑️  Deleted {} images.", deleted),
        Err(e) => repl::print_error("Error clearing images", e),
    }
}
