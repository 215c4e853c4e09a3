use anyhow::Result;
use clap::{Parser, Subcommand};
use parley_core::config::{self, Config};
use parley_core::error::ConfigError;
use tracing_subscriber::EnvFilter;

mod chat;
mod image;
mod onboard;
mod repl;
mod speech;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "parley - chat, arithmetic tools, images and speech on the OpenAI API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant; arithmetic tools are offered unless --plain
    Chat {
        #[arg(long)]
        plain: bool,
    },
    /// Generate images from prompts
    Image,
    /// Generate a transcript and spoken audio from prompts
    Speech,
    /// Write the config file interactively
    Onboard,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PARLEY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The config to start a session with, or `None` once the reason it cannot
/// start has been printed.
fn startup_config(loaded: Result<Config, ConfigError>) -> Option<Config> {
    match loaded {
        Ok(config) => Some(config),
        Err(e) => {
            println!("❌ Error: {}", e);
            if matches!(e, ConfigError::MissingApiKey) {
                println!("Set OPENAI_API_KEY in your environment or .env, or run `parley onboard`.");
            }
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Chat { plain: false });
    if let Commands::Onboard = command {
        match onboard::run_onboard() {
            Ok(onboard_config) => {
                config::save_config(&onboard_config, &config::get_config_path())?
            }
            Err(e) => println!("❌ Onboarding failed: {}", e),
        }
        return Ok(());
    }

    let Some(config) = startup_config(Config::load()) else {
        return Ok(());
    };
    match command {
        Commands::Chat { plain } => chat::run(&config, plain).await?,
        Commands::Image => image::run(&config).await?,
        Commands::Speech => speech::run(&config).await?,
        Commands::Onboard => {}
    }

    Ok(())
}
