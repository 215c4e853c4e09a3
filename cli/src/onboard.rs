use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password, Select};
use parley_core::Voice;
use parley_core::config::{self, Config};

const MODELS: [&str; 4] = ["gpt-4o", "gpt-4o-mini", "gpt-5", "gpt-5-mini"];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_api_key() -> Result<String> {
    let api_key = Password::new()
        .with_prompt("Enter your OpenAI API key")
        .interact()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }
    Ok(api_key)
}

fn setup_organization() -> Result<Option<String>> {
    let org: String = Input::new()
        .with_prompt("OpenAI organization ID (leave blank for none)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read organization")?;

    let org = org.trim();
    Ok((!org.is_empty()).then(|| org.to_string()))
}

fn setup_model() -> Result<String> {
    let selection = Select::new()
        .with_prompt("Select the chat model")
        .items(&MODELS)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(MODELS[selection].to_string())
}

fn setup_voice() -> Result<Voice> {
    let items = Voice::ALL
        .iter()
        .map(|v| format!("{} - {}", v, v.description()))
        .collect::<Vec<_>>();

    let selection = Select::new()
        .with_prompt("Select the default speech voice")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to select voice")?;

    Ok(Voice::ALL[selection])
}

/// Walks through credentials and defaults, returning the config to save.
pub fn run_onboard() -> Result<Config> {
    println!("{}", style("parley").cyan().bold());
    println!(
        "  {}",
        style("This wizard writes your OpenAI settings to the parley config file.").dim()
    );

    print_step(1, 4, "API Key");
    let api_key = setup_api_key()?;

    print_step(2, 4, "Organization");
    let organization = setup_organization()?;

    print_step(3, 4, "Model");
    let model = setup_model()?;

    print_step(4, 4, "Voice");
    let voice = setup_voice()?;

    let config = Config {
        api_key,
        organization,
        model: Some(model),
        voice: voice.to_string(),
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config will be saved to {}",
        style("→").green(),
        style(config::get_config_path().display()).cyan()
    );
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("parley chat").cyan().bold()
    );
    println!();

    Ok(config)
}
