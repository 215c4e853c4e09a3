use crate::repl::{self, LineReader, Mode, ReplCommand};
use anyhow::Result;
use console::style;
use parley_core::config::{Config, DEFAULT_CHAT_MODEL};
use parley_core::{AgentLoop, ToolExecutor, ToolRegistry, TurnReport, create_provider, tools};
use std::sync::Arc;
use termimad::MadSkin;

const ARITHMETIC_PROMPT: &str = "You are a helpful assistant with access to arithmetic functions. Use the provided functions to perform calculations when asked. Always show your work by explaining what calculation you're performing.";
const PLAIN_PROMPT: &str = "You are a helpful assistant. Be concise and friendly.";

const HELP: &str = "
📋 Commands:
    • 'help' - Show this help
    • 'quit', 'exit' or 'bye' - Exit the program

💡 Anything else is sent to the assistant, e.g. 'What is 15 + 7?'
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn build_agent(config: &Config, plain: bool) -> Result<AgentLoop> {
    let provider = Arc::new(create_provider(config, DEFAULT_CHAT_MODEL));

    let (registry, prompt) = if plain {
        (ToolRegistry::new(), PLAIN_PROMPT)
    } else {
        (tools::arithmetic_registry()?, ARITHMETIC_PROMPT)
    };
    let executor =
        ToolExecutor::new(Arc::new(registry)).with_strict_arguments(config.strict_arguments);
    Ok(AgentLoop::new(provider, executor, prompt)
        .with_max_completion_tokens(config.max_completion_tokens))
}

pub async fn run(config: &Config, plain: bool) -> Result<()> {
    let mut agent = build_agent(config, plain)?;

    if plain {
        repl::print_banner(
            "🤖 Simple Chat",
            &["Type 'quit' or 'exit' to end the conversation"],
        );
    } else {
        repl::print_banner(
            "🤖 Chat with Function Calling (Arithmetic)",
            &[
                "Try asking me to do math like: 'What is 15 + 7?' or 'Calculate 100 divided by 4'",
                "Type 'quit' or 'exit' to end the conversation",
            ],
        );
    }

    let skin = MadSkin::default();
    let mut reader = LineReader::new(Mode::Chat)?;

    loop {
        println!();
        let Some(line) = reader.read("👤 You: ")? else {
            println!();
            repl::goodbye();
            break;
        };

        if handle_line(&mut agent, &skin, &line).await == Flow::Quit {
            break;
        }
    }

    reader.save();
    Ok(())
}

/// Handles one line of chat input. Only conversational input reaches the
/// agent; commands never touch the conversation.
async fn handle_line(agent: &mut AgentLoop, skin: &MadSkin, line: &str) -> Flow {
    match ReplCommand::parse(line, Mode::Chat) {
        ReplCommand::Empty => {}
        ReplCommand::Quit => {
            repl::goodbye();
            return Flow::Quit;
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Input(input) => match agent.process(&input).await {
            Ok(Some(report)) => print_report(skin, agent.model(), &report),
            Ok(None) => {}
            Err(e) => repl::print_error("Error", e),
        },
        other => tracing::debug!(?other, "Ignoring command outside its mode"),
    }
    Flow::Continue
}

fn print_report(skin: &MadSkin, model: &str, report: &TurnReport) {
    if report.used_tools() {
        println!();
        println!("🔧 {} is calling functions...", style(model).cyan());
        for run in &report.tool_runs {
            println!("   📞 Calling {}({})", run.call.name, run.call.arguments);
            if run.is_error() {
                println!("   📊 Result: {}", style(&run.output).yellow());
            } else {
                println!("   📊 Result: {}", run.output);
            }
        }
    }

    println!();
    println!("🤖 {}:", style(model).cyan().bold());
    skin.print_text(&report.reply);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> Config {
        Config {
            api_key: "sk-test".into(),
            base_url: Some("http://127.0.0.1:9".into()),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn quit_ends_the_session_without_appending() {
        let mut agent = build_agent(&offline_config(), false).unwrap();
        let skin = MadSkin::default();

        for word in ["quit", "Exit", "bye"] {
            assert_eq!(handle_line(&mut agent, &skin, word).await, Flow::Quit);
        }
        assert_eq!(agent.conversation().len(), 1);
    }

    #[tokio::test]
    async fn commands_and_blank_lines_leave_history_alone() {
        let mut agent = build_agent(&offline_config(), true).unwrap();
        let skin = MadSkin::default();

        assert_eq!(handle_line(&mut agent, &skin, "   ").await, Flow::Continue);
        assert_eq!(handle_line(&mut agent, &skin, "help").await, Flow::Continue);
        assert_eq!(agent.conversation().len(), 1);
    }
}
