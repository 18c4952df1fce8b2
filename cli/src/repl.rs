/// REPL shell — Reedline-based interactive poll session.
use anyhow::Result;
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use stellar_vote_core::commands::Command;
use stellar_vote_core::display;
use stellar_vote_core::session::WalletSession;

use crate::Cli;

pub async fn run_repl(cli: &Cli, session: &WalletSession) -> Result<()> {
    println!("StellarVote v{}", env!("CARGO_PKG_VERSION"));
    println!("Network: {}", cli.network_config().network);
    println!("Backend: {}", cli.backend_mode());
    println!();
    println!("{}", display::format_tallies(&session.tallies()));
    println!("Type 'help' for a list of commands.");
    println!();

    let commands: Vec<String> = [
        "connect",
        "disconnect",
        "balance",
        "address",
        "history",
        "send",
        "vote",
        "results",
        "feed",
        "status",
        "help",
        "exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let completer = Box::new(DefaultCompleter::new(commands));
    let mut line_editor = Reedline::create().with_completer(completer);
    let mut prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("[poll]".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match Command::parse(line) {
                    Ok(Command::Exit) => {
                        println!("Goodbye.");
                        break;
                    }
                    Ok(cmd) => {
                        if let Some(prompt_msg) = cmd.confirmation_prompt() {
                            if !prompt_confirm(&prompt_msg) {
                                println!("Cancelled.");
                                continue;
                            }
                        }

                        match cmd.execute(session, cli.json).await {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{output}");
                                }
                            }
                            Err(e) => {
                                eprintln!("Error: {e}");
                            }
                        }

                        // Reflect the session in the prompt after connects
                        // and disconnects.
                        let snapshot = session.snapshot();
                        let prompt_str = match snapshot.address {
                            Some(address) => {
                                format!("[{}]", display::short_address(&address))
                            }
                            None => "[poll]".to_string(),
                        };
                        prompt = DefaultPrompt::new(
                            DefaultPromptSegment::Basic(prompt_str),
                            DefaultPromptSegment::Empty,
                        );
                    }
                    Err(e) => {
                        eprintln!("{e}");
                    }
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    session.disconnect();
    Ok(())
}

fn prompt_confirm(prompt: &str) -> bool {
    use std::io::Write;
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).is_ok() && input.trim().eq_ignore_ascii_case("y")
}
