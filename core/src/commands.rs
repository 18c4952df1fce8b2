/// Command definitions, parsing, and execution for the REPL and one-shot mode.
use anyhow::{bail, Result};

use crate::display;
use crate::extension::WalletKind;
use crate::poll::VoteChoice;
use crate::session::WalletSession;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Connect a wallet: connect [freighter|albedo|xbull]
    Connect { kind: WalletKind },
    /// Tear down the session
    Disconnect,
    /// Show the connected account's balance
    Balance,
    /// Show the connected account's address
    Address,
    /// Show recent transactions for the connected account
    History,
    /// Send native currency: send <destination> <amount>
    Send { destination: String, amount: String },
    /// Cast a vote: vote <yes|no>
    Vote { choice: VoteChoice },
    /// Show the poll tallies
    Results,
    /// Show the live activity feed
    Feed,
    /// Show the session status
    Status,
    /// Print help
    Help { command: Option<String> },
    /// Exit the client
    Exit,
}

impl Command {
    /// Parse a command from a raw input string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let mut parts = input.splitn(3, char::is_whitespace);
        let cmd = parts.next().unwrap_or_default().to_lowercase();
        let arg1 = parts.next().map(|s| s.trim());
        let arg2 = parts.next().map(|s| s.trim());

        match cmd.as_str() {
            "connect" => {
                let kind = match arg1 {
                    Some(s) => s
                        .parse::<WalletKind>()
                        .map_err(|e| anyhow::anyhow!("{e}"))?,
                    None => WalletKind::Freighter,
                };
                Ok(Command::Connect { kind })
            }

            "disconnect" => Ok(Command::Disconnect),

            "balance" | "bal" => Ok(Command::Balance),

            "address" | "addr" => Ok(Command::Address),

            "history" | "txs" => Ok(Command::History),

            "send" | "pay" => {
                let destination = arg1
                    .ok_or_else(|| {
                        anyhow::anyhow!("Missing destination. Usage: send <destination> <amount>")
                    })?
                    .to_string();
                let amount = arg2
                    .ok_or_else(|| {
                        anyhow::anyhow!("Missing amount. Usage: send <destination> <amount>")
                    })?
                    .to_string();
                Ok(Command::Send {
                    destination,
                    amount,
                })
            }

            "vote" => {
                let choice = arg1
                    .ok_or_else(|| anyhow::anyhow!("Missing vote. Usage: vote <yes|no>"))?
                    .parse::<VoteChoice>()
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                Ok(Command::Vote { choice })
            }

            "results" | "tallies" => Ok(Command::Results),

            "feed" | "activity" => Ok(Command::Feed),

            "status" => Ok(Command::Status),

            "help" | "?" => Ok(Command::Help {
                command: arg1.map(|s| s.to_string()),
            }),

            "exit" | "quit" | "q" => Ok(Command::Exit),

            other => bail!("Unknown command '{other}'. Type 'help' for a list of commands."),
        }
    }

    /// Returns a confirmation prompt if this command should ask before executing.
    pub fn confirmation_prompt(&self) -> Option<String> {
        match self {
            Command::Send {
                destination,
                amount,
            } => Some(format!(
                "Send {amount} XLM to {}?",
                display::short_address(destination)
            )),
            Command::Vote { choice } => Some(format!("Cast a {choice} vote?")),
            _ => None,
        }
    }

    /// Execute a command against the session and return the output string.
    pub async fn execute(&self, session: &WalletSession, json_output: bool) -> Result<String> {
        match self {
            Command::Connect { kind } => {
                session.connect(*kind).await;
                let snapshot = session.snapshot();
                match (&snapshot.last_error, snapshot.address.as_deref()) {
                    (Some(err), _) => Ok(format!("Connection failed: {err}\nTry again with 'connect'.")),
                    (None, Some(address)) => Ok(format!(
                        "Connected: {}",
                        display::short_address(address)
                    )),
                    (None, None) => Ok(format!(
                        "{kind} does not integrate here; its site was opened instead."
                    )),
                }
            }

            Command::Disconnect => {
                session.disconnect();
                Ok("Disconnected.".to_string())
            }

            Command::Balance => {
                let snapshot = session.snapshot();
                match snapshot.balance {
                    Some(stroops) if json_output => Ok(display::format_balance_json(stroops)),
                    Some(stroops) => Ok(format!(
                        "{}\nSpendable: {}",
                        display::format_balance(stroops),
                        display::format_balance(session.spendable()),
                    )),
                    None => Ok("Balance not fetched yet.".to_string()),
                }
            }

            Command::Address => {
                let snapshot = session.snapshot();
                match snapshot.address {
                    Some(address) => Ok(address),
                    None => Ok("No wallet connected.".to_string()),
                }
            }

            Command::History => {
                let snapshot = session.snapshot();
                Ok(display::format_history(&snapshot.history))
            }

            Command::Send {
                destination,
                amount,
            } => {
                let hash = session.send(destination, amount).await?;
                Ok(format!("Payment sent!\n  Hash: {hash}"))
            }

            Command::Vote { choice } => {
                let hash = session.vote(*choice).await?;
                Ok(format!(
                    "Vote recorded!\n  Hash: {hash}\n  {}",
                    display::format_tallies(&session.tallies()),
                ))
            }

            Command::Results => {
                if json_output {
                    let tallies = session.tallies();
                    Ok(serde_json::json!({
                        "yes": tallies.yes,
                        "no": tallies.no,
                        "total": tallies.total(),
                        "yes_percent": tallies.yes_percent(),
                    })
                    .to_string())
                } else {
                    Ok(display::format_tallies(&session.tallies()))
                }
            }

            Command::Feed => Ok(display::format_feed(&session.feed())),

            Command::Status => {
                let snapshot = session.snapshot();
                let mut lines = vec![format!("  Status:  {}", snapshot.status)];
                if let Some(address) = &snapshot.address {
                    lines.push(format!("  Address: {}", display::short_address(address)));
                }
                if let Some(kind) = snapshot.wallet_kind {
                    lines.push(format!("  Wallet:  {kind}"));
                }
                if let Some(err) = &snapshot.last_error {
                    lines.push(format!("  Error:   {err}"));
                }
                Ok(lines.join("\n"))
            }

            Command::Help { command } => Ok(help_text(command.as_deref())),

            Command::Exit => Ok(String::new()),
        }
    }
}

/// Help text for all commands, or detail for one.
pub fn help_text(command: Option<&str>) -> String {
    match command {
        Some("connect") => "connect [freighter|albedo|xbull]: connect a wallet \
(default: freighter). Non-integrated wallets open their own site."
            .to_string(),
        Some("send") => {
            "send <destination> <amount>: send XLM. The destination must be a \
56-character G… address; 1 XLM stays reserved."
                .to_string()
        }
        Some("vote") => "vote <yes|no>: cast a vote with the connected account.".to_string(),
        _ => "\
Commands:
  connect [wallet]     Connect a wallet (freighter, albedo, xbull)
  disconnect           Tear down the session
  balance              Show balance and spendable amount
  address              Show the connected address
  history              Show recent transactions
  send <dest> <amt>    Send XLM to a destination
  vote <yes|no>        Cast a vote on the poll
  results              Show the poll tallies
  feed                 Show the live activity feed
  status               Show the session status
  help [command]       Show help
  exit                 Quit"
            .to_string(),
    }
}
