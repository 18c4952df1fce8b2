mod extension;
mod repl;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use stellar_vote_core::commands::Command;
use stellar_vote_core::config::{BackendMode, Network, NetworkConfig};
use stellar_vote_core::extension::WalletExtension;
use stellar_vote_core::ledger::{LedgerClient, RemoteLedgerClient, SimulatedLedgerClient};
use stellar_vote_core::network::HorizonClient;
use stellar_vote_core::poll::PollStore;
use stellar_vote_core::session::{UrlLauncher, WalletSession};

use extension::{PromptExtension, StubExtension};

/// Address the demo extension reports when none is given.
const DEMO_ADDRESS: &str = "GDEMO4Q2XJ7GK9N2M8UVLP3A1BZM2PLWQRX4N7YVSDE91HCTN5MXF7KL";

#[derive(Parser)]
#[command(name = "stellar-vote", about = "StellarVote — wallet and poll REPL", version)]
pub(crate) struct Cli {
    /// Use the in-process demo ledger (default)
    #[arg(long)]
    demo: bool,

    /// Use the real ledger and an interactive signing prompt
    #[arg(long)]
    real: bool,

    /// Use testnet (default)
    #[arg(long)]
    testnet: bool,

    /// Use the public network
    #[arg(long)]
    pubnet: bool,

    /// Custom Horizon endpoint URL
    #[arg(long)]
    node: Option<String>,

    /// Allow connecting to non-HTTPS endpoint URLs
    #[arg(long)]
    insecure: bool,

    /// Demo account address reported by the stub extension
    #[arg(long)]
    address: Option<String>,

    /// Run a single command and exit
    #[arg(long)]
    cmd: Option<String>,

    /// Output in JSON format (useful with --cmd)
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn backend_mode(&self) -> BackendMode {
        if self.real {
            BackendMode::Real
        } else {
            BackendMode::Demo
        }
    }

    fn network_config(&self) -> NetworkConfig {
        if let Some(url) = &self.node {
            NetworkConfig {
                network: Network::Custom,
                custom_url: Some(url.clone()),
                custom_passphrase: None,
            }
        } else if self.pubnet {
            NetworkConfig {
                network: Network::Pubnet,
                custom_url: None,
                custom_passphrase: None,
            }
        } else {
            NetworkConfig::default()
        }
    }

    /// Validate that at most one backend flag and one network flag is set.
    fn validate_flags(&self) -> Result<()> {
        if self.demo && self.real {
            bail!("Conflicting backend flags. Use only one of --demo or --real.");
        }
        let count = self.testnet as u8 + self.pubnet as u8 + self.node.is_some() as u8;
        if count > 1 {
            bail!("Conflicting network flags. Use only one of --testnet, --pubnet, or --node.");
        }
        Ok(())
    }
}

/// Opens wallet-product sites in the system browser.
struct SystemLauncher;

impl UrlLauncher for SystemLauncher {
    fn open_url(&self, url: &str) {
        if let Err(e) = open::that(url) {
            eprintln!("Could not open {url}: {e}");
        }
    }
}

/// Wire the session for the selected backend and network.
fn build_session(cli: &Cli) -> Result<WalletSession> {
    let poll = Arc::new(PollStore::seeded());
    let config = cli.network_config();

    let (extension, ledger): (Arc<dyn WalletExtension>, Arc<dyn LedgerClient>) =
        match cli.backend_mode() {
            BackendMode::Demo => {
                let address = cli.address.clone().unwrap_or_else(|| DEMO_ADDRESS.to_string());
                (
                    Arc::new(StubExtension::new(address)),
                    Arc::new(SimulatedLedgerClient::new(Arc::clone(&poll))),
                )
            }
            BackendMode::Real => {
                let extension: Arc<dyn WalletExtension> = Arc::new(PromptExtension);
                let horizon = HorizonClient::new(&config, cli.insecure)?;
                (
                    Arc::clone(&extension),
                    Arc::new(RemoteLedgerClient::new(
                        horizon,
                        extension,
                        Arc::clone(&poll),
                        config.clone(),
                    )),
                )
            }
        };

    Ok(WalletSession::with_launcher(
        extension,
        ledger,
        poll,
        Box::new(SystemLauncher),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.validate_flags()?;

    let session = build_session(&cli)?;

    if let Some(cmd_str) = &cli.cmd {
        run_oneshot(&cli, &session, cmd_str).await
    } else {
        repl::run_repl(&cli, &session).await
    }
}

async fn run_oneshot(cli: &Cli, session: &WalletSession, cmd_str: &str) -> Result<()> {
    let command = Command::parse(cmd_str)?;
    if command == Command::Exit {
        return Ok(());
    }

    let output = command.execute(session, cli.json).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    session.disconnect();

    Ok(())
}
