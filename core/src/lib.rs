pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod extension;
pub mod ledger;
pub mod network;
pub mod poll;
pub mod session;
pub mod sync;
pub mod tx;
pub mod validate;

pub use commands::Command;
pub use config::{BackendMode, Network, NetworkConfig, CONTRACT_ID};
pub use error::WalletError;
pub use extension::{PublicKeyResponse, SignResponse, WalletExtension, WalletKind};
pub use ledger::{LedgerClient, RemoteLedgerClient, SimulatedLedgerClient};
pub use network::{HorizonClient, TransactionRecord, TransactionResult};
pub use poll::{ActivityEntry, PollStore, Tallies, VoteChoice};
pub use session::{SessionSnapshot, SessionStatus, UrlLauncher, WalletSession};
