//! The two interchangeable ledger backends behind one capability trait.
//!
//! The backend is selected once at configuration time; callers hold an
//! `Arc<dyn LedgerClient>` and never branch on the mode themselves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::config::{NetworkConfig, CONTRACT_ID};
use crate::error::{Result, WalletError};
use crate::extension::WalletExtension;
use crate::network::{
    AccountRecord, BalanceEntry, HorizonClient, TransactionRecord, TransactionResult,
};
use crate::poll::{PollStore, VoteChoice};
use crate::tx::EnvelopeBuilder;
use crate::display::stroops_to_xlm;

/// Simulated submission latency.
pub const SIM_LATENCY: Duration = Duration::from_millis(1500);

/// Starting balance granted to every simulated account (10 000 XLM).
pub const SIM_STARTING_BALANCE: u64 = 100_000_000_000;

/// Account-lookup, history, and transaction operations offered by a ledger
/// backend. Both variants return the same normalized result shape.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Load an account's balances and sequence.
    async fn load_account(&self, address: &str) -> Result<AccountRecord>;

    /// Most recent transactions for an account, newest first.
    async fn transactions_for_account(
        &self,
        address: &str,
        limit: u8,
    ) -> Result<Vec<TransactionRecord>>;

    /// Cast a vote on the poll contract on behalf of `voter`.
    async fn cast_vote(&self, voter: &str, choice: VoteChoice) -> Result<TransactionResult>;

    /// Send a native-currency payment. Inputs are validated by the caller
    /// before dispatch.
    async fn send_payment(
        &self,
        source: &str,
        destination: &str,
        amount_stroops: u64,
    ) -> Result<TransactionResult>;
}

// ---------------------------------------------------------------------------
// Real backend: ledger REST service + wallet extension
// ---------------------------------------------------------------------------

/// Builds, signs, and submits envelopes against the real ledger, requesting
/// signatures from the wallet extension. All extension/network failures are
/// classified here; raw errors never reach callers.
pub struct RemoteLedgerClient {
    horizon: HorizonClient,
    extension: Arc<dyn WalletExtension>,
    poll: Arc<PollStore>,
    config: NetworkConfig,
}

impl RemoteLedgerClient {
    pub fn new(
        horizon: HorizonClient,
        extension: Arc<dyn WalletExtension>,
        poll: Arc<PollStore>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            horizon,
            extension,
            poll,
            config,
        }
    }

    /// Sign an encoded envelope and submit it, normalizing the extension's
    /// loosely-typed reply. No usable signed payload is a rejection.
    async fn sign_and_submit(&self, encoded: &str) -> Result<String> {
        let signed = self
            .extension
            .sign_transaction(encoded, self.config.passphrase())
            .await?
            .into_signed()
            .ok_or_else(|| {
                WalletError::SubmissionRejected(
                    "Signing returned no signed transaction".to_string(),
                )
            })?;

        let reply = self.horizon.submit_transaction(&signed).await?;
        Ok(reply.hash)
    }
}

#[async_trait]
impl LedgerClient for RemoteLedgerClient {
    async fn load_account(&self, address: &str) -> Result<AccountRecord> {
        Ok(self.horizon.load_account(address).await?)
    }

    async fn transactions_for_account(
        &self,
        address: &str,
        limit: u8,
    ) -> Result<Vec<TransactionRecord>> {
        Ok(self.horizon.transactions_for_account(address, limit).await?)
    }

    async fn cast_vote(&self, voter: &str, choice: VoteChoice) -> Result<TransactionResult> {
        let account = self.horizon.load_account(voter).await?;
        let envelope = EnvelopeBuilder::new(&account, self.config.passphrase())
            .contract_call(CONTRACT_ID, choice.contract_fn(), voter)
            .build()?;
        let hash = self.sign_and_submit(&envelope.encode()?).await?;

        // Optimistic client-side mirror; the contract holds the
        // authoritative count.
        self.poll.record_vote(voter, choice, &hash);

        Ok(TransactionResult {
            hash,
            succeeded: true,
        })
    }

    async fn send_payment(
        &self,
        source: &str,
        destination: &str,
        amount_stroops: u64,
    ) -> Result<TransactionResult> {
        let account = self.horizon.load_account(source).await?;
        let envelope = EnvelopeBuilder::new(&account, self.config.passphrase())
            .payment(destination, amount_stroops)
            .build()?;
        let hash = self.sign_and_submit(&envelope.encode()?).await?;

        Ok(TransactionResult {
            hash,
            succeeded: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Demo backend: in-process simulator
// ---------------------------------------------------------------------------

struct SimAccount {
    balance: u64,
    sequence: u64,
    history: Vec<TransactionRecord>,
}

impl SimAccount {
    fn fresh() -> Self {
        Self {
            balance: SIM_STARTING_BALANCE,
            sequence: 1,
            history: Vec::new(),
        }
    }
}

/// In-process fake ledger: serves seeded accounts, advances tallies and the
/// activity feed on simulated submission with artificial latency, and never
/// touches the network or the wallet extension.
pub struct SimulatedLedgerClient {
    poll: Arc<PollStore>,
    latency: Duration,
    accounts: Mutex<HashMap<String, SimAccount>>,
    next_record_id: Mutex<u64>,
}

impl SimulatedLedgerClient {
    pub fn new(poll: Arc<PollStore>) -> Self {
        Self::with_latency(poll, SIM_LATENCY)
    }

    pub fn with_latency(poll: Arc<PollStore>, latency: Duration) -> Self {
        Self {
            poll,
            latency,
            accounts: Mutex::new(HashMap::new()),
            next_record_id: Mutex::new(1),
        }
    }

    /// Synthesize a 64-hex-character transaction hash.
    fn synth_hash() -> String {
        let mut rng = rand::thread_rng();
        (0..32)
            .map(|_| format!("{:02x}", rng.gen::<u8>()))
            .collect()
    }

    /// Record a simulated submission into the account's history.
    fn index_submission(&self, address: &str, hash: &str, successful: bool) {
        let id = {
            let mut next = self.next_record_id.lock().expect("sim lock poisoned");
            let id = *next;
            *next += 1;
            id
        };
        let mut accounts = self.accounts.lock().expect("sim lock poisoned");
        let account = accounts
            .entry(address.to_string())
            .or_insert_with(SimAccount::fresh);
        account.sequence += 1;
        account.history.insert(
            0,
            TransactionRecord {
                id: id.to_string(),
                hash: hash.to_string(),
                created_at: Utc::now().to_rfc3339(),
                successful,
            },
        );
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedgerClient {
    async fn load_account(&self, address: &str) -> Result<AccountRecord> {
        let mut accounts = self.accounts.lock().expect("sim lock poisoned");
        let account = accounts
            .entry(address.to_string())
            .or_insert_with(SimAccount::fresh);
        Ok(AccountRecord {
            id: address.to_string(),
            sequence: account.sequence.to_string(),
            balances: vec![BalanceEntry {
                asset_type: "native".to_string(),
                balance: stroops_to_xlm(account.balance),
            }],
        })
    }

    async fn transactions_for_account(
        &self,
        address: &str,
        limit: u8,
    ) -> Result<Vec<TransactionRecord>> {
        let accounts = self.accounts.lock().expect("sim lock poisoned");
        Ok(accounts
            .get(address)
            .map(|a| a.history.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn cast_vote(&self, voter: &str, choice: VoteChoice) -> Result<TransactionResult> {
        tokio::time::sleep(self.latency).await;

        let hash = Self::synth_hash();
        debug!(voter, %choice, hash = %hash, "simulated vote");
        self.poll.record_vote(voter, choice, &hash);
        self.index_submission(voter, &hash, true);

        Ok(TransactionResult {
            hash,
            succeeded: true,
        })
    }

    async fn send_payment(
        &self,
        source: &str,
        destination: &str,
        amount_stroops: u64,
    ) -> Result<TransactionResult> {
        tokio::time::sleep(self.latency).await;

        let hash = Self::synth_hash();
        debug!(source, destination, amount_stroops, hash = %hash, "simulated payment");
        {
            let mut accounts = self.accounts.lock().expect("sim lock poisoned");
            let sender = accounts
                .entry(source.to_string())
                .or_insert_with(SimAccount::fresh);
            sender.balance = sender.balance.saturating_sub(amount_stroops);
            let recipient = accounts
                .entry(destination.to_string())
                .or_insert_with(SimAccount::fresh);
            recipient.balance = recipient.balance.saturating_add(amount_stroops);
        }
        self.index_submission(source, &hash, true);

        Ok(TransactionResult {
            hash,
            succeeded: true,
        })
    }
}
