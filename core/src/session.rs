//! Wallet session lifecycle: the single facade the presentation layer
//! consumes. Owns the connection state machine, mediates validation and
//! backend dispatch, and is the only owner of the background refresh task.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::display::parse_xlm_amount;
use crate::error::{Result, WalletError};
use crate::extension::{WalletExtension, WalletKind};
use crate::ledger::LedgerClient;
use crate::network::TransactionRecord;
use crate::poll::{ActivityEntry, PollStore, Tallies, VoteChoice};
use crate::sync::{refresh_account, POST_SEND_REFRESH_DELAYS, REFRESH_INTERVAL};
use crate::validate::{is_valid_address, max_spendable};

/// Connection lifecycle state. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Connecting => write!(f, "connecting"),
            SessionStatus::Connected => write!(f, "connected"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

/// Point-in-time copy of the session. `address` and `wallet_kind` are
/// present iff the status is `Connected`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub address: Option<String>,
    pub wallet_kind: Option<WalletKind>,
    /// Native balance in stroops; `None` until the first successful fetch.
    pub balance: Option<u64>,
    /// At most six records, newest first.
    pub history: Vec<TransactionRecord>,
    pub last_error: Option<WalletError>,
}

/// Opens a wallet product's site for the non-integrated kinds.
pub trait UrlLauncher: Send + Sync {
    fn open_url(&self, url: &str);
}

/// Default launcher: records the hand-off in the log and does nothing else.
pub struct LogOnlyLauncher;

impl UrlLauncher for LogOnlyLauncher {
    fn open_url(&self, url: &str) {
        info!(url, "wallet hand-off requested");
    }
}

struct SessionInner {
    state: Mutex<SessionSnapshot>,
    extension: Arc<dyn WalletExtension>,
    ledger: Arc<dyn LedgerClient>,
    poll: Arc<PollStore>,
    launcher: Box<dyn UrlLauncher>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn state(&self) -> MutexGuard<'_, SessionSnapshot> {
        self.state.lock().expect("session state lock poisoned")
    }

    fn connected_to(&self, address: &str) -> bool {
        let state = self.state();
        state.status == SessionStatus::Connected && state.address.as_deref() == Some(address)
    }

    /// One refresh cycle against the configured ledger. Applies only the
    /// parts that fetched successfully (last writer wins), and only while
    /// the session is still connected to the same address.
    async fn refresh(inner: &Arc<Self>, address: &str) {
        if !inner.connected_to(address) {
            return;
        }
        let (balance, history) = refresh_account(inner.ledger.as_ref(), address).await;
        let mut state = inner.state();
        if state.status != SessionStatus::Connected || state.address.as_deref() != Some(address) {
            return;
        }
        if let Some(balance) = balance {
            state.balance = Some(balance);
        }
        if let Some(history) = history {
            state.history = history;
        }
    }
}

/// The active wallet session. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<SessionInner>,
}

impl WalletSession {
    pub fn new(
        extension: Arc<dyn WalletExtension>,
        ledger: Arc<dyn LedgerClient>,
        poll: Arc<PollStore>,
    ) -> Self {
        Self::with_launcher(extension, ledger, poll, Box::new(LogOnlyLauncher))
    }

    /// A session with a custom hand-off launcher for non-integrated kinds.
    pub fn with_launcher(
        extension: Arc<dyn WalletExtension>,
        ledger: Arc<dyn LedgerClient>,
        poll: Arc<PollStore>,
        launcher: Box<dyn UrlLauncher>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionSnapshot::default()),
                extension,
                ledger,
                poll,
                launcher,
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Connect a wallet. Never returns an error: failures are classified and
    /// stored in the snapshot's `last_error` with status `Error`.
    ///
    /// Non-integrated kinds hand off to the product's site; the session
    /// stays untouched. A connect while already connected is a no-op
    /// (disconnect first to switch wallets).
    pub async fn connect(&self, kind: WalletKind) {
        if !kind.is_integrated() {
            if let Some(url) = kind.redirect_url() {
                self.inner.launcher.open_url(url);
            }
            return;
        }

        {
            let mut state = self.inner.state();
            if state.status == SessionStatus::Connected {
                return;
            }
            state.status = SessionStatus::Connecting;
            state.last_error = None;
        }

        match self.handshake().await {
            Ok(address) => {
                info!(address = %address, %kind, "wallet connected");
                {
                    let mut state = self.inner.state();
                    state.status = SessionStatus::Connected;
                    state.address = Some(address.clone());
                    state.wallet_kind = Some(kind);
                }
                self.start_refresh_task(address);
            }
            Err(err) => {
                warn!(error = %err, "wallet connection failed");
                let mut state = self.inner.state();
                state.status = SessionStatus::Error;
                state.last_error = Some(err);
            }
        }
    }

    async fn handshake(&self) -> Result<String> {
        // Capability probe; failures are ignored by contract.
        let _ = self.inner.extension.is_connected().await;

        self.inner.extension.request_access().await?;
        self.inner
            .extension
            .get_public_key()
            .await?
            .into_address()
            .ok_or_else(|| {
                WalletError::UserRejected("Connection rejected by the user".to_string())
            })
    }

    /// Tear down the session: stop the refresh task and reset every field.
    /// Synchronous, idempotent, always succeeds.
    pub fn disconnect(&self) {
        if let Some(handle) = self
            .inner
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned")
            .take()
        {
            handle.abort();
        }
        *self.inner.state() = SessionSnapshot::default();
    }

    /// Send a native-currency payment. Destination, amount, and the reserve
    /// floor are validated before any backend dispatch.
    pub async fn send(&self, destination: &str, amount: &str) -> Result<String> {
        let (source, balance) = {
            let state = self.inner.state();
            match (state.status, state.address.clone()) {
                (SessionStatus::Connected, Some(address)) => {
                    (address, state.balance.unwrap_or(0))
                }
                _ => return Err(WalletError::Unknown("Wallet not connected".to_string())),
            }
        };

        if !is_valid_address(destination) {
            return Err(WalletError::InvalidDestination(
                "Invalid destination address".to_string(),
            ));
        }
        let stroops = parse_xlm_amount(amount).map_err(WalletError::InvalidAmount)?;
        if stroops == 0 {
            return Err(WalletError::InvalidAmount(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if stroops > max_spendable(balance) {
            return Err(WalletError::InsufficientBalance(
                "Insufficient balance (1 XLM reserve required)".to_string(),
            ));
        }

        let result = self
            .inner
            .ledger
            .send_payment(&source, destination, stroops)
            .await?;
        self.schedule_post_send_refresh(source);
        Ok(result.hash)
    }

    /// Cast a vote on behalf of the connected address.
    pub async fn vote(&self, choice: VoteChoice) -> Result<String> {
        let voter = {
            let state = self.inner.state();
            match (state.status, state.address.clone()) {
                (SessionStatus::Connected, Some(address)) => address,
                _ => return Err(WalletError::Unknown("Wallet not connected".to_string())),
            }
        };

        let result = self.inner.ledger.cast_vote(&voter, choice).await?;
        Ok(result.hash)
    }

    /// The full session snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state().clone()
    }

    /// The largest amount currently spendable without breaching the reserve.
    pub fn spendable(&self) -> u64 {
        max_spendable(self.inner.state().balance.unwrap_or(0))
    }

    /// Current poll tallies (snapshot copy).
    pub fn tallies(&self) -> Tallies {
        self.inner.poll.tallies()
    }

    /// Current activity feed, newest first (snapshot copy).
    pub fn feed(&self) -> Vec<ActivityEntry> {
        self.inner.poll.feed()
    }

    /// Start (or restart) the periodic refresh loop for `address`. The task
    /// fetches immediately, then on the fixed interval, until aborted by
    /// [`Self::disconnect`].
    fn start_refresh_task(&self, address: String) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            loop {
                interval.tick().await;
                SessionInner::refresh(&inner, &address).await;
            }
        });

        let mut slot = self
            .inner
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned");
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// One-shot refreshes after a send, offset to let the ledger index the
    /// new transaction. Each re-checks connectivity before writing, so a
    /// disconnect in the meantime makes them no-ops.
    fn schedule_post_send_refresh(&self, address: String) {
        for delay in POST_SEND_REFRESH_DELAYS {
            let inner = Arc::clone(&self.inner);
            let address = address.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                SessionInner::refresh(&inner, &address).await;
            });
        }
    }
}
