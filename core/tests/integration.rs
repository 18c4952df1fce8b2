/// Integration tests driving the session facade end to end against the
/// simulated backend, with paused time so latencies and refresh intervals
/// are deterministic. One test at the bottom hits the real testnet and is
/// ignored by default; run with: cargo test -- --ignored
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stellar_vote_core::error::Result as WalletResult;
use stellar_vote_core::extension::{PublicKeyResponse, SignResponse, WalletExtension, WalletKind};
use stellar_vote_core::ledger::{
    LedgerClient, SimulatedLedgerClient, SIM_LATENCY, SIM_STARTING_BALANCE,
};
use stellar_vote_core::network::{AccountRecord, TransactionRecord, TransactionResult};
use stellar_vote_core::poll::{PollStore, Tallies, VoteChoice};
use stellar_vote_core::session::{SessionSnapshot, SessionStatus, UrlLauncher, WalletSession};
use stellar_vote_core::WalletError;

const ADDRESS: &str = "GABCDEFGHIJKLMNOPQRSTUVWXYZ234567ABCDEFGHIJKLMNOPQRSF7KL";

// -- Test doubles --

/// Extension fake: optionally rejects access or returns an empty key, and
/// counts access requests.
struct FakeExtension {
    address: Option<String>,
    reject_access: bool,
    access_requests: AtomicUsize,
}

impl FakeExtension {
    fn granting(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            reject_access: false,
            access_requests: AtomicUsize::new(0),
        }
    }

    fn rejecting() -> Self {
        Self {
            address: None,
            reject_access: true,
            access_requests: AtomicUsize::new(0),
        }
    }

    fn empty_key() -> Self {
        Self {
            address: None,
            reject_access: false,
            access_requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WalletExtension for FakeExtension {
    async fn is_connected(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn request_access(&self) -> anyhow::Result<()> {
        self.access_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_access {
            anyhow::bail!("User rejected the access request");
        }
        Ok(())
    }

    async fn get_public_key(&self) -> anyhow::Result<PublicKeyResponse> {
        Ok(PublicKeyResponse::Address(
            self.address.clone().unwrap_or_default(),
        ))
    }

    async fn sign_transaction(
        &self,
        envelope: &str,
        _network_passphrase: &str,
    ) -> anyhow::Result<SignResponse> {
        Ok(SignResponse::Envelope(format!("signed:{envelope}")))
    }
}

/// Ledger wrapper counting account loads and submissions.
struct InstrumentedLedger {
    sim: SimulatedLedgerClient,
    account_loads: AtomicUsize,
    submissions: AtomicUsize,
}

impl InstrumentedLedger {
    fn new(poll: Arc<PollStore>) -> Self {
        Self {
            sim: SimulatedLedgerClient::new(poll),
            account_loads: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LedgerClient for InstrumentedLedger {
    async fn load_account(&self, address: &str) -> WalletResult<AccountRecord> {
        self.account_loads.fetch_add(1, Ordering::SeqCst);
        self.sim.load_account(address).await
    }

    async fn transactions_for_account(
        &self,
        address: &str,
        limit: u8,
    ) -> WalletResult<Vec<TransactionRecord>> {
        self.sim.transactions_for_account(address, limit).await
    }

    async fn cast_vote(&self, voter: &str, choice: VoteChoice) -> WalletResult<TransactionResult> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.sim.cast_vote(voter, choice).await
    }

    async fn send_payment(
        &self,
        source: &str,
        destination: &str,
        amount_stroops: u64,
    ) -> WalletResult<TransactionResult> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.sim.send_payment(source, destination, amount_stroops).await
    }
}

struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl UrlLauncher for RecordingLauncher {
    fn open_url(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

struct Harness {
    session: WalletSession,
    extension: Arc<FakeExtension>,
    ledger: Arc<InstrumentedLedger>,
}

fn harness_with(extension: FakeExtension, poll: PollStore) -> Harness {
    let poll = Arc::new(poll);
    let extension = Arc::new(extension);
    let ledger = Arc::new(InstrumentedLedger::new(Arc::clone(&poll)));
    let session = WalletSession::new(
        Arc::clone(&extension) as Arc<dyn WalletExtension>,
        Arc::clone(&ledger) as Arc<dyn LedgerClient>,
        poll,
    );
    Harness {
        session,
        extension,
        ledger,
    }
}

fn harness() -> Harness {
    harness_with(FakeExtension::granting(ADDRESS), PollStore::seeded())
}

/// Let spawned refresh work run to completion under the paused clock.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// -- Connection lifecycle --

#[tokio::test(start_paused = true)]
async fn connect_establishes_session_and_fetches_state() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Connected);
    assert_eq!(snapshot.address.as_deref(), Some(ADDRESS));
    assert_eq!(snapshot.wallet_kind, Some(WalletKind::Freighter));
    assert_eq!(snapshot.last_error, None);

    // The immediate refresh lands once the task gets a turn.
    settle().await;
    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.balance, Some(SIM_STARTING_BALANCE));
}

#[tokio::test(start_paused = true)]
async fn rejected_access_classifies_and_stays_retryable() {
    let h = harness_with(FakeExtension::rejecting(), PollStore::seeded());
    h.session.connect(WalletKind::Freighter).await;

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(matches!(
        snapshot.last_error,
        Some(WalletError::UserRejected(_))
    ));
    assert_eq!(snapshot.address, None);

    // The session remains queryable and a retry goes through the handshake again.
    h.session.connect(WalletKind::Freighter).await;
    assert_eq!(h.extension.access_requests.load(Ordering::SeqCst), 2);
    assert_eq!(h.session.snapshot().status, SessionStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn empty_public_key_classifies_as_rejection() {
    let h = harness_with(FakeExtension::empty_key(), PollStore::seeded());
    h.session.connect(WalletKind::Freighter).await;

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(matches!(
        snapshot.last_error,
        Some(WalletError::UserRejected(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn connect_while_connected_is_a_noop() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    h.session.connect(WalletKind::Freighter).await;

    assert_eq!(h.extension.access_requests.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.snapshot().status, SessionStatus::Connected);
}

#[tokio::test(start_paused = true)]
async fn non_integrated_kind_hands_off_without_a_session() {
    let poll = Arc::new(PollStore::seeded());
    let extension = Arc::new(FakeExtension::granting(ADDRESS));
    let ledger = Arc::new(InstrumentedLedger::new(Arc::clone(&poll)));
    let launcher = Arc::new(RecordingLauncher {
        opened: Mutex::new(Vec::new()),
    });
    struct Fwd(Arc<RecordingLauncher>);
    impl UrlLauncher for Fwd {
        fn open_url(&self, url: &str) {
            self.0.open_url(url);
        }
    }
    let session = WalletSession::with_launcher(
        Arc::clone(&extension) as Arc<dyn WalletExtension>,
        ledger as Arc<dyn LedgerClient>,
        poll,
        Box::new(Fwd(Arc::clone(&launcher))),
    );

    session.connect(WalletKind::Albedo).await;
    session.connect(WalletKind::Xbull).await;

    assert_eq!(
        *launcher.opened.lock().unwrap(),
        vec!["https://albedo.link", "https://xbull.app"]
    );
    assert_eq!(session.snapshot(), SessionSnapshot::default());
    assert_eq!(extension.access_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn disconnect_twice_equals_disconnect_once() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    h.session.disconnect();
    let after_first = h.session.snapshot();
    h.session.disconnect();
    let after_second = h.session.snapshot();

    assert_eq!(after_first, after_second);
    assert_eq!(after_first, SessionSnapshot::default());
}

#[tokio::test(start_paused = true)]
async fn refresh_stops_on_disconnect() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;
    assert_eq!(h.ledger.account_loads.load(Ordering::SeqCst), 1);

    // Next periodic refresh fires at +15 s.
    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(h.ledger.account_loads.load(Ordering::SeqCst), 2);

    h.session.disconnect();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        h.ledger.account_loads.load(Ordering::SeqCst),
        2,
        "no refresh may fire against a disconnected session"
    );
}

// -- Voting --

#[tokio::test(start_paused = true)]
async fn end_to_end_demo_vote() {
    let h = harness_with(
        FakeExtension::granting(ADDRESS),
        PollStore::new(Tallies { yes: 47, no: 31 }),
    );
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    let started = tokio::time::Instant::now();
    let hash = h.session.vote(VoteChoice::Yes).await.unwrap();
    assert_eq!(started.elapsed(), SIM_LATENCY);

    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(h.session.tallies(), Tallies { yes: 48, no: 31 });
    let feed = h.session.feed();
    assert_eq!(feed[0].address, "GABC…F7KL");
    assert_eq!(feed[0].choice, VoteChoice::Yes);
    assert!(feed[0].is_new);
    assert_eq!(feed[0].hash, hash);
}

#[tokio::test(start_paused = true)]
async fn vote_yes_then_no_increments_each_tally_once() {
    let h = harness_with(
        FakeExtension::granting(ADDRESS),
        PollStore::new(Tallies { yes: 47, no: 31 }),
    );
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    h.session.vote(VoteChoice::Yes).await.unwrap();
    h.session.vote(VoteChoice::No).await.unwrap();

    assert_eq!(h.session.tallies(), Tallies { yes: 48, no: 32 });
    let feed = h.session.feed();
    assert_eq!(feed[0].choice, VoteChoice::No);
    assert_eq!(feed[1].choice, VoteChoice::Yes);
}

#[tokio::test(start_paused = true)]
async fn vote_without_connection_fails() {
    let h = harness();
    let err = h.session.vote(VoteChoice::Yes).await.unwrap_err();
    assert!(matches!(err, WalletError::Unknown(_)));
    assert_eq!(h.ledger.submissions.load(Ordering::SeqCst), 0);
}

// -- Sending --

#[tokio::test(start_paused = true)]
async fn send_rejects_invalid_destination_before_any_backend_call() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    let err = h.session.send("short-addr", "5").await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidDestination(_)));
    assert_eq!(h.ledger.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn send_rejects_bad_amounts_before_any_backend_call() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    for amount in ["abc", "0", "-1", ""] {
        let err = h.session.send(ADDRESS, amount).await.unwrap_err();
        assert!(
            matches!(err, WalletError::InvalidAmount(_)),
            "amount '{amount}' should be invalid, got {err:?}"
        );
    }
    assert_eq!(h.ledger.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn send_enforces_the_reserve_floor() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    // Simulated accounts hold 10 000 XLM; spending it all would breach the
    // 1 XLM reserve.
    let err = h.session.send(ADDRESS, "10000").await.unwrap_err();
    assert!(matches!(err, WalletError::InsufficientBalance(_)));
    assert_eq!(h.ledger.submissions.load(Ordering::SeqCst), 0);

    assert_eq!(h.session.spendable(), SIM_STARTING_BALANCE - 10_000_000);
}

#[tokio::test(start_paused = true)]
async fn send_schedules_follow_up_refreshes() {
    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;
    assert_eq!(h.ledger.account_loads.load(Ordering::SeqCst), 1);

    // The send completes after the simulated latency (t = 1.5 s).
    let hash = h.session.send(ADDRESS, "2.5").await.unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(h.ledger.submissions.load(Ordering::SeqCst), 1);

    // Follow-ups land at +2 s and +6 s after the send.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(h.ledger.account_loads.load(Ordering::SeqCst), 2);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(h.ledger.account_loads.load(Ordering::SeqCst), 3);

    // The refreshed history picks up the submitted payment.
    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.history[0].hash, hash);
}

#[tokio::test(start_paused = true)]
async fn send_without_connection_fails() {
    let h = harness();
    let err = h.session.send(ADDRESS, "1").await.unwrap_err();
    assert!(matches!(err, WalletError::Unknown(_)));
}

// -- Command layer --

#[tokio::test(start_paused = true)]
async fn command_flow_connect_vote_results() {
    use stellar_vote_core::Command;

    let h = harness_with(
        FakeExtension::granting(ADDRESS),
        PollStore::new(Tallies { yes: 47, no: 31 }),
    );

    let out = Command::parse("connect")
        .unwrap()
        .execute(&h.session, false)
        .await
        .unwrap();
    assert!(out.contains("Connected"));
    settle().await;

    let out = Command::parse("vote yes")
        .unwrap()
        .execute(&h.session, false)
        .await
        .unwrap();
    assert!(out.contains("Vote recorded"));
    assert!(out.contains("YES 48"));

    let results = Command::parse("results")
        .unwrap()
        .execute(&h.session, true)
        .await
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&results).unwrap();
    assert_eq!(v["yes"], 48);
    assert_eq!(v["no"], 31);
    assert_eq!(v["yes_percent"], 61);
}

#[tokio::test(start_paused = true)]
async fn command_flow_send_error_reaches_the_caller() {
    use stellar_vote_core::Command;

    let h = harness();
    h.session.connect(WalletKind::Freighter).await;
    settle().await;

    let err = Command::parse("send short-addr 5")
        .unwrap()
        .execute(&h.session, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid destination"));
}

// -- Real network (ignored by default) --

#[tokio::test]
#[ignore]
async fn testnet_unfunded_account_lookup_fails() {
    use stellar_vote_core::config::NetworkConfig;
    use stellar_vote_core::HorizonClient;

    let client = HorizonClient::new(&NetworkConfig::default(), false)
        .expect("failed to create testnet client");

    // A syntactically valid address that has never been funded: the ledger
    // reports it as missing.
    let unfunded = format!("G{}", "A".repeat(55));
    let result = client.load_account(&unfunded).await;
    assert!(result.is_err(), "unfunded account should not resolve");
}
