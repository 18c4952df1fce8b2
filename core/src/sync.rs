//! Account-state refresh: balance and recent history for the active session.
//!
//! Fetch failures are logged and skipped; they never disturb session state
//! or replace previously cached values. Stale-but-present data is preferred
//! over blanking the display.

use std::time::Duration;

use tracing::warn;

use crate::ledger::LedgerClient;
use crate::network::TransactionRecord;

/// How often a connected session refreshes its account state.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Follow-up refresh delays after a successful send, to pick up the
/// just-submitted transaction once the ledger indexes it.
pub const POST_SEND_REFRESH_DELAYS: [Duration; 2] =
    [Duration::from_secs(2), Duration::from_secs(6)];

/// Number of history entries kept per refresh.
pub const HISTORY_LIMIT: u8 = 6;

/// One refresh cycle: fetch the account's native balance (stroops) and its
/// recent history. Each part is `None` if its fetch failed; the caller
/// applies only the parts that succeeded.
pub(crate) async fn refresh_account(
    ledger: &dyn LedgerClient,
    address: &str,
) -> (Option<u64>, Option<Vec<TransactionRecord>>) {
    let (account, history) = futures::join!(
        ledger.load_account(address),
        ledger.transactions_for_account(address, HISTORY_LIMIT),
    );

    let balance = match account {
        Ok(account) => Some(account.native_balance()),
        Err(err) => {
            warn!(address, error = %err, "balance refresh failed; keeping cached value");
            None
        }
    };

    let history = match history {
        Ok(records) => Some(records),
        Err(err) => {
            warn!(address, error = %err, "history refresh failed; keeping cached value");
            None
        }
    };

    (balance, history)
}
