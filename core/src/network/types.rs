use serde::Deserialize;

use crate::display::parse_xlm_amount;

/// One balance line of an account record. The native currency is identified
/// by its `asset_type` tag.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BalanceEntry {
    pub asset_type: String,
    pub balance: String,
}

/// Account snapshot as returned by the ledger's account-lookup resource.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

impl AccountRecord {
    /// The native-currency balance in stroops. An account without a native
    /// balance entry (or with an unparseable one) reads as zero.
    #[must_use]
    pub fn native_balance(&self) -> u64 {
        self.balances
            .iter()
            .find(|b| b.asset_type == "native")
            .and_then(|b| parse_xlm_amount(&b.balance).ok())
            .unwrap_or(0)
    }
}

/// One entry of an account's transaction history.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: String,
    pub hash: String,
    pub created_at: String,
    pub successful: bool,
}

/// Paged transaction-history response.
#[derive(Debug, Deserialize)]
pub(super) struct TransactionsPage {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedRecords,
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbeddedRecords {
    pub records: Vec<TransactionRecord>,
}

/// Successful submission reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubmitResponse {
    pub hash: String,
}

/// Normalized outcome of a submission, identical in shape from both backends.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    /// 64 lowercase hex characters.
    pub hash: String,
    pub succeeded: bool,
}
