/// Transaction envelope construction.
///
/// Envelopes carry a single operation, a fixed base fee, the source account's
/// next sequence number, a 30-second validity window, and the passphrase of
/// the network they are valid on. The encoded form is an opaque base64 string
/// handed to the wallet extension for signing and to the ledger for
/// submission; neither side inspects it here.
use anyhow::{Context, Result};
use base64ct::{Base64, Encoding};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::network::AccountRecord;

/// Fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Seconds until a built envelope expires.
pub const TX_VALIDITY_SECS: i64 = 30;

/// The single operation an envelope carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Native-currency payment, amount in stroops.
    Payment { destination: String, amount: u64 },
    /// Contract call with the caller's address as sole argument.
    InvokeContract {
        contract_id: String,
        function: String,
        argument: String,
    },
}

/// Validity window baked into the envelope itself, as Unix seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeBounds {
    pub min_time: i64,
    pub max_time: i64,
}

/// A fully-built, unsigned transaction envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionEnvelope {
    pub source: String,
    pub sequence: u64,
    pub fee: u32,
    pub time_bounds: TimeBounds,
    pub network_passphrase: String,
    pub operation: Operation,
}

impl TransactionEnvelope {
    /// Serialize to the base64 wire form consumed by the extension and ledger.
    pub fn encode(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self).context("Failed to serialize envelope")?;
        Ok(Base64::encode_string(&bytes))
    }

    /// Parse an encoded envelope back into its structured form.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = Base64::decode_vec(encoded)
            .map_err(|e| anyhow::anyhow!("Invalid envelope encoding: {e}"))?;
        serde_json::from_slice(&bytes).context("Failed to parse envelope")
    }
}

/// Builds a single-operation envelope against a loaded source account.
pub struct EnvelopeBuilder<'a> {
    account: &'a AccountRecord,
    network_passphrase: String,
    operation: Option<Operation>,
}

impl<'a> EnvelopeBuilder<'a> {
    pub fn new(account: &'a AccountRecord, network_passphrase: &str) -> Self {
        Self {
            account,
            network_passphrase: network_passphrase.to_string(),
            operation: None,
        }
    }

    /// Add a native-currency payment operation.
    pub fn payment(mut self, destination: &str, amount_stroops: u64) -> Self {
        self.operation = Some(Operation::Payment {
            destination: destination.to_string(),
            amount: amount_stroops,
        });
        self
    }

    /// Add a contract-call operation with the caller address as argument.
    pub fn contract_call(mut self, contract_id: &str, function: &str, caller: &str) -> Self {
        self.operation = Some(Operation::InvokeContract {
            contract_id: contract_id.to_string(),
            function: function.to_string(),
            argument: caller.to_string(),
        });
        self
    }

    /// Finish the envelope: next sequence, base fee, 30-second window.
    pub fn build(self) -> Result<TransactionEnvelope> {
        let operation = self
            .operation
            .context("Envelope requires exactly one operation")?;
        let sequence: u64 = self
            .account
            .sequence
            .parse()
            .with_context(|| format!("Invalid account sequence '{}'", self.account.sequence))?;
        let now = Utc::now().timestamp();

        Ok(TransactionEnvelope {
            source: self.account.id.clone(),
            sequence: sequence + 1,
            fee: BASE_FEE,
            time_bounds: TimeBounds {
                min_time: 0,
                max_time: now + TX_VALIDITY_SECS,
            },
            network_passphrase: self.network_passphrase,
            operation,
        })
    }
}
