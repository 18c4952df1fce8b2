/// Thin wrapper around the ledger's REST API for account and submission
/// operations.
mod history;
mod types;

pub use types::*;

use anyhow::{bail, Context, Result};

use crate::config::NetworkConfig;

pub struct HorizonClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: String,
}

/// Reject non-HTTPS endpoints unless `allow_insecure` is set.
fn validate_endpoint_url(url: &str, allow_insecure: bool) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://") {
        if allow_insecure {
            return Ok(());
        }
        bail!("Refusing to connect over plain HTTP: {url}\nUse --insecure to allow unencrypted connections.");
    }
    bail!("Invalid endpoint URL scheme: {url}\nExpected an https:// URL.");
}

impl HorizonClient {
    pub fn new(config: &NetworkConfig, allow_insecure: bool) -> Result<Self> {
        let url = config
            .horizon_url()
            .ok_or_else(|| anyhow::anyhow!("Custom network requires an endpoint URL"))?;
        validate_endpoint_url(url, allow_insecure)?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Load an account record (balances + sequence) by address.
    pub async fn load_account(&self, address: &str) -> Result<AccountRecord> {
        let url = format!("{}/accounts/{address}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query account")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Account lookup failed ({status}): {body}");
        }

        response
            .json::<AccountRecord>()
            .await
            .context("Failed to parse account record")
    }

    /// Submit a signed transaction envelope and return the ledger's reply.
    pub async fn submit_transaction(&self, signed_envelope: &str) -> Result<SubmitResponse> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("tx", signed_envelope)])
            .send()
            .await
            .context("Failed to submit transaction")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Transaction submission failed ({status}): {body}");
        }

        response
            .json::<SubmitResponse>()
            .await
            .context("Failed to parse submission reply")
    }
}
