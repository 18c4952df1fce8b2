use anyhow::{bail, Context, Result};

use super::types::{TransactionRecord, TransactionsPage};
use super::HorizonClient;

impl HorizonClient {
    /// Query the most recent transactions involving the given address,
    /// newest first.
    pub async fn transactions_for_account(
        &self,
        address: &str,
        limit: u8,
    ) -> Result<Vec<TransactionRecord>> {
        let url = format!(
            "{}/accounts/{address}/transactions?order=desc&limit={limit}",
            self.base_url
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query transactions")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Transaction history lookup failed ({status}): {body}");
        }

        let page = response
            .json::<TransactionsPage>()
            .await
            .context("Failed to parse transaction history")?;

        Ok(page.embedded.records)
    }
}
