/// Wallet-extension adapters for the terminal.
///
/// The demo backend auto-approves with a fixed address; the real backend
/// walks the user through access, address entry, and envelope signing at
/// the prompt (paste-based signing, the terminal equivalent of approving
/// in the extension popup).
use std::io::Write;

use async_trait::async_trait;
use stellar_vote_core::extension::{PublicKeyResponse, SignResponse, WalletExtension};

/// Auto-approving extension for the demo backend.
pub struct StubExtension {
    address: String,
}

impl StubExtension {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletExtension for StubExtension {
    async fn is_connected(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn request_access(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_public_key(&self) -> anyhow::Result<PublicKeyResponse> {
        Ok(PublicKeyResponse::Address(self.address.clone()))
    }

    async fn sign_transaction(
        &self,
        envelope: &str,
        _network_passphrase: &str,
    ) -> anyhow::Result<SignResponse> {
        Ok(SignResponse::Envelope(format!("signed:{envelope}")))
    }
}

/// Interactive extension for the real backend: every operation is approved
/// and answered at the terminal.
pub struct PromptExtension;

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[async_trait]
impl WalletExtension for PromptExtension {
    async fn is_connected(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn request_access(&self) -> anyhow::Result<()> {
        let answer = prompt_line("Grant this client access to your wallet? [y/N]: ")?;
        if !answer.eq_ignore_ascii_case("y") {
            anyhow::bail!("User rejected the access request");
        }
        Ok(())
    }

    async fn get_public_key(&self) -> anyhow::Result<PublicKeyResponse> {
        let address = prompt_line("Wallet address (G…): ")?;
        Ok(PublicKeyResponse::Address(address))
    }

    async fn sign_transaction(
        &self,
        envelope: &str,
        network_passphrase: &str,
    ) -> anyhow::Result<SignResponse> {
        println!("Sign this envelope for network '{network_passphrase}':");
        println!("  {envelope}");
        let signed = prompt_line("Paste the signed envelope (or the wallet's JSON reply): ")?;

        // Wallets reply with either the bare signed envelope or a JSON
        // object carrying it; both shapes are normalized downstream.
        if signed.starts_with('{') {
            let response = serde_json::from_str::<SignResponse>(&signed)
                .map_err(|e| anyhow::anyhow!("Unparseable signing reply: {e}"))?;
            return Ok(response);
        }
        Ok(SignResponse::Envelope(signed))
    }
}
