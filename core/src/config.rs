/// Network and backend configuration for the poll client.
use serde::{Deserialize, Serialize};

/// Contract hosting the two-option poll (`vote_yes` / `vote_no`).
pub const CONTRACT_ID: &str = "CBYP7L3KXYZABCDEF1234567890EXAMPLECONTRACTADDRESS1234567";

const TESTNET_HORIZON: &str = "https://horizon-testnet.stellar.org";
const PUBNET_HORIZON: &str = "https://horizon.stellar.org";

const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
const PUBNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Pubnet,
    Custom,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Pubnet => write!(f, "pubnet"),
            Network::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub network: Network,
    /// Horizon endpoint for `Network::Custom`.
    pub custom_url: Option<String>,
    /// Signing passphrase for `Network::Custom`; defaults to the testnet
    /// passphrase when unset (custom endpoints here are test deployments).
    pub custom_passphrase: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            custom_url: None,
            custom_passphrase: None,
        }
    }
}

impl NetworkConfig {
    /// The Horizon base URL for this network. `None` for Custom without a URL.
    pub fn horizon_url(&self) -> Option<&str> {
        match self.network {
            Network::Testnet => Some(TESTNET_HORIZON),
            Network::Pubnet => Some(PUBNET_HORIZON),
            Network::Custom => self.custom_url.as_deref(),
        }
    }

    /// The network passphrase every transaction envelope is bound to.
    pub fn passphrase(&self) -> &str {
        match self.network {
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Pubnet => PUBNET_PASSPHRASE,
            Network::Custom => self
                .custom_passphrase
                .as_deref()
                .unwrap_or(TESTNET_PASSPHRASE),
        }
    }
}

/// Which ledger backend the session dispatches transactions to.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum BackendMode {
    /// In-process simulator; never touches network or extension.
    #[default]
    Demo,
    /// Horizon + wallet extension.
    Real,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Demo => write!(f, "demo"),
            BackendMode::Real => write!(f, "real"),
        }
    }
}
