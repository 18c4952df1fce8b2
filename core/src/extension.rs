/// Wallet-extension contract: the three operations the core calls on a
/// connected wallet product, plus normalization of its loosely-typed replies.
///
use async_trait::async_trait;
use serde::Deserialize;

/// Wallet products selectable from the connect panel. Only Freighter
/// implements the full extension contract; the others hand off to their
/// own site and never establish a session here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    Freighter,
    Albedo,
    Xbull,
}

impl WalletKind {
    /// Whether this product speaks the extension contract directly.
    #[must_use]
    pub fn is_integrated(&self) -> bool {
        matches!(self, WalletKind::Freighter)
    }

    /// The product site opened for non-integrated kinds.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&'static str> {
        match self {
            WalletKind::Freighter => None,
            WalletKind::Albedo => Some("https://albedo.link"),
            WalletKind::Xbull => Some("https://xbull.app"),
        }
    }
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKind::Freighter => write!(f, "freighter"),
            WalletKind::Albedo => write!(f, "albedo"),
            WalletKind::Xbull => write!(f, "xbull"),
        }
    }
}

impl std::str::FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "freighter" => Ok(WalletKind::Freighter),
            "albedo" => Ok(WalletKind::Albedo),
            "xbull" => Ok(WalletKind::Xbull),
            other => Err(format!(
                "Unknown wallet '{other}'. Use 'freighter', 'albedo', or 'xbull'."
            )),
        }
    }
}

/// Reply to a public-key request: either a bare address string or a
/// structured object carrying one. Normalized via [`Self::into_address`]
/// immediately at the boundary; the ambiguous shape never leaks further.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PublicKeyResponse {
    Address(String),
    Structured {
        #[serde(rename = "publicKey")]
        public_key: Option<String>,
    },
}

impl PublicKeyResponse {
    /// The connected address, if the reply carried a non-empty one.
    #[must_use]
    pub fn into_address(self) -> Option<String> {
        let addr = match self {
            PublicKeyResponse::Address(s) => Some(s),
            PublicKeyResponse::Structured { public_key } => public_key,
        };
        addr.filter(|s| !s.is_empty())
    }
}

/// Reply to a signing request: a bare signed envelope or a structured
/// response containing one under `signedTxXdr` or `result`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SignResponse {
    Envelope(String),
    Structured {
        #[serde(rename = "signedTxXdr")]
        signed_tx_xdr: Option<String>,
        result: Option<String>,
    },
}

impl SignResponse {
    /// The signed envelope, if the reply carried a non-empty one.
    #[must_use]
    pub fn into_signed(self) -> Option<String> {
        let signed = match self {
            SignResponse::Envelope(s) => Some(s),
            SignResponse::Structured {
                signed_tx_xdr,
                result,
            } => signed_tx_xdr.or(result),
        };
        signed.filter(|s| !s.is_empty())
    }
}

/// The operations the core calls on a wallet extension. Implementations
/// live outside this crate (browser bridge, interactive prompt, test fake).
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Best-effort capability probe; callers ignore failures.
    async fn is_connected(&self) -> anyhow::Result<bool>;

    /// Ask the extension to grant this origin access. May fail with a
    /// user rejection.
    async fn request_access(&self) -> anyhow::Result<()>;

    /// The connected account's address.
    async fn get_public_key(&self) -> anyhow::Result<PublicKeyResponse>;

    /// Sign a serialized transaction envelope for the named network.
    async fn sign_transaction(
        &self,
        envelope: &str,
        network_passphrase: &str,
    ) -> anyhow::Result<SignResponse>;
}
