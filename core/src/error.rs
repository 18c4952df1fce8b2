//! Domain error type for wallet and poll operations.

use thiserror::Error;

/// Typed error enum for wallet operations, allowing callers to match on
/// specific failure modes instead of inspecting opaque message strings.
///
/// Every variant is user-facing: raw extension/network failures are mapped
/// into one of these at the submission boundary and never propagate as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    /// Extension or signature request denied/cancelled by the user.
    #[error("{0}")]
    UserRejected(String),

    /// Wallet extension absent or its API surface not resolvable.
    #[error("{0}")]
    WalletNotFound(String),

    /// Extension connected to the wrong ledger network.
    #[error("{0}")]
    NetworkMismatch(String),

    /// Malformed recipient address, rejected before any network call.
    #[error("{0}")]
    InvalidDestination(String),

    /// Non-positive or unparseable amount, rejected before any network call.
    #[error("{0}")]
    InvalidAmount(String),

    /// Requested spend would breach the reserve floor.
    #[error("{0}")]
    InsufficientBalance(String),

    /// Signing produced no usable signed payload.
    #[error("{0}")]
    SubmissionRejected(String),

    /// Any other failure, passed through with its original message.
    #[error("{0}")]
    Unknown(String),
}

impl WalletError {
    /// Classify a raw extension/network failure message by keyword.
    ///
    /// Validation errors (`InvalidDestination`, `InvalidAmount`,
    /// `InsufficientBalance`) are constructed directly at the check site and
    /// never go through this path.
    pub fn classify(msg: impl AsRef<str>) -> Self {
        let msg = msg.as_ref();
        let lower = msg.to_lowercase();
        if lower.contains("reject") || lower.contains("denied") || lower.contains("cancel") {
            WalletError::UserRejected(format!("Request rejected by the user: {msg}"))
        } else if lower.contains("network") || lower.contains("passphrase") {
            WalletError::NetworkMismatch(format!("Wallet is on the wrong network: {msg}"))
        } else if lower.contains("install") || lower.contains("found") {
            WalletError::WalletNotFound(format!("Wallet extension not available: {msg}"))
        } else {
            WalletError::Unknown(msg.to_string())
        }
    }
}

impl From<anyhow::Error> for WalletError {
    fn from(err: anyhow::Error) -> Self {
        WalletError::classify(format!("{err:#}"))
    }
}

/// Alias for `std::result::Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_keywords_classify_as_user_rejected() {
        for msg in ["User rejected request", "access denied", "Cancelled by user"] {
            assert!(
                matches!(WalletError::classify(msg), WalletError::UserRejected(_)),
                "{msg} should classify as UserRejected"
            );
        }
    }

    #[test]
    fn network_keywords_classify_as_mismatch() {
        assert!(matches!(
            WalletError::classify("wrong network passphrase"),
            WalletError::NetworkMismatch(_)
        ));
        assert!(matches!(
            WalletError::classify("Network mismatch: expected TESTNET"),
            WalletError::NetworkMismatch(_)
        ));
    }

    #[test]
    fn missing_extension_classifies_as_wallet_not_found() {
        assert!(matches!(
            WalletError::classify("Freighter is not installed"),
            WalletError::WalletNotFound(_)
        ));
        assert!(matches!(
            WalletError::classify("extension API not found"),
            WalletError::WalletNotFound(_)
        ));
    }

    #[test]
    fn unrecognized_message_passes_through_unknown() {
        let err = WalletError::classify("tx_bad_seq");
        assert_eq!(err, WalletError::Unknown("tx_bad_seq".into()));
    }

    #[test]
    fn rejection_takes_priority_over_not_found() {
        // A message matching several keyword sets classifies by the first arm.
        assert!(matches!(
            WalletError::classify("request rejected, extension not found"),
            WalletError::UserRejected(_)
        ));
    }

    #[test]
    fn anyhow_conversion_classifies_the_full_chain() {
        let err = anyhow::anyhow!("user denied access").context("Connection handshake failed");
        let classified: WalletError = err.into();
        assert!(matches!(classified, WalletError::UserRejected(_)));
    }
}
