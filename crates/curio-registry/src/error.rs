//! Error types for registry operations.

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur in the token registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Invalid address format.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the address error.
        message: String,
    },

    /// Token id is not known to the registry.
    #[error("unknown token: {0}")]
    UnknownToken(u64),

    /// A transfer was attempted by someone other than the current holder.
    #[error("token {token} is not held by {claimed}")]
    NotTokenOwner {
        /// The token being transferred.
        token: u64,
        /// The address that claimed to hold it.
        claimed: String,
    },

    /// No metadata stored under the given pointer.
    #[error("metadata not found: {0}")]
    MetadataNotFound(String),

    /// Wallet/keypair error.
    #[error("wallet error: {message}")]
    WalletError {
        /// Description of the wallet error.
        message: String,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Create an invalid address error.
    #[must_use]
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Create a wallet error.
    #[must_use]
    pub fn wallet_error(message: impl Into<String>) -> Self {
        Self::WalletError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_token_display() {
        let err = RegistryError::UnknownToken(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn not_token_owner_display() {
        let err = RegistryError::NotTokenOwner {
            token: 7,
            claimed: "abc123".to_string(),
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn invalid_address_display() {
        let err = RegistryError::invalid_address("bad format");
        assert!(err.to_string().contains("bad format"));
    }
}
