//! Error types for marketplace operations.

use crate::item::ItemId;
use curio_registry::RegistryError;
use thiserror::Error;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors that can occur in marketplace operations.
///
/// Every precondition failure aborts the whole operation before any state
/// mutation or fund movement; partial effects are never committed.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Asking price must be at least one base unit.
    #[error("asking price must be at least 1 base unit")]
    InvalidPrice,

    /// The attached listing fee does not match the required fee exactly.
    #[error("listing fee mismatch: required {required}, paid {paid}")]
    FeeMismatch {
        /// The fee the ledger currently requires.
        required: u64,
        /// The fee the caller attached.
        paid: u64,
    },

    /// The attached payment does not match the asking price exactly.
    #[error("price mismatch: asking {asking}, paid {paid}")]
    PriceMismatch {
        /// The listing's asking price.
        asking: u64,
        /// The amount the caller attached.
        paid: u64,
    },

    /// No item with the given id.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The item was already sold; sold records are terminal.
    #[error("item already sold: {0}")]
    AlreadySold(ItemId),

    /// Owner-gated accessor called by a non-owner.
    #[error("only the owner can do this")]
    Unauthorized,

    /// Token registry operation failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_mismatch_display() {
        let err = MarketError::FeeMismatch {
            required: 25,
            paid: 30,
        };
        assert!(err.to_string().contains("25"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn price_mismatch_display() {
        let err = MarketError::PriceMismatch {
            asking: 1000,
            paid: 999,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn registry_error_converts() {
        let err: MarketError = RegistryError::UnknownToken(4).into();
        assert!(matches!(err, MarketError::Registry(_)));
        assert!(err.to_string().contains("unknown token"));
    }
}
