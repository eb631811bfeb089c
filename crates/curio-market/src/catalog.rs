//! Display decoration for query results.
//!
//! The presentation layer joins view output with off-chain metadata before
//! rendering. This is strictly cosmetic: the ledger never consults metadata
//! for any invariant, and a metadata outage cannot affect listings or sales.

use crate::error::Result;
use crate::item::MarketItem;
use curio_registry::{MetadataPointer, MetadataStore, Registry, RegistryError, TokenMetadata};
use serde::{Deserialize, Serialize};

/// Anything that can resolve a metadata pointer to a displayable description.
///
/// The in-process [`MetadataStore`] implements this; a real deployment would
/// plug in its content-addressed blob store.
pub trait MetadataFetcher {
    /// Fetch the metadata stored under `pointer`.
    ///
    /// # Errors
    ///
    /// Returns a registry error if the pointer cannot be resolved.
    fn fetch(&self, pointer: &MetadataPointer) -> std::result::Result<TokenMetadata, RegistryError>;
}

impl MetadataFetcher for MetadataStore {
    fn fetch(&self, pointer: &MetadataPointer) -> std::result::Result<TokenMetadata, RegistryError> {
        MetadataStore::fetch(self, pointer)
    }
}

/// A view record joined with its decoded metadata, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCard {
    /// The underlying ledger record.
    pub item: MarketItem,
    /// The asset's displayable description.
    pub metadata: TokenMetadata,
}

/// Decorate view output with metadata resolved through `fetcher`.
///
/// Order is preserved from the input.
///
/// # Errors
///
/// Returns a registry error if a token or its metadata cannot be resolved.
pub fn decorate(
    registry: &Registry,
    fetcher: &impl MetadataFetcher,
    items: Vec<MarketItem>,
) -> Result<Vec<ListingCard>> {
    let mut cards = Vec::with_capacity(items.len());
    for item in items {
        let pointer = registry.metadata_of(item.token_id)?;
        let metadata = fetcher.fetch(&pointer)?;
        cards.push(ListingCard { item, metadata });
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use crate::ledger::MarketLedger;
    use curio_registry::{Address, Wallet};

    const FEE: u64 = 25;

    fn addr() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    #[test]
    fn decorate_joins_items_with_metadata() {
        let registry = Registry::new().expect("registry");
        let store = MetadataStore::new();
        let seller = addr();
        let mut ledger = MarketLedger::new(addr(), addr(), FEE);

        for name in ["Dune", "Tide"] {
            let pointer = store
                .put(&TokenMetadata::new(name, "test", "curio://img"))
                .expect("put");
            let token = registry.mint(&seller, pointer);
            ledger
                .create_market_item(&registry, token, 100, FEE, &seller)
                .expect("create");
        }

        let cards = decorate(&registry, &store, ledger.fetch_market_items()).expect("decorate");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].metadata.name, "Dune");
        assert_eq!(cards[1].metadata.name, "Tide");
        assert_eq!(cards[0].item.item_id, 1);
    }

    #[test]
    fn decorate_surfaces_missing_metadata() {
        let registry = Registry::new().expect("registry");
        let store = MetadataStore::new();
        let empty_store = MetadataStore::new();
        let seller = addr();
        let mut ledger = MarketLedger::new(addr(), addr(), FEE);

        let pointer = store
            .put(&TokenMetadata::new("Dune", "test", "curio://img"))
            .expect("put");
        let token = registry.mint(&seller, pointer);
        ledger
            .create_market_item(&registry, token, 100, FEE, &seller)
            .expect("create");

        let result = decorate(&registry, &empty_store, ledger.fetch_market_items());
        assert!(matches!(result, Err(MarketError::Registry(_))));
    }

    #[test]
    fn decorate_empty_input() {
        let registry = Registry::new().expect("registry");
        let store = MetadataStore::new();
        let cards = decorate(&registry, &store, Vec::new()).expect("decorate");
        assert!(cards.is_empty());
    }
}
