//! Read-only projections over the ledger's item set.
//!
//! Views never mutate state and always return freshly cloned records in
//! ascending item id order, so callers can never reach back into the ledger
//! through a result.

use crate::item::MarketItem;
use crate::ledger::MarketLedger;
use curio_registry::Address;

impl MarketLedger {
    /// All unsold items, ascending by item id.
    #[must_use]
    pub fn fetch_market_items(&self) -> Vec<MarketItem> {
        self.records().filter(|item| !item.sold).cloned().collect()
    }

    /// Items currently owned by `caller` — i.e. sold records the caller
    /// bought. Ascending by item id.
    #[must_use]
    pub fn fetch_my_nfts(&self, caller: &Address) -> Vec<MarketItem> {
        self.records()
            .filter(|item| item.owner.as_address() == Some(caller))
            .cloned()
            .collect()
    }

    /// Items originally listed by `caller`, sold or not. Ascending by item id.
    #[must_use]
    pub fn fetch_items_created(&self, caller: &Address) -> Vec<MarketItem> {
        self.records()
            .filter(|item| item.seller == *caller)
            .cloned()
            .collect()
    }
}
