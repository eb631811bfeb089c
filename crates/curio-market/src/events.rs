//! Status notifications for marketplace observers.
//!
//! Each item emits exactly two notifications over its lifetime: one when the
//! listing is created (`sold == false`) and one when it is sold
//! (`sold == true`). Callers never need to parse these to learn results —
//! operations return their outcomes directly — but dashboards and indexers can
//! subscribe to the feed.

use crate::item::{ItemId, ItemOwner, MarketItem};
use curio_registry::{Address, TokenId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A snapshot of an item's state, published on creation and on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
    /// The item id.
    pub item_id: ItemId,
    /// The registry holding the token.
    pub token_contract: Address,
    /// The token being sold.
    pub token_id: TokenId,
    /// Who listed the item.
    pub seller: Address,
    /// Current holder.
    pub owner: ItemOwner,
    /// Asking price.
    pub price: u64,
    /// Sold flag.
    pub sold: bool,
}

impl From<&MarketItem> for ItemStatus {
    fn from(item: &MarketItem) -> Self {
        Self {
            item_id: item.item_id,
            token_contract: item.token_contract.clone(),
            token_id: item.token_id,
            seller: item.seller.clone(),
            owner: item.owner.clone(),
            price: item.price,
            sold: item.sold,
        }
    }
}

/// Broadcast feed of item status notifications.
///
/// Observers are optional: publishing while nobody is subscribed is not an
/// error and never affects the underlying operation.
#[derive(Debug, Clone)]
pub struct StatusFeed {
    tx: broadcast::Sender<ItemStatus>,
}

impl StatusFeed {
    /// Create a feed buffering up to `capacity` undelivered notifications per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ItemStatus> {
        self.tx.subscribe()
    }

    /// Publish a notification to all current subscribers.
    pub fn publish(&self, status: ItemStatus) {
        // A send error only means there are no subscribers right now.
        let _ = self.tx.send(status);
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new(64)
    }
}
