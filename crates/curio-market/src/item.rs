//! Market item records.
//!
//! One record per listing, kept forever: records are mutated exactly once (by
//! a successful sale) and never deleted, forming an append-only audit trail.

use chrono::Utc;
use curio_registry::{Address, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique market item identifier, assigned in strictly increasing order
/// starting at 1.
pub type ItemId = u64;

/// Who holds the item right now.
///
/// While a listing is open the token sits with the exchange's escrow identity,
/// modeled as its own variant rather than a magic address value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOwner {
    /// Held by the exchange on behalf of the seller.
    Escrow,
    /// Held by a real participant (the buyer, after a sale).
    Address(Address),
}

impl ItemOwner {
    /// True while the item sits in escrow.
    #[must_use]
    pub const fn is_escrow(&self) -> bool {
        matches!(self, Self::Escrow)
    }

    /// The holder's address, if a real participant.
    #[must_use]
    pub const fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Escrow => None,
            Self::Address(addr) => Some(addr),
        }
    }
}

impl fmt::Display for ItemOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escrow => write!(f, "escrow"),
            Self::Address(addr) => write!(f, "{addr}"),
        }
    }
}

/// One listing on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    /// Unique item id.
    pub item_id: ItemId,
    /// Address of the registry holding the token.
    pub token_contract: Address,
    /// The token being sold.
    pub token_id: TokenId,
    /// Who listed the item.
    pub seller: Address,
    /// Current holder (escrow until sold).
    pub owner: ItemOwner,
    /// Asking price in smallest currency units.
    pub price: u64,
    /// The listing fee paid when the item was created.
    pub fee_paid: u64,
    /// Whether the item has been sold. Once true the record is terminal.
    pub sold: bool,
    /// Unix timestamp of listing creation.
    pub listed_at: i64,
}

impl MarketItem {
    /// Build a fresh, unsold listing held in escrow.
    pub(crate) fn new(
        item_id: ItemId,
        token_contract: Address,
        token_id: TokenId,
        seller: Address,
        price: u64,
        fee_paid: u64,
    ) -> Self {
        Self {
            item_id,
            token_contract,
            token_id,
            seller,
            owner: ItemOwner::Escrow,
            price,
            fee_paid,
            sold: false,
            listed_at: Utc::now().timestamp(),
        }
    }

    /// True if `caller` originally listed this item. Consuming UIs use this to
    /// keep sellers from buying their own listing; the ledger itself does not
    /// enforce it.
    #[must_use]
    pub fn is_seller(&self, caller: &Address) -> bool {
        self.seller == *caller
    }
}
