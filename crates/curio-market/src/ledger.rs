//! The listing ledger state machine.
//!
//! Owns the full set of market item records, the monotonic item id counter,
//! the fee policy, and the settlement algorithm. Both mutating operations are
//! all-or-nothing: preconditions are checked first, then the token moves
//! through the registry, and only then is the ledger's own state touched —
//! a registry failure leaves the ledger exactly as it was.
//!
//! The ledger itself is a plain synchronous value; [`crate::service`] wraps it
//! for shared, serialized access.

use crate::error::{MarketError, Result};
use crate::events::ItemStatus;
use crate::item::{ItemId, ItemOwner, MarketItem};
use curio_registry::{Address, Registry, TokenId};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// The marketplace ledger.
///
/// Single authoritative instance per marketplace; every mutation is a
/// read-modify-write of this value and must be serialized by the caller.
#[derive(Debug)]
pub struct MarketLedger {
    /// The administrative owner (fee recipient).
    owner: Address,
    /// The identity under which listed tokens are held in escrow.
    escrow: Address,
    /// Current listing fee in smallest currency units.
    listing_fee: u64,
    /// Next item id to assign. `next_item_id - 1` equals the number of
    /// records ever created.
    next_item_id: ItemId,
    /// All records ever created, keyed by item id. Never shrinks.
    items: BTreeMap<ItemId, MarketItem>,
    /// Sum of every listing fee ever paid. Fees are never refunded, so this
    /// only grows.
    fees_collected: u64,
    /// Portion of collected fees released to the owner by completed sales.
    owner_balance: u64,
    /// Sale proceeds credited to each seller.
    proceeds: HashMap<Address, u64>,
}

impl MarketLedger {
    /// Create a ledger administered by `owner`, escrowing tokens under
    /// `escrow`, with the given listing fee.
    #[must_use]
    pub fn new(owner: Address, escrow: Address, listing_fee: u64) -> Self {
        Self {
            owner,
            escrow,
            listing_fee,
            next_item_id: 1,
            items: BTreeMap::new(),
            fees_collected: 0,
            owner_balance: 0,
            proceeds: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Fee policy
    // ------------------------------------------------------------------

    /// The current listing fee. Readable by anyone.
    #[must_use]
    pub fn listing_fee(&self) -> u64 {
        self.listing_fee
    }

    /// Change the listing fee. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Unauthorized`] unless `caller` is the owner.
    pub fn set_listing_fee(&mut self, caller: &Address, fee: u64) -> Result<()> {
        self.require_owner(caller)?;
        info!(old = self.listing_fee, new = fee, "listing fee changed");
        self.listing_fee = fee;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    /// Create a listing for `token_id`, transferring the token into escrow.
    ///
    /// The seller pays `paid_fee`, which must equal the current listing fee
    /// exactly; fees are kept even if the listing never sells.
    ///
    /// Returns the new item id and the status notification for observers.
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidPrice`] for a zero asking price,
    /// [`MarketError::FeeMismatch`] when the fee is off in either direction,
    /// or a registry error if the seller does not hold the token. No ledger
    /// state changes on any failure.
    pub fn create_market_item(
        &mut self,
        registry: &Registry,
        token_id: TokenId,
        price: u64,
        paid_fee: u64,
        seller: &Address,
    ) -> Result<(ItemId, ItemStatus)> {
        if price == 0 {
            return Err(MarketError::InvalidPrice);
        }
        if paid_fee != self.listing_fee {
            return Err(MarketError::FeeMismatch {
                required: self.listing_fee,
                paid: paid_fee,
            });
        }

        // Move the token into escrow first; the registry rejects the call if
        // the seller is not the current holder, and at that point nothing in
        // the ledger has changed.
        registry.transfer(token_id, seller, &self.escrow)?;

        let item_id = self.next_item_id;
        self.next_item_id += 1;

        let item = MarketItem::new(
            item_id,
            registry.address().clone(),
            token_id,
            seller.clone(),
            price,
            paid_fee,
        );
        let status = ItemStatus::from(&item);
        self.items.insert(item_id, item);
        self.fees_collected += paid_fee;

        info!(item_id, token_id, seller = %seller, price, "market item created");
        Ok((item_id, status))
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Execute a sale: move the token out of escrow to the buyer, credit the
    /// asking price to the seller, and release the item's listing fee to the
    /// owner's withdrawable balance.
    ///
    /// `paid` must equal the asking price exactly (no overpay tolerance, to
    /// match the fee-exactness policy).
    ///
    /// Returns the updated status notification.
    ///
    /// # Errors
    ///
    /// [`MarketError::NotFound`], [`MarketError::AlreadySold`], or
    /// [`MarketError::PriceMismatch`]; a registry failure aborts the whole
    /// sale. Either all effects commit or none do.
    pub fn create_market_sale(
        &mut self,
        registry: &Registry,
        item_id: ItemId,
        paid: u64,
        buyer: &Address,
    ) -> Result<ItemStatus> {
        let (token_id, price, fee_paid, seller) = {
            let item = self.items.get(&item_id).ok_or(MarketError::NotFound(item_id))?;
            if item.sold {
                return Err(MarketError::AlreadySold(item_id));
            }
            if paid != item.price {
                return Err(MarketError::PriceMismatch {
                    asking: item.price,
                    paid,
                });
            }
            (item.token_id, item.price, item.fee_paid, item.seller.clone())
        };

        // Token first: if this fails, no payment moves and the record stays
        // unsold.
        registry.transfer(token_id, &self.escrow, buyer)?;

        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(MarketError::NotFound(item_id))?;
        item.sold = true;
        item.owner = ItemOwner::Address(buyer.clone());
        let status = ItemStatus::from(&*item);

        *self.proceeds.entry(seller.clone()).or_insert(0) += price;
        self.owner_balance += fee_paid;

        info!(item_id, token_id, buyer = %buyer, price, "market sale settled");
        Ok(status)
    }

    // ------------------------------------------------------------------
    // Administrative accessors
    // ------------------------------------------------------------------

    /// The administrative owner's address. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Unauthorized`] unless `caller` is the owner.
    pub fn owner(&self, caller: &Address) -> Result<Address> {
        self.require_owner(caller)?;
        Ok(self.owner.clone())
    }

    /// The owner's withdrawable fee balance. Owner only.
    ///
    /// Fees become withdrawable when the item they were paid for sells.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Unauthorized`] unless `caller` is the owner.
    pub fn owner_balance(&self, caller: &Address) -> Result<u64> {
        self.require_owner(caller)?;
        Ok(self.owner_balance)
    }

    /// Withdraw the owner's entire withdrawable balance, returning the amount.
    /// Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Unauthorized`] unless `caller` is the owner.
    pub fn withdraw_fees(&mut self, caller: &Address) -> Result<u64> {
        self.require_owner(caller)?;
        let amount = self.owner_balance;
        self.owner_balance = 0;
        info!(amount, "owner withdrew fees");
        Ok(amount)
    }

    fn require_owner(&self, caller: &Address) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(MarketError::Unauthorized)
        }
    }

    // ------------------------------------------------------------------
    // Public reads
    // ------------------------------------------------------------------

    /// Total listing fees ever collected (audit figure; never decreases).
    #[must_use]
    pub fn fees_collected(&self) -> u64 {
        self.fees_collected
    }

    /// Sale proceeds credited to `seller` so far.
    #[must_use]
    pub fn proceeds_of(&self, seller: &Address) -> u64 {
        self.proceeds.get(seller).copied().unwrap_or(0)
    }

    /// Number of records ever created.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.next_item_id - 1
    }

    /// The escrow identity under which listed tokens are held.
    #[must_use]
    pub fn escrow(&self) -> &Address {
        &self.escrow
    }

    /// Fetch a copy of a single record.
    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<MarketItem> {
        self.items.get(&item_id).cloned()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &MarketItem> {
        self.items.values()
    }
}
