//! # curio-market
//!
//! Marketplace ledger for the Curio exchange.
//!
//! This crate provides:
//!
//! - The listing ledger state machine (create listings, escrow tokens,
//!   settle sales atomically)
//! - The fee policy and owner-gated administrative accessors
//! - Read-only query views over the item set
//! - Status notifications for external observers
//! - An async facade serializing mutations over a shared ledger
//!
//! Tokens themselves live in [`curio_registry`]; the ledger consumes the
//! registry's mint/transfer/ownership capability and keeps its own
//! escrow bookkeeping consistent with it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod events;
pub mod item;
pub mod ledger;
pub mod service;
pub mod views;

pub use catalog::{ListingCard, MetadataFetcher, decorate};
pub use error::{MarketError, Result};
pub use events::{ItemStatus, StatusFeed};
pub use item::{ItemId, ItemOwner, MarketItem};
pub use ledger::MarketLedger;
pub use service::MarketService;
