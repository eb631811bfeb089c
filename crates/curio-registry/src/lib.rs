//! # curio-registry
//!
//! Asset-ownership registry for the Curio exchange.
//!
//! This crate provides:
//! - Identity primitives (Ed25519 keypairs, base58 addresses)
//! - The token registry (mint, transfer, ownership and metadata lookups)
//! - A content-addressed metadata store for off-chain asset descriptions
//!
//! Token identifiers are assigned monotonically starting at 1 and are never
//! reused. The registry is the single source of truth for "who holds token X
//! now"; the marketplace ledger in `curio-market` builds on top of it.
//!
//! ## Example
//!
//! ```rust
//! use curio_registry::{MetadataStore, Registry, TokenMetadata, Wallet};
//!
//! # fn example() -> curio_registry::Result<()> {
//! let registry = Registry::new()?;
//! let store = MetadataStore::new();
//!
//! let artist = Wallet::generate()?;
//! let pointer = store.put(&TokenMetadata::new("Dune", "desert at dawn", "curio://img/1"))?;
//! let token = registry.mint(artist.address(), pointer);
//!
//! assert_eq!(registry.owner_of(token)?, *artist.address());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod identity;
pub mod metadata;
pub mod registry;

pub use error::{RegistryError, Result};
pub use identity::{Address, Wallet};
pub use metadata::{MetadataPointer, MetadataStore, TokenMetadata};
pub use registry::{Registry, TokenId};
