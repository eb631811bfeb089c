//! The token registry: unique asset identifiers, ownership, metadata pointers.
//!
//! Token ids are assigned monotonically starting at 1 and never reused. The
//! registry is the authoritative record of who currently holds each token;
//! transfers are rejected unless initiated from the current holder.

use crate::error::{RegistryError, Result};
use crate::identity::{Address, Wallet};
use crate::metadata::MetadataPointer;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// A unique token identifier.
pub type TokenId = u64;

#[derive(Debug, Default)]
struct RegistryState {
    next_token_id: TokenId,
    owners: HashMap<TokenId, Address>,
    metadata: HashMap<TokenId, MetadataPointer>,
}

/// The asset-ownership registry.
///
/// Shareable across tasks; all methods take `&self` and serialize access to
/// the ownership table internally.
#[derive(Debug)]
pub struct Registry {
    address: Address,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Create a new registry with a freshly generated identity.
    ///
    /// # Errors
    ///
    /// Returns error if the identity keypair cannot be generated.
    pub fn new() -> Result<Self> {
        let identity = Wallet::generate()?;
        Ok(Self {
            address: identity.address().clone(),
            state: RwLock::new(RegistryState {
                next_token_id: 1,
                ..RegistryState::default()
            }),
        })
    }

    /// The registry's own address, used by the marketplace as the contract
    /// reference recorded on each listing.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Mint a new token to `to` with an immutable metadata pointer.
    ///
    /// Returns the newly assigned token id.
    pub fn mint(&self, to: &Address, pointer: MetadataPointer) -> TokenId {
        let mut state = self.state.write();
        let token = state.next_token_id;
        state.next_token_id += 1;
        state.owners.insert(token, to.clone());
        state.metadata.insert(token, pointer);

        debug!(token, owner = %to, "minted token");
        token
    }

    /// Resolve the current holder of a token.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] for an unminted id.
    pub fn owner_of(&self, token: TokenId) -> Result<Address> {
        self.state
            .read()
            .owners
            .get(&token)
            .cloned()
            .ok_or(RegistryError::UnknownToken(token))
    }

    /// Transfer a token from its current holder to another address.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] for an unminted id, or
    /// [`RegistryError::NotTokenOwner`] if `from` is not the current holder.
    pub fn transfer(&self, token: TokenId, from: &Address, to: &Address) -> Result<()> {
        let mut state = self.state.write();
        let holder = state
            .owners
            .get(&token)
            .ok_or(RegistryError::UnknownToken(token))?;
        if holder != from {
            return Err(RegistryError::NotTokenOwner {
                token,
                claimed: from.to_string(),
            });
        }
        state.owners.insert(token, to.clone());

        debug!(token, from = %from, to = %to, "transferred token");
        Ok(())
    }

    /// Resolve a token's metadata pointer.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] for an unminted id.
    pub fn metadata_of(&self, token: TokenId) -> Result<MetadataPointer> {
        self.state
            .read()
            .metadata
            .get(&token)
            .cloned()
            .ok_or(RegistryError::UnknownToken(token))
    }

    /// Number of tokens minted so far.
    #[must_use]
    pub fn token_count(&self) -> u64 {
        self.state.read().next_token_id - 1
    }
}
