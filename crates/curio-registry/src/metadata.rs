//! Off-chain asset metadata and its content-addressed store.
//!
//! Each token carries an immutable pointer to a metadata blob describing the
//! asset. Pointers are the base58 SHA-256 digest of the canonical JSON, so the
//! same description always resolves to the same pointer and a blob can never
//! change behind a pointer. The ledger never reads metadata; it is used only to
//! decorate query results for display.

use crate::error::{RegistryError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// The displayable description of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Asset name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Pointer to the image blob.
    pub image: String,
}

impl TokenMetadata {
    /// Build metadata from its three fields.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
        }
    }
}

/// A content-addressed pointer to a metadata blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataPointer(String);

impl MetadataPointer {
    /// The pointer string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An in-memory content-addressed metadata store.
///
/// Stands in for an external blob store; the registry only ever records the
/// pointers it hands out.
#[derive(Debug, Default)]
pub struct MetadataStore {
    blobs: RwLock<HashMap<MetadataPointer, TokenMetadata>>,
}

impl MetadataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a metadata blob and return its pointer.
    ///
    /// Storing the same metadata twice yields the same pointer.
    ///
    /// # Errors
    ///
    /// Returns error if the metadata cannot be serialized.
    pub fn put(&self, metadata: &TokenMetadata) -> Result<MetadataPointer> {
        let canonical = serde_json::to_vec(metadata)?;
        let digest = Sha256::digest(&canonical);
        let pointer = MetadataPointer(bs58::encode(digest).into_string());
        self.blobs
            .write()
            .insert(pointer.clone(), metadata.clone());
        Ok(pointer)
    }

    /// Fetch the metadata stored under a pointer.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MetadataNotFound`] if nothing is stored there.
    pub fn fetch(&self, pointer: &MetadataPointer) -> Result<TokenMetadata> {
        self.blobs
            .read()
            .get(pointer)
            .cloned()
            .ok_or_else(|| RegistryError::MetadataNotFound(pointer.to_string()))
    }
}
