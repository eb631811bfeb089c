//! Identity primitives: addresses and signing keypairs.
//!
//! Every participant (artist, seller, buyer, the exchange itself) is named by
//! an `Address`, the base58 encoding of an Ed25519 public key. A `Wallet` is
//! the corresponding keypair and acts as the signing identity the presentation
//! layer hands to the core.

use crate::error::{RegistryError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant address (base58-encoded Ed25519 public key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Parse an address from a base58-encoded string.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid base58 or does not decode to
    /// 32 bytes.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| RegistryError::invalid_address(format!("invalid base58: {e}")))?;
        if bytes.len() != 32 {
            return Err(RegistryError::invalid_address(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Create an address from raw public key bytes.
    ///
    /// # Errors
    ///
    /// Returns error if `bytes` is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(RegistryError::invalid_address(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bs58::encode(bytes).into_string()))
    }

    /// The base58 string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A signing identity (Ed25519 keypair).
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a new random wallet.
    ///
    /// Key material is drawn from `OsRng` rather than a userspace PRNG.
    ///
    /// # Errors
    ///
    /// Returns error if the derived public key cannot be encoded.
    pub fn generate() -> Result<Self> {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::from_secret_key(&secret)
    }

    /// Reconstruct a wallet from a 32-byte secret key.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not 32 bytes.
    pub fn from_secret_key(secret: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = secret.try_into().map_err(|_| {
            RegistryError::wallet_error(format!("secret key must be 32 bytes, got {}", secret.len()))
        })?;
        let signing_key = SigningKey::from_bytes(&secret);
        let address = Address::from_bytes(signing_key.verifying_key().as_bytes())?;
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The wallet's address.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The public (verifying) key.
    #[must_use]
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
