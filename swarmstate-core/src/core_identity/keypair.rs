//! Keypair module
//!
//! Ed25519 identity key material. The store's own account id is the X25519
//! (Montgomery) form of the Ed25519 public key behind the `0x05` prefix.
//!
//! Security: seed buffers are zeroized on drop.

use super::account_id::{AccountId, PREFIX_USER};
use super::IdentityError;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// Ed25519 identity keypair
#[derive(Clone)]
pub struct IdentityKeypair {
    signing: SigningKey,
}

impl IdentityKeypair {
    /// Accepts a 32-byte seed, or a 64-byte secret key laid out as
    /// `seed || pubkey` whose pubkey half must match the seed.
    pub fn from_secret(secret: &[u8]) -> Result<Self, IdentityError> {
        match secret.len() {
            32 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(secret);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(&secret[..32]);
                let keypair = Self::from_seed(&seed);
                if keypair.verifying_key().as_bytes() != &secret[32..] {
                    return Err(IdentityError::InvalidSeed(
                        "public key half does not match seed".to_string(),
                    ));
                }
                Ok(keypair)
            }
            n => Err(IdentityError::InvalidSeed(format!(
                "expected 32 or 64 bytes, got {}",
                n
            ))),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        IdentityKeypair { signing: SigningKey::from_bytes(seed) }
    }

    /// Fresh random identity
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        rand::rng().fill_bytes(&mut seed[..]);
        Self::from_seed(&seed)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// 64-byte `seed || pubkey` form
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing.to_keypair_bytes())
    }

    /// `0x05` followed by the X25519 public key
    pub fn account_id(&self) -> AccountId {
        AccountId::new(PREFIX_USER, self.verifying_key().to_montgomery().to_bytes())
    }
}

impl fmt::Debug for IdentityKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKeypair")
            .field("public", &hex::encode(self.verifying_key().as_bytes()))
            .finish_non_exhaustive()
    }
}
