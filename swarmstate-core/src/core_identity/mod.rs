//! Identity utilities
//!
//! Pure functions for validating and normalizing account identifiers, plus
//! the Ed25519 keypair the store derives its own account id from.

mod account_id;
mod encoding;
mod errors;
mod keypair;

pub use account_id::{normalize, validate_account_id, AccountId, PREFIX_GROUP, PREFIX_USER};
pub use encoding::{base32z_decode, base32z_encode, decode_pubkey};
pub use errors::IdentityError;
pub use keypair::IdentityKeypair;
