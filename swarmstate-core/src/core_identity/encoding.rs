//! Textual encodings of 32-byte public keys
//!
//! Keys arrive as hex (64 chars), base32z (52 chars) or base64 (43 chars
//! unpadded, 44 padded, standard or URL-safe alphabet).

use super::IdentityError;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

const BASE32Z_ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// Decode a 32-byte public key from any accepted textual encoding
pub fn decode_pubkey(text: &str) -> Result<[u8; 32], IdentityError> {
    let bytes = match text.len() {
        64 => hex::decode(text).map_err(|e| IdentityError::InvalidEncoding(e.to_string()))?,
        52 => base32z_decode(text)?,
        43 | 44 => base64_decode(text)?,
        n => {
            return Err(IdentityError::InvalidEncoding(format!(
                "{} characters is not a hex, base32z or base64 public key",
                n
            )))
        }
    };
    into_key(bytes)
}

fn into_key(bytes: Vec<u8>) -> Result<[u8; 32], IdentityError> {
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| IdentityError::InvalidEncoding(format!("decoded {} bytes, expected 32", len)))
}

fn base64_decode(text: &str) -> Result<Vec<u8>, IdentityError> {
    let url_safe = text.contains(['-', '_']);
    let engine = match (url_safe, text.ends_with('=')) {
        (false, true) => &STANDARD,
        (false, false) => &STANDARD_NO_PAD,
        (true, true) => &URL_SAFE,
        (true, false) => &URL_SAFE_NO_PAD,
    };
    engine
        .decode(text)
        .map_err(|e| IdentityError::InvalidEncoding(e.to_string()))
}

/// Decode z-base-32; trailing bits beyond the last whole byte must be zero
pub fn base32z_decode(text: &str) -> Result<Vec<u8>, IdentityError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for c in text.bytes() {
        let digit = BASE32Z_ALPHABET
            .iter()
            .position(|&a| a == c.to_ascii_lowercase())
            .ok_or_else(|| IdentityError::InvalidEncoding(format!("invalid base32z character '{}'", c as char)))?;
        acc = (acc << 5) | digit as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    if acc != 0 {
        return Err(IdentityError::InvalidEncoding("non-zero base32z padding bits".to_string()));
    }
    Ok(out)
}

pub fn base32z_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8 + 4) / 5);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &b in bytes {
        acc = (acc << 8) | b as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32Z_ALPHABET[((acc >> bits) & 0x1f) as usize] as char);
        }
        acc &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32Z_ALPHABET[((acc << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}
