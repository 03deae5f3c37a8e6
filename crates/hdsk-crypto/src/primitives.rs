//! Keyed-hash building blocks: domain-separated salts, key fingerprints and
//! the constant-time fingerprint comparison used for lineage checks.
//!
//! Every MAC is constructed fresh for the call that needs it and keyed with
//! exactly one key; no instance outlives the function that created it.

use hmac::digest::core_api::BlockSizeUser;
use hmac::digest::Digest;
use hmac::{Mac, SimpleHmac};
use subtle::ConstantTimeEq;

use crate::error::{HdError, HdResult};
use crate::{FINGERPRINT_SIZE, SALT_SIZE};

/// Domain-separation tag appended to every salt MAC input.
const SALT_DOMAIN: &[u8; 4] = b"SALT";

/// A hash function usable as the keyed-hash primitive.
///
/// Any RustCrypto digest with a block size qualifies (SHA-2, SHA-3,
/// BLAKE2, ...). HMAC over it is built with [`SimpleHmac`], so no
/// core-level hash internals are required.
pub trait HashFunction: Digest + BlockSizeUser + Clone {}

impl<D> HashFunction for D where D: Digest + BlockSizeUser + Clone {}

/// Build a fresh HMAC instance keyed with `key`.
pub(crate) fn new_mac<D: HashFunction>(key: &[u8]) -> HdResult<SimpleHmac<D>> {
    <SimpleHmac<D> as Mac>::new_from_slice(key)
        .map_err(|e| HdError::Primitive(format!("HMAC key rejected: {e}")))
}

/// Take the first `N` bytes of a digest, failing if the digest is shorter.
pub(crate) fn truncate<const N: usize>(bytes: &[u8]) -> HdResult<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or_else(|| {
            HdError::Primitive(format!(
                "digest is {} bytes, need at least {N}",
                bytes.len()
            ))
        })
}

/// Derive a 16-byte salt from `message` and an optional context.
///
/// The context is hashed and truncated to 16 bytes to normalize its length;
/// without one a zero block is used. The result is
/// `HMAC(context16, message || "SALT")[..16]`.
pub fn calc_salt<D: HashFunction>(
    message: &[u8],
    context: Option<&[u8]>,
) -> HdResult<[u8; SALT_SIZE]> {
    let mac_key: [u8; SALT_SIZE] = match context {
        Some(ctx) => truncate(&<D as Digest>::digest(ctx))?,
        None => [0u8; SALT_SIZE],
    };
    let mut mac = new_mac::<D>(&mac_key)?;
    mac.update(message);
    mac.update(SALT_DOMAIN);
    truncate(&mac.finalize().into_bytes())
}

/// Fingerprint binding a child key to its parent: `HMAC(parent, child)[..16]`.
///
/// For a master key `parent` is the original secret.
pub fn fingerprint<D: HashFunction>(parent: &[u8], child: &[u8]) -> HdResult<[u8; FINGERPRINT_SIZE]> {
    let mut mac = new_mac::<D>(parent)?;
    mac.update(child);
    truncate(&mac.finalize().into_bytes())
}

/// Compare two fingerprints in constant time.
///
/// Both inputs must be exactly [`FINGERPRINT_SIZE`] bytes; anything else is
/// a [`HdError::LineageShape`] rather than a mismatch.
pub fn verify_fingerprint(expected: &[u8], actual: &[u8]) -> HdResult<bool> {
    for len in [expected.len(), actual.len()] {
        if len != FINGERPRINT_SIZE {
            return Err(HdError::LineageShape {
                expected: FINGERPRINT_SIZE,
                actual: len,
            });
        }
    }
    Ok(expected.ct_eq(actual).into())
}
