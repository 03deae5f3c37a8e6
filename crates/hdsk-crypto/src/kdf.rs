//! Extract-then-expand key derivation (HKDF, RFC 5869) over any
//! [`HashFunction`].

use hkdf::SimpleHkdf;
use zeroize::Zeroizing;

use crate::error::{HdError, HdResult};
use crate::primitives::HashFunction;

/// Derive `length` bytes of output key material.
///
/// `ikm` is strengthened against `salt` into a pseudorandom key, which is
/// then expanded under `info`. Identical inputs always produce identical
/// output. Fails if `length` exceeds 255 digest blocks.
pub fn derive<D: HashFunction>(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    length: usize,
) -> HdResult<Zeroizing<Vec<u8>>> {
    let hkdf = SimpleHkdf::<D>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new(vec![0u8; length]);
    hkdf.expand(info, &mut okm)
        .map_err(|e| HdError::Primitive(format!("HKDF expand to {length} bytes: {e}")))?;
    Ok(okm)
}
