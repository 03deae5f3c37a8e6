//! Hierarchical deterministic keys: master, child and node derivation, and
//! lineage verification.
//!
//! Each derivation step is `HKDF(ikm, salt, info) -> 64 bytes`, split into a
//! 32-byte key and a 32-byte chain code:
//!
//! ```text
//! master:  ikm = secret      salt = Salt(secret)              info = "MASTER"
//! child:   ikm = parent.code salt = Salt(parent.code, BE(i))  info = "CHILD" || decimal(i)
//! ```
//!
//! Children carry no reference to their parent. Lineage is re-established by
//! recomputing the fingerprint `HMAC(parent.key, child.key)[..16]`.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::codec::{encode_index, resolve_index};
use crate::error::{HdError, HdResult, PathError};
use crate::kdf::derive;
use crate::path::Path;
use crate::primitives::{calc_salt, fingerprint, verify_fingerprint, HashFunction};
use crate::schema::SegmentType;
use crate::{CHAIN_CODE_SIZE, FINGERPRINT_SIZE, KEY_SIZE};

const MASTER_INFO: &str = "MASTER";
const CHILD_INFO: &str = "CHILD";

/// A key in the hierarchy. Zeroized on drop.
#[derive(Clone)]
pub struct HdKey {
    key: [u8; KEY_SIZE],
    chain_code: [u8; CHAIN_CODE_SIZE],
    depth: u32,
    fingerprint: [u8; FINGERPRINT_SIZE],
}

impl HdKey {
    /// Rebuild a key from stored material, checking every length.
    pub fn from_parts(
        key: &[u8],
        chain_code: &[u8],
        depth: u32,
        fingerprint: &[u8],
    ) -> HdResult<Self> {
        Ok(Self {
            key: fixed("key", key)?,
            chain_code: fixed("chain_code", chain_code)?,
            depth,
            fingerprint: fixed("fingerprint", fingerprint)?,
        })
    }

    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.chain_code
    }

    /// 0 for a master key, parent depth + 1 otherwise.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn fingerprint(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.fingerprint
    }

    pub fn export(&self) -> ExportedKey {
        ExportedKey {
            key: hex::encode(self.key),
            chain_code: hex::encode(self.chain_code),
            depth: self.depth,
            fingerprint: hex::encode(self.fingerprint),
        }
    }

    /// Split 64 bytes of KDF output into key and chain code.
    fn from_okm(okm: &[u8], depth: u32, fingerprint: [u8; FINGERPRINT_SIZE]) -> HdResult<Self> {
        let (key, chain_code) = okm.split_at(KEY_SIZE);
        Ok(Self {
            key: fixed("key", key)?,
            chain_code: fixed("chain_code", chain_code)?,
            depth,
            fingerprint,
        })
    }
}

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> HdResult<[u8; N]> {
    bytes.try_into().map_err(|_| HdError::InvalidKeyMaterial {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

impl Drop for HdKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

impl PartialEq for HdKey {
    fn eq(&self, other: &Self) -> bool {
        let same = self.key[..].ct_eq(&other.key[..])
            & self.chain_code[..].ct_eq(&other.chain_code[..])
            & self.fingerprint[..].ct_eq(&other.fingerprint[..])
            & self.depth.ct_eq(&other.depth);
        same.into()
    }
}

impl Eq for HdKey {}

impl std::fmt::Debug for HdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdKey")
            .field("key", &"[REDACTED]")
            .field("chain_code", &"[REDACTED]")
            .field("depth", &self.depth)
            .field("fingerprint", &hex::encode(self.fingerprint))
            .finish()
    }
}

/// Hex-encoded key record for storage and display.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedKey {
    pub key: String,
    pub chain_code: String,
    pub depth: u32,
    pub fingerprint: String,
}

impl Drop for ExportedKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

impl std::fmt::Debug for ExportedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedKey")
            .field("key", &"[REDACTED]")
            .field("chain_code", &"[REDACTED]")
            .field("depth", &self.depth)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl TryFrom<&ExportedKey> for HdKey {
    type Error = HdError;

    fn try_from(exported: &ExportedKey) -> HdResult<Self> {
        let key = zeroize::Zeroizing::new(decode_hex("key", &exported.key)?);
        let chain_code = zeroize::Zeroizing::new(decode_hex("chain_code", &exported.chain_code)?);
        let fingerprint = decode_hex("fingerprint", &exported.fingerprint)?;
        HdKey::from_parts(&key, &chain_code, exported.depth, &fingerprint)
    }
}

/// Decode a hex field. The error names the field only, never the value.
fn decode_hex(field: &'static str, s: &str) -> HdResult<Vec<u8>> {
    hex::decode(s).map_err(|_| HdError::MalformedHex { field })
}

/// Derive the depth-0 master key from a secret.
pub fn master<D: HashFunction>(secret: &[u8]) -> HdResult<HdKey> {
    let salt = calc_salt::<D>(secret, None)?;
    let okm = derive::<D>(secret, &salt, MASTER_INFO.as_bytes(), KEY_SIZE + CHAIN_CODE_SIZE)?;
    let fp = fingerprint::<D>(secret, &okm[..KEY_SIZE])?;
    HdKey::from_okm(&okm, 0, fp)
}

/// Derive the child of `parent` at `index`.
///
/// Salt and KDF input come from the parent's chain code; the fingerprint
/// comes from the parent's key.
pub fn child<D: HashFunction>(parent: &HdKey, index: u32) -> HdResult<HdKey> {
    let depth = parent
        .depth
        .checked_add(1)
        .ok_or(HdError::DepthOverflow(parent.depth))?;
    let salt = calc_salt::<D>(&parent.chain_code, Some(&encode_index(index)[..]))?;
    let info = format!("{CHILD_INFO}{index}");
    let okm = derive::<D>(
        &parent.chain_code,
        &salt,
        info.as_bytes(),
        KEY_SIZE + CHAIN_CODE_SIZE,
    )?;
    let fp = fingerprint::<D>(&parent.key, &okm[..KEY_SIZE])?;
    tracing::trace!(depth, index, "derived child key");
    HdKey::from_okm(&okm, depth, fp)
}

/// Derive a child from a textual index, numeric if it parses as one and
/// hashed as an alphabetic label otherwise.
pub fn child_from_str<D: HashFunction>(parent: &HdKey, index: &str) -> HdResult<HdKey> {
    let resolved = resolve_index::<D>(index, SegmentType::Either).map_err(|source| {
        PathError::Unresolved {
            position: 0,
            label: "index".to_string(),
            source,
        }
    })?;
    child::<D>(parent, resolved)
}

/// Derive the key at the end of `path`, starting from `master`.
///
/// The path must contain at least one index.
pub fn node<D: HashFunction>(master: &HdKey, path: &Path) -> HdResult<HdKey> {
    let (first, rest) = path.indices().split_first().ok_or(PathError::Empty)?;
    let mut key = child::<D>(master, *first)?;
    for index in rest {
        key = child::<D>(&key, *index)?;
    }
    tracing::debug!(depth = key.depth, "derived node key");
    Ok(key)
}

/// Check whether `child` is the direct child of `parent`.
pub fn lineage<D: HashFunction>(child: &HdKey, parent: &HdKey) -> HdResult<bool> {
    let recomputed = fingerprint::<D>(&parent.key, &child.key)?;
    verify_fingerprint(&child.fingerprint, &recomputed)
}
