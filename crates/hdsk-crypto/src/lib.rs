//! hdsk-crypto: symmetric hierarchical deterministic key derivation
//!
//! A tree of 256-bit keys grown from one secret using only HMAC and HKDF,
//! generic over the hash function.
//!
//! ```text
//! secret
//!   └── master (depth 0)       HKDF(secret, Salt(secret), "MASTER")
//!       └── child i (depth 1)  HKDF(code, Salt(code, BE(i)), "CHILD" || i)
//!           └── ...            one level per path index, bounded by the schema
//! ```
//!
//! Paths such as `m/42/0/1/0` are validated against a schema such as
//! `m / application: any / purpose: any / context: any / index: num`.
//! A child proves its parent through a 16-byte fingerprint
//! `HMAC(parent.key, child.key)`, checked in constant time by [`lineage`].

pub mod codec;
pub mod error;
pub mod kdf;
pub mod key;
pub mod path;
pub mod primitives;
pub mod schema;

pub use error::{HdError, HdResult, IndexError, PathError, SchemaError};
pub use key::{child, child_from_str, lineage, master, node, ExportedKey, HdKey};
pub use path::Path;
pub use primitives::{calc_salt, fingerprint, verify_fingerprint, HashFunction};
pub use schema::{Schema, Segment, SegmentType};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a chain code in bytes
pub const CHAIN_CODE_SIZE: usize = 32;

/// Size of a key fingerprint in bytes
pub const FINGERPRINT_SIZE: usize = 16;

/// Size of a derived salt in bytes
pub const SALT_SIZE: usize = 16;

/// Root marker opening every schema and path
pub const ROOT_MARKER: &str = "m";

/// Schema used when none is configured
pub const DEFAULT_SCHEMA: &str = "m / application: any / purpose: any / context: any / index: num";

/// Conformance path under [`DEFAULT_SCHEMA`]
pub const DEFAULT_PATH: &str = "m/42/0/1/0";
