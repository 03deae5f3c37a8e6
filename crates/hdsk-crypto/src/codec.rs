//! Index codec: textual indices to `u32`, and `u32` to wire bytes.

use std::num::IntErrorKind;

use hmac::digest::Digest;

use crate::error::IndexError;
use crate::primitives::{truncate, HashFunction};
use crate::schema::SegmentType;

/// Alphabetic indices are reduced into `[0, 2^31 - 1]`.
const ALPHABETIC_MODULUS: u32 = 1 << 31;

/// Lexical class of an index string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexClass {
    /// ASCII digits only.
    Numeric,
    /// ASCII letters and hyphens only.
    Alphabetic,
    /// Empty, or mixes characters from both classes (or neither).
    Invalid,
}

/// Classify an index string. The numeric and alphabetic alphabets are
/// disjoint, so a string is never both.
pub fn classify(s: &str) -> IndexClass {
    if s.is_empty() {
        IndexClass::Invalid
    } else if s.bytes().all(|b| b.is_ascii_digit()) {
        IndexClass::Numeric
    } else if s.bytes().all(|b| b.is_ascii_alphabetic() || b == b'-') {
        IndexClass::Alphabetic
    } else {
        IndexClass::Invalid
    }
}

/// Encode an index as 4 big-endian bytes.
pub fn encode_index(index: u32) -> [u8; 4] {
    index.to_be_bytes()
}

/// Parse a base-10 index that must fit in a `u32`.
pub fn numeric_index(s: &str) -> Result<u32, IndexError> {
    if classify(s) != IndexClass::Numeric {
        return Err(IndexError::NotNumeric(s.to_string()));
    }
    s.parse::<u32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => IndexError::OutOfRange(s.to_string()),
        _ => IndexError::NotNumeric(s.to_string()),
    })
}

/// Map an alphabetic label to an index: the first 4 digest bytes as a
/// big-endian integer, reduced modulo 2^31.
pub fn alphabetic_index<D: HashFunction>(s: &str) -> Result<u32, IndexError> {
    if classify(s) != IndexClass::Alphabetic {
        return Err(IndexError::NotAlphabetic(s.to_string()));
    }
    let prefix: [u8; 4] = truncate(&<D as Digest>::digest(s.as_bytes()))
        .map_err(|e| IndexError::Primitive(e.to_string()))?;
    Ok(u32::from_be_bytes(prefix) % ALPHABETIC_MODULUS)
}

/// Resolve an index string under a schema segment type.
pub fn resolve_index<D: HashFunction>(s: &str, kind: SegmentType) -> Result<u32, IndexError> {
    match kind {
        SegmentType::Numeric => numeric_index(s),
        SegmentType::Alphabetic => alphabetic_index::<D>(s),
        SegmentType::Either => match classify(s) {
            IndexClass::Numeric => numeric_index(s),
            IndexClass::Alphabetic => alphabetic_index::<D>(s),
            IndexClass::Invalid => Err(IndexError::Unresolvable(s.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Sha256;

    #[test]
    fn test_classify() {
        assert_eq!(classify("42"), IndexClass::Numeric);
        assert_eq!(classify("0"), IndexClass::Numeric);
        assert_eq!(classify("wallet"), IndexClass::Alphabetic);
        assert_eq!(classify("my-app"), IndexClass::Alphabetic);
        assert_eq!(classify("-"), IndexClass::Alphabetic);
        assert_eq!(classify(""), IndexClass::Invalid);
        assert_eq!(classify("app1"), IndexClass::Invalid);
        assert_eq!(classify("+7"), IndexClass::Invalid);
        assert_eq!(classify(" 7"), IndexClass::Invalid);
        assert_eq!(classify("snake_case"), IndexClass::Invalid);
    }

    #[test]
    fn test_encode_index_big_endian() {
        assert_eq!(encode_index(0), [0, 0, 0, 0]);
        assert_eq!(encode_index(42), [0, 0, 0, 42]);
        assert_eq!(encode_index(0x0102_0304), [1, 2, 3, 4]);
        assert_eq!(encode_index(u32::MAX), [0xFF; 4]);
    }

    #[test]
    fn test_numeric_index() {
        assert_eq!(numeric_index("7").unwrap(), 7);
        assert_eq!(numeric_index("007").unwrap(), 7);
        assert_eq!(numeric_index("4294967295").unwrap(), u32::MAX);
        assert_eq!(
            numeric_index("4294967296"),
            Err(IndexError::OutOfRange("4294967296".into()))
        );
        assert_eq!(numeric_index("abc"), Err(IndexError::NotNumeric("abc".into())));
        assert_eq!(numeric_index("-1"), Err(IndexError::NotNumeric("-1".into())));
    }

    #[test]
    fn test_alphabetic_index_matches_digest_prefix() {
        let digest = Sha256::digest(b"wallet");
        let expected = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) % (1 << 31);
        assert_eq!(alphabetic_index::<Sha256>("wallet").unwrap(), expected);
    }

    #[test]
    fn test_alphabetic_index_high_bit_clear() {
        for label in ["a", "b", "wallet", "bitcoin", "email-keys", "x-y-z", "QWERTY"] {
            let idx = alphabetic_index::<Sha256>(label).unwrap();
            assert!(idx < (1 << 31), "{label} -> {idx}");
        }
    }

    #[test]
    fn test_alphabetic_rejects_digits() {
        assert_eq!(
            alphabetic_index::<Sha256>("7"),
            Err(IndexError::NotAlphabetic("7".into()))
        );
    }

    #[test]
    fn test_resolve_either() {
        assert_eq!(resolve_index::<Sha256>("12", SegmentType::Either).unwrap(), 12);
        assert_eq!(
            resolve_index::<Sha256>("mail", SegmentType::Either).unwrap(),
            alphabetic_index::<Sha256>("mail").unwrap()
        );
        assert_eq!(
            resolve_index::<Sha256>("mail2", SegmentType::Either),
            Err(IndexError::Unresolvable("mail2".into()))
        );
        assert_eq!(
            resolve_index::<Sha256>("99999999999", SegmentType::Either),
            Err(IndexError::OutOfRange("99999999999".into()))
        );
    }
}
