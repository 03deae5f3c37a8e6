use thiserror::Error;

pub type HdResult<T> = Result<T, HdError>;

/// Errors surfaced by schema parsing, path parsing and key derivation.
///
/// Messages carry positions, labels and lengths only; secret and key bytes
/// never appear in them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HdError {
    #[error("hash primitive failure: {0}")]
    Primitive(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("fingerprints for lineage verification must be {expected} bytes each, got {actual}")]
    LineageShape { expected: usize, actual: usize },

    #[error("invalid key material: {field} must be {expected} bytes, got {actual}")]
    InvalidKeyMaterial {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid key material: {field} is not valid hex")]
    MalformedHex { field: &'static str },

    #[error("cannot derive below depth {0}")]
    DepthOverflow(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema cannot exceed {max} segments, got {got}")]
    TooManySegments { got: usize, max: usize },

    #[error("root segment must be designated by \"m\", got {0:?}")]
    MissingRoot(String),

    #[error("malformed segment {0:?} (expected \"label: type\")")]
    MalformedSegment(String),

    #[error("invalid type {kind:?} for label {label:?} (expected num, str or any)")]
    UnknownType { label: String, kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("master key must be designated by \"m\", got {0:?}")]
    MissingRoot(String),

    #[error("too many indices: got {got}, schema allows {max}")]
    TooManyIndices { got: usize, max: usize },

    #[error("path must contain at least one index")]
    Empty,

    #[error("position {position} label {label:?}: {source}")]
    Unresolved {
        position: usize,
        label: String,
        #[source]
        source: IndexError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("invalid numeric index {0:?}")]
    NotNumeric(String),

    #[error("numeric index {0:?} is outside the u32 range")]
    OutOfRange(String),

    #[error("invalid alphabetic index {0:?} (letters and hyphens only)")]
    NotAlphabetic(String),

    #[error("index {0:?} is neither numeric nor alphabetic")]
    Unresolvable(String),

    #[error("index hashing failed: {0}")]
    Primitive(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_names_position_and_label() {
        let err = HdError::from(PathError::Unresolved {
            position: 3,
            label: "index".into(),
            source: IndexError::NotNumeric("abc".into()),
        });
        let msg = err.to_string();
        assert!(msg.contains("position 3"), "{msg}");
        assert!(msg.contains("\"index\""), "{msg}");
        assert!(msg.contains("\"abc\""), "{msg}");
    }
}
