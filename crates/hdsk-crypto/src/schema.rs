//! Derivation path schemas.
//!
//! A schema names and types every level below the master key:
//!
//! ```text
//! m / application: any / purpose: any / context: any / index: num
//! ```
//!
//! The root marker `m` is mandatory and counts toward the 256-segment limit.

use std::fmt;
use std::str::FromStr;

use crate::error::{HdError, HdResult, SchemaError};
use crate::path::Path;
use crate::primitives::HashFunction;
use crate::ROOT_MARKER;

/// Separator between schema segments.
pub const SCHEMA_SEPARATOR: &str = " / ";

/// Maximum number of schema segments, root included.
pub const MAX_SCHEMA_SEGMENTS: usize = 256;

/// Type constraint on a single path level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    /// `num`: base-10 `u32`.
    Numeric,
    /// `str`: letters and hyphens, hashed to an index.
    Alphabetic,
    /// `any`: numeric if possible, otherwise alphabetic.
    Either,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "num",
            Self::Alphabetic => "str",
            Self::Either => "any",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "num" => Some(Self::Numeric),
            "str" => Some(Self::Alphabetic),
            "any" => Some(Self::Either),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labelled, typed level of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub label: String,
    pub kind: SegmentType,
}

/// A parsed schema: the ordered segments below the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    segments: Vec<Segment>,
}

impl Schema {
    /// Parse a schema from its textual form.
    pub fn parse(text: &str) -> HdResult<Self> {
        let parts: Vec<&str> = text.split(SCHEMA_SEPARATOR).collect();
        if parts.len() > MAX_SCHEMA_SEGMENTS {
            return Err(SchemaError::TooManySegments {
                got: parts.len(),
                max: MAX_SCHEMA_SEGMENTS,
            }
            .into());
        }
        if parts[0] != ROOT_MARKER {
            return Err(SchemaError::MissingRoot(parts[0].to_string()).into());
        }

        let segments = parts[1..]
            .iter()
            .map(|raw| parse_segment(raw))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(levels = segments.len(), "parsed derivation schema");
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of levels below the root.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parse and validate a derivation path against this schema.
    pub fn parse_path<D: HashFunction>(&self, text: &str) -> HdResult<Path> {
        Path::parse::<D>(text, self)
    }
}

fn parse_segment(raw: &str) -> Result<Segment, SchemaError> {
    let (label, kind) = raw
        .split_once(':')
        .ok_or_else(|| SchemaError::MalformedSegment(raw.to_string()))?;
    let (label, kind) = (label.trim(), kind.trim());
    if label.is_empty() || kind.is_empty() {
        return Err(SchemaError::MalformedSegment(raw.to_string()));
    }
    let kind = SegmentType::from_token(kind).ok_or_else(|| SchemaError::UnknownType {
        label: label.to_string(),
        kind: kind.to_string(),
    })?;
    Ok(Segment {
        label: label.to_string(),
        kind,
    })
}

impl FromStr for Schema {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_MARKER)?;
        for segment in &self.segments {
            write!(f, "{SCHEMA_SEPARATOR}{}: {}", segment.label, segment.kind)?;
        }
        Ok(())
    }
}
