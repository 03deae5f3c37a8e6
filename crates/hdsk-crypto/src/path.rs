//! Derivation paths: `m/42/0/1/0`, resolved to `u32` indices under a schema.

use std::fmt;

use crate::codec::resolve_index;
use crate::error::{HdResult, PathError};
use crate::primitives::HashFunction;
use crate::schema::Schema;
use crate::ROOT_MARKER;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// An ordered list of resolved child indices, one per schema level present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    indices: Vec<u32>,
}

impl Path {
    /// Parse `text` and resolve each index under the type of the schema
    /// segment at the same position.
    pub fn parse<D: HashFunction>(text: &str, schema: &Schema) -> HdResult<Self> {
        let mut parts = text.split(PATH_SEPARATOR);
        let root = parts.next().unwrap_or_default();
        if root != ROOT_MARKER {
            return Err(PathError::MissingRoot(root.to_string()).into());
        }

        let raw: Vec<&str> = parts.collect();
        if raw.len() > schema.len() {
            return Err(PathError::TooManyIndices {
                got: raw.len(),
                max: schema.len(),
            }
            .into());
        }

        let indices = raw
            .iter()
            .zip(schema.segments())
            .enumerate()
            .map(|(position, (index, segment))| {
                resolve_index::<D>(index, segment.kind).map_err(|source| PathError::Unresolved {
                    position,
                    label: segment.label.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(depth = indices.len(), "parsed derivation path");
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<Vec<u32>> for Path {
    fn from(indices: Vec<u32>) -> Self {
        Self { indices }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

/// Renders the resolved numeric form; alphabetic labels appear as their
/// hashed indices.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_MARKER)?;
        for index in &self.indices {
            write!(f, "{PATH_SEPARATOR}{index}")?;
        }
        Ok(())
    }
}
