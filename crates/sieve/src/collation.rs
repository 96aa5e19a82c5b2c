//! Backend-defined string matching.
//!
//! Case sensitivity of `Contains`/`StartsWith`/`EndsWith` and of search
//! patterns belongs to the data source, not to the specification. Each
//! [`QuerySource`](crate::QuerySource) reports its collation and the string
//! predicates are compiled against it. Equality and sorting stay ordinal.

use serde::{Deserialize, Serialize};

/// String comparison rules of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Collation {
    /// Byte-wise, case-sensitive.
    #[default]
    Ordinal,
    /// Case-insensitive (Unicode lowercase folding).
    IgnoreCase,
}

impl Collation {
    /// Returns `true` if `haystack` contains `needle`.
    pub fn contains(self, haystack: &str, needle: &str) -> bool {
        match self {
            Collation::Ordinal => haystack.contains(needle),
            Collation::IgnoreCase => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    /// Returns `true` if `haystack` starts with `prefix`.
    pub fn starts_with(self, haystack: &str, prefix: &str) -> bool {
        match self {
            Collation::Ordinal => haystack.starts_with(prefix),
            Collation::IgnoreCase => haystack
                .to_lowercase()
                .starts_with(&prefix.to_lowercase()),
        }
    }

    /// Returns `true` if `haystack` ends with `suffix`.
    pub fn ends_with(self, haystack: &str, suffix: &str) -> bool {
        match self {
            Collation::Ordinal => haystack.ends_with(suffix),
            Collation::IgnoreCase => haystack.to_lowercase().ends_with(&suffix.to_lowercase()),
        }
    }
}
