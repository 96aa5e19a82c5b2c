//! Paging state, configuration and the materialized page wrapper.

use serde::{Deserialize, Serialize};

/// Paging defaults applied by [`Specification::set_page`](crate::Specification::set_page).
///
/// Deserializes from any serde format; missing keys fall back to the
/// defaults.
///
/// ```
/// use sieve::PagingConfig;
///
/// let config = PagingConfig::default();
/// assert_eq!(config.default_page_size, 10);
/// assert_eq!(config.max_page_size, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size used when a caller passes a page size of zero.
    pub default_page_size: usize,
    /// Upper bound for page sizes, if any.
    pub max_page_size: Option<usize>,
}

impl PagingConfig {
    /// Maps a requested page size into the configured range.
    pub fn normalize_page_size(&self, page_size: usize) -> usize {
        let size = if page_size == 0 {
            self.default_page_size.max(1)
        } else {
            page_size
        };
        match self.max_page_size {
            Some(max) => size.min(max.max(1)),
            None => size,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        PagingConfig {
            default_page_size: 10,
            max_page_size: None,
        }
    }
}

/// Skip/take state of a specification.
///
/// A zero `skip` and an absent `take` are both no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub skip: usize,
    pub take: Option<usize>,
}

impl Paging {
    /// Returns `true` if neither skip nor take would change a sequence.
    pub fn is_unset(&self) -> bool {
        self.skip == 0 && self.take.is_none()
    }
}

/// One page of materialized results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Number of items across all pages.
    pub total_count: usize,
    /// 1-based page number.
    pub page_number: usize,
    /// Requested page size.
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Number of pages needed for `total_count` items.
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    /// Converts the items, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}
