// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Offset pagination and result limits.

use crate::sort::Sort;

/// Pagination request for list operations.
///
/// # Example
///
/// ```rust
/// use entity_query_core::Pageable;
///
/// let first = Pageable::of(0, 25); // offset=0, size=25
/// let third = Pageable::of(2, 25); // offset=50, size=25
///
/// assert_eq!(first.offset(), Some(0));
/// assert_eq!(third.offset(), Some(50));
/// assert!(Pageable::unpaged().is_unpaged());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pageable {
    /// No pagination, optionally sorted.
    #[default]
    Unpaged,

    /// A concrete page.
    Paged {
        /// Page number (0-indexed).
        page: u64,

        /// Items per page.
        size: u64,

        /// Ordering that comes with the page request.
        sort: Sort
    }
}

impl Pageable {
    /// Page request without sorting.
    ///
    /// # Arguments
    ///
    /// * `page` — Page number (0-indexed)
    /// * `size` — Items per page
    pub const fn of(page: u64, size: u64) -> Self {
        Self::Paged {
            page,
            size,
            sort: Sort::unsorted()
        }
    }

    /// Page request carrying a sort.
    pub fn sorted(page: u64, size: u64, sort: Sort) -> Self {
        Self::Paged {
            page,
            size,
            sort
        }
    }

    /// No pagination.
    pub const fn unpaged() -> Self {
        Self::Unpaged
    }

    /// Check if this is a concrete page.
    pub const fn is_paged(&self) -> bool {
        matches!(self, Self::Paged { .. })
    }

    /// Check if this requests everything.
    pub const fn is_unpaged(&self) -> bool {
        matches!(self, Self::Unpaged)
    }

    /// Number of results to skip.
    pub const fn offset(&self) -> Option<u64> {
        match self {
            Self::Paged {
                page,
                size,
                ..
            } => Some(*page * *size),
            Self::Unpaged => None
        }
    }

    /// Requested page size.
    pub const fn page_size(&self) -> Option<u64> {
        match self {
            Self::Paged {
                size, ..
            } => Some(*size),
            Self::Unpaged => None
        }
    }

    /// Sort that travels with the page request.
    pub fn sort(&self) -> Sort {
        match self {
            Self::Paged {
                sort, ..
            } => sort.clone(),
            Self::Unpaged => Sort::unsorted()
        }
    }
}

/// Upper bound on the number of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Limit {
    max: Option<usize>
}

impl Limit {
    /// Limit results to `max`.
    pub const fn of(max: usize) -> Self {
        Self {
            max: Some(max)
        }
    }

    /// No limit.
    pub const fn unlimited() -> Self {
        Self {
            max: None
        }
    }

    /// Check if a limit is set.
    pub const fn is_limited(&self) -> bool {
        self.max.is_some()
    }

    /// Maximum number of results, if limited.
    pub const fn max(&self) -> Option<usize> {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pageable_of() {
        let p = Pageable::of(2, 25);
        assert_eq!(p.page_size(), Some(25));
        assert_eq!(p.offset(), Some(50));
        assert!(p.sort().is_unsorted());
    }

    #[test]
    fn pageable_default_is_unpaged() {
        let p = Pageable::default();
        assert!(p.is_unpaged());
        assert_eq!(p.offset(), None);
        assert_eq!(p.page_size(), None);
    }

    #[test]
    fn sorted_page_keeps_sort() {
        let p = Pageable::sorted(0, 10, Sort::by(["name"]));
        assert_eq!(p.sort().len(), 1);
    }

    #[test]
    fn limit_accessors() {
        assert_eq!(Limit::of(3).max(), Some(3));
        assert!(!Limit::unlimited().is_limited());
    }
}
