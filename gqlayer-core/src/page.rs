//! Pagination hints for list operations.
//!
//! List operations accept optional `pageNumber`/`pageSize` arguments. When a caller supplies
//! either of them, the resolver turns them into [`PaginationParams`] and forwards them to the
//! store; otherwise the store returns every match.

use serde::{Deserialize, Serialize};

/// Page used when only a page size is supplied.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when only a page number is supplied.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which slice of a result set to return. Pages are 1-indexed.
///
/// # Example
///
/// ```ignore
/// use gqlayer_core::page::PaginationParams;
///
/// let params = PaginationParams::new(3, 20);
/// assert_eq!(params.offset(), 40);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl PaginationParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn builder() -> PaginationParamsBuilder {
        PaginationParamsBuilder::default()
    }

    /// Builds parameters from raw list arguments.
    ///
    /// Returns `None` when neither argument was supplied. Missing values take the defaults and
    /// values below 1 are clamped to 1.
    pub fn from_args(page_number: Option<i64>, page_size: Option<i64>) -> Option<Self> {
        if page_number.is_none() && page_size.is_none() {
            return None;
        }

        let clamp = |value: i64| usize::try_from(value.max(1)).unwrap_or(usize::MAX);

        Some(Self::new(
            page_number.map(clamp).unwrap_or(DEFAULT_PAGE),
            page_size.map(clamp).unwrap_or(DEFAULT_PAGE_SIZE),
        ))
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Keeps only the items of this page.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.per_page)
            .collect()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Builder for [`PaginationParams`]; unset values take the defaults.
#[derive(Debug, Default)]
pub struct PaginationParamsBuilder {
    page: Option<usize>,
    per_page: Option<usize>,
}

impl PaginationParamsBuilder {
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> PaginationParams {
        PaginationParams::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_arguments_mean_no_pagination() {
        assert_eq!(PaginationParams::from_args(None, None), None);
    }

    #[test]
    fn partial_arguments_take_defaults() {
        assert_eq!(
            PaginationParams::from_args(Some(3), None),
            Some(PaginationParams::new(3, 10))
        );
        assert_eq!(
            PaginationParams::from_args(None, Some(25)),
            Some(PaginationParams::new(1, 25))
        );
    }

    #[test]
    fn non_positive_values_are_clamped() {
        let params = PaginationParams::from_args(Some(0), Some(-4)).unwrap();

        assert_eq!(params, PaginationParams::new(1, 1));
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn apply_returns_the_requested_slice() {
        let items: Vec<i32> = (1..=25).collect();

        assert_eq!(PaginationParams::new(2, 10).apply(items.clone()), (11..=20).collect::<Vec<_>>());
        assert_eq!(PaginationParams::new(3, 10).apply(items.clone()), (21..=25).collect::<Vec<_>>());
        assert!(PaginationParams::new(4, 10).apply(items).is_empty());
    }

    #[test]
    fn builder_fills_in_defaults() {
        assert_eq!(PaginationParams::builder().build(), PaginationParams::default());
        assert_eq!(
            PaginationParams::builder().with_page(5).build(),
            PaginationParams::new(5, 10)
        );
    }
}
