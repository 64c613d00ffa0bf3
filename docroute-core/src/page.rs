//! Pagination and result types for managing query results.
//!
//! This module provides page-based slicing of result sets, including the
//! [`Page`] struct for result pages and [`PaginationParams`] for specifying
//! which page to take.

use serde::{Deserialize, Serialize};
use std::cmp::min;

/// A single page of paginated results.
///
/// # Example
///
/// ```ignore
/// use docroute::page::Page;
///
/// let page: Page<String> = Page::builder(vec!["item1".to_string()])
///     .with_count(100)
///     .with_next_page(Some(2))
///     .build();
///
/// assert_eq!(page.items.len(), 1);
/// assert_eq!(page.count, 100);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    pub items: Vec<T>,
    /// Total count of items across all pages.
    pub count: usize,
    /// The next page number (if more pages exist).
    pub next_page: Option<usize>,
    /// The previous page number (if this is not the first page).
    pub previous_page: Option<usize>,
}

impl<T> Page<T> {
    /// Creates a new builder for constructing a page with custom settings.
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }

    /// Wraps a complete, unpaginated result set as a single page.
    pub fn single(items: Vec<T>) -> Self {
        let count = items.len();
        Page::builder(items).with_count(count).build()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }
}

/// Builder for constructing [`Page`] instances with fluent API.
pub struct PageBuilder<T> {
    items: Vec<T>,
    count: usize,
    next_page: Option<usize>,
    previous_page: Option<usize>,
}

impl<T> PageBuilder<T> {
    /// Creates a new builder with the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }

    /// Sets the total count of items across all pages.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the next page number (or `None` if this is the last page).
    pub fn with_next_page(mut self, next_page: Option<usize>) -> Self {
        self.next_page = next_page;
        self
    }

    /// Sets the previous page number (or `None` if this is the first page).
    pub fn with_previous_page(mut self, previous_page: Option<usize>) -> Self {
        self.previous_page = previous_page;
        self
    }

    /// Builds and returns the final [`Page`] instance.
    pub fn build(self) -> Page<T> {
        Page {
            items: self.items,
            count: self.count,
            next_page: self.next_page,
            previous_page: self.previous_page,
        }
    }
}

/// Page-based slicing parameters.
///
/// Pages are 1-indexed. Parameters with `page == 0` or `limit == 0` are not
/// [valid](PaginationParams::is_valid) and are ignored by the query engine.
///
/// # Example
///
/// ```ignore
/// use docroute::page::PaginationParams;
///
/// let params = PaginationParams::new(2, 50);
/// assert_eq!(params.offset(), 50);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: usize,
    /// Number of items per page.
    pub limit: usize,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Whether these parameters describe a real page (`page >= 1`, `limit > 0`).
    pub fn is_valid(&self) -> bool {
        self.page >= 1 && self.limit > 0
    }

    /// Calculates the number of items to skip for this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Returns the items of this page; out-of-range pages yield an empty vec.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset();

        if offset >= items.len() {
            return Vec::new();
        }

        items
            .into_iter()
            .skip(offset)
            .take(self.limit)
            .collect()
    }

    /// Paginates a vec of items and wraps the slice with navigation metadata.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let items: Vec<i32> = (1..=100).collect();
    /// let page = PaginationParams::new(2, 10).paginate(items);
    ///
    /// assert_eq!(page.items, vec![11, 12, 13, 14, 15, 16, 17, 18, 19, 20]);
    /// assert_eq!(page.next_page, Some(3));
    /// assert_eq!(page.previous_page, Some(1));
    /// ```
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let count = items.len();
        let end = min(self.offset().saturating_add(self.limit), count);
        let previous_page = if self.page > 1 { Some(self.page - 1) } else { None };

        Page::builder(self.slice(items))
            .with_count(count)
            .with_next_page(if end < count { Some(self.page + 1) } else { None })
            .with_previous_page(previous_page)
            .build()
    }
}
