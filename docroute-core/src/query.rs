//! Query construction for read operations.
//!
//! A [`Query`] combines equality filters, at most one sort key and optional
//! page-based pagination. Queries are executed in memory by the
//! [`QueryEngine`](crate::evaluator::QueryEngine) over a collection scan.
//!
//! # Query Building
//!
//! ```ignore
//! use docroute::query::{Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter("status", "draft")
//!     .sort("created_at", SortDirection::Desc)
//!     .paginate(1, 20)
//!     .build();
//! ```
//!
//! Queries can also be derived from query-string entries with
//! [`Query::from_params`]: `_sort`, `_order`, `_page` and `_limit` are
//! reserved, every other key becomes an equality filter.

use bson::{Bson, Document as BsonDocument};
use std::{collections::HashMap, str::FromStr};

use crate::page::PaginationParams;

/// Query-string key selecting the sort field.
pub const SORT_PARAM: &str = "_sort";
/// Query-string key selecting the sort direction (`asc` or `desc`).
pub const ORDER_PARAM: &str = "_order";
/// Query-string key selecting the 1-indexed page.
pub const PAGE_PARAM: &str = "_page";
/// Query-string key selecting the page size.
pub const LIMIT_PARAM: &str = "_limit";

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0).
    Desc,
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// A read query over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Field name to required value. Every pair must loosely match.
    pub filter: BsonDocument,
    /// Optional single-key sort.
    pub sort: Option<Sort>,
    /// Optional page slice, applied after filtering and sorting.
    pub paginate: Option<PaginationParams>,
}

impl Query {
    /// Creates a new empty query. Executing it returns the input unchanged.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Builds a query from decoded query-string entries.
    ///
    /// `_sort` names the sort field and `_order` its direction (ascending by
    /// default). `_limit` enables pagination, with `_page` defaulting to 1.
    /// Values that do not parse are ignored. Every other entry becomes a
    /// string equality filter.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut builder = QueryBuilder::new();

        for (key, value) in params {
            match key.as_str() {
                SORT_PARAM | ORDER_PARAM | PAGE_PARAM | LIMIT_PARAM => {}
                _ => builder = builder.filter(key.as_str(), value.as_str()),
            }
        }

        if let Some(field) = params.get(SORT_PARAM).filter(|f| !f.is_empty()) {
            let direction = params
                .get(ORDER_PARAM)
                .and_then(|order| order.parse().ok())
                .unwrap_or_default();

            builder = builder.sort(field.as_str(), direction);
        }

        let limit = params
            .get(LIMIT_PARAM)
            .and_then(|limit| limit.trim().parse::<usize>().ok());
        let page = params
            .get(PAGE_PARAM)
            .and_then(|page| page.trim().parse::<usize>().ok())
            .unwrap_or(1);

        if let Some(limit) = limit {
            builder = builder.paginate(page, limit);
        }

        builder.build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Adds an equality filter. A second filter on the same field replaces the first.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.query.filter.insert(field.into(), value.into());
        self
    }

    /// Sets the sort specification, replacing any previous one.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Sets the 1-indexed page and page size.
    pub fn paginate(mut self, page: usize, limit: usize) -> Self {
        self.query.paginate = Some(PaginationParams::new(page, limit));
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}
