//! In-memory query evaluation: filtering, sorting and pagination of records.
//!
//! [`QueryEngine`] runs the three steps of a [`Query`] in a fixed order:
//! filter, then stable sort, then page slice. Each step is optional.
//!
//! # Loose equality
//!
//! Filter values are compared with [`loose_eq`], which coerces between
//! numbers, numeric strings and booleans:
//!
//! | record value | filter value | equal when |
//! |---|---|---|
//! | number | number | numerically equal (integers and doubles unified) |
//! | number | string | the trimmed string parses to the same number (`""` is 0) |
//! | boolean | number or string | the boolean as 1/0 equals the numeric value |
//! | string | string | byte-equal |
//! | boolean | boolean | equal |
//! | null | null | equal |
//!
//! Every other pairing, including arrays and nested documents, is unequal.
//!
//! Numeric strings follow Rust float syntax (`"1e3"`, `".5"`, `"+2"`) plus
//! `0x`/`0o`/`0b` integer prefixes. Non-finite spellings such as `"inf"` or
//! `"NaN"` never coerce.
//!
//! # Sort order
//!
//! Sorting never coerces. Values are ordered by type class first
//! (missing/null, boolean, number, datetime, string, then arrays and
//! documents) and naturally within a class, so records lacking the sort
//! field come first in ascending order and last in descending order.

use bson::{Bson, DateTime, Document as BsonDocument};
use std::cmp::Ordering;

use crate::{
    document::Record,
    page::Page,
    query::{Query, SortDirection},
};

/// Comparable view of a BSON value. Integers and doubles are normalized to `f64`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Arrays, documents and other types with no scalar ordering.
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            _ => Comparable::Opaque,
        }
    }
}

impl Comparable<'_> {
    /// Type class position: null < bool < number < datetime < string < opaque.
    fn rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Number(_) => 2,
            Comparable::DateTime(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Opaque => 5,
        }
    }

    /// Total order used for sorting: type class first, then value within the class.
    ///
    /// NaN sorts after every other number; opaque values all tie.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a
                .partial_cmp(b)
                .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())),
            _ => self
                .partial_cmp(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
            || matches!((self, other), (Comparable::Null, Comparable::Null))
    }
}

/// Parses a string the way a numeric coercion would: trimmed, empty is zero.
fn coerce_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };

    match radix {
        Some(radix) => u64::from_str_radix(&trimmed[2..], radix).ok().map(|n| n as f64),
        None => trimmed.parse::<f64>().ok().filter(|n| n.is_finite()),
    }
}

fn bool_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Cross-type equality used by filters. See the module docs for the coercion table.
pub fn loose_eq(left: &Bson, right: &Bson) -> bool {
    use Comparable::*;

    match (Comparable::from(left), Comparable::from(right)) {
        (Number(n), String(s)) | (String(s), Number(n)) => coerce_number(s) == Some(n),
        (Bool(b), Number(n)) | (Number(n), Bool(b)) => bool_number(b) == n,
        (Bool(b), String(s)) | (String(s), Bool(b)) => coerce_number(s) == Some(bool_number(b)),
        (a, b) => a == b,
    }
}

/// Compares two optional field values for sorting. A missing field sorts as null.
fn compare_values(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let left = left.map(Comparable::from).unwrap_or(Comparable::Null);
    let right = right.map(Comparable::from).unwrap_or(Comparable::Null);

    left.sort_cmp(&right)
}

/// Executes [`Query`] values against in-memory record sequences.
pub struct QueryEngine;

impl QueryEngine {
    /// Returns whether `record` satisfies every pair of `filter`.
    ///
    /// A filter field missing from the record never matches.
    pub fn matches(record: &Record, filter: &BsonDocument) -> bool {
        filter.iter().all(|(field, expected)| {
            record
                .get(field)
                .is_some_and(|actual| loose_eq(actual, expected))
        })
    }

    /// Applies filter, sort and pagination, in that order.
    pub fn execute(records: impl IntoIterator<Item = Record>, query: &Query) -> Vec<Record> {
        let items = Self::filter_and_sort(records, query);

        match query.paginate.filter(|p| p.is_valid()) {
            Some(params) => params.slice(items),
            None => items,
        }
    }

    /// Like [`QueryEngine::execute`], but keeps the total match count and page links.
    pub fn execute_page(records: impl IntoIterator<Item = Record>, query: &Query) -> Page<Record> {
        let items = Self::filter_and_sort(records, query);

        match query.paginate.filter(|p| p.is_valid()) {
            Some(params) => params.paginate(items),
            None => Page::single(items),
        }
    }

    fn filter_and_sort(records: impl IntoIterator<Item = Record>, query: &Query) -> Vec<Record> {
        let mut items = records
            .into_iter()
            .filter(|record| Self::matches(record, &query.filter))
            .collect::<Vec<_>>();

        if let Some(sort) = &query.sort {
            // `sort_by` is stable, so ties keep their scan order.
            items.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));

                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        items
    }
}
