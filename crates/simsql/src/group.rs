//! Group-by deduplication.
//!
//! Grouping keeps the first record seen for each distinct composite key and
//! drops the rest, so it runs after sorting: the sort decides which record
//! represents its group.

use std::collections::HashSet;

use crate::error::{FieldError, QueryError, Result};
use crate::field::{AnyRecord, FieldAccessor, Shape};
use crate::value::KeyValue;

/// Ordered list of columns forming a composite dedup key.
///
/// ```
/// use simsql::GroupBy;
///
/// let group = GroupBy::columns(["project", "status"]);
/// assert_eq!(group.column_names(), &["project", "status"]);
/// assert!(GroupBy::none().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBy {
    columns: Vec<String>,
}

impl GroupBy {
    /// No grouping.
    pub fn none() -> Self {
        Self::default()
    }

    /// Groups by a single column.
    pub fn column(column: impl Into<String>) -> Self {
        GroupBy {
            columns: vec![column.into()],
        }
    }

    /// Groups by several columns, in key order. Repeated names are kept once.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = GroupBy::none();
        for column in columns {
            let column = column.into();
            if !group.columns.contains(&column) {
                group.columns.push(column);
            }
        }
        group
    }

    /// The key columns.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` if there are no key columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Keeps the first record per distinct key, in first-occurrence order.
pub(crate) fn dedupe_records<'r>(
    records: &mut Vec<&'r dyn AnyRecord>,
    group: &GroupBy,
    shape: &Shape,
) -> Result<()> {
    if group.is_empty() {
        return Ok(());
    }

    let invalid = |column: &str, reason: FieldError| QueryError::InvalidGroupByField {
        record_type: shape.record_type(),
        column: column.to_string(),
        reason,
    };

    let accessors: Vec<&FieldAccessor> = group
        .column_names()
        .iter()
        .map(|column| {
            shape
                .accessor(column)
                .ok_or_else(|| invalid(column, FieldError::UnknownColumn))
        })
        .collect::<Result<_>>()?;
    if records.is_empty() {
        return Ok(());
    }

    let mut seen: HashSet<Vec<KeyValue<'r>>> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    for &record in records.iter() {
        let mut key = Vec::with_capacity(accessors.len());
        for accessor in &accessors {
            let value = accessor
                .get(record)
                .map_err(|err| invalid(accessor.column(), err.into()))?;
            key.push(KeyValue(value));
        }
        if seen.insert(key) {
            kept.push(record);
        }
    }

    *records = kept;
    Ok(())
}
