//! Ordering types and the sort stage.
//!
//! Provides [`Dir`] for sort direction, [`Nulls`] for null placement,
//! [`SortKey`] for one column and [`OrderBy`] for a prioritized list of keys.
//!
//! Sorting is stable and fail-hard: an unknown sort column, or two values
//! that cannot be ordered, aborts the query with
//! [`QueryError::InvalidSortField`].

use std::cmp::Ordering;

use crate::error::{FieldError, QueryError, Result};
use crate::field::{AnyRecord, FieldAccessor, Shape};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where null values go.
///
/// The placement holds regardless of [`Dir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nulls {
    /// Nulls before every value.
    #[default]
    First,
    /// Nulls after every value.
    Last,
}

/// One sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// The column to sort by.
    pub column: String,
    /// The sort direction.
    pub dir: Dir,
    /// Placement of null values.
    pub nulls: Nulls,
}

impl SortKey {
    /// Creates a key with the given direction and nulls first.
    pub fn new(column: impl Into<String>, dir: Dir) -> Self {
        SortKey {
            column: column.into(),
            dir,
            nulls: Nulls::First,
        }
    }

    /// Sets the null placement.
    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = nulls;
        self
    }

    /// Compares two values according to this key.
    ///
    /// Nulls are placed before direction is applied, so they stay where
    /// [`Nulls`] puts them. Returns `None` if the values cannot be compared.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
        let null_first = match self.nulls {
            Nulls::First => Ordering::Less,
            Nulls::Last => Ordering::Greater,
        };
        match (a.is_none(), b.is_none()) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(null_first),
            (false, true) => Some(null_first.reverse()),
            (false, false) => compare_values(a, b).map(|o| self.dir.apply(o)),
        }
    }
}

/// Prioritized list of sort keys. The first key is the primary one.
///
/// ```
/// use simsql::{Dir, OrderBy};
///
/// let order = OrderBy::asc("due").then("priority", Dir::Desc);
/// assert_eq!(order.keys().len(), 2);
/// assert_eq!(order.keys()[1].dir, Dir::Desc);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    keys: Vec<SortKey>,
}

impl OrderBy {
    /// No ordering; the sort stage is skipped.
    pub fn none() -> Self {
        Self::default()
    }

    /// Orders by one column.
    pub fn column(column: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            keys: vec![SortKey::new(column, dir)],
        }
    }

    /// Orders by one column, ascending.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::column(column, Dir::Asc)
    }

    /// Orders by one column, descending.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::column(column, Dir::Desc)
    }

    /// Adds a tie-breaking column.
    pub fn then(self, column: impl Into<String>, dir: Dir) -> Self {
        self.then_key(SortKey::new(column, dir))
    }

    /// Adds a tie-breaking key.
    pub fn then_key(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    /// The keys, in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<SortKey> for OrderBy {
    fn from(key: SortKey) -> Self {
        OrderBy { keys: vec![key] }
    }
}

/// Compares two values by their natural ordering.
///
/// Null sorts before any value. Returns `None` if the kinds differ or a
/// number is NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Less),
        (_, Value::None) => Some(Ordering::Greater),

        _ => None,
    }
}

/// Stable sort of `records` by `order`, reading columns through `shape`.
pub(crate) fn sort_records<'r>(
    records: &mut Vec<&'r dyn AnyRecord>,
    order: &OrderBy,
    shape: &Shape,
) -> Result<()> {
    if order.is_empty() {
        return Ok(());
    }

    let invalid = |column: &str, reason: FieldError| QueryError::InvalidSortField {
        record_type: shape.record_type(),
        column: column.to_string(),
        reason,
    };

    let accessors: Vec<(&SortKey, &FieldAccessor)> = order
        .keys()
        .iter()
        .map(|key| match shape.accessor(&key.column) {
            Some(accessor) => Ok((key, accessor)),
            None => Err(invalid(&key.column, FieldError::UnknownColumn)),
        })
        .collect::<Result<_>>()?;
    if records.len() < 2 {
        return Ok(());
    }

    // Extract every key once, then sort the decorated rows.
    let mut rows = Vec::with_capacity(records.len());
    for &record in records.iter() {
        let mut values = Vec::with_capacity(accessors.len());
        for (key, accessor) in &accessors {
            let value = accessor
                .get(record)
                .map_err(|err| invalid(&key.column, err.into()))?;
            values.push(value);
        }
        rows.push((values, record));
    }

    let mut failure = None;
    rows.sort_by(|(a, _), (b, _)| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        for (i, (key, _)) in accessors.iter().enumerate() {
            match key.compare(&a[i], &b[i]) {
                Some(Ordering::Equal) => continue,
                Some(ordering) => return ordering,
                None => {
                    failure = Some(invalid(
                        &key.column,
                        FieldError::Incomparable {
                            left: a[i].kind(),
                            right: b[i].kind(),
                        },
                    ));
                    return Ordering::Equal;
                }
            }
        }
        Ordering::Equal
    });

    if let Some(err) = failure {
        return Err(err);
    }

    records.clear();
    records.extend(rows.into_iter().map(|(_, record)| record));
    Ok(())
}
