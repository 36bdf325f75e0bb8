//! Offset/limit pagination.

use std::ops::Range;

/// Optional offset and limit applied as the last pipeline stage.
///
/// Without a limit the stage is the identity and the offset is ignored.
/// Out-of-range offsets produce an empty page, never an error.
///
/// ```
/// use simsql::Limit;
///
/// assert_eq!(Limit::with_offset(5, 10).range(7), 5..7);
/// assert_eq!(Limit::of(3).range(10), 0..3);
/// assert_eq!(Limit::none().range(4), 0..4);
/// assert!(Limit::with_offset(9, 1).range(4).is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    offset: Option<usize>,
    limit: Option<usize>,
}

impl Limit {
    /// No pagination.
    pub fn none() -> Self {
        Self::default()
    }

    /// At most `limit` records from the start.
    pub fn of(limit: usize) -> Self {
        Limit {
            offset: None,
            limit: Some(limit),
        }
    }

    /// At most `limit` records starting at `offset`.
    pub fn with_offset(offset: usize, limit: usize) -> Self {
        Limit {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// Replaces the offset.
    pub fn skip(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Replaces the limit.
    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The configured offset.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The configured limit.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if this limit keeps every record.
    pub fn is_none(&self) -> bool {
        self.limit.is_none()
    }

    /// The index range kept out of `len` records.
    pub fn range(&self, len: usize) -> Range<usize> {
        let Some(limit) = self.limit else {
            return 0..len;
        };
        let from = self.offset.unwrap_or(0).min(len);
        let to = from.saturating_add(limit).min(len);
        from..to
    }

    /// Keeps the page of `items` selected by this limit.
    pub fn apply<T>(&self, items: &mut Vec<T>) {
        let range = self.range(items.len());
        items.truncate(range.end);
        items.drain(..range.start);
    }
}
