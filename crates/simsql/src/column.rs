//! Fluent constructors for common column predicates.
//!
//! Every method produces a labelled [`ColumnCondition`] over one column:
//!
//! ```
//! use simsql::{Column, Where};
//!
//! let filter = Where::new()
//!     .and(Column::of("status").is_in(["open", "blocked"]))
//!     .and(Column::of("priority").is_greater_than_or_equal(3))
//!     .and(Column::of("title").starts_with("fix"));
//! assert_eq!(filter.and_conditions().len(), 3);
//! ```

use regex::Regex;

use crate::condition::ColumnCondition;
use crate::constant::{order_against, Constant};
use crate::error::Result;
use crate::op::Op;

/// Names a column and builds predicates over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
}

impl Column {
    /// Starts a predicate on `name`.
    pub fn of(name: impl Into<String>) -> Self {
        Column { name: name.into() }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `column = value`.
    ///
    /// Kinds must match exactly, except that numbers compare by value across
    /// representations. A null column never equals anything; use
    /// [`is_null`](Self::is_null).
    pub fn is_equal_to(&self, value: impl Into<Constant>) -> ColumnCondition {
        let constant = value.into();
        let label = self.label(Op::Eq, &constant);
        ColumnCondition::of(self.name.clone(), move |v| constant.equals(v)).with_label(label)
    }

    /// `column <> value`. A null column matches neither equality nor
    /// inequality.
    pub fn is_not_equal_to(&self, value: impl Into<Constant>) -> ColumnCondition {
        let constant = value.into();
        let label = self.label(Op::Ne, &constant);
        ColumnCondition::of(self.name.clone(), move |v| !v.is_none() && !constant.equals(v))
            .with_label(label)
    }

    /// `column > value`.
    pub fn is_greater_than(&self, value: impl Into<Constant>) -> ColumnCondition {
        self.ordered(Op::Gt, value.into())
    }

    /// `column < value`.
    pub fn is_less_than(&self, value: impl Into<Constant>) -> ColumnCondition {
        self.ordered(Op::Lt, value.into())
    }

    /// `column >= value`.
    pub fn is_greater_than_or_equal(&self, value: impl Into<Constant>) -> ColumnCondition {
        self.ordered(Op::Gte, value.into())
    }

    /// `column <= value`.
    pub fn is_less_than_or_equal(&self, value: impl Into<Constant>) -> ColumnCondition {
        self.ordered(Op::Lte, value.into())
    }

    /// `column in (values...)`.
    pub fn is_in<I, C>(&self, values: I) -> ColumnCondition
    where
        I: IntoIterator<Item = C>,
        C: Into<Constant>,
    {
        let set: Vec<Constant> = values.into_iter().map(Into::into).collect();
        let listed: Vec<String> = set.iter().map(ToString::to_string).collect();
        let label = format!("{} {} ({})", self.name, Op::In, listed.join(", "));
        ColumnCondition::of(self.name.clone(), move |v| set.iter().any(|c| c.equals(v)))
            .with_label(label)
    }

    /// `column like '%needle%'`.
    pub fn contains(&self, needle: impl Into<String>) -> ColumnCondition {
        let needle = needle.into();
        let label = format!("{} {} '%{}%'", self.name, Op::Contains, needle);
        ColumnCondition::of(self.name.clone(), move |v| {
            v.as_str().is_some_and(|s| s.contains(needle.as_str()))
        })
        .with_label(label)
    }

    /// `column like 'prefix%'`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> ColumnCondition {
        let prefix = prefix.into();
        let label = format!("{} {} '{}%'", self.name, Op::StartsWith, prefix);
        ColumnCondition::of(self.name.clone(), move |v| {
            v.as_str().is_some_and(|s| s.starts_with(prefix.as_str()))
        })
        .with_label(label)
    }

    /// `column like '%suffix'`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> ColumnCondition {
        let suffix = suffix.into();
        let label = format!("{} {} '%{}'", self.name, Op::EndsWith, suffix);
        ColumnCondition::of(self.name.clone(), move |v| {
            v.as_str().is_some_and(|s| s.ends_with(suffix.as_str()))
        })
        .with_label(label)
    }

    /// `column regexp 'pattern'`.
    ///
    /// The pattern is compiled once; an invalid pattern is an error here
    /// rather than a non-match later.
    pub fn matches_regex(&self, pattern: &str) -> Result<ColumnCondition> {
        let regex = Regex::new(pattern)?;
        let label = format!("{} {} '{}'", self.name, Op::Regex, pattern);
        Ok(
            ColumnCondition::of(self.name.clone(), move |v| {
                v.as_str().is_some_and(|s| regex.is_match(s))
            })
            .with_label(label),
        )
    }

    /// `column is null`.
    pub fn is_null(&self) -> ColumnCondition {
        ColumnCondition::of(self.name.clone(), |v| v.is_none())
            .with_label(format!("{} {}", self.name, Op::IsNull))
    }

    /// `column is not null`.
    pub fn is_not_null(&self) -> ColumnCondition {
        ColumnCondition::of(self.name.clone(), |v| !v.is_none())
            .with_label(format!("{} {}", self.name, Op::NotNull))
    }

    fn ordered(&self, op: Op, constant: Constant) -> ColumnCondition {
        let label = self.label(op, &constant);
        ColumnCondition::of(self.name.clone(), move |v| {
            order_against(v, &constant).is_some_and(|ordering| op.eval_ordering(ordering))
        })
        .with_label(label)
    }

    fn label(&self, op: Op, constant: &Constant) -> String {
        format!("{} {} {}", self.name, op, constant)
    }
}
