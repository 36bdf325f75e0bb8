//! Predicate operators produced by the column builder.
//!
//! [`Op`] names the comparison a [`Column`](crate::Column) predicate performs;
//! it drives evaluation and the condition's display label.

use std::cmp::Ordering;

/// Comparison operator of a column predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal (exact match).
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Value is one of a set.
    In,
    /// String contains substring.
    Contains,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// String matches regular expression.
    Regex,
    /// Column is absent or null.
    IsNull,
    /// Column is present.
    NotNull,
}

impl Op {
    /// Evaluates a range operator given how the column value orders against
    /// the constant. Any other operator yields `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the SQL-like spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::In => "in",
            Op::Contains | Op::StartsWith | Op::EndsWith => "like",
            Op::Regex => "regexp",
            Op::IsNull => "is null",
            Op::NotNull => "is not null",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
