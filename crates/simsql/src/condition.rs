//! The condition tree.
//!
//! A [`Condition`] is either a leaf [`ColumnCondition`], which extracts one or
//! more column values and hands them to an evaluator, or a composite
//! [`Where`], which combines sub-conditions.
//!
//! Evaluation is fail-soft: an unknown column, an accessor failure or an
//! [`EvalError`] from the evaluator makes the condition `false` for that
//! record. It never aborts the query.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::FieldCache;
use crate::context::QueryContext;
use crate::error::EvalError;
use crate::field::AnyRecord;
use crate::value::Value;

/// A predicate evaluable against a record.
pub trait Condition: Send + Sync + fmt::Debug {
    /// Returns `true` if `record` satisfies this condition.
    ///
    /// `None` stands for an absent record, which exposes no columns.
    fn matches(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool;

    /// Evaluates this condition outside a query.
    ///
    /// The record is read through its own runtime type, resolved with the
    /// global cache.
    fn evaluate(&self, record: &dyn AnyRecord) -> bool {
        let ctx = QueryContext::detached(FieldCache::global());
        self.matches(Some(record), &ctx)
    }
}

impl<C: Condition + ?Sized> Condition for Box<C> {
    fn matches(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        (**self).matches(record, ctx)
    }
}

impl<C: Condition + ?Sized> Condition for Arc<C> {
    fn matches(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        (**self).matches(record, ctx)
    }
}

type Evaluator = dyn Fn(&[Value<'_>]) -> Result<bool, EvalError> + Send + Sync;

/// Leaf condition over one or more named columns.
///
/// The evaluator receives the extracted values in the order the columns were
/// configured.
///
/// # Example
///
/// ```
/// use simsql::{ColumnCondition, Condition, Record, ShapeBuilder, Value};
///
/// struct Item {
///     price: u32,
///     stock: u32,
/// }
///
/// impl Record for Item {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .column("price", |i| Value::from(i.price))
///             .column("stock", |i| Value::from(i.stock));
///     }
/// }
///
/// let cheap = ColumnCondition::of("price", |v| v.as_i64().is_some_and(|p| p < 10));
/// let plenty = ColumnCondition::of_columns(["price", "stock"], |vs| {
///     vs[0].as_i64() < vs[1].as_i64()
/// });
///
/// let item = Item { price: 5, stock: 20 };
/// assert!(cheap.evaluate(&item));
/// assert!(plenty.evaluate(&item));
/// ```
#[derive(Clone)]
pub struct ColumnCondition {
    columns: Vec<String>,
    label: Option<String>,
    evaluator: Arc<Evaluator>,
}

impl ColumnCondition {
    /// Condition over a single column.
    pub fn of<F>(column: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value<'_>) -> bool + Send + Sync + 'static,
    {
        Self::try_of([column], move |values| {
            Ok(values.first().is_some_and(|value| predicate(value)))
        })
    }

    /// Condition over several columns.
    pub fn of_columns<I, S, F>(columns: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value<'_>]) -> bool + Send + Sync + 'static,
    {
        Self::try_of(columns, move |values| Ok(predicate(values)))
    }

    /// Condition whose evaluator may fail.
    ///
    /// An `Err` from the evaluator makes the condition `false`.
    pub fn try_of<I, S, F>(columns: I, evaluator: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value<'_>]) -> Result<bool, EvalError> + Send + Sync + 'static,
    {
        ColumnCondition {
            columns: columns.into_iter().map(Into::into).collect(),
            label: None,
            evaluator: Arc::new(evaluator),
        }
    }

    /// Sets the label shown by `Display` and `Debug`.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The configured columns, in evaluator order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The label, if one was set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn extract<'r>(
        &self,
        record: &'r dyn AnyRecord,
        ctx: &QueryContext<'_>,
    ) -> Option<Vec<Value<'r>>> {
        let shape = ctx.shape_for(record);
        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let Some(accessor) = shape.accessor(column) else {
                trace!(column = %column, record_type = shape.record_type(), "unknown filter column");
                return None;
            };
            match accessor.get(record) {
                Ok(value) => values.push(value),
                Err(err) => {
                    debug!(error = %err, "filter column extraction failed");
                    return None;
                }
            }
        }
        Some(values)
    }
}

impl Condition for ColumnCondition {
    fn matches(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        let values = match record {
            Some(record) => match self.extract(record, ctx) {
                Some(values) => values,
                None => return false,
            },
            None if self.columns.is_empty() => Vec::new(),
            None => return false,
        };

        match (self.evaluator)(&values) {
            Ok(matched) => matched,
            Err(err) => {
                debug!(condition = %self, error = %err, "condition evaluation failed");
                false
            }
        }
    }
}

impl fmt::Display for ColumnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "<predicate on {}>", self.columns.join(", ")),
        }
    }
}

impl fmt::Debug for ColumnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnCondition")
            .field("columns", &self.columns)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Composite condition.
///
/// A record matches when every AND condition matches, **or** when any OR
/// condition matches. An empty OR list counts as matching, and so does an
/// empty AND list; a `Where` with nothing in it matches everything.
///
/// Note the precedence: this is `all(and) || any(or)`, not
/// `all(and) && any(or)`. A record that satisfies every AND condition passes
/// even if it satisfies no OR condition.
///
/// ```
/// use simsql::{Column, Condition, Record, ShapeBuilder, Value, Where};
///
/// struct Row {
///     n: i32,
/// }
///
/// impl Record for Row {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape.column("n", |r| Value::from(r.n));
///     }
/// }
///
/// let w = Where::new()
///     .and(Column::of("n").is_greater_than(10))
///     .or(Column::of("n").is_equal_to(3));
///
/// assert!(w.evaluate(&Row { n: 11 }));
/// assert!(w.evaluate(&Row { n: 3 }));
/// assert!(!w.evaluate(&Row { n: 4 }));
/// ```
#[derive(Debug, Default)]
pub struct Where {
    and: Vec<Box<dyn Condition>>,
    or: Vec<Box<dyn Condition>>,
}

impl Where {
    /// Creates an empty `Where`, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition to the AND list.
    pub fn and(mut self, condition: impl Condition + 'static) -> Self {
        self.and.push(Box::new(condition));
        self
    }

    /// Adds a condition to the OR list.
    pub fn or(mut self, condition: impl Condition + 'static) -> Self {
        self.or.push(Box::new(condition));
        self
    }

    /// Returns `true` if both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty()
    }

    /// The AND list.
    pub fn and_conditions(&self) -> &[Box<dyn Condition>] {
        &self.and
    }

    /// The OR list.
    pub fn or_conditions(&self) -> &[Box<dyn Condition>] {
        &self.or
    }

    fn match_all(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        self.and.iter().all(|c| c.matches(record, ctx))
    }

    fn match_any(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        self.or.is_empty() || self.or.iter().any(|c| c.matches(record, ctx))
    }
}

impl Condition for Where {
    fn matches(&self, record: Option<&dyn AnyRecord>, ctx: &QueryContext<'_>) -> bool {
        self.match_all(record, ctx) || self.match_any(record, ctx)
    }
}
