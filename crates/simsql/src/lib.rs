//! simsql - SQL-like queries over in-memory record collections.
//!
//! simsql filters, sorts, deduplicates and paginates slices of structs using
//! column-name-addressed predicates, with no database behind them. It
//! provides:
//!
//! - Column access by name through per-type accessors, resolved once and cached
//! - A composable condition tree: column predicates and nested `Where` groups
//! - Multi-column ordering with a fixed null policy
//! - Group-by deduplication that keeps the first record per key
//! - Offset/limit pagination
//!
//! # Quick Start
//!
//! ```rust
//! use simsql::{query, Column, Dir, GroupBy, Limit, OrderBy, Record, ShapeBuilder, Value};
//!
//! // Describe the columns of your data
//! struct Task {
//!     name: String,
//!     project: &'static str,
//!     priority: i32,
//! }
//!
//! impl Record for Task {
//!     fn describe(shape: &mut ShapeBuilder<Self>) {
//!         shape
//!             .column("name", |t| Value::String(&t.name))
//!             .column("project", |t| Value::String(t.project))
//!             .column("priority", |t| Value::from(t.priority));
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), project: "site", priority: 3 },
//!     Task { name: "Fix bug".into(), project: "core", priority: 5 },
//!     Task { name: "Refactor".into(), project: "core", priority: 4 },
//!     Task { name: "Old task".into(), project: "site", priority: 1 },
//! ];
//!
//! // Highest-priority task of each project, among priority >= 3
//! let filter = Column::of("priority").is_greater_than_or_equal(3);
//! let order = OrderBy::column("priority", Dir::Desc);
//! let group = GroupBy::column("project");
//!
//! let results = query(&tasks, &filter, &order, &group, &Limit::none()).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Fix bug");
//! assert_eq!(results[1].name, "Write docs");
//! ```
//!
//! With the `derive` feature, `#[derive(Record)]` writes the `describe`
//! implementation from the struct's fields.
//!
//! # Pipeline
//!
//! Every query runs four stages in a fixed order:
//!
//! ```text
//! filter (Condition) → sort (OrderBy) → dedupe (GroupBy) → page (Limit)
//! ```
//!
//! Filtering is fail-soft: a predicate on an unknown column, or one whose
//! evaluator fails, simply does not match. Sorting and grouping are
//! fail-hard: an unknown column or unorderable values abort the query with
//! a [`QueryError`].
//!
//! # Where Semantics
//!
//! A [`Where`] combines an AND list and an OR list:
//!
//! ```text
//! match = (all AND conditions match) ∨ (any OR condition matches, or no OR conditions exist)
//! ```
//!
//! Both lists are trivially satisfied when empty, so a `Where` with only AND
//! conditions, or only OR conditions, matches every record.
//!
//! # Column Kinds and Predicates
//!
//! | Kind | Predicates |
//! |------|-----------|
//! | String | `=`, `<>`, `>`, `>=`, `<`, `<=`, `in`, `contains`, `starts_with`, `ends_with`, `regex` |
//! | Number | `=`, `<>`, `>`, `>=`, `<`, `<=`, `in` |
//! | Timestamp | `=`, `<>`, `>`, `>=`, `<`, `<=` (also against millisecond numbers) |
//! | Enum | `=`, `<>`, `in`, `>`, `>=`, `<`, `<=` (also against discriminant numbers) |
//! | Bool | `=`, `<>`, `>`, `>=`, `<`, `<=` (`false < true`) |
//!
//! Every kind supports `is_null` and `is_not_null`.

mod cache;
mod column;
mod condition;
mod constant;
mod context;
mod error;
mod field;
mod group;
mod limit;
mod op;
mod ordering;
mod query;
mod value;

// Re-export public API
pub use cache::{CacheConfig, CacheStats, FieldCache};
pub use column::Column;
pub use condition::{ColumnCondition, Condition, Where};
pub use constant::{order_against, Comparison, Constant};
pub use context::QueryContext;
pub use error::{EvalError, FieldAccessError, FieldError, QueryError, Result};
pub use field::{
    AnyRecord, FieldAccessor, Record, RecordType, Shape, ShapeBuilder, ToDiscriminant, ToTimestamp,
};
pub use group::GroupBy;
pub use limit::Limit;
pub use op::Op;
pub use ordering::{compare_values, Dir, Nulls, OrderBy, SortKey};
pub use query::{query, query_dyn, Query};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use simsql_macros::Record;
