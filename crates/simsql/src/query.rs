//! Query pipeline and builder.
//!
//! Every query runs the same four stages in a fixed order:
//!
//! ```text
//! filter (Condition) → sort (OrderBy) → dedupe (GroupBy) → page (Limit)
//! ```
//!
//! [`query`] and [`query_dyn`] take the stages as arguments; [`Query`]
//! bundles them into a reusable value.

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::cache::FieldCache;
use crate::condition::{Condition, Where};
use crate::context::QueryContext;
use crate::error::Result;
use crate::field::{AnyRecord, Record, RecordType};
use crate::group::{dedupe_records, GroupBy};
use crate::limit::Limit;
use crate::ordering::{sort_records, Dir, OrderBy, SortKey};

/// Runs a query over a slice of records of one static type.
///
/// Returns references into `records`, in result order.
///
/// # Errors
///
/// Fails with [`QueryError::InvalidSortField`](crate::QueryError::InvalidSortField)
/// or [`QueryError::InvalidGroupByField`](crate::QueryError::InvalidGroupByField)
/// when a sort or group column cannot be resolved or ordered. Filtering
/// never fails.
///
/// # Example
///
/// ```
/// use simsql::{query, Column, Dir, GroupBy, Limit, OrderBy, Record, ShapeBuilder, Value};
///
/// struct Task {
///     name: &'static str,
///     priority: i32,
/// }
///
/// impl Record for Task {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .column("name", |t| Value::String(t.name))
///             .column("priority", |t| Value::from(t.priority));
///     }
/// }
///
/// let tasks = [
///     Task { name: "write docs", priority: 3 },
///     Task { name: "fix bug", priority: 5 },
///     Task { name: "triage", priority: 1 },
/// ];
///
/// let found = query(
///     &tasks,
///     &Column::of("priority").is_greater_than_or_equal(3),
///     &OrderBy::column("priority", Dir::Desc),
///     &GroupBy::none(),
///     &Limit::none(),
/// )
/// .unwrap();
/// let names: Vec<_> = found.iter().map(|t| t.name).collect();
/// assert_eq!(names, ["fix bug", "write docs"]);
/// ```
pub fn query<'r, T: Record>(
    records: &'r [T],
    condition: &dyn Condition,
    order: &OrderBy,
    group: &GroupBy,
    limit: &Limit,
) -> Result<Vec<&'r T>> {
    run_typed(
        records,
        condition,
        order,
        group,
        limit,
        RecordType::of::<T>(),
        FieldCache::global(),
    )
}

/// Runs a query over type-erased records.
///
/// When `record_type` is `None` it is taken from the first record; every
/// record is then read through that type's columns.
pub fn query_dyn<'r>(
    records: &[&'r dyn AnyRecord],
    condition: &dyn Condition,
    order: &OrderBy,
    group: &GroupBy,
    limit: &Limit,
    record_type: Option<RecordType>,
) -> Result<Vec<&'r dyn AnyRecord>> {
    run_dyn(
        records,
        condition,
        order,
        group,
        limit,
        record_type,
        FieldCache::global(),
    )
}

fn run_typed<'r, T: Record>(
    records: &'r [T],
    condition: &dyn Condition,
    order: &OrderBy,
    group: &GroupBy,
    limit: &Limit,
    record_type: RecordType,
    cache: &FieldCache,
) -> Result<Vec<&'r T>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let erased: Vec<&'r dyn AnyRecord> = records.iter().map(|r| r as &dyn AnyRecord).collect();
    let rows = run(erased, condition, order, group, limit, record_type, cache)?;
    Ok(rows
        .into_iter()
        .filter_map(|r| r.as_any().downcast_ref::<T>())
        .collect())
}

fn run_dyn<'r>(
    records: &[&'r dyn AnyRecord],
    condition: &dyn Condition,
    order: &OrderBy,
    group: &GroupBy,
    limit: &Limit,
    record_type: Option<RecordType>,
    cache: &FieldCache,
) -> Result<Vec<&'r dyn AnyRecord>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let record_type = record_type.unwrap_or_else(|| first.record_type());
    run(records.to_vec(), condition, order, group, limit, record_type, cache)
}

fn run<'r>(
    records: Vec<&'r dyn AnyRecord>,
    condition: &dyn Condition,
    order: &OrderBy,
    group: &GroupBy,
    limit: &Limit,
    record_type: RecordType,
    cache: &FieldCache,
) -> Result<Vec<&'r dyn AnyRecord>> {
    let span = debug_span!("query", record_type = record_type.name(), input = records.len());
    let _guard = span.enter();

    // Lives until this function returns, on every path.
    let shape = cache.resolve(record_type);
    let ctx = QueryContext::with_shape(cache, record_type, Arc::clone(&shape));

    let mut rows: Vec<&'r dyn AnyRecord> = records
        .into_iter()
        .filter(|record| condition.matches(Some(*record), &ctx))
        .collect();
    debug!(rows = rows.len(), "filtered");

    if !order.is_empty() {
        sort_records(&mut rows, order, &shape)?;
        debug!(keys = order.keys().len(), "sorted");
    }

    if !group.is_empty() {
        dedupe_records(&mut rows, group, &shape)?;
        debug!(rows = rows.len(), "grouped");
    }

    limit.apply(&mut rows);
    debug!(rows = rows.len(), "paged");
    Ok(rows)
}

/// Reusable query: a condition plus ordering, grouping and paging.
///
/// The default query matches everything and keeps input order.
///
/// # Example
///
/// ```
/// use simsql::{Column, Query, Record, ShapeBuilder, Value};
///
/// struct Song {
///     artist: &'static str,
///     plays: u32,
/// }
///
/// impl Record for Song {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .column("artist", |s| Value::String(s.artist))
///             .column("plays", |s| Value::from(s.plays));
///     }
/// }
///
/// let songs = [
///     Song { artist: "a", plays: 10 },
///     Song { artist: "b", plays: 30 },
///     Song { artist: "a", plays: 20 },
/// ];
///
/// // Most played song per artist.
/// let top = Query::new()
///     .order_desc("plays")
///     .group_by("artist")
///     .execute(&songs)
///     .unwrap();
/// let plays: Vec<u32> = top.iter().map(|s| s.plays).collect();
/// assert_eq!(plays, [30, 20]);
///
/// let popular = Query::new().filter(Column::of("plays").is_greater_than(15));
/// assert_eq!(popular.count(&songs).unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    condition: Arc<dyn Condition>,
    order: OrderBy,
    group: GroupBy,
    limit: Limit,
    record_type: Option<RecordType>,
    cache: Option<Arc<FieldCache>>,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            condition: Arc::new(Where::new()),
            order: OrderBy::none(),
            group: GroupBy::none(),
            limit: Limit::none(),
            record_type: None,
            cache: None,
        }
    }
}

impl Query {
    /// Creates a query that matches everything.
    pub fn new() -> Self {
        Query::default()
    }

    // ========================================================================
    // Stages
    // ========================================================================

    /// Sets the filter condition.
    pub fn filter(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Arc::new(condition);
        self
    }

    /// Replaces the whole ordering.
    pub fn ordering(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    /// Adds a sort key.
    pub fn order_by(mut self, column: &str, dir: Dir) -> Self {
        self.order = self.order.then(column, dir);
        self
    }

    /// Adds an ascending sort key.
    pub fn order_asc(self, column: &str) -> Self {
        self.order_by(column, Dir::Asc)
    }

    /// Adds a descending sort key.
    pub fn order_desc(self, column: &str) -> Self {
        self.order_by(column, Dir::Desc)
    }

    /// Adds a fully specified sort key.
    pub fn order_key(mut self, key: SortKey) -> Self {
        self.order = self.order.then_key(key);
        self
    }

    /// Replaces the whole grouping.
    pub fn grouping(mut self, group: GroupBy) -> Self {
        self.group = group;
        self
    }

    /// Adds a group-by column.
    pub fn group_by(mut self, column: &str) -> Self {
        let columns = self.group.column_names().iter().map(String::as_str);
        self.group = GroupBy::columns(columns.chain([column]));
        self
    }

    /// Replaces the paging.
    pub fn paging(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the maximum number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = self.limit.take(n);
        self
    }

    /// Sets the number of results to skip. Only applies with a limit.
    pub fn offset(mut self, n: usize) -> Self {
        self.limit = self.limit.skip(n);
        self
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Reads records through the columns of `record_type` instead of their
    /// own type.
    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    /// Reads records through the columns of `T`.
    pub fn of<T: Record>(self) -> Self {
        self.record_type(RecordType::of::<T>())
    }

    /// Resolves columns with `cache` instead of the global cache.
    pub fn cache(mut self, cache: Arc<FieldCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The filter condition.
    pub fn condition(&self) -> &dyn Condition {
        self.condition.as_ref()
    }

    /// The ordering.
    pub fn get_ordering(&self) -> &OrderBy {
        &self.order
    }

    /// The grouping.
    pub fn get_grouping(&self) -> &GroupBy {
        &self.group
    }

    /// The paging.
    pub fn get_paging(&self) -> &Limit {
        &self.limit
    }

    /// The explicit record type, if set.
    pub fn get_record_type(&self) -> Option<RecordType> {
        self.record_type
    }

    // ========================================================================
    // Execution
    // ========================================================================

    fn resolver(&self) -> &FieldCache {
        self.cache.as_deref().unwrap_or_else(|| FieldCache::global())
    }

    /// Tests a single record against the filter condition.
    pub fn matches(&self, record: &dyn AnyRecord) -> bool {
        let cache = self.resolver();
        let ctx = match self.record_type {
            Some(record_type) => QueryContext::new(cache, record_type),
            None => QueryContext::detached(cache),
        };
        self.condition.matches(Some(record), &ctx)
    }

    /// Runs the query over records of one static type.
    pub fn execute<'r, T: Record>(&self, records: &'r [T]) -> Result<Vec<&'r T>> {
        let record_type = self.record_type.unwrap_or_else(RecordType::of::<T>);
        run_typed(
            records,
            self.condition.as_ref(),
            &self.order,
            &self.group,
            &self.limit,
            record_type,
            self.resolver(),
        )
    }

    /// Runs the query over type-erased records.
    pub fn execute_dyn<'r>(
        &self,
        records: &[&'r dyn AnyRecord],
    ) -> Result<Vec<&'r dyn AnyRecord>> {
        run_dyn(
            records,
            self.condition.as_ref(),
            &self.order,
            &self.group,
            &self.limit,
            self.record_type,
            self.resolver(),
        )
    }

    /// Counts the records the query returns.
    pub fn count<T: Record>(&self, records: &[T]) -> Result<usize> {
        self.execute(records).map(|rows| rows.len())
    }
}
