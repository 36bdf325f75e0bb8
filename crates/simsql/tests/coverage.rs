//! Additional tests to improve code coverage.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use simsql::{
    compare_values, order_against, CacheConfig, Column, ColumnCondition, Comparison, Condition,
    Constant, Dir, EvalError, FieldCache, FieldError, GroupBy, Limit, Nulls, Number, Op, OrderBy,
    Query, QueryError, Record, RecordType, ShapeBuilder, SortKey, Timestamp, Value, Where,
};

struct Row {
    name: String,
    n: i64,
}

impl Record for Row {
    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .column("name", |r| Value::String(&r.name))
            .column("n", |r| Value::from(r.n));
    }
}

fn row(name: &str, n: i64) -> Row {
    Row {
        name: name.to_string(),
        n,
    }
}

// ============================================================================
// Value type coverage
// ============================================================================

#[test]
fn value_is_checks() {
    assert!(Value::String("test").is_string());
    assert!(!Value::String("test").is_number());
    assert!(!Value::String("test").is_none());

    assert!(Value::Number(Number::I64(42)).is_number());
    assert!(Value::None.is_none());
}

#[test]
fn value_as_extractors() {
    assert_eq!(Value::String("hello").as_str(), Some("hello"));
    assert_eq!(Value::String("hello").as_number(), None);

    assert_eq!(
        Value::Number(Number::I64(42)).as_number(),
        Some(Number::I64(42))
    );
    assert_eq!(Value::Number(Number::U64(42)).as_i64(), Some(42));
    assert_eq!(Value::Number(Number::F64(2.5)).as_f64(), Some(2.5));
    assert_eq!(Value::Number(Number::F64(2.5)).as_i64(), None);

    assert_eq!(
        Value::Timestamp(Timestamp(1000)).as_timestamp(),
        Some(Timestamp(1000))
    );
    assert_eq!(Value::Timestamp(Timestamp(1000)).as_enum(), None);

    assert_eq!(Value::Enum(5).as_enum(), Some(5));
    assert_eq!(Value::Enum(5).as_bool(), None);

    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert_eq!(Value::Bool(true).as_timestamp(), None);

    assert_eq!(Value::None.as_str(), None);
    assert_eq!(Value::None.as_number(), None);
}

#[test]
fn value_kinds() {
    assert_eq!(Value::String("a").kind(), "string");
    assert_eq!(Value::None.kind(), "null");
    assert_ne!(Value::Enum(1).kind(), Value::Number(Number::I64(1)).kind());
}

#[test]
fn value_from_option() {
    assert_eq!(Value::from(Some(3i32)), Value::Number(Number::I64(3)));
    assert_eq!(Value::from(None::<i32>), Value::None);
}

#[test]
fn number_to_f64() {
    assert_eq!(Number::I64(42).to_f64(), 42.0);
    assert_eq!(Number::U64(42).to_f64(), 42.0);
    assert_eq!(Number::F64(42.5).to_f64(), 42.5);
}

#[test]
fn number_compare_mixed() {
    assert_eq!(
        Number::I64(-1).compare(Number::U64(0)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
        Some(Ordering::Greater)
    );
    assert_eq!(
        Number::I64(2).compare(Number::F64(2.5)),
        Some(Ordering::Less)
    );
    assert_eq!(Number::F64(f64::NAN).compare(Number::I64(0)), None);
}

#[test]
fn number_to_i64() {
    assert_eq!(Number::U64(7).to_i64(), Some(7));
    assert_eq!(Number::U64(u64::MAX).to_i64(), None);
    assert_eq!(Number::F64(1.0).to_i64(), None);
}

#[test]
fn timestamp_conversions() {
    assert_eq!(Timestamp::from_secs(3), Timestamp(3000));
    assert_eq!(Timestamp::from_millis(1500).as_secs(), 1);
    assert_eq!(Timestamp::from(42i64).as_millis(), 42);
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn constant_display() {
    assert_eq!(Constant::from("x").to_string(), "'x'");
    assert_eq!(Constant::from(-3i8).to_string(), "-3");
    assert_eq!(Constant::from(7u32).to_string(), "7");
    assert_eq!(Constant::from(1.5f64).to_string(), "1.5");
    assert_eq!(Constant::Timestamp(Timestamp(10)).to_string(), "@10");
    assert_eq!(Constant::Enum(2).to_string(), "#2");
    assert_eq!(Constant::from(false).to_string(), "false");
}

#[test]
fn constant_kind_names() {
    assert_eq!(Constant::from("x").kind(), Value::String("x").kind());
    assert_eq!(Constant::from(true).kind(), Value::Bool(true).kind());
}

#[test]
fn order_against_retries_from_value_side() {
    let ts = Value::Timestamp(Timestamp(500));
    assert_eq!(
        Constant::from(500i64).compare_to_value(&ts),
        Comparison::Incompatible
    );
    assert_eq!(order_against(&ts, &Constant::from(500i64)), Some(Ordering::Equal));
    assert_eq!(
        order_against(&Value::Number(Number::I64(3)), &Constant::from(5u8)),
        Some(Ordering::Less)
    );
    assert_eq!(
        order_against(&Value::String("a"), &Constant::from(1i32)),
        None
    );
    assert_eq!(order_against(&Value::None, &Constant::from(1i32)), None);
}

#[test]
fn comparison_ordering() {
    assert_eq!(
        Comparison::Ordered(Ordering::Less).ordering(),
        Some(Ordering::Less)
    );
    assert_eq!(Comparison::Incompatible.ordering(), None);
}

// ============================================================================
// Operators and labels
// ============================================================================

#[test]
fn op_as_str() {
    assert_eq!(Op::Eq.as_str(), "=");
    assert_eq!(Op::Ne.as_str(), "<>");
    assert_eq!(Op::Gte.to_string(), ">=");
    assert_eq!(Op::Contains.as_str(), "like");
    assert_eq!(Op::IsNull.as_str(), "is null");
}

#[test]
fn op_eval_ordering() {
    assert!(Op::Gte.eval_ordering(Ordering::Equal));
    assert!(!Op::Gt.eval_ordering(Ordering::Equal));
    assert!(Op::Lte.eval_ordering(Ordering::Less));
    assert!(!Op::In.eval_ordering(Ordering::Equal));
}

#[test]
fn column_condition_labels() {
    assert_eq!(Column::of("n").is_greater_than(3).to_string(), "n > 3");
    assert_eq!(Column::of("s").is_equal_to("a").to_string(), "s = 'a'");
    assert_eq!(Column::of("n").is_in([1, 2]).to_string(), "n in (1, 2)");
    assert_eq!(Column::of("s").contains("x").to_string(), "s like '%x%'");
    assert_eq!(Column::of("s").starts_with("x").to_string(), "s like 'x%'");
    assert_eq!(Column::of("s").ends_with("x").to_string(), "s like '%x'");
    assert_eq!(Column::of("s").is_null().to_string(), "s is null");
    assert_eq!(Column::of("s").is_not_null().to_string(), "s is not null");
}

#[test]
fn unlabelled_condition_display() {
    let c = ColumnCondition::of_columns(["a", "b"], |_| true);
    assert_eq!(c.to_string(), "<predicate on a, b>");
    assert_eq!(c.label(), None);
    assert_eq!(c.columns(), ["a", "b"]);

    let c = c.with_label("custom");
    assert_eq!(c.to_string(), "custom");
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn regex_condition() {
    let c = Column::of("name").matches_regex("^a.c$").unwrap();
    assert!(c.evaluate(&row("abc", 0)));
    assert!(!c.evaluate(&row("abcd", 0)));
}

#[test]
fn invalid_regex_is_an_error() {
    let err = Column::of("name").matches_regex("(unclosed").unwrap_err();
    assert!(matches!(err, QueryError::InvalidRegex(_)));
    assert_eq!(err.column(), None);
}

#[test]
fn string_ops_never_match_numbers() {
    let r = row("x", 10);
    assert!(!Column::of("n").contains("1").evaluate(&r));
    assert!(!Column::of("n").is_equal_to("10").evaluate(&r));
    assert!(Column::of("n").is_equal_to(10u8).evaluate(&r));
}

#[test]
fn unknown_column_never_matches() {
    let c = ColumnCondition::of("missing", |v| v.is_none());
    assert!(!c.evaluate(&row("x", 1)));
    assert!(!Column::of("missing").is_not_equal_to(2).evaluate(&row("x", 1)));
    assert!(Column::of("n").is_not_equal_to(2).evaluate(&row("x", 1)));
}

#[test]
fn where_accessors() {
    let w = Where::new()
        .and(Column::of("n").is_equal_to(1))
        .or(Column::of("n").is_equal_to(2))
        .or(Column::of("n").is_equal_to(3));
    assert!(!w.is_empty());
    assert_eq!(w.and_conditions().len(), 1);
    assert_eq!(w.or_conditions().len(), 2);
    assert!(Where::new().is_empty());
    assert!(Where::new().evaluate(&row("x", 1)));
}

#[test]
fn boxed_and_shared_conditions() {
    let boxed: Box<dyn Condition> = Box::new(Column::of("n").is_less_than(5));
    let shared: Arc<dyn Condition> = Arc::new(Column::of("n").is_greater_than(5));
    assert!(boxed.evaluate(&row("x", 1)));
    assert!(!shared.evaluate(&row("x", 1)));

    let w = Where::new().and(boxed).and(shared).or(Column::of("n").is_null());
    assert!(!w.evaluate(&row("x", 1)));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn eval_error_display() {
    let err = EvalError::mismatch("number", &Value::String("x"));
    assert_eq!(err.to_string(), "type mismatch: expected number, got string");
    assert_eq!(EvalError::Custom("boom".into()).to_string(), "boom");
}

#[test]
fn field_error_display() {
    assert_eq!(FieldError::UnknownColumn.to_string(), "no such column");
    let err = FieldError::Incomparable {
        left: "string",
        right: "number",
    };
    assert_eq!(err.to_string(), "cannot order string against number");
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(
        config.get_expire_after_access(),
        Some(Duration::from_secs(24 * 60 * 60))
    );
    assert_eq!(config.never_expire().get_expire_after_access(), None);
}

#[test]
fn cache_hits_and_misses() {
    let cache = FieldCache::new();
    assert!(cache.is_empty());

    let first = cache.resolve(RecordType::of::<Row>());
    let second = cache.resolve(RecordType::of::<Row>());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.columns(), ["name", "n"]);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert!(cache.contains(RecordType::of::<Row>()));

    assert!(cache.invalidate(RecordType::of::<Row>()));
    assert!(!cache.invalidate(RecordType::of::<Row>()));
    assert!(cache.is_empty());
}

#[test]
fn cache_expires_idle_entries() {
    let cache = FieldCache::with_config(CacheConfig::default().expire_after_access(Duration::ZERO));
    cache.resolve(RecordType::of::<Row>());
    assert_eq!(cache.purge_expired(), 1);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn cache_clear() {
    let cache = FieldCache::new();
    cache.resolve(RecordType::of::<Row>());
    cache.clear();
    assert_eq!(cache.len(), 0);
}

#[test]
fn record_type_identity() {
    assert_eq!(RecordType::of::<Row>(), RecordType::of::<Row>());
    assert!(RecordType::of::<Row>().name().ends_with("Row"));
}

// ============================================================================
// Ordering, grouping and paging primitives
// ============================================================================

#[test]
fn dir_helpers() {
    assert!(Dir::Asc.is_asc());
    assert!(Dir::Desc.is_desc());
    assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
    assert_eq!(Dir::Asc.to_string(), "asc");
}

#[test]
fn compare_values_null_first() {
    assert_eq!(
        compare_values(&Value::None, &Value::Bool(false)),
        Some(Ordering::Less)
    );
    assert_eq!(
        compare_values(&Value::String("a"), &Value::Number(Number::I64(1))),
        None
    );
}

#[test]
fn sort_key_null_placement_ignores_direction() {
    let key = SortKey::new("n", Dir::Desc);
    let one = Value::Number(Number::I64(1));
    assert_eq!(key.compare(&Value::None, &one), Some(Ordering::Less));

    let key = key.nulls(Nulls::Last);
    assert_eq!(key.compare(&Value::None, &one), Some(Ordering::Greater));
    assert_eq!(
        key.compare(&one, &Value::Number(Number::I64(2))),
        Some(Ordering::Greater)
    );
}

#[test]
fn order_by_builders() {
    let order = OrderBy::asc("a")
        .then("b", Dir::Desc)
        .then_key(SortKey::new("c", Dir::Asc).nulls(Nulls::Last));
    let columns: Vec<&str> = order.keys().iter().map(|k| k.column.as_str()).collect();
    assert_eq!(columns, ["a", "b", "c"]);
    assert_eq!(order.keys()[2].nulls, Nulls::Last);
    assert!(OrderBy::none().is_empty());
}

#[test]
fn group_by_dedupes_column_names() {
    let group = GroupBy::columns(["a", "b", "a"]);
    assert_eq!(group.column_names(), ["a", "b"]);
    assert!(!group.is_empty());
}

#[test]
fn limit_accessors() {
    let limit = Limit::of(3).skip(2);
    assert_eq!(limit.offset(), Some(2));
    assert_eq!(limit.limit(), Some(3));
    assert!(!limit.is_none());
    assert_eq!(limit.range(10), 2..5);

    // Without a limit the offset does not apply.
    assert_eq!(Limit::none().skip(4).range(10), 0..10);
    assert_eq!(Limit::none().take(0).range(10), 0..0);
    assert_eq!(Limit::with_offset(usize::MAX, usize::MAX).range(3), 3..3);
}

// ============================================================================
// Query builder
// ============================================================================

#[test]
fn query_builder_accessors() {
    let q = Query::new()
        .filter(Column::of("n").is_greater_than(1))
        .order_desc("n")
        .order_asc("name")
        .group_by("name")
        .limit(5)
        .offset(1)
        .of::<Row>();

    assert_eq!(q.get_ordering().keys().len(), 2);
    assert_eq!(q.get_grouping().column_names(), ["name"]);
    assert_eq!(q.get_paging(), &Limit::with_offset(1, 5));
    assert_eq!(q.get_record_type(), Some(RecordType::of::<Row>()));
    assert!(q.condition().evaluate(&row("x", 2)));
}

#[test]
fn query_matches_single_record() {
    let q = Query::new().filter(Column::of("name").starts_with("a"));
    assert!(q.matches(&row("abc", 0)));
    assert!(!q.matches(&row("xyz", 0)));
}

#[test]
fn query_with_private_cache() {
    let cache = Arc::new(FieldCache::new());
    let rows = vec![row("a", 3), row("b", 1), row("c", 2)];
    let q = Query::new()
        .order_by("n", Dir::Asc)
        .paging(Limit::of(2))
        .cache(Arc::clone(&cache));

    let names: Vec<&str> = q
        .execute(&rows)
        .unwrap()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["b", "c"]);
    assert!(cache.contains(RecordType::of::<Row>()));
}
