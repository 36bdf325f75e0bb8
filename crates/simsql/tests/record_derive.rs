//! Tests for `#[derive(Record)]`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use simsql::{
    query, Column, Condition, Constant, Dir, FieldCache, GroupBy, Limit, OrderBy, RecordType,
    Shape, Timestamp, ToDiscriminant, Value, Where,
};
use simsql_macros::Record as DeriveRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Open = 1,
    Closed = 2,
}

impl ToDiscriminant for Status {
    fn discriminant(&self) -> u32 {
        *self as u32
    }
}

#[derive(Debug, DeriveRecord)]
struct Ticket {
    title: String,
    tag: &'static str,
    votes: u32,
    score: f64,
    urgent: bool,
    #[record(Enum)]
    status: Status,
    #[record(Timestamp)]
    opened_ms: i64,
    closed_at: Option<SystemTime>,
    #[record(rename = "owner")]
    assignee: Option<String>,
    #[record(skip)]
    secret: String,
    attachments: Vec<u8>,
}

fn ticket(title: &str, votes: u32, status: Status) -> Ticket {
    Ticket {
        title: title.to_string(),
        tag: "bug",
        votes,
        score: f64::from(votes) / 2.0,
        urgent: votes > 10,
        status,
        opened_ms: 1_000 * i64::from(votes),
        closed_at: None,
        assignee: None,
        secret: "hidden".to_string(),
        attachments: Vec::new(),
    }
}

fn shape_columns<T: simsql::Record>() -> Vec<String> {
    FieldCache::new()
        .resolve(RecordType::of::<T>())
        .columns()
        .to_vec()
}

#[test]
fn declares_inferred_and_annotated_columns() {
    let columns = shape_columns::<Ticket>();
    assert_eq!(
        columns,
        [
            "title",
            "tag",
            "votes",
            "score",
            "urgent",
            "status",
            "opened_ms",
            "closed_at",
            "owner"
        ]
    );
}

#[test]
fn generates_column_constants() {
    assert_eq!(Ticket::TITLE, "title");
    assert_eq!(Ticket::OPENED_MS, "opened_ms");
    assert_eq!(Ticket::OWNER, "owner");
}

fn read<'a>(shape: &Shape, record: &'a Ticket, column: &str) -> Value<'a> {
    shape.accessor(column).unwrap().get(record).unwrap()
}

#[test]
fn reads_values_by_kind() {
    let mut t = ticket("crash", 12, Status::Open);
    t.closed_at = Some(UNIX_EPOCH + Duration::from_secs(5));
    t.assignee = Some("ana".to_string());

    let cache = FieldCache::new();
    let shape = cache.resolve(RecordType::of::<Ticket>());
    let get = |column: &str| read(&shape, &t, column);

    assert_eq!(get("title"), Value::String("crash"));
    assert_eq!(get("tag"), Value::String("bug"));
    assert_eq!(get("votes"), Value::from(12u32));
    assert_eq!(get("score"), Value::from(6.0f64));
    assert_eq!(get("urgent"), Value::Bool(true));
    assert_eq!(get("status"), Value::Enum(1));
    assert_eq!(get("opened_ms"), Value::Timestamp(Timestamp(12_000)));
    assert_eq!(get("closed_at"), Value::Timestamp(Timestamp::from_secs(5)));
    assert_eq!(get("owner"), Value::String("ana"));
}

#[test]
fn absent_options_read_as_none() {
    let t = ticket("crash", 1, Status::Closed);
    assert!(Column::of("owner").is_null().evaluate(&t));
    assert!(Column::of("closed_at").is_null().evaluate(&t));
    assert!(!Column::of("owner").is_equal_to("ana").evaluate(&t));
}

#[test]
fn skipped_and_unsupported_fields_are_not_columns() {
    let t = ticket("crash", 1, Status::Closed);
    assert!(!Column::of("secret").is_not_null().evaluate(&t));
    assert!(!Column::of("attachments").is_not_null().evaluate(&t));
    assert!(!Column::of("assignee").is_null().evaluate(&t));
}

#[test]
fn enum_and_timestamp_columns_in_a_query() {
    let tickets = vec![
        ticket("a", 3, Status::Open),
        ticket("b", 9, Status::Closed),
        ticket("c", 5, Status::Open),
        ticket("d", 1, Status::Open),
    ];

    // The OR branch never matches, so the AND list decides.
    let filter = Where::new()
        .and(Column::of("status").is_equal_to(Constant::Enum(Status::Open as u32)))
        .and(Column::of("opened_ms").is_greater_than(Timestamp(2_000)))
        .or(Column::of("title").is_null());
    let rows = query(
        &tickets,
        &filter,
        &OrderBy::column("opened_ms", Dir::Desc),
        &GroupBy::none(),
        &Limit::none(),
    )
    .unwrap();
    let titles: Vec<&str> = rows.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["c", "a"]);
}

// ============================================================================
// rename_all and flatten
// ============================================================================

#[derive(Debug, DeriveRecord)]
#[record(rename_all = "camelCase")]
struct Person {
    first_name: String,
    birth_year: i32,
    #[record(rename = "nick")]
    nick_name: Option<String>,
}

#[derive(Debug, DeriveRecord)]
#[record(rename_all = "camelCase")]
struct Employee {
    #[record(flatten)]
    person: Person,
    // Shadows `Person::birthYear`.
    birth_year: u16,
    team_name: Arc<str>,
}

fn employee(first: &str, person_year: i32, own_year: u16, team: &str) -> Employee {
    Employee {
        person: Person {
            first_name: first.to_string(),
            birth_year: person_year,
            nick_name: None,
        },
        birth_year: own_year,
        team_name: Arc::from(team),
    }
}

#[test]
fn rename_all_applies_to_unrenamed_fields() {
    assert_eq!(
        shape_columns::<Person>(),
        ["firstName", "birthYear", "nick"]
    );
    assert_eq!(Person::FIRST_NAME, "firstName");
    assert_eq!(Person::NICK, "nick");
}

#[test]
fn flatten_embeds_columns_with_own_columns_first() {
    assert_eq!(
        shape_columns::<Employee>(),
        ["birthYear", "teamName", "firstName", "nick"]
    );
}

#[test]
fn flattened_columns_are_queryable_and_shadowed() {
    let staff = vec![
        employee("Ada", 1815, 1990, "core"),
        employee("Alan", 1912, 1985, "core"),
        employee("Grace", 1906, 2000, "tools"),
    ];

    // `birthYear` reads the employee's own field, not the embedded one.
    let rows = query(
        &staff,
        &Column::of(Employee::BIRTH_YEAR).is_greater_than(1950),
        &OrderBy::asc(Employee::BIRTH_YEAR),
        &GroupBy::column(Employee::TEAM_NAME),
        &Limit::none(),
    )
    .unwrap();
    let names: Vec<&str> = rows.iter().map(|e| e.person.first_name.as_str()).collect();
    assert_eq!(names, ["Alan", "Grace"]);

    let rows = query(
        &staff,
        &Column::of(Person::FIRST_NAME).starts_with("A"),
        &OrderBy::desc(Person::FIRST_NAME),
        &GroupBy::none(),
        &Limit::none(),
    )
    .unwrap();
    let names: Vec<&str> = rows.iter().map(|e| e.person.first_name.as_str()).collect();
    assert_eq!(names, ["Alan", "Ada"]);
}

// ============================================================================
// Kinds given by name
// ============================================================================

#[derive(Debug, DeriveRecord)]
struct Flag {
    #[record(kind = "enum")]
    status: Status,
    #[record(kind = "bool")]
    enabled: bool,
    #[record(kind = "timestamp")]
    expires_ms: u64,
}

#[test]
fn named_kinds_read_like_idents() {
    let flag = Flag {
        status: Status::Closed,
        enabled: true,
        expires_ms: u64::MAX,
    };
    let cache = FieldCache::new();
    let shape = cache.resolve(RecordType::of::<Flag>());
    let accessor = |column: &str| shape.accessor(column).unwrap();

    assert_eq!(accessor("status").get(&flag).unwrap(), Value::Enum(2));
    assert_eq!(accessor("enabled").get(&flag).unwrap(), Value::Bool(true));
    assert_eq!(
        accessor("expires_ms").get(&flag).unwrap(),
        Value::Timestamp(Timestamp(i64::MAX))
    );
}
