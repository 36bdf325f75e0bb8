//! Proc macros for simsql.
//!
//! # Available Macros
//!
//! - [`Record`] - Generate the column declarations of a queryable struct
//!
//! Reach it through `simsql` with the `derive` feature enabled, which
//! re-exports it next to the `Record` trait.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for queryable structs.
///
/// Each field becomes a column named after the field. Column kinds are
/// inferred from common field types; other fields are left out unless they
/// carry an explicit kind.
///
/// | Field type | Column kind |
/// |------------|-------------|
/// | `String`, `&str`, `Box<str>`, `Arc<str>`, `Cow<str>` | String |
/// | integer and float primitives | Number |
/// | `bool` | Bool |
/// | `Timestamp`, `SystemTime` | Timestamp |
/// | `Option<X>` | kind of `X`, `None` reads as null |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String`, `Number`, `Bool` | Force the column kind |
/// | `Timestamp` | Timestamp column - requires `ToTimestamp` impl |
/// | `Enum` | Enum column - requires `ToDiscriminant` impl |
/// | `kind = "..."` | Column kind by name |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom column name |
/// | `flatten` | Embed the columns of a nested `Record`; own columns shadow them |
/// | `optional` | Treat the field as an `Option` (for type aliases) |
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `rename_all = "..."` | `camelCase`, `PascalCase`, `snake_case` or `SCREAMING_SNAKE_CASE` |
///
/// # Generated Code
///
/// 1. Column name constants (e.g., `Task::NAME`, `Task::DUE_AT`)
/// 2. Implementation of `Record::describe()`
///
/// # Example
///
/// ```ignore
/// use simsql::{Column, Constant, Query, Record, ToDiscriminant};
///
/// #[derive(Clone, Copy)]
/// enum Status { Open, Done }
///
/// impl ToDiscriminant for Status {
///     fn discriminant(&self) -> u32 {
///         *self as u32
///     }
/// }
///
/// #[derive(Record)]
/// struct Audit {
///     created_by: String,
/// }
///
/// #[derive(Record)]
/// #[record(rename_all = "camelCase")]
/// struct Task {
///     #[record(flatten)]
///     audit: Audit,
///     title: String,
///     priority: Option<u8>,
///     #[record(Enum)]
///     status: Status,
///     #[record(skip)]
///     internal_id: u64,
/// }
///
/// let tasks = vec![Task {
///     audit: Audit { created_by: "ana".into() },
///     title: "Write docs".into(),
///     priority: Some(3),
///     status: Status::Open,
///     internal_id: 1,
/// }];
///
/// let open = Column::of(Task::STATUS).is_equal_to(Constant::Enum(Status::Open as u32));
/// assert_eq!(Query::new().filter(open).count(&tasks).unwrap(), 1);
///
/// let mine = Query::new().filter(Column::of("createdBy").is_equal_to("ana"));
/// assert_eq!(mine.count(&tasks).unwrap(), 1);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
