//! Record shapes and column accessors.
//!
//! A [`Record`] declares its columns once through [`ShapeBuilder`]; the
//! resulting [`Shape`] maps each column name to a [`FieldAccessor`]. Shapes
//! are built lazily per type and cached by [`FieldCache`](crate::FieldCache).
//!
//! Embedded structs declared with [`ShapeBuilder::flatten`] contribute their
//! columns the way a supertype would: a column declared closer to the record
//! shadows a same-named column further down the embedding chain.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::FieldAccessError;
use crate::value::{Timestamp, Value};

type ErasedGetter = dyn Fn(&dyn Any) -> Option<Value<'_>> + Send + Sync;

fn erase<F>(getter: F) -> Arc<ErasedGetter>
where
    F: Fn(&dyn Any) -> Option<Value<'_>> + Send + Sync + 'static,
{
    Arc::new(getter)
}

/// A queryable record shape.
///
/// Usually derived with `#[derive(Record)]` (feature `derive`), but simple to
/// implement by hand:
///
/// ```
/// use simsql::{Record, ShapeBuilder, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Record for Task {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .column("name", |task| Value::String(&task.name))
///             .column("priority", |task| Value::from(task.priority));
///     }
/// }
/// ```
pub trait Record: Any + Sized {
    /// Declares the columns of this record type.
    fn describe(shape: &mut ShapeBuilder<Self>);
}

/// Object-safe view of a [`Record`].
///
/// Implemented for every `Record`; lets queries run over `&dyn AnyRecord`
/// sequences whose concrete type is only known at run time.
pub trait AnyRecord: Any {
    /// Runtime type of this record.
    fn record_type(&self) -> RecordType;

    /// Upcast used by accessors to recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Record> AnyRecord for T {
    fn record_type(&self) -> RecordType {
        RecordType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for dyn AnyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.record_type().name())
    }
}

/// Identity of a record type, able to build its [`Shape`].
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
    build: fn() -> Shape,
}

impl RecordType {
    /// Returns the record type of `T`.
    pub fn of<T: Record>() -> Self {
        RecordType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            build: Shape::build::<T>,
        }
    }

    /// The type's identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build_shape(&self) -> Shape {
        (self.build)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

/// Reads one column from records of one type.
#[derive(Clone)]
pub struct FieldAccessor {
    record_type: &'static str,
    column: Arc<str>,
    getter: Arc<ErasedGetter>,
}

impl FieldAccessor {
    /// The column this accessor reads.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Name of the record type this accessor was resolved for.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// Extracts the column value from `record`.
    ///
    /// Fails when `record` is not of the type this accessor was resolved for.
    pub fn get<'a>(&self, record: &'a dyn AnyRecord) -> Result<Value<'a>, FieldAccessError> {
        (self.getter)(record.as_any()).ok_or_else(|| FieldAccessError {
            record_type: self.record_type,
            column: self.column.to_string(),
            actual: record.record_type().name(),
        })
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("record_type", &self.record_type)
            .field("column", &self.column)
            .finish()
    }
}

struct Declared {
    name: String,
    depth: usize,
    getter: Arc<ErasedGetter>,
}

/// Collects the column declarations of a record type.
///
/// Passed to [`Record::describe`].
pub struct ShapeBuilder<T> {
    declared: Vec<Declared>,
    _record: std::marker::PhantomData<fn(&T)>,
}

impl<T: Record> ShapeBuilder<T> {
    fn new() -> Self {
        ShapeBuilder {
            declared: Vec::new(),
            _record: std::marker::PhantomData,
        }
    }

    /// Declares a column read by `getter`.
    pub fn column<F>(&mut self, name: impl Into<String>, getter: F) -> &mut Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        let getter = erase(move |record| record.downcast_ref::<T>().map(|r| getter(r)));
        self.declared.push(Declared {
            name: name.into(),
            depth: 0,
            getter,
        });
        self
    }

    /// Embeds the columns of `P`, reached through `project`.
    ///
    /// Columns declared directly on `T` (or on an embedding closer to `T`)
    /// shadow same-named columns of `P`.
    pub fn flatten<P: Record>(&mut self, project: fn(&T) -> &P) -> &mut Self {
        let mut parent = ShapeBuilder::<P>::new();
        P::describe(&mut parent);
        for declared in parent.declared {
            let inner = declared.getter;
            let getter = erase(move |record| {
                let record = record.downcast_ref::<T>()?;
                let parent: &dyn Any = project(record);
                inner(parent)
            });
            self.declared.push(Declared {
                name: declared.name,
                depth: declared.depth + 1,
                getter,
            });
        }
        self
    }
}

/// Resolved column map of one record type.
pub struct Shape {
    record_type: &'static str,
    accessors: HashMap<String, FieldAccessor>,
    columns: Vec<String>,
}

impl Shape {
    /// Builds the shape of `T` by running [`Record::describe`].
    pub fn build<T: Record>() -> Shape {
        let mut builder = ShapeBuilder::<T>::new();
        T::describe(&mut builder);

        let record_type = std::any::type_name::<T>();
        let mut declared = builder.declared;
        // Stable: declaration order is kept within a depth.
        declared.sort_by_key(|d| d.depth);

        let mut accessors = HashMap::with_capacity(declared.len());
        let mut columns = Vec::with_capacity(declared.len());
        for d in declared {
            if accessors.contains_key(&d.name) {
                continue;
            }
            columns.push(d.name.clone());
            accessors.insert(
                d.name.clone(),
                FieldAccessor {
                    record_type,
                    column: Arc::from(d.name.as_str()),
                    getter: d.getter,
                },
            );
        }

        Shape {
            record_type,
            accessors,
            columns,
        }
    }

    /// Name of the record type.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// Looks up the accessor for `column`.
    pub fn accessor(&self, column: &str) -> Option<&FieldAccessor> {
        self.accessors.get(column)
    }

    /// Column names, own columns first, then embedded ones.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of resolvable columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the type declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("record_type", &self.record_type)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Converts a field to a [`Timestamp`].
///
/// Used by `#[record(Timestamp)]` fields.
///
/// ```
/// use simsql::{Timestamp, ToTimestamp};
///
/// struct Millis(i64);
///
/// impl ToTimestamp for Millis {
///     fn to_timestamp(&self) -> Timestamp {
///         Timestamp::from_millis(self.0)
///     }
/// }
/// ```
pub trait ToTimestamp {
    /// Converts this value to a [`Timestamp`].
    fn to_timestamp(&self) -> Timestamp;
}

impl ToTimestamp for i64 {
    fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl ToTimestamp for u64 {
    /// Saturates at `i64::MAX` milliseconds.
    fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl ToTimestamp for Timestamp {
    fn to_timestamp(&self) -> Timestamp {
        *self
    }
}

impl ToTimestamp for std::time::SystemTime {
    fn to_timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(after) => Timestamp(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => {
                let millis = i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX);
                Timestamp(-millis)
            }
        }
    }
}

/// Converts an enum field to a stable discriminant.
///
/// Used by `#[record(Enum)]` fields. Prefer explicit values over declaration
/// order so that stored discriminants stay meaningful.
pub trait ToDiscriminant {
    /// Returns the discriminant of this variant.
    fn discriminant(&self) -> u32;
}
