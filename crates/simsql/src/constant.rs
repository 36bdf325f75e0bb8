//! Owned comparison constants and cross-kind comparison.
//!
//! A [`Constant`] is the right-hand side of a column predicate. Ordering a
//! column value against a constant is attempted in two directions: first with
//! the constant's own (strict) logic, then with the value's own (lenient)
//! logic. Each direction reports a [`Comparison`].

use std::cmp::Ordering;
use std::fmt;

use crate::value::{Number, Timestamp, Value};

/// Outcome of one comparison attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The two sides have a defined order.
    Ordered(Ordering),
    /// The comparing side cannot order the other side.
    Incompatible,
}

impl Comparison {
    fn from_option(ordering: Option<Ordering>) -> Self {
        ordering.map_or(Comparison::Incompatible, Comparison::Ordered)
    }

    /// Returns the ordering, if any.
    pub fn ordering(self) -> Option<Ordering> {
        match self {
            Comparison::Ordered(ordering) => Some(ordering),
            Comparison::Incompatible => None,
        }
    }
}

/// Owned value stored in a predicate.
///
/// Unlike [`Value`], which borrows from a record, a constant owns its data.
#[derive(Debug, Clone)]
pub enum Constant {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
}

impl Constant {
    /// Strict equality against a column value.
    ///
    /// Kinds must match; numbers compare by value across representations.
    /// A null column equals nothing.
    pub fn equals(&self, value: &Value<'_>) -> bool {
        match (self, value) {
            (Constant::String(c), Value::String(v)) => c == v,
            (Constant::Number(c), Value::Number(v)) => c.compare(*v) == Some(Ordering::Equal),
            (Constant::Timestamp(c), Value::Timestamp(v)) => c == v,
            (Constant::Enum(c), Value::Enum(v)) => c == v,
            (Constant::Bool(c), Value::Bool(v)) => c == v,
            _ => false,
        }
    }

    /// Orders this constant against a column value using the constant's
    /// logic: only values of the same kind are accepted.
    pub fn compare_to_value(&self, value: &Value<'_>) -> Comparison {
        let ordering = match (self, value) {
            (Constant::String(c), Value::String(v)) => Some(c.as_str().cmp(v)),
            (Constant::Number(c), Value::Number(v)) => c.compare(*v),
            (Constant::Timestamp(c), Value::Timestamp(v)) => Some(c.cmp(v)),
            (Constant::Enum(c), Value::Enum(v)) => Some(c.cmp(v)),
            (Constant::Bool(c), Value::Bool(v)) => Some(c.cmp(v)),
            _ => None,
        };
        Comparison::from_option(ordering)
    }

    /// Name of this constant's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::String(_) => "string",
            Constant::Number(_) => "number",
            Constant::Timestamp(_) => "timestamp",
            Constant::Enum(_) => "enum",
            Constant::Bool(_) => "bool",
        }
    }
}

impl Value<'_> {
    /// Orders this value against a constant using the value's logic.
    ///
    /// Besides same-kind constants, timestamps accept integral millisecond
    /// constants and enums accept integral discriminant constants.
    pub fn compare_to_constant(&self, constant: &Constant) -> Comparison {
        let ordering = match (self, constant) {
            (Value::String(v), Constant::String(c)) => Some((*v).cmp(c.as_str())),
            (Value::Number(v), Constant::Number(c)) => v.compare(*c),
            (Value::Timestamp(v), Constant::Timestamp(c)) => Some(v.cmp(c)),
            (Value::Timestamp(v), Constant::Number(c)) => c.to_i64().map(|millis| v.0.cmp(&millis)),
            (Value::Enum(v), Constant::Enum(c)) => Some(v.cmp(c)),
            (Value::Enum(v), Constant::Number(c)) => c.to_i64().map(|d| i64::from(*v).cmp(&d)),
            (Value::Bool(v), Constant::Bool(c)) => Some(v.cmp(c)),
            _ => None,
        };
        Comparison::from_option(ordering)
    }
}

/// Orders a column value against a constant, trying the constant's logic
/// first and the value's logic second.
///
/// The result is the value's position relative to the constant. `None` means
/// neither side could order the other.
///
/// ```
/// use std::cmp::Ordering;
/// use simsql::{order_against, Constant, Number, Timestamp, Value};
///
/// let ts = Value::Timestamp(Timestamp(5_000));
/// // A numeric constant cannot order a timestamp, but the timestamp
/// // accepts it as milliseconds.
/// let limit = Constant::Number(Number::I64(1_000));
/// assert_eq!(order_against(&ts, &limit), Some(Ordering::Greater));
/// ```
pub fn order_against(value: &Value<'_>, constant: &Constant) -> Option<Ordering> {
    match constant.compare_to_value(value) {
        Comparison::Ordered(ordering) => Some(ordering.reverse()),
        Comparison::Incompatible => value.compare_to_constant(constant).ordering(),
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::String(s) => write!(f, "'{}'", s),
            Constant::Number(Number::I64(n)) => write!(f, "{}", n),
            Constant::Number(Number::U64(n)) => write!(f, "{}", n),
            Constant::Number(Number::F64(n)) => write!(f, "{}", n),
            Constant::Timestamp(t) => write!(f, "@{}", t.0),
            Constant::Enum(d) => write!(f, "#{}", d),
            Constant::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Self {
        Constant::String(s)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::String(s.to_string())
    }
}

impl From<Number> for Constant {
    fn from(n: Number) -> Self {
        Constant::Number(n)
    }
}

impl From<Timestamp> for Constant {
    fn from(t: Timestamp) -> Self {
        Constant::Timestamp(t)
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Constant::Bool(b)
    }
}

macro_rules! constant_from_number {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Constant {
                fn from(n: $ty) -> Self {
                    Constant::Number(Number::from(n))
                }
            }
        )+
    };
}

constant_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
