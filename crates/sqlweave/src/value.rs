//! Backend-agnostic values and the type descriptors attached to record fields.
//!
//! [`Value`] is what the builders bind as statement arguments and what row
//! cursors hand back when decoding. [`SqlType`] ties a Rust field type to its
//! [`FieldType`] descriptor and to the conversions in both directions.

use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A single bound argument or decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Json(serde_json::Value),
}

/// The kind of value a field holds, independent of nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    DateTime,
    Uuid,
    Json,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Bytes => "bytes",
            ValueKind::DateTime => "datetime",
            ValueKind::Uuid => "uuid",
            ValueKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// Runtime type descriptor of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl FieldType {
    /// A non-nullable field of the given kind.
    pub const fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// The nullable form of this type.
    pub const fn nullable(self) -> Self {
        Self {
            kind: self.kind,
            nullable: true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueError {
    pub expected: String,
    pub found: String,
}

impl ValueError {
    pub fn new(expected: impl fmt::Display, found: &Value) -> Self {
        Self {
            expected: expected.to_string(),
            found: found.describe(),
        }
    }
}

impl Value {
    /// The kind of this value, `None` for NULL.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Text(_) => Some(ValueKind::Text),
            Value::Bytes(_) => Some(ValueKind::Bytes),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::Uuid(_) => Some(ValueKind::Uuid),
            Value::Json(_) => Some(ValueKind::Json),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Text(s) => format!("text {s:?}"),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
            other => format!("{other}"),
        }
    }

    /// Convert a driver-provided value into the shape a field expects.
    ///
    /// Drivers that hand back loosely typed data (text protocols, SQLite's
    /// dynamic typing, MySQL's `TINYINT` booleans) use this before writing into
    /// a scan slot. Values that already match pass through untouched.
    pub fn coerce(self, ty: FieldType) -> Result<Value, ValueError> {
        if self.is_null() {
            return if ty.nullable {
                Ok(Value::Null)
            } else {
                Err(ValueError::new(ty, &self))
            };
        }
        if self.kind() == Some(ty.kind) {
            return Ok(self);
        }

        let converted = match (ty.kind, &self) {
            (ValueKind::Bool, Value::Int(i)) => Some(Value::Bool(*i != 0)),
            (ValueKind::Bool, Value::Text(s)) => match s.as_str() {
                "1" | "true" | "TRUE" | "t" => Some(Value::Bool(true)),
                "0" | "false" | "FALSE" | "f" => Some(Value::Bool(false)),
                _ => None,
            },
            (ValueKind::Int, Value::Text(s)) => s.trim().parse().ok().map(Value::Int),
            (ValueKind::Int, Value::Bool(b)) => Some(Value::Int(i64::from(*b))),
            (ValueKind::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (ValueKind::Float, Value::Text(s)) => s.trim().parse().ok().map(Value::Float),
            (ValueKind::Text, Value::Bytes(b)) => {
                String::from_utf8(b.clone()).ok().map(Value::Text)
            }
            (ValueKind::Bytes, Value::Text(s)) => Some(Value::Bytes(s.clone().into_bytes())),
            (ValueKind::DateTime, Value::Text(s)) => parse_datetime(s).map(Value::DateTime),
            (ValueKind::Uuid, Value::Text(s)) => Uuid::parse_str(s).ok().map(Value::Uuid),
            (ValueKind::Uuid, Value::Bytes(b)) => Uuid::from_slice(b).ok().map(Value::Uuid),
            (ValueKind::Json, Value::Text(s)) => serde_json::from_str(s).ok().map(Value::Json),
            _ => None,
        };

        // Text-protocol drivers hand everything back as bytes.
        match converted {
            Some(v) => Ok(v),
            None => match self {
                Value::Bytes(b) if ty.kind != ValueKind::Text => match String::from_utf8(b) {
                    Ok(s) => Value::Text(s).coerce(ty),
                    Err(e) => Err(ValueError {
                        expected: ty.to_string(),
                        found: format!("non-utf8 bytes ({e})"),
                    }),
                },
                other => Err(ValueError::new(ty, &other)),
            },
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Json(j) => write!(f, "{j}"),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Maps a Rust field type to its [`FieldType`] and converts it to and from [`Value`].
///
/// `#[derive(Entity)]` requires every field type to implement this trait.
pub trait SqlType: Sized {
    /// Descriptor recorded in the model for fields of this type.
    const FIELD_TYPE: FieldType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;

    /// Whether [`SqlType::from_value`] would accept `value`.
    ///
    /// Row population checks every column before writing any of them.
    fn check(value: &Value) -> Result<(), ValueError> {
        Self::from_value(value.clone()).map(drop)
    }
}

macro_rules! impl_sql_type_int {
    ($($ty:ty),*) => {
        $(
            impl SqlType for $ty {
                const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Int);

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).map_err(|_| ValueError {
                            expected: stringify!($ty).to_string(),
                            found: format!("out of range integer {i}"),
                        }),
                        other => Err(ValueError::new(stringify!($ty), &other)),
                    }
                }

                fn check(value: &Value) -> Result<(), ValueError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).map(drop).map_err(|_| ValueError {
                            expected: stringify!($ty).to_string(),
                            found: format!("out of range integer {i}"),
                        }),
                        other => Err(ValueError::new(stringify!($ty), other)),
                    }
                }
            }
        )*
    };
}

impl_sql_type_int!(i8, i16, i32, i64, u8, u16, u32);

impl SqlType for bool {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Bool);

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::new("bool", &other)),
        }
    }
}

impl SqlType for f32 {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Float);

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            // Non-finite values carry over; finite ones must fit.
            Value::Float(f) if f.is_finite() && f.abs() > f64::from(f32::MAX) => Err(ValueError {
                expected: "f32".to_string(),
                found: format!("out of range float {f}"),
            }),
            Value::Float(f) => Ok(f as f32),
            other => Err(ValueError::new("f32", &other)),
        }
    }
}

impl SqlType for f64 {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Float);

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(ValueError::new("f64", &other)),
        }
    }
}

impl SqlType for String {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Text);

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(ValueError::new("String", &other)),
        }
    }

    fn check(value: &Value) -> Result<(), ValueError> {
        match value {
            Value::Text(_) => Ok(()),
            other => Err(ValueError::new("String", other)),
        }
    }
}

impl SqlType for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Bytes);

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(ValueError::new("Vec<u8>", &other)),
        }
    }

    fn check(value: &Value) -> Result<(), ValueError> {
        match value {
            Value::Bytes(_) => Ok(()),
            other => Err(ValueError::new("Vec<u8>", other)),
        }
    }
}

impl SqlType for NaiveDateTime {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::DateTime);

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(ValueError::new("NaiveDateTime", &other)),
        }
    }
}

impl SqlType for Uuid {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Uuid);

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Uuid(u) => Ok(u),
            other => Err(ValueError::new("Uuid", &other)),
        }
    }
}

impl SqlType for serde_json::Value {
    const FIELD_TYPE: FieldType = FieldType::of(ValueKind::Json).nullable();

    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Null => Ok(serde_json::Value::Null),
            other => Err(ValueError::new("json", &other)),
        }
    }

    fn check(value: &Value) -> Result<(), ValueError> {
        match value {
            Value::Json(_) | Value::Null => Ok(()),
            other => Err(ValueError::new("json", other)),
        }
    }
}

// Option<T> is the nullable form of T.
impl<T: SqlType> SqlType for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE.nullable();

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn check(value: &Value) -> Result<(), ValueError> {
        match value {
            Value::Null => Ok(()),
            other => T::check(other),
        }
    }
}
