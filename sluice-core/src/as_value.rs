use crate::{Error, Result, Value};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, borrow::Cow};
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// It is used both to build query parameters and to decode the columns of fetched rows.
///
/// # Error semantics
/// - Numeric conversions accept any integer variant and check the range of the target type.
/// - Textual values (`Value::Varchar`) are parsed when the target is numeric or temporal, the
///   whole string must be consumed.
///
/// # Examples
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The NULL variant for this type.
    fn as_empty_value() -> Value;
    /// Convert into the owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert `{:?}` into {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_text<T: std::str::FromStr>(value: &Value, text: &str) -> Result<T> {
    text.trim()
        .parse::<T>()
        .map_err(|_| conversion_error::<T>(value))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let converted = match &value {
                    Value::Int8(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int16(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int32(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int64(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt8(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt16(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt32(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt64(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Boolean(Some(v)) => Some(*v as $source),
                    Value::Varchar(Some(v)) => Some(parse_text::<$source>(&value, v)?),
                    _ => None,
                };
                converted.ok_or_else(|| conversion_error::<$source>(&value))
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                Ok(match &value {
                    Value::Float32(Some(v)) => *v as $source,
                    Value::Float64(Some(v)) => *v as $source,
                    Value::Int8(Some(v)) => *v as $source,
                    Value::Int16(Some(v)) => *v as $source,
                    Value::Int32(Some(v)) => *v as $source,
                    Value::Int64(Some(v)) => *v as $source,
                    Value::UInt8(Some(v)) => *v as $source,
                    Value::UInt16(Some(v)) => *v as $source,
                    Value::UInt32(Some(v)) => *v as $source,
                    Value::UInt64(Some(v)) => *v as $source,
                    Value::Decimal(Some(v)) => v
                        .to_f64()
                        .ok_or_else(|| conversion_error::<$source>(&value))?
                        as $source,
                    Value::Varchar(Some(v)) => parse_text::<$source>(&value, v)?,
                    _ => return Err(conversion_error::<$source>(&value)),
                })
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Value::Boolean(Some(v)) = value {
            return Ok(v);
        }
        if value.is_integer() && !value.is_null() {
            return i64::try_from_value(value.clone())
                .or_else(|_| u64::try_from_value(value).map(|v| v as i64))
                .map(|v| v != 0);
        }
        Err(conversion_error::<Self>(&value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        value.as_value()
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Decimal(Some(v)) => Some(*v),
            Value::Int64(Some(v)) => Decimal::from_i64(*v),
            Value::UInt64(Some(v)) => Decimal::from_u64(*v),
            Value::Float64(Some(v)) => Decimal::from_f64(*v),
            Value::Varchar(Some(v)) => Some(parse_text::<Decimal>(&value, v)?),
            v if v.is_integer() => i64::try_from_value(value.clone())
                .ok()
                .and_then(Decimal::from_i64),
            _ => None,
        };
        converted.ok_or_else(|| conversion_error::<Self>(&value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        value.as_value()
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("The blob is not a valid UTF-8 string")),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        value.as_value()
    }
}

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.to_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(Error::msg(format!(
            "Cannot borrow a string out of `{:?}`, use String instead",
            value
        )))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        value.as_value()
    }
}

impl AsValue for Cow<'_, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        value.as_value()
    }
}

impl AsValue for &[u8] {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(Error::msg(format!(
            "Cannot borrow bytes out of `{:?}`, use Vec<u8> instead",
            value
        )))
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Date(Some(v)) => Ok(*v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(v)) => Date::parse(v.trim(), format_description!("[year]-[month]-[day]"))
                .map_err(|e| Error::new(e).context(conversion_error::<Self>(&value))),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Time(Some(v)) => Ok(*v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(v)) => Time::parse(
                v.trim(),
                format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]"),
            )
            .map_err(|e| Error::new(e).context(conversion_error::<Self>(&value))),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Timestamp(Some(v)) => Ok(*v),
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(v)) => PrimitiveDateTime::parse(
                v.trim(),
                format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
                ),
            )
            .map_err(|e| Error::new(e).context(conversion_error::<Self>(&value))),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Uuid(Some(v)) => Ok(*v),
            Value::Varchar(Some(v)) => Uuid::parse_str(v.trim())
                .map_err(|e| Error::new(e).context(conversion_error::<Self>(&value))),
            Value::Blob(Some(v)) => Uuid::from_slice(v)
                .map_err(|e| Error::new(e).context(conversion_error::<Self>(&value))),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($source:ty),+) => {
        $(impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        })+
    };
}

impl_from_for_value!(Date, Time, PrimitiveDateTime, Uuid);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}
