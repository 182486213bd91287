use crate::{Error, Interval, Result, TimeTz, Value};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{any, borrow::Cow, sync::Arc};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Entities read their fields through `try_from_value` and the filter builders accept anything
/// implementing it, through the blanket `From<T: AsValue> for Value`.
///
/// ```rust
/// use postgrape_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

macro_rules! narrow_integer {
    ($source:ty, $target:ty, $v:expr) => {
        <$target>::try_from($v).map_err(|_| {
            Error::msg(format!(
                "Value {}: {} is out of range for {}",
                $v,
                any::type_name::<$source>(),
                any::type_name::<$target>(),
            ))
        })
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int16(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int32(Some(v)) => narrow_integer!(i32, i16, v),
    Value::Int64(Some(v)) => narrow_integer!(i64, i16, v),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => narrow_integer!(i64, i32, v),
    Value::Decimal(Some(v)) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i32"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i32().ok_or(error)
    }
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i64().ok_or(error)
    }
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Float64(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => v.to_f32().ok_or_else(|| conversion_error::<f32>(&Value::Decimal(Some(v)))),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => v.to_f64().ok_or_else(|| conversion_error::<f64>(&Value::Decimal(Some(v)))),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => Ok(v.into()),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(
    Box<[u8]>,
    Value::Blob,
    Value::Varchar(Some(v)) => Ok(v.into_bytes().into()),
);
impl_as_value!(Date, Value::Date);
impl_as_value!(
    Time,
    Value::Time,
    // TIME columns decode as the duration elapsed since midnight
    Value::Interval(Some(v)) => {
        let micros = v.total_micros();
        if !(0..Interval::MICROS_IN_DAY).contains(&micros) {
            return Err(Error::msg(format!("Interval {v} is not a time of day")));
        }
        let micros = micros as u64;
        Time::from_hms_micro(
            (micros / 3_600_000_000) as u8,
            ((micros / 60_000_000) % 60) as u8,
            ((micros / 1_000_000) % 60) as u8,
            (micros % 1_000_000) as u32,
        )
        .map_err(Into::into)
    },
    Value::TimeTz(Some(v)) => Ok(v.time),
);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(
    Interval,
    Value::Interval,
    Value::Varchar(Some(v)) => v.parse(),
);
impl_as_value!(
    TimeTz,
    Value::TimeTz,
    Value::Varchar(Some(v)) => v.parse(),
);
impl_as_value!(
    Uuid,
    Value::Uuid,
    Value::Varchar(Some(v)) => Uuid::parse_str(&v).map_err(Into::into),
);

impl AsValue for std::time::Duration {
    fn as_empty_value() -> Value {
        Value::Interval(None)
    }
    fn as_value(self) -> Value {
        Value::Interval(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Interval::try_from_value(value).map(|v| v.as_duration())
    }
}

impl<'a> AsValue for Cow<'a, str> {
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
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
}

impl<T: AsValue> AsValue for Arc<T>
where
    T: Clone,
{
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        Arc::unwrap_or_clone(self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Arc::new)
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None, Box::new(T::as_empty_value()))
    }
    fn as_value(self) -> Value {
        Value::List(
            Some(self.into_iter().map(AsValue::as_value).collect()),
            Box::new(T::as_empty_value()),
        )
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(v), ..) => v.into_iter().map(T::try_from_value).collect(),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}
