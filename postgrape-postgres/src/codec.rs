use byteorder::{NetworkEndian, ReadBytesExt};
use bytes::{BufMut, BytesMut};
use postgrape_core::{AsValue, Error, Interval, Result, TimeTz, Value};
use postgres_types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use rust_decimal::Decimal;
use std::{
    fmt::{self, Debug, Display},
    io::Cursor,
    str::FromStr,
};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::BorrowedFormatItem, macros::format_description,
};
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Outcome of writing one parameter, in the error type `postgres-types` expects.
pub type EncodeResult = std::result::Result<IsNull, BoxError>;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Converts values at the driver boundary, in the binary wire format.
///
/// Handed to [`crate::PostgresPool`] at construction, every connection of the pool shares it.
pub trait ValueCodec: Debug + Send + Sync {
    /// Decode a column of type `ty`, `raw` is `None` for SQL NULL.
    fn decode(&self, ty: &Type, raw: Option<&[u8]>) -> Result<Value>;

    /// Encode a parameter whose type was inferred by the server as `ty`.
    fn encode(&self, value: &Value, ty: &Type, out: &mut BytesMut) -> EncodeResult;
}

/// Undecoded column, the codec turns it into a value.
pub(crate) struct RawValue<'a> {
    pub(crate) ty: Type,
    pub(crate) raw: Option<&'a [u8]>,
}

impl<'a> FromSql<'a> for RawValue<'a> {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Ok(Self {
            ty: ty.clone(),
            raw: Some(raw),
        })
    }

    fn from_sql_null(ty: &Type) -> std::result::Result<Self, BoxError> {
        Ok(Self {
            ty: ty.clone(),
            raw: None,
        })
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Parameter encoded through the codec.
pub(crate) struct Encode<'a> {
    pub(crate) value: &'a Value,
    pub(crate) codec: &'a dyn ValueCodec,
}

impl Debug for Encode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.value, f)
    }
}

impl ToSql for Encode<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        self.codec.encode(self.value, ty, out)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Codec used unless another one is injected.
///
/// `TIME` columns decode to [`Interval`] (elapsed since midnight) and `TIMETZ` to [`TimeTz`].
/// Text parameters are coerced into the type of the column they are compared with, so
/// `hh:mm:ss` strings can be stored into `TIME` and `INTERVAL` columns.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultCodec;

impl ValueCodec for DefaultCodec {
    fn decode(&self, ty: &Type, raw: Option<&[u8]>) -> Result<Value> {
        macro_rules! decode {
            ($($($ty:path)|+ => $value:path, $decode:expr,)+) => {
                match *ty {
                    $($($ty)|+ => $value(match raw {
                        Some(raw) => Some($decode(raw)?),
                        None => None,
                    }),)+
                    _ => match ty.kind() {
                        Kind::Array(member) => Value::List(
                            match raw {
                                Some(raw) => Some(
                                    Vec::<RawValue>::from_sql(ty, raw)
                                        .map_err(Error::msg)?
                                        .into_iter()
                                        .map(|v| self.decode(&v.ty, v.raw))
                                        .collect::<Result<_>>()?,
                                ),
                                None => None,
                            },
                            Box::new(empty_value(member)),
                        ),
                        _ => match raw {
                            Some(raw) => Value::Varchar(Some(from_sql::<String>(ty, raw).map_err(
                                |e| e.context(format!("Cannot decode sql type `{}`", ty)),
                            )?)),
                            None => Value::Null,
                        },
                    },
                }
            };
        }
        Ok(decode!(
            Type::BOOL => Value::Boolean, |raw| from_sql::<bool>(ty, raw),
            Type::CHAR => Value::Int16, |raw| from_sql::<i8>(ty, raw).map(i16::from),
            Type::INT2 => Value::Int16, |raw| from_sql::<i16>(ty, raw),
            Type::INT4 => Value::Int32, |raw| from_sql::<i32>(ty, raw),
            Type::INT8 => Value::Int64, |raw| from_sql::<i64>(ty, raw),
            Type::OID => Value::Int64, |raw| from_sql::<u32>(ty, raw).map(i64::from),
            Type::FLOAT4 => Value::Float32, |raw| from_sql::<f32>(ty, raw),
            Type::FLOAT8 => Value::Float64, |raw| from_sql::<f64>(ty, raw),
            Type::NUMERIC => Value::Decimal, |raw| from_sql::<Decimal>(ty, raw),
            Type::BYTEA => Value::Blob, |raw| from_sql::<Vec<u8>>(ty, raw).map(Into::into),
            Type::DATE => Value::Date, |raw| from_sql::<Date>(ty, raw),
            Type::TIME => Value::Interval, read_time,
            Type::TIMETZ => Value::TimeTz, read_time_tz,
            Type::TIMESTAMP => Value::Timestamp, |raw| from_sql::<PrimitiveDateTime>(ty, raw),
            Type::TIMESTAMPTZ => Value::TimestampWithTimezone, |raw| from_sql::<OffsetDateTime>(ty, raw),
            Type::INTERVAL => Value::Interval, read_interval,
            Type::UUID => Value::Uuid, |raw| from_sql::<Uuid>(ty, raw),
        ))
    }

    fn encode(&self, value: &Value, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        if value.is_null() {
            return Ok(IsNull::Yes);
        }
        match *ty {
            Type::BOOL => convert::<bool>(value)?.to_sql(ty, out),
            Type::CHAR => i8::try_from(convert::<i16>(value)?)?.to_sql(ty, out),
            Type::INT2 => convert::<i16>(value)?.to_sql(ty, out),
            Type::INT4 => convert::<i32>(value)?.to_sql(ty, out),
            Type::INT8 => convert::<i64>(value)?.to_sql(ty, out),
            Type::OID => u32::try_from(convert::<i64>(value)?)?.to_sql(ty, out),
            Type::FLOAT4 => convert::<f32>(value)?.to_sql(ty, out),
            Type::FLOAT8 => convert::<f64>(value)?.to_sql(ty, out),
            Type::NUMERIC => convert::<Decimal>(value)?.to_sql(ty, out),
            Type::BYTEA => Box::<[u8]>::try_from_value(value.clone())?
                .as_ref()
                .to_sql(ty, out),
            Type::DATE => match value {
                Value::Varchar(Some(v)) => Date::parse(v, DATE_FORMAT)?.to_sql(ty, out),
                v => Date::try_from_value(v.clone())?.to_sql(ty, out),
            },
            Type::TIME => match value {
                Value::Time(Some(v)) => v.to_sql(ty, out),
                Value::TimeTz(Some(v)) => v.time.to_sql(ty, out),
                v => write_time(&convert::<Interval>(v)?, out),
            },
            Type::TIMETZ => write_time_tz(&convert::<TimeTz>(value)?, out),
            Type::TIMESTAMP => PrimitiveDateTime::try_from_value(value.clone())?.to_sql(ty, out),
            Type::TIMESTAMPTZ => OffsetDateTime::try_from_value(value.clone())?.to_sql(ty, out),
            Type::INTERVAL => write_interval(&convert::<Interval>(value)?, out),
            Type::UUID => convert::<Uuid>(value)?.to_sql(ty, out),
            _ => match (ty.kind(), value) {
                (Kind::Array(..), Value::List(Some(values), ..)) => values
                    .iter()
                    .map(|value| Encode { value, codec: self })
                    .collect::<Vec<_>>()
                    .to_sql(ty, out),
                (_, Value::Varchar(Some(v))) => v.to_sql(ty, out),
                _ => Err(format!("Cannot encode {:?} as the sql type `{}`", value, ty).into()),
            },
        }
    }
}

fn from_sql<'a, T: FromSql<'a>>(ty: &Type, raw: &'a [u8]) -> Result<T> {
    T::from_sql(ty, raw).map_err(Error::msg)
}

/// Value conversion also parsing text values.
fn convert<T>(value: &Value) -> Result<T>
where
    T: AsValue + FromStr,
    <T as FromStr>::Err: Display,
{
    match value {
        Value::Varchar(Some(v)) => v.parse::<T>().map_err(|e| {
            Error::msg(format!(
                "Cannot parse `{}` as {}: {}",
                v,
                std::any::type_name::<T>(),
                e
            ))
        }),
        v => T::try_from_value(v.clone()),
    }
}

fn read_time(raw: &[u8]) -> Result<Interval> {
    let micros = Cursor::new(raw).read_i64::<NetworkEndian>()?;
    Ok(Interval::from_micros(micros as i128))
}

fn write_time(value: &Interval, out: &mut BytesMut) -> EncodeResult {
    let micros = value.total_micros();
    if !(0..=Interval::MICROS_IN_DAY).contains(&micros) {
        return Err(format!("Interval {} is not a time of day", value).into());
    }
    out.put_i64(micros as i64);
    Ok(IsNull::No)
}

fn read_time_tz(raw: &[u8]) -> Result<TimeTz> {
    let mut raw = Cursor::new(raw);
    let micros = raw.read_i64::<NetworkEndian>()?;
    // Offset in seconds west of UTC
    let zone = raw.read_i32::<NetworkEndian>()?;
    let time = Time::MIDNIGHT + time::Duration::microseconds(micros);
    Ok(TimeTz::new(time, UtcOffset::from_whole_seconds(-zone)?))
}

fn write_time_tz(value: &TimeTz, out: &mut BytesMut) -> EncodeResult {
    let (h, m, s, micro) = value.time.as_hms_micro();
    let micros = ((h as i64 * 60 + m as i64) * 60 + s as i64) * 1_000_000 + micro as i64;
    out.put_i64(micros);
    out.put_i32(-value.offset.whole_seconds());
    Ok(IsNull::No)
}

fn read_interval(raw: &[u8]) -> Result<Interval> {
    let mut raw = Cursor::new(raw);
    let micros = raw.read_i64::<NetworkEndian>()?;
    let days = raw.read_i32::<NetworkEndian>()?;
    let months = raw.read_i32::<NetworkEndian>()?;
    Ok(Interval::new(
        months as i64,
        days as i64,
        micros as i128 * 1_000,
    ))
}

fn write_interval(value: &Interval, out: &mut BytesMut) -> EncodeResult {
    let micros_all = value.nanos / 1_000;
    let micros = micros_all.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    let days = (value.days as i128 + (micros_all - micros as i128) / Interval::MICROS_IN_DAY)
        .clamp(i32::MIN as i128, i32::MAX as i128) as i32;
    let months = value.months.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    out.put_i64(micros);
    out.put_i32(days);
    out.put_i32(months);
    Ok(IsNull::No)
}

/// Typed null matching a column type, used as the element type of decoded arrays.
pub fn empty_value(ty: &Type) -> Value {
    match *ty {
        Type::BOOL => Value::Boolean(None),
        Type::CHAR | Type::INT2 => Value::Int16(None),
        Type::INT4 => Value::Int32(None),
        Type::INT8 | Type::OID => Value::Int64(None),
        Type::FLOAT4 => Value::Float32(None),
        Type::FLOAT8 => Value::Float64(None),
        Type::NUMERIC => Value::Decimal(None),
        Type::VARCHAR | Type::TEXT | Type::NAME | Type::BPCHAR | Type::JSON | Type::XML => {
            Value::Varchar(None)
        }
        Type::BYTEA => Value::Blob(None),
        Type::DATE => Value::Date(None),
        Type::TIME | Type::INTERVAL => Value::Interval(None),
        Type::TIMETZ => Value::TimeTz(None),
        Type::TIMESTAMP => Value::Timestamp(None),
        Type::TIMESTAMPTZ => Value::TimestampWithTimezone(None),
        Type::UUID => Value::Uuid(None),
        _ => match ty.kind() {
            Kind::Array(member) => Value::List(None, Box::new(empty_value(member))),
            _ => Value::Null,
        },
    }
}
