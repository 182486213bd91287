#[cfg(test)]
mod tests {
    use postgrape_core::{AsValue, Interval, TimeTz, Value};
    use rust_decimal::Decimal;
    use std::{borrow::Cow, sync::Arc, time::Duration};
    use time::{
        UtcOffset,
        macros::{date, datetime, time},
    };
    use uuid::Uuid;

    #[test]
    fn value_none() {
        assert_eq!(Value::default(), Value::Null);
        assert!(Value::Null.is_null());
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert!(Value::List(None, Box::new(Value::Int32(None))).is_null());
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert_eq!(bool::try_from_value(val).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::Int16(Some(8))).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::Int32(Some(0))).unwrap(), false);
        assert!(bool::try_from_value(Value::Varchar(Some("true".into()))).is_err());
    }

    #[test]
    fn value_integers() {
        let val: Value = 7i16.into();
        assert_eq!(val, Value::Int16(Some(7)));
        assert_eq!(i64::try_from_value(val.clone()).unwrap(), 7);
        assert_eq!(i32::try_from_value(val).unwrap(), 7);
        assert_eq!(i16::try_from_value(Value::Int64(Some(300))).unwrap(), 300);
        assert!(i16::try_from_value(Value::Int64(Some(100_000))).is_err());
        assert!(i32::try_from_value(Value::Int64(Some(i64::MAX))).is_err());
        assert_eq!(
            i64::try_from_value(Value::Decimal(Some(Decimal::new(42, 0)))).unwrap(),
            42
        );
        assert!(i64::try_from_value(Value::Decimal(Some(Decimal::new(425, 1)))).is_err());
        assert_eq!(Value::Int32(Some(5)).as_i64(), Some(5));
        assert_eq!(Value::Varchar(Some("5".into())).as_i64(), None);
    }

    #[test]
    fn value_floats() {
        let val: Value = 1.5f64.into();
        assert_eq!(val, Value::Float64(Some(1.5)));
        assert_eq!(f64::try_from_value(Value::Int32(Some(2))).unwrap(), 2.0);
        assert_eq!(f32::try_from_value(Value::Float64(Some(0.25))).unwrap(), 0.25);
        assert_eq!(
            f64::try_from_value(Value::Decimal(Some(Decimal::new(125, 2)))).unwrap(),
            1.25
        );
    }

    #[test]
    fn value_strings() {
        let val: Value = "hello".into();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(String::try_from_value(val.clone()).unwrap(), "hello");
        assert_eq!(
            Cow::<str>::try_from_value(val).unwrap(),
            Cow::<str>::Borrowed("hello")
        );
        let blob: Box<[u8]> = AsValue::try_from_value(Value::Varchar(Some("ab".into()))).unwrap();
        assert_eq!(&*blob, b"ab");
        assert!(String::try_from_value(Value::Int32(Some(1))).is_err());
    }

    #[test]
    fn value_temporal() {
        let val: Value = date!(2024 - 02 - 29).into();
        assert_eq!(val, Value::Date(Some(date!(2024 - 02 - 29))));
        let val: Value = datetime!(2024-02-29 10:00:00).into();
        assert!(matches!(val, Value::Timestamp(Some(..))));
        let val: Value = datetime!(2024-02-29 10:00:00 +1).into();
        assert!(matches!(val, Value::TimestampWithTimezone(Some(..))));

        let time = time::Time::try_from_value(Value::Interval(Some(Interval::from_hms(
            13, 14, 15,
        ))))
        .unwrap();
        assert_eq!(time, time!(13:14:15));
        assert!(
            time::Time::try_from_value(Value::Interval(Some(Interval::from_hms(25, 0, 0))))
                .is_err()
        );
        let time = time::Time::try_from_value(Value::TimeTz(Some(TimeTz::new(
            time!(08:00:00),
            UtcOffset::UTC,
        ))))
        .unwrap();
        assert_eq!(time, time!(08:00:00));
    }

    #[test]
    fn value_interval() {
        let val: Value = Duration::from_secs(90).into();
        assert_eq!(val, Value::Interval(Some(Interval::from_secs(90))));
        assert_eq!(
            Duration::try_from_value(val).unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            Interval::try_from_value(Value::Varchar(Some("02:00:00".into()))).unwrap(),
            Interval::from_hms(2, 0, 0)
        );
        assert_eq!(
            TimeTz::try_from_value(Value::Varchar(Some("10:00:00+01:00".into()))).unwrap(),
            TimeTz::new(time!(10:00:00), UtcOffset::from_hms(1, 0, 0).unwrap())
        );
    }

    #[test]
    fn value_uuid() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let val: Value = uuid.into();
        assert_eq!(val, Value::Uuid(Some(uuid)));
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(
                "67e55044-10b1-426f-9247-bb680e5fe0c8".into()
            )))
            .unwrap(),
            uuid
        );
    }

    #[test]
    fn value_wrappers() {
        let val: Value = Option::<i32>::None.into();
        assert_eq!(val, Value::Int32(None));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(Some(3))).unwrap(),
            Some(3)
        );
        let val: Value = Arc::new(5i64).into();
        assert_eq!(val, Value::Int64(Some(5)));
        let val: Value = vec![1i64, 2].into();
        assert_eq!(
            val,
            Value::List(
                Some(vec![Value::Int64(Some(1)), Value::Int64(Some(2))]),
                Box::new(Value::Int64(None))
            )
        );
        assert_eq!(Vec::<i64>::try_from_value(val).unwrap(), vec![1, 2]);
    }
}
