#[cfg(test)]
mod tests {
    use postgrape_core::{GenericSqlWriter, Interval, SqlWriter, Value, writer::Context};
    use std::{str::FromStr, time::Duration};

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();

    #[test]
    fn display() {
        assert_eq!(Interval::from_secs(0).to_string(), "00:00:00");
        assert_eq!(Interval::from_secs(59).to_string(), "00:00:59");
        assert_eq!(Interval::from_hms(1, 2, 3).to_string(), "01:02:03");
        assert_eq!(Interval::from_hms(0, 90, 0).to_string(), "01:30:00");
        assert_eq!(Interval::from_days(2).to_string(), "48:00:00");
        assert_eq!(Interval::from_months(1).to_string(), "720:00:00");
        assert_eq!(Interval::from_micros(1_500_000).to_string(), "00:00:01");
        assert_eq!(Interval::from_secs(-61).to_string(), "-00:01:01");
    }

    #[test]
    fn parse() {
        assert_eq!(
            Interval::from_str("01:02:03").unwrap(),
            Interval::from_hms(1, 2, 3)
        );
        assert_eq!(
            Interval::from_str("48:00:00").unwrap(),
            Interval::from_days(2)
        );
        assert_eq!(
            Interval::from_str(" 00:00:01.25 ").unwrap(),
            Interval::from_micros(1_250_000)
        );
        assert_eq!(
            Interval::from_str("-00:01:01").unwrap(),
            Interval::from_secs(-61)
        );
        assert!(Interval::from_str("").is_err());
        assert!(Interval::from_str("10:00").is_err());
        assert!(Interval::from_str("00:60:00").is_err());
        assert!(Interval::from_str("aa:bb:cc").is_err());
        assert!(Interval::from_str("00:00:01.x").is_err());
        assert!(Interval::from_str("--1:00:00").is_err());
        assert!(Interval::from_str("01:-5:00").is_err());
        assert!(Interval::from_str("+1:00:00").is_err());
        assert!(Interval::from_str("00:+1:00").is_err());
        assert!(Interval::from_str("- 1:00:00").is_err());
        assert_eq!(
            Interval::from_str("-01:00:00").unwrap(),
            Interval::from_secs(-3600)
        );
    }

    #[test]
    fn equality() {
        assert_eq!(Interval::from_secs(86_400), Interval::from_days(1));
        assert_eq!(Interval::new(0, 1, 0), Interval::from_hms(24, 0, 0));
        assert_ne!(Interval::from_months(1), Interval::from_days(30));
        assert!(Interval::default().is_zero());
        assert!(!Interval::from_nanos(1).is_zero());
    }

    #[test]
    fn durations() {
        let interval: Interval = Duration::from_secs(3_723).into();
        assert_eq!(interval, Interval::from_hms(1, 2, 3));
        assert_eq!(interval.as_duration(), Duration::from_secs(3_723));
        assert_eq!(Interval::from_secs(-5).as_duration(), Duration::ZERO);
        assert_eq!(Interval::from_days(1).total_micros(), 86_400_000_000);
        assert_eq!(
            Interval::from_months(2).total_nanos(),
            60 * 86_400 * 1_000_000_000
        );
    }

    #[test]
    fn sql() {
        macro_rules! test_interval {
            ($interval:expr, $expected:literal) => {{
                let mut buff = String::new();
                WRITER.write_value(&mut Context::inline(), &mut buff, &$interval.into());
                assert_eq!(buff, $expected);
            }};
        }
        test_interval!(Interval::from_hms(0, 0, 5), "'00:00:05'");
        test_interval!(Interval::from_hms(12, 30, 0), "'12:30:00'");
        test_interval!(Interval::from_days(3), "'72:00:00'");
        test_interval!(Interval::from_secs(-1), "'%2D00:00:01'");
    }

    #[test]
    fn parameter() {
        let mut context = Context::parameterized();
        let mut buff = String::new();
        WRITER.write_value(
            &mut context,
            &mut buff,
            &Interval::from_hms(1, 0, 0).into(),
        );
        assert_eq!(buff, "$1");
        assert_eq!(
            context.parameters,
            vec![Value::Varchar(Some("01:00:00".into()))]
        );
    }
}
