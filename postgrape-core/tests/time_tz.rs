#[cfg(test)]
mod tests {
    use postgrape_core::TimeTz;
    use std::str::FromStr;
    use time::{UtcOffset, macros::time};

    #[test]
    fn parse() {
        assert_eq!(
            TimeTz::from_str("10:20:30+02:00").unwrap(),
            TimeTz::new(time!(10:20:30), UtcOffset::from_hms(2, 0, 0).unwrap())
        );
        assert_eq!(
            TimeTz::from_str("23:59:59.5-05:30").unwrap(),
            TimeTz::new(
                time!(23:59:59.5),
                UtcOffset::from_hms(-5, -30, 0).unwrap()
            )
        );
        assert_eq!(
            TimeTz::from_str("00:00:00+01").unwrap(),
            TimeTz::new(time!(00:00:00), UtcOffset::from_hms(1, 0, 0).unwrap())
        );
        assert!(TimeTz::from_str("10:20:30").is_err());
        assert!(TimeTz::from_str("25:00:00+00").is_err());
        assert!(TimeTz::from_str("10:20:30+xx").is_err());
    }

    #[test]
    fn display() {
        let value = TimeTz::new(time!(08:05:00), UtcOffset::from_hms(-3, -30, 0).unwrap());
        assert_eq!(value.to_string(), "08:05:00-03:30");
        assert_eq!(TimeTz::from_str(&value.to_string()).unwrap(), value);
        let value = TimeTz::new(time!(18:00:00), UtcOffset::UTC);
        assert_eq!(value.to_string(), "18:00:00+00:00");
    }

    #[test]
    fn to_utc() {
        let value = TimeTz::new(time!(01:00:00), UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(value.to_utc(), time!(23:00:00));
        let value = TimeTz::new(time!(22:00:00), UtcOffset::from_hms(-3, 0, 0).unwrap());
        assert_eq!(value.to_utc(), time!(01:00:00));
    }
}
