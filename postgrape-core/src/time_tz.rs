use crate::Error;
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use time::{Duration, Time, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");

/// Time of day paired with its UTC offset, the shape of `TIME WITH TIME ZONE` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeTz {
    pub time: Time,
    pub offset: UtcOffset,
}

impl TimeTz {
    pub const fn new(time: Time, offset: UtcOffset) -> Self {
        Self { time, offset }
    }

    /// Same instant expressed in UTC, wrapping around midnight.
    pub fn to_utc(&self) -> Time {
        self.time - Duration::seconds(self.offset.whole_seconds() as i64)
    }
}

impl Display for TimeTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, _) = self.offset.as_hms();
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}:{:02}",
            self.time.hour(),
            self.time.minute(),
            self.time.second(),
            if self.offset.is_negative() { '-' } else { '+' },
            hours.unsigned_abs(),
            minutes.unsigned_abs(),
        )
    }
}

impl FromStr for TimeTz {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || Error::msg(format!("Cannot parse `{s}` as a time with time zone"));
        let value = s.trim();
        let Some(split) = value.rfind(['+', '-']) else {
            return Err(error());
        };
        let (time, offset) = value.split_at(split);
        let time = Time::parse(time, TIME_FORMAT).map_err(|e| error().context(e))?;
        let negative = offset.starts_with('-');
        let mut parts = offset[1..].splitn(2, ':');
        let hours = parts
            .next()
            .and_then(|v| v.parse::<i8>().ok())
            .ok_or_else(error)?;
        let minutes = match parts.next() {
            Some(v) => v.parse::<i8>().map_err(|_| error())?,
            None => 0,
        };
        let (hours, minutes) = if negative {
            (-hours, -minutes)
        } else {
            (hours, minutes)
        };
        let offset = UtcOffset::from_hms(hours, minutes, 0).map_err(|e| error().context(e))?;
        Ok(Self { time, offset })
    }
}
