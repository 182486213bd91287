use crate::Error;
use std::{
    fmt::{self, Display},
    hash::Hash,
    str::FromStr,
    time::Duration,
};

const SECS_IN_DAY: i64 = 60 * 60 * 24;
const NANOS_IN_SEC: i128 = 1_000_000_000;
const NANOS_IN_DAY: i128 = SECS_IN_DAY as i128 * NANOS_IN_SEC;

/// Duration made of calendar months, days and a sub-day part.
///
/// The textual form is `hh:mm:ss`: the hours absorb days and months (a month counts as 30 days),
/// so `Interval::from_days(2)` prints as `48:00:00`.
#[derive(Default, Debug, Clone, Copy)]
pub struct Interval {
    pub months: i64,
    pub days: i64,
    pub nanos: i128,
}

impl Interval {
    pub const DAYS_IN_MONTH: i64 = 30;
    pub const MICROS_IN_DAY: i128 = SECS_IN_DAY as i128 * 1_000_000;

    pub fn new(months: i64, days: i64, nanos: i128) -> Self {
        Self {
            months,
            days,
            nanos,
        }
    }

    pub const fn from_duration(duration: &Duration) -> Self {
        Self::from_nanos(duration.as_nanos() as i128)
    }

    pub const fn from_nanos(nanos: i128) -> Self {
        Self {
            months: 0,
            days: (nanos / NANOS_IN_DAY) as _,
            nanos: (nanos % NANOS_IN_DAY),
        }
    }

    pub const fn from_micros(micros: i128) -> Self {
        Self {
            months: 0,
            days: (micros / Self::MICROS_IN_DAY) as _,
            nanos: (micros % Self::MICROS_IN_DAY) * 1_000,
        }
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self {
            months: 0,
            days: secs / SECS_IN_DAY,
            nanos: ((secs % SECS_IN_DAY) as i128 * NANOS_IN_SEC),
        }
    }

    pub const fn from_hms(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self::from_secs(hours * 3600 + minutes * 60 + seconds)
    }

    pub const fn from_days(days: i64) -> Self {
        Self {
            months: 0,
            days,
            nanos: 0,
        }
    }

    pub const fn from_months(months: i64) -> Self {
        Self {
            months,
            days: 0,
            nanos: 0,
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0 && self.nanos == 0
    }

    /// Total length in nanoseconds, months folded as 30 days.
    pub const fn total_nanos(&self) -> i128 {
        (self.months as i128 * Self::DAYS_IN_MONTH as i128 + self.days as i128) * NANOS_IN_DAY
            + self.nanos
    }

    pub const fn total_micros(&self) -> i128 {
        self.total_nanos() / 1_000
    }

    /// Convert to a standard duration, negative intervals saturate to zero.
    pub const fn as_duration(&self) -> Duration {
        let nanos = self.total_nanos();
        if nanos <= 0 {
            return Duration::ZERO;
        }
        Duration::new((nanos / NANOS_IN_SEC) as u64, (nanos % NANOS_IN_SEC) as u32)
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.months == other.months
            && self.days as i128 * NANOS_IN_DAY + self.nanos
                == other.days as i128 * NANOS_IN_DAY + other.nanos
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.months.hash(state);
        (self.days as i128 * NANOS_IN_DAY + self.nanos).hash(state);
    }
}

impl From<Duration> for Interval {
    fn from(value: Duration) -> Self {
        Self::from_duration(&value)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.total_nanos();
        let secs = (nanos / NANOS_IN_SEC).unsigned_abs();
        if nanos < 0 {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || Error::msg(format!("Cannot parse `{s}` as a hh:mm:ss duration"));
        let (negative, value) = match s.trim().strip_prefix('-') {
            Some(v) => (true, v),
            None => (false, s.trim()),
        };
        let mut parts = value.splitn(3, ':');
        let (Some(hours), Some(minutes), Some(seconds)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(error());
        };
        let (seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
        // Only the leading `-` carries a sign
        let number = |v: &str| match v.bytes().all(|c| c.is_ascii_digit()) {
            true => v.parse::<i64>().map_err(|_| error()),
            false => Err(error()),
        };
        let hours = number(hours)?;
        let minutes = number(minutes)?;
        let seconds = number(seconds)?;
        if minutes >= 60 || seconds >= 60 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(error());
        }
        let mut nanos = (hours as i128 * 3600 + minutes as i128 * 60 + seconds as i128) * NANOS_IN_SEC;
        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(9)];
            let scale = 10i128.pow(9 - digits.len() as u32);
            nanos += digits.parse::<i128>().map_err(|_| error())? * scale;
        }
        Ok(Self::from_nanos(if negative { -nanos } else { nanos }))
    }
}
