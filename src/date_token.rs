use crate::{error::DateTokenError, zone::localize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _};
use chrono_tz::Tz;
use std::fmt;

const DATE_LEN: usize = 8;
const DATE_TIME_LEN: usize = 15;

/// A calendar date or date-time as written in UNTIL and EXDATE parts.
///
/// `YYYYMMDD` is date only and resolves to local midnight,
/// `YYYYMMDDTHHMMSS` is a local wall clock time and a trailing `Z` makes it
/// a UTC instant. The written form is kept next to the instant so the token
/// can be formatted back exactly as it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken {
    instant: DateTime<Tz>,
    written: NaiveDateTime,
    date_only: bool,
    utc: bool,
}

impl DateToken {
    pub fn parse(token: &str, timezone: &Tz) -> Result<Self, DateTokenError> {
        let bytes = token.as_bytes();

        let (date_only, utc) = match bytes.len() {
            DATE_LEN => (true, false),
            DATE_TIME_LEN => (false, false),
            len if len == DATE_TIME_LEN + 1 => match bytes[DATE_TIME_LEN] {
                b'Z' => (false, true),
                _ => return Err(DateTokenError::Suffix),
            },
            len => return Err(DateTokenError::Length(len)),
        };

        let date = {
            let year = digits(bytes, 0, 4)?;
            let month = digits(bytes, 4, 2)?;
            let day = digits(bytes, 6, 2)?;
            NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(DateTokenError::OutOfRange)?
        };

        let time = if date_only {
            NaiveTime::MIN
        } else {
            if bytes[DATE_LEN] != b'T' {
                return Err(DateTokenError::Separator);
            }
            let hour = digits(bytes, 9, 2)?;
            let minute = digits(bytes, 11, 2)?;
            let second = digits(bytes, 13, 2)?;
            NaiveTime::from_hms_opt(hour, minute, second).ok_or(DateTokenError::OutOfRange)?
        };

        let written = date.and_time(time);
        let instant = if utc {
            timezone.from_utc_datetime(&written)
        } else {
            localize(timezone, &written)
        };

        Ok(DateToken {
            instant,
            written,
            date_only,
            utc,
        })
    }

    /// A date-only token for `date`, resolved to local midnight.
    pub fn date(date: NaiveDate, timezone: &Tz) -> Self {
        let written = date.and_time(NaiveTime::MIN);
        DateToken {
            instant: localize(timezone, &written),
            written,
            date_only: true,
            utc: false,
        }
    }

    /// A timed token for `instant`, written in UTC when `utc` is set and as
    /// a local wall clock reading otherwise.
    pub fn instant(instant: DateTime<Tz>, utc: bool) -> Self {
        let written = if utc {
            instant.naive_utc()
        } else {
            instant.naive_local()
        };

        DateToken {
            instant,
            written,
            date_only: false,
            utc,
        }
    }

    pub fn as_instant(&self) -> DateTime<Tz> {
        self.instant
    }

    /// The calendar date as written.
    pub fn calendar_date(&self) -> NaiveDate {
        self.written.date()
    }

    pub fn is_date_only(&self) -> bool {
        self.date_only
    }

    pub fn is_utc(&self) -> bool {
        self.utc
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.date_only {
            return write!(f, "{}", self.written.format("%Y%m%d"));
        }

        write!(f, "{}", self.written.format("%Y%m%dT%H%M%S"))?;
        if self.utc {
            f.write_str("Z")?;
        }
        Ok(())
    }
}

fn digits(bytes: &[u8], start: usize, len: usize) -> Result<u32, DateTokenError> {
    bytes[start..start + len]
        .iter()
        .copied()
        .enumerate()
        .try_fold(0, |acc, (i, b)| match b {
            b'0'..=b'9' => Ok(acc * 10 + u32::from(b - b'0')),
            _ => Err(DateTokenError::NotDigit(start + i)),
        })
}
