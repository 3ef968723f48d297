use chrono::{DateTime, TimeZone as _};
use chrono_tz::{Tz, US::Eastern, UTC};

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
    UTC.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// New York wall clock time, for anything that should feel daylight saving.
pub fn eastern(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
    Eastern.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}
