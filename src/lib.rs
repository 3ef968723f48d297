//! Recurrence rules in the iCalendar `RRULE` style.
//!
//! A rule is read from text such as `FREQ=MONTHLY;BYDAY=-1FR;COUNT=6`,
//! anchored at a start instant, and asked for the occurrences that follow
//! any given instant:
//!
//! ```
//! use chrono::TimeZone as _;
//! use chrono_tz::Europe::Paris;
//! use recurrence::Rule;
//!
//! let start = Paris.with_ymd_and_hms(2012, 1, 1, 9, 0, 0).unwrap();
//! let rule = Rule::parse("FREQ=MONTHLY;BYDAY=-1FR;COUNT=6", start).unwrap();
//!
//! let next = rule.next(&start).unwrap();
//! assert_eq!(next, Paris.with_ymd_and_hms(2012, 1, 27, 9, 0, 0).unwrap());
//! assert_eq!(rule.next_occurrences(&start, 10).len(), 6);
//! assert_eq!(rule.to_string(), "FREQ=MONTHLY;BYDAY=-1FR;COUNT=6");
//! ```

mod date_token;
mod error;
mod fields;
mod format;
mod generator;
mod parser;
mod period;
mod rule;
mod zone;

#[cfg(test)]
mod test_helpers;

pub use date_token::DateToken;
pub use error::{DateTokenError, ParseError};
pub use fields::{ByDay, Fields, Frequency, Key};
pub use parser::parse;
pub use rule::{Occurrences, Rule, DEFAULT_HORIZON_YEARS};
