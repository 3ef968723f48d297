//! Reads the `KEY=VALUE;...` recurrence rule grammar into [`Fields`].

use crate::{
    date_token::DateToken,
    error::ParseError,
    fields::{weekday_from_code, ByDay, Fields, Frequency, Key},
};
use chrono_tz::Tz;
use std::{num::NonZeroU32, str::FromStr};

const MAX_BY_DAY_ORDINAL: i32 = 53;

/// Parses rule text, resolving UNTIL and EXDATE tokens in `timezone`.
///
/// Fails on the first malformed part. Keys must be upper case, may appear
/// only once and must be one of FREQ, INTERVAL, COUNT, UNTIL, BYMONTH,
/// BYMONTHDAY, BYDAY or EXDATE.
pub fn parse(text: &str, timezone: Tz) -> Result<Fields, ParseError> {
    let mut freq = None;
    let mut fields = Fields::new(Frequency::Daily);

    for part in text.split(';') {
        let (name, value) = part.split_once('=').ok_or_else(|| ParseError::MalformedPart {
            part: part.to_owned(),
        })?;

        let key = Key::from_keyword(name).ok_or_else(|| ParseError::UnknownKey {
            key: name.to_owned(),
        })?;

        if fields.order.contains(&key) {
            return Err(ParseError::DuplicateKey { key });
        }
        fields.order.push(key);

        tracing::trace!(%key, value, "parsing rule part");

        match key {
            Key::Freq => {
                freq = Some(Frequency::from_keyword(value).ok_or_else(|| {
                    ParseError::UnknownFrequency {
                        value: value.to_owned(),
                    }
                })?);
            }
            Key::Interval => fields.interval = positive(key, value)?,
            Key::Count => fields.count = Some(positive(key, value)?),
            Key::Until => fields.until = Some(date_token(key, value, &timezone)?),
            Key::ByMonth => {
                fields.by_month = list(value, |token| in_range(key, token, 1..=12))?;
            }
            Key::ByMonthDay => {
                fields.by_month_day = list(value, |token| in_range(key, token, 1..=31))?;
            }
            Key::ByDay => fields.by_day = list(value, by_day)?,
            Key::ExDate => {
                fields.exdate = list(value, |token| date_token(key, token, &timezone))?;
            }
        }
    }

    fields.freq = freq.ok_or(ParseError::MissingFrequency)?;

    if fields.is_set(Key::ByMonth) && fields.is_set(Key::ByMonthDay) && fields.is_set(Key::ByDay)
    {
        return Err(ParseError::UnsupportedCombination);
    }

    Ok(fields)
}

fn list<T>(
    value: &str,
    item: impl Fn(&str) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    value.split(',').map(item).collect()
}

/// Decimal integers as they are written back out: an optional minus sign and
/// no leading zeros.
fn integer<T: FromStr>(key: Key, token: &str) -> Result<T, ParseError> {
    let malformed = || ParseError::MalformedInteger {
        key,
        token: token.to_owned(),
    };

    if !plain_digits(token.strip_prefix('-').unwrap_or(token)) {
        return Err(malformed());
    }
    token.parse().map_err(|_| malformed())
}

fn plain_digits(digits: &str) -> bool {
    digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || (!digits.is_empty() && !digits.starts_with('0')))
}

fn positive(key: Key, token: &str) -> Result<NonZeroU32, ParseError> {
    let value: u32 = integer(key, token)?;
    NonZeroU32::new(value).ok_or_else(|| ParseError::OutOfRange {
        key,
        token: token.to_owned(),
    })
}

fn in_range<T>(key: Key, token: &str, range: std::ops::RangeInclusive<T>) -> Result<T, ParseError>
where
    T: FromStr + PartialOrd,
{
    let value = integer(key, token)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange {
            key,
            token: token.to_owned(),
        })
    }
}

fn date_token(key: Key, token: &str, timezone: &Tz) -> Result<DateToken, ParseError> {
    DateToken::parse(token, timezone).map_err(|source| ParseError::MalformedDateToken {
        key,
        token: token.to_owned(),
        source,
    })
}

/// `[+-]?[1-9][0-9]*` followed by a two letter weekday code, or the code alone.
fn by_day(token: &str) -> Result<ByDay, ParseError> {
    let malformed = || ParseError::MalformedByDayToken {
        token: token.to_owned(),
    };

    let split = token
        .len()
        .checked_sub(2)
        .filter(|&at| token.is_char_boundary(at))
        .ok_or_else(malformed)?;
    let (prefix, code) = token.split_at(split);

    let weekday = weekday_from_code(code).ok_or_else(malformed)?;

    if prefix.is_empty() {
        return Ok(ByDay::every(weekday));
    }

    let (negative, digits) = match prefix.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, prefix.strip_prefix('+').unwrap_or(prefix)),
    };
    if !plain_digits(digits) {
        return Err(malformed());
    }

    let magnitude: i32 = digits.parse().map_err(|_| malformed())?;
    if magnitude == 0 || magnitude > MAX_BY_DAY_ORDINAL {
        return Err(malformed());
    }

    Ok(ByDay {
        plus_sign: prefix.starts_with('+'),
        ..ByDay::nth(if negative { -magnitude } else { magnitude }, weekday)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DateTokenError, test_helpers::*};
    use chrono::Weekday;
    use chrono_tz::UTC;

    #[test]
    fn yearly_by_month_and_day() {
        let fields = parse("FREQ=YEARLY;BYMONTH=11;BYDAY=1SU", UTC).unwrap();

        let mut expected = Fields::new(Frequency::Yearly);
        expected.by_month = vec![11];
        expected.by_day = vec![ByDay::nth(1, Weekday::Sun)];
        assert_eq!(fields, expected);
        assert_eq!(fields.by_day[0].weekday_number(), 0);
    }

    #[test]
    fn negative_by_day() {
        let fields = parse("FREQ=YEARLY;BYDAY=-1SU", UTC).unwrap();

        let mut expected = Fields::new(Frequency::Yearly);
        expected.by_day = vec![ByDay::nth(-1, Weekday::Sun)];
        assert_eq!(fields, expected);
    }

    #[test]
    fn by_month_list() {
        let fields = parse("FREQ=WEEKLY;BYMONTH=1,2,3", UTC).unwrap();

        assert_eq!(fields.freq, Frequency::Weekly);
        assert_eq!(fields.by_month, [1, 2, 3]);
        assert_eq!(fields.interval.get(), 1);
        assert_eq!(fields.count, None);
    }

    #[test]
    fn exdate_keeps_token_kinds() {
        let fields = parse(
            "FREQ=WEEKLY;BYMONTH=1,2,3;EXDATE=20110201T010000,20110302",
            UTC,
        )
        .unwrap();

        assert_eq!(fields.exdate[0].as_instant(), utc(2011, 2, 1, 1, 0, 0));
        assert!(!fields.exdate[0].is_date_only());
        assert_eq!(fields.exdate[1].as_instant(), utc(2011, 3, 2, 0, 0, 0));
        assert!(fields.exdate[1].is_date_only());
    }

    #[test]
    fn exdate_in_explicit_zone() {
        let fields = parse("FREQ=DAILY;EXDATE=20110201T010000", chrono_tz::US::Eastern).unwrap();
        assert_eq!(fields.exdate[0].as_instant(), eastern(2011, 2, 1, 1, 0, 0));
    }

    #[test]
    fn interval_count_until() {
        let fields = parse("FREQ=MONTHLY;INTERVAL=3;COUNT=5;UNTIL=20120101T000000Z", UTC).unwrap();

        assert_eq!(fields.interval.get(), 3);
        assert_eq!(fields.count.map(NonZeroU32::get), Some(5));
        let until = fields.until.unwrap();
        assert!(until.is_utc());
        assert_eq!(until.as_instant(), utc(2012, 1, 1, 0, 0, 0));
    }

    #[test]
    fn by_day_prefixes() {
        assert_eq!(by_day("MO"), Ok(ByDay::every(Weekday::Mon)));
        assert_eq!(
            by_day("+2TU"),
            Ok(ByDay {
                plus_sign: true,
                ..ByDay::nth(2, Weekday::Tue)
            })
        );
        assert_eq!(by_day("-53SA"), Ok(ByDay::nth(-53, Weekday::Sat)));
        assert!(by_day("0MO").is_err());
        assert!(by_day("54MO").is_err());
        assert!(by_day("-MO").is_err());
        assert!(by_day("1XX").is_err());
        assert!(by_day("1mo").is_err());
        assert!(by_day("M").is_err());
        assert!(by_day("a1MO").is_err());
        assert!(by_day("01SU").is_err());
        assert!(by_day("+01SU").is_err());
        assert!(by_day("-01SU").is_err());
        assert!(by_day("+-1SU").is_err());
    }

    #[test]
    fn integers_are_written_plainly() {
        for (text, key, token) in [
            ("FREQ=DAILY;INTERVAL=+2", Key::Interval, "+2"),
            ("FREQ=DAILY;COUNT=007", Key::Count, "007"),
            ("FREQ=YEARLY;BYMONTH=01", Key::ByMonth, "01"),
            ("FREQ=MONTHLY;BYMONTHDAY=1,+15", Key::ByMonthDay, "+15"),
            ("FREQ=MONTHLY;BYMONTHDAY=-01", Key::ByMonthDay, "-01"),
        ] {
            assert_eq!(
                parse(text, UTC),
                Err(ParseError::MalformedInteger {
                    key,
                    token: token.to_owned()
                }),
                "{text}"
            );
        }
        assert!(parse("FREQ=DAILY;COUNT=4294967295", UTC).is_ok());
    }

    #[test]
    fn unknown_frequency() {
        assert_eq!(
            parse("FREQ=HOURLY", UTC),
            Err(ParseError::UnknownFrequency {
                value: "HOURLY".to_owned()
            })
        );
        assert!(parse("FREQ=weekly", UTC).is_err());
    }

    #[test]
    fn missing_frequency() {
        assert_eq!(parse("BYMONTH=1", UTC), Err(ParseError::MissingFrequency));
    }

    #[test]
    fn malformed_by_day_names_token() {
        assert_eq!(
            parse("FREQ=MONTHLY;BYDAY=1SU,2XY", UTC),
            Err(ParseError::MalformedByDayToken {
                token: "2XY".to_owned()
            })
        );
    }

    #[test]
    fn malformed_integers() {
        assert_eq!(
            parse("FREQ=DAILY;INTERVAL=two", UTC),
            Err(ParseError::MalformedInteger {
                key: Key::Interval,
                token: "two".to_owned()
            })
        );
        assert_eq!(
            parse("FREQ=DAILY;COUNT=0", UTC),
            Err(ParseError::OutOfRange {
                key: Key::Count,
                token: "0".to_owned()
            })
        );
        assert!(parse("FREQ=DAILY;COUNT=-1", UTC).is_err());
        assert!(parse("FREQ=DAILY;BYMONTH=", UTC).is_err());
    }

    #[test]
    fn range_checks() {
        assert_eq!(
            parse("FREQ=YEARLY;BYMONTH=13", UTC),
            Err(ParseError::OutOfRange {
                key: Key::ByMonth,
                token: "13".to_owned()
            })
        );
        assert!(parse("FREQ=MONTHLY;BYMONTHDAY=-1", UTC).is_err());
        assert!(parse("FREQ=MONTHLY;BYMONTHDAY=0", UTC).is_err());
        assert!(parse("FREQ=MONTHLY;BYMONTHDAY=32", UTC).is_err());
    }

    #[test]
    fn malformed_date_keeps_cause() {
        assert_eq!(
            parse("FREQ=DAILY;EXDATE=20110201,2011", UTC),
            Err(ParseError::MalformedDateToken {
                key: Key::ExDate,
                token: "2011".to_owned(),
                source: DateTokenError::Length(4),
            })
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            parse("FREQ=DAILY;FOO=1", UTC),
            Err(ParseError::UnknownKey {
                key: "FOO".to_owned()
            })
        );
        assert_eq!(
            parse("FREQ=DAILY;FREQ=WEEKLY", UTC),
            Err(ParseError::DuplicateKey { key: Key::Freq })
        );
        assert_eq!(
            parse("FREQ=DAILY;", UTC),
            Err(ParseError::MalformedPart {
                part: String::new()
            })
        );
        assert!(parse("", UTC).is_err());
    }

    #[test]
    fn all_three_day_filters_rejected() {
        assert_eq!(
            parse("FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=1;BYDAY=MO", UTC),
            Err(ParseError::UnsupportedCombination)
        );
        assert!(parse("FREQ=YEARLY;BYMONTHDAY=13;BYDAY=FR", UTC).is_ok());
    }

    #[test]
    fn error_messages_name_key_and_token() {
        let err = parse("FREQ=DAILY;UNTIL=2011020X", UTC).unwrap_err();
        assert_eq!(err.to_string(), "UNTIL: malformed date '2011020X'");
    }
}
