use crate::date_token::DateToken;
use chrono::Weekday;
use std::{fmt, num::NonZeroU32};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl Frequency {
    pub(crate) fn from_keyword(value: &str) -> Option<Self> {
        match value {
            "YEARLY" => Some(Frequency::Yearly),
            "MONTHLY" => Some(Frequency::Monthly),
            "WEEKLY" => Some(Frequency::Weekly),
            "DAILY" => Some(Frequency::Daily),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
        })
    }
}

/// Rule part names, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Freq,
    Interval,
    Count,
    Until,
    ByMonth,
    ByMonthDay,
    ByDay,
    ExDate,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Freq,
        Key::Interval,
        Key::Count,
        Key::Until,
        Key::ByMonth,
        Key::ByMonthDay,
        Key::ByDay,
        Key::ExDate,
    ];

    pub(crate) fn from_keyword(key: &str) -> Option<Self> {
        Key::ALL.iter().copied().find(|k| k.keyword() == key)
    }

    fn keyword(self) -> &'static str {
        match self {
            Key::Freq => "FREQ",
            Key::Interval => "INTERVAL",
            Key::Count => "COUNT",
            Key::Until => "UNTIL",
            Key::ByMonth => "BYMONTH",
            Key::ByMonthDay => "BYMONTHDAY",
            Key::ByDay => "BYDAY",
            Key::ExDate => "EXDATE",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A BYDAY entry: a weekday and its position within the period.
///
/// An ordinal of 0 selects every such weekday, a positive one counts from
/// the start of the period and a negative one from its end (-1 is the last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByDay {
    pub ordinal: i32,
    pub weekday: Weekday,
    /// A positive ordinal was written as `+n`.
    pub(crate) plus_sign: bool,
}

impl ByDay {
    pub fn every(weekday: Weekday) -> Self {
        ByDay::nth(0, weekday)
    }

    pub fn nth(ordinal: i32, weekday: Weekday) -> Self {
        ByDay {
            ordinal,
            weekday,
            plus_sign: false,
        }
    }

    /// Weekday number where 0 is Sunday and 6 is Saturday.
    pub fn weekday_number(&self) -> u32 {
        self.weekday.num_days_from_sunday()
    }
}

pub(crate) fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SU",
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
    }
}

pub(crate) fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code {
        "SU" => Some(Weekday::Sun),
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        _ => None,
    }
}

/// The normalized content of a recurrence rule.
///
/// Lists keep the order they were written in. `order` remembers in which
/// order parts appeared in the text so formatting reproduces it; it takes
/// no part in equality.
#[derive(Debug, Clone)]
pub struct Fields {
    pub freq: Frequency,
    pub interval: NonZeroU32,
    pub count: Option<NonZeroU32>,
    pub until: Option<DateToken>,
    pub by_month: Vec<u32>,
    pub by_month_day: Vec<i32>,
    pub by_day: Vec<ByDay>,
    pub exdate: Vec<DateToken>,
    pub(crate) order: Vec<Key>,
}

impl Fields {
    pub fn new(freq: Frequency) -> Self {
        Fields {
            freq,
            interval: NonZeroU32::MIN,
            count: None,
            until: None,
            by_month: Vec::new(),
            by_month_day: Vec::new(),
            by_day: Vec::new(),
            exdate: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Whether `key` has a value worth writing out.
    pub fn is_set(&self, key: Key) -> bool {
        match key {
            Key::Freq => true,
            Key::Interval => self.interval.get() != 1 || self.order.contains(&Key::Interval),
            Key::Count => self.count.is_some(),
            Key::Until => self.until.is_some(),
            Key::ByMonth => !self.by_month.is_empty(),
            Key::ByMonthDay => !self.by_month_day.is_empty(),
            Key::ByDay => !self.by_day.is_empty(),
            Key::ExDate => !self.exdate.is_empty(),
        }
    }

    /// Keys with a value, in written order followed by any remaining ones in
    /// canonical order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        let remaining = Key::ALL.iter().copied().filter(move |k| !self.order.contains(k));

        self.order
            .iter()
            .copied()
            .chain(remaining)
            .filter(move |&k| self.is_set(k))
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq
            && self.interval == other.interval
            && self.count == other.count
            && self.until == other.until
            && self.by_month == other.by_month
            && self.by_month_day == other.by_month_day
            && self.by_day == other.by_day
            && self.exdate == other.exdate
    }
}

impl Eq for Fields {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_written_order() {
        let mut fields = Fields::new(Frequency::Monthly);
        fields.by_day.push(ByDay::nth(1, Weekday::Sun));
        fields.interval = NonZeroU32::new(3).unwrap();
        fields.order = vec![Key::Freq, Key::ByDay, Key::Interval];

        let keys: Vec<_> = fields.keys().collect();
        assert_eq!(keys, [Key::Freq, Key::ByDay, Key::Interval]);
    }

    #[test]
    fn unwritten_keys_in_canonical_order() {
        let mut fields = Fields::new(Frequency::Weekly);
        fields.by_month = vec![1, 2];
        fields.count = NonZeroU32::new(4);

        let keys: Vec<_> = fields.keys().collect();
        assert_eq!(keys, [Key::Freq, Key::Count, Key::ByMonth]);
    }

    #[test]
    fn default_interval_is_not_written() {
        let fields = Fields::new(Frequency::Daily);
        assert!(!fields.is_set(Key::Interval));
        assert_eq!(fields.keys().collect::<Vec<_>>(), [Key::Freq]);
    }

    #[test]
    fn equality_ignores_order() {
        let mut a = Fields::new(Frequency::Yearly);
        a.by_month = vec![11];
        let mut b = a.clone();
        b.order = vec![Key::ByMonth, Key::Freq];

        assert_eq!(a, b);
    }

    #[test]
    fn weekday_numbers_start_on_sunday() {
        assert_eq!(ByDay::every(Weekday::Sun).weekday_number(), 0);
        assert_eq!(ByDay::every(Weekday::Sat).weekday_number(), 6);
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(Key::from_keyword("BYMONTHDAY"), Some(Key::ByMonthDay));
        assert_eq!(Key::from_keyword("bymonthday"), None);
        assert_eq!(Frequency::from_keyword("WEEKLY"), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_keyword("Weekly"), None);
    }
}
