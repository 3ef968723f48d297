use crate::{error::ParseError, fields::Fields, generator::Generator, parser, Frequency};
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;

/// How many years past the point a search starts from it may look before
/// giving up, so rules that can never match still return.
pub const DEFAULT_HORIZON_YEARS: u32 = 100;

/// A parsed recurrence rule anchored at its start instant.
///
/// Immutable once built. Occurrences are computed on demand from the
/// arguments of each query; a rule keeps no iteration state between calls.
#[derive(Debug, Clone)]
pub struct Rule {
    fields: Fields,
    dtstart: DateTime<Tz>,
    horizon_years: u32,
}

/// Progress through a COUNT limited rule: the last instance returned and how
/// many instances, excluded ones included, lie at or before it.
#[derive(Debug, Clone, Copy)]
struct Tally {
    last: DateTime<Tz>,
    counted: u32,
}

impl Rule {
    pub fn new(fields: Fields, dtstart: DateTime<Tz>) -> Self {
        tracing::debug!(rule = %fields, %dtstart, "building recurrence rule");

        Rule {
            fields,
            dtstart,
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }

    /// Parses `text` with UNTIL and EXDATE read in the zone of `dtstart`.
    pub fn parse(text: &str, dtstart: DateTime<Tz>) -> Result<Self, ParseError> {
        let fields = parser::parse(text, dtstart.timezone())?;
        Ok(Rule::new(fields, dtstart))
    }

    /// Limits every search to `years` past its starting point.
    pub fn horizon(mut self, years: u32) -> Self {
        self.horizon_years = years.max(1);
        self
    }

    pub fn freq(&self) -> Frequency {
        self.fields.freq
    }

    pub fn dtstart(&self) -> DateTime<Tz> {
        self.dtstart
    }

    pub fn value_of(&self) -> &Fields {
        &self.fields
    }

    /// The earliest occurrence strictly after `after`.
    pub fn next<T: TimeZone>(&self, after: &DateTime<T>) -> Option<DateTime<Tz>> {
        let after = after.with_timezone(&self.dtstart.timezone());
        self.search(Some(after), &mut None)
    }

    /// Up to `max` occurrences strictly after `after`, fewer once the rule
    /// runs out.
    pub fn next_occurrences<T: TimeZone>(
        &self,
        after: &DateTime<T>,
        max: usize,
    ) -> Vec<DateTime<Tz>> {
        self.after(after).take(max).collect()
    }

    /// Every occurrence strictly after `after`, in order.
    pub fn after<T: TimeZone>(&self, after: &DateTime<T>) -> Occurrences<'_> {
        Occurrences {
            rule: self,
            cursor: Some(after.with_timezone(&self.dtstart.timezone())),
            tally: None,
            done: false,
        }
    }

    /// Every occurrence from the start instant on, in order.
    pub fn all(&self) -> Occurrences<'_> {
        Occurrences {
            rule: self,
            cursor: None,
            tally: None,
            done: false,
        }
    }

    fn generator(&self) -> Generator<'_> {
        Generator {
            fields: &self.fields,
            dtstart: self.dtstart,
            horizon_years: self.horizon_years,
        }
    }

    /// Finds the next occurrence after `after`. With a COUNT, instances are
    /// counted from the start instant, or from `tally` when it lies at or
    /// before `after`, only as far as the occurrence being returned.
    fn search(
        &self,
        after: Option<DateTime<Tz>>,
        tally: &mut Option<Tally>,
    ) -> Option<DateTime<Tz>> {
        let generator = self.generator();
        let until = self.fields.until.map(|until| until.as_instant());

        let Some(count) = self.fields.count else {
            return generator.next_after(after, until);
        };

        let resume = (*tally).filter(|tally| after.map_or(false, |after| tally.last <= after));
        let (mut counted, from) = match resume {
            Some(tally) => (tally.counted, Some(tally.last)),
            None => (0, None),
        };

        // excluded instances still take up a place in the count
        let stop = generator.stop(after, until);
        for instance in generator.instances(from, stop, until) {
            if counted == count.get() {
                break;
            }
            counted += 1;

            if after.map_or(true, |after| instance > after) && !generator.is_excluded(&instance) {
                *tally = Some(Tally {
                    last: instance,
                    counted,
                });
                return Some(instance);
            }
        }

        tracing::debug!(count = count.get(), counted, "no counted occurrence left");
        None
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fields, f)
    }
}

/// Occurrences of a [`Rule`] in increasing order, see [`Rule::after`].
#[derive(Debug, Clone)]
pub struct Occurrences<'r> {
    rule: &'r Rule,
    cursor: Option<DateTime<Tz>>,
    tally: Option<Tally>,
    done: bool,
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<DateTime<Tz>> {
        if self.done {
            return None;
        }

        match self.rule.search(self.cursor, &mut self.tally) {
            Some(next) => {
                self.cursor = Some(next);
                Some(next)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
