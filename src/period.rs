use crate::Frequency;
use chrono::{Datelike as _, NaiveDate};

/// A FREQ sized calendar span, numbered so consecutive spans differ by one.
///
/// Years are numbered by year, months from year 0, and weeks (Monday to
/// Sunday) and days from the start of the common era.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Period {
    freq: Frequency,
    index: i64,
}

impl Period {
    pub fn containing(freq: Frequency, date: NaiveDate) -> Self {
        let days = i64::from(date.num_days_from_ce());
        let index = match freq {
            Frequency::Yearly => i64::from(date.year()),
            Frequency::Monthly => i64::from(date.year()) * 12 + i64::from(date.month0()),
            // day 1 of the common era is a Monday
            Frequency::Weekly => (days - 1).div_euclid(7),
            Frequency::Daily => days,
        };

        Period { freq, index }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        match self.freq {
            Frequency::Yearly => NaiveDate::from_ymd_opt(i32::try_from(self.index).ok()?, 1, 1),
            Frequency::Monthly => {
                let year = i32::try_from(self.index.div_euclid(12)).ok()?;
                let month = u32::try_from(self.index.rem_euclid(12)).ok()? + 1;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            Frequency::Weekly => {
                let days = self.index.checked_mul(7)?.checked_add(1)?;
                NaiveDate::from_num_days_from_ce_opt(i32::try_from(days).ok()?)
            }
            Frequency::Daily => NaiveDate::from_num_days_from_ce_opt(i32::try_from(self.index).ok()?),
        }
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.offset(1)?.first_day()?.pred_opt()
    }

    fn offset(&self, periods: i64) -> Option<Self> {
        Some(Period {
            freq: self.freq,
            index: self.index.checked_add(periods)?,
        })
    }
}

/// Periods reachable from the anchor's period by whole multiples of the
/// interval, starting with the first one that contains or follows `from` and
/// ending once a period starts after `stop`.
pub(crate) struct Periods {
    cursor: Option<Period>,
    step: i64,
    stop: NaiveDate,
}

impl Periods {
    pub fn new(
        freq: Frequency,
        interval: u32,
        anchor: NaiveDate,
        from: NaiveDate,
        stop: NaiveDate,
    ) -> Self {
        let step = i64::from(interval);
        let anchor = Period::containing(freq, anchor);
        let from = Period::containing(freq, from);

        let cursor = if from.index <= anchor.index {
            Some(anchor)
        } else {
            let behind = (from.index - anchor.index).rem_euclid(step);
            match behind {
                0 => Some(from),
                _ => from.offset(step - behind),
            }
        };

        Periods { cursor, step, stop }
    }
}

impl Iterator for Periods {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        let current = self.cursor?;

        match current.first_day() {
            Some(first) if first <= self.stop => {
                self.cursor = current.offset(self.step);
                Some(current)
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }
}
