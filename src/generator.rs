//! Occurrence search.
//!
//! Steps through the FREQ periods that are a whole number of intervals away
//! from the anchor's period, expands the BY filters inside each into a sorted
//! set of candidate days, and returns the first candidate that lies after
//! the query, within the upper bound and outside every exclusion.

use crate::{
    fields::{ByDay, Fields},
    period::{Period, Periods},
    zone::localize,
    Frequency,
};
use chrono::{DateTime, Datelike as _, Months, NaiveDate};
use chrono_tz::Tz;

#[derive(Clone, Copy)]
pub(crate) struct Generator<'a> {
    pub fields: &'a Fields,
    pub dtstart: DateTime<Tz>,
    pub horizon_years: u32,
}

impl<'a> Generator<'a> {
    /// First occurrence strictly after `after` (or the first one at all when
    /// `after` is `None`) that does not pass `upper`.
    pub fn next_after(
        &self,
        after: Option<DateTime<Tz>>,
        upper: Option<DateTime<Tz>>,
    ) -> Option<DateTime<Tz>> {
        let stop = self.stop(after, upper);

        let next = self.instances(after, stop, upper).find(|candidate| {
            let excluded = self.is_excluded(candidate);
            if excluded {
                tracing::trace!(%candidate, "skipping excluded occurrence");
            }
            !excluded
        });

        if next.is_none() {
            tracing::debug!(
                rule = %self.fields,
                %stop,
                "search exhausted without an occurrence"
            );
        }
        next
    }

    /// Rule instances, excluded ones included, strictly after `after` in
    /// increasing order. Ends at the first instance past `upper` or once the
    /// periods start after `stop`.
    pub fn instances(
        self,
        after: Option<DateTime<Tz>>,
        stop: NaiveDate,
        upper: Option<DateTime<Tz>>,
    ) -> impl Iterator<Item = DateTime<Tz>> + 'a {
        let dtstart = self.dtstart;
        let timezone = dtstart.timezone();
        let anchor = dtstart.naive_local();
        let time = anchor.time();

        let periods = Periods::new(
            self.fields.freq,
            self.fields.interval.get(),
            anchor.date(),
            self.search_start(after),
            stop,
        );

        periods
            .flat_map(move |period| self.candidate_days(&period))
            .map(move |day| localize(&timezone, &day.and_time(time)))
            .filter(move |candidate| {
                *candidate >= dtstart && after.map_or(true, |after| *candidate > after)
            })
            .take_while(move |candidate| upper.map_or(true, |upper| *candidate <= upper))
    }

    /// Last day a search for occurrences after `after` looks at: the safety
    /// horizon or the day of `upper`, whichever comes first.
    pub fn stop(&self, after: Option<DateTime<Tz>>, upper: Option<DateTime<Tz>>) -> NaiveDate {
        let horizon = self
            .search_start(after)
            .checked_add_months(Months::new(self.horizon_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MAX);

        match upper {
            Some(upper) => {
                let last = upper.with_timezone(&self.dtstart.timezone()).date_naive();
                horizon.min(last)
            }
            None => horizon,
        }
    }

    pub fn is_excluded(&self, candidate: &DateTime<Tz>) -> bool {
        self.fields.exdate.iter().any(|excluded| {
            if excluded.is_date_only() {
                excluded.calendar_date() == candidate.date_naive()
            } else {
                excluded.as_instant() == *candidate
            }
        })
    }

    fn search_start(&self, after: Option<DateTime<Tz>>) -> NaiveDate {
        let from = match after {
            Some(after) if after > self.dtstart => after,
            _ => self.dtstart,
        };
        from.with_timezone(&self.dtstart.timezone()).date_naive()
    }

    /// Days in `period` that the BY filters select, sorted and distinct.
    fn candidate_days(&self, period: &Period) -> Vec<NaiveDate> {
        let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
            return Vec::new();
        };

        let mut days = match self.fields.freq {
            Frequency::Yearly => self.yearly(first, last),
            Frequency::Monthly => self.month(first.year(), first.month()),
            Frequency::Weekly | Frequency::Daily => first
                .iter_days()
                .take_while(|day| *day <= last)
                .filter(|day| self.selects(*day))
                .collect(),
        };

        days.sort_unstable();
        days.dedup();
        days
    }

    fn yearly(&self, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
        let fields = self.fields;

        // BYDAY alone counts weekdays through the whole year
        if fields.by_month.is_empty() && fields.by_month_day.is_empty() && !fields.by_day.is_empty()
        {
            return fields
                .by_day
                .iter()
                .flat_map(|by_day| weekdays_within(by_day, first, last))
                .collect();
        }

        let months = if !fields.by_month.is_empty() {
            fields.by_month.clone()
        } else if !fields.by_month_day.is_empty() {
            (1..=12).collect()
        } else {
            vec![self.dtstart.month()]
        };

        months
            .into_iter()
            .flat_map(|month| self.month(first.year(), month))
            .collect()
    }

    fn month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let fields = self.fields;

        if !fields.by_month.is_empty() && !fields.by_month.contains(&month) {
            return Vec::new();
        }
        let Some((first, last)) = month_bounds(year, month) else {
            return Vec::new();
        };

        if !fields.by_month_day.is_empty() {
            fields
                .by_month_day
                .iter()
                .filter_map(|&day| NaiveDate::from_ymd_opt(year, month, u32::try_from(day).ok()?))
                .filter(|day| fields.by_day.is_empty() || self.by_day_in_month(*day))
                .collect()
        } else if !fields.by_day.is_empty() {
            fields
                .by_day
                .iter()
                .flat_map(|by_day| weekdays_within(by_day, first, last))
                .collect()
        } else {
            NaiveDate::from_ymd_opt(year, month, self.dtstart.day())
                .into_iter()
                .collect()
        }
    }

    /// Day filter for WEEKLY and DAILY periods.
    fn selects(&self, day: NaiveDate) -> bool {
        let fields = self.fields;

        if !fields.by_month.is_empty() && !fields.by_month.contains(&day.month()) {
            return false;
        }
        if !fields.by_month_day.is_empty()
            && !fields
                .by_month_day
                .iter()
                .any(|&d| u32::try_from(d) == Ok(day.day()))
        {
            return false;
        }

        if fields.by_day.is_empty() {
            // an unfiltered week falls back to the anchor's weekday
            return fields.freq == Frequency::Daily
                || !fields.by_month_day.is_empty()
                || day.weekday() == self.dtstart.weekday();
        }

        match fields.freq {
            Frequency::Weekly => fields.by_day.iter().any(|b| b.weekday == day.weekday()),
            // DAILY counts BYDAY ordinals within the day's month
            _ => self.by_day_in_month(day),
        }
    }

    /// Whether some BYDAY entry selects `day` when counted within its month.
    fn by_day_in_month(&self, day: NaiveDate) -> bool {
        let Some((first, last)) = month_bounds(day.year(), day.month()) else {
            return false;
        };

        self.fields.by_day.iter().any(|by_day| {
            by_day.weekday == day.weekday()
                && (by_day.ordinal == 0 || weekdays_within(by_day, first, last).contains(&day))
        })
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Days from `first` to `last` that `by_day` picks out.
fn weekdays_within(by_day: &ByDay, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let skip = (7 + by_day.weekday.num_days_from_monday()
        - first.weekday().num_days_from_monday())
        % 7;

    let matching: Vec<NaiveDate> = first
        .iter_days()
        .skip(skip as usize)
        .step_by(7)
        .take_while(|day| *day <= last)
        .collect();

    let position = match by_day.ordinal {
        0 => return matching,
        n if n > 0 => usize::try_from(n - 1).ok(),
        n => matching.len().checked_sub(n.unsigned_abs() as usize),
    };

    position
        .and_then(|i| matching.get(i).copied())
        .into_iter()
        .collect()
}
