//! Writes rules back out in the `KEY=VALUE;...` grammar `parser` reads.

use crate::fields::{weekday_code, ByDay, Fields, Key};
use std::fmt::{self, Display};

impl Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.plus_sign && self.ordinal > 0 {
            f.write_str("+")?;
        }
        if self.ordinal != 0 {
            write!(f, "{}", self.ordinal)?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

impl Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}=")?;

            match key {
                Key::Freq => write!(f, "{}", self.freq)?,
                Key::Interval => write!(f, "{}", self.interval)?,
                Key::Count => write_list(f, self.count.iter())?,
                Key::Until => write_list(f, self.until.iter())?,
                Key::ByMonth => write_list(f, &self.by_month)?,
                Key::ByMonthDay => write_list(f, &self.by_month_day)?,
                Key::ByDay => write_list(f, &self.by_day)?,
                Key::ExDate => write_list(f, &self.exdate)?,
            }
        }
        Ok(())
    }
}

fn write_list<T: Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
