use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset as _, TimeZone as _};
use chrono_tz::Tz;

/// Resolves a wall clock reading in `timezone` to a single instant.
///
/// Ambiguous readings (clocks falling back) take the earlier instant.
/// Readings skipped by a forward jump are read with the offset in effect
/// before the jump, which lands them the length of the gap later.
pub(crate) fn localize(timezone: &Tz, local: &NaiveDateTime) -> DateTime<Tz> {
    match timezone.from_local_datetime(local) {
        LocalResult::Single(time) => time,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before = *local - Duration::days(1);
            let offset = timezone
                .offset_from_local_datetime(&before)
                .earliest()
                .map(|offset| offset.fix().local_minus_utc())
                .unwrap_or_default();

            timezone.from_utc_datetime(&(*local - Duration::seconds(i64::from(offset))))
        }
    }
}
