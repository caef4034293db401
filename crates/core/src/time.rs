//! Local calendar-day arithmetic for users in arbitrary time zones.

use chrono::{NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::types::Timestamp;

/// Parse an IANA zone name, falling back to UTC for missing or unknown names.
pub fn parse_timezone(name: Option<&str>) -> Tz {
    name.and_then(|n| n.trim().parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

pub fn local_date(now: Timestamp, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn local_hour(now: Timestamp, tz: Tz) -> u32 {
    now.with_timezone(&tz).hour()
}

/// First instant of `date` in `tz`, as UTC.
///
/// Where midnight does not exist (DST gap) the first valid hour is used.
pub fn start_of_local_day(date: NaiveDate, tz: Tz) -> Timestamp {
    (0..3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Half-open `[start, end)` UTC bounds of the local day containing `now`.
pub fn local_day_bounds(now: Timestamp, tz: Tz) -> (Timestamp, Timestamp) {
    let today = local_date(now, tz);
    let start = start_of_local_day(today, tz);
    let end = today
        .succ_opt()
        .map(|tomorrow| start_of_local_day(tomorrow, tz))
        .unwrap_or(start + chrono::Duration::days(1));
    (start, end)
}
