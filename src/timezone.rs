//! Resolving the server's local timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The current UTC offset of a canonical timezone such as "America/Argentina/Buenos_Aires".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current year in `canonical_timezone`, which differs from the UTC year around new year.
pub fn current_local_year(canonical_timezone: &str) -> Option<i32> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).year())
}

#[cfg(test)]
mod tests {
    use super::{current_local_year, get_local_offset};

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC").map(|offset| offset.whole_hours()), Some(0));
    }

    #[test]
    fn unknown_timezone_has_no_year() {
        assert_eq!(current_local_year("Middle/Earth"), None);
    }
}
