use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use time_tz::{PrimitiveDateTimeExt, Tz};

pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// Interpret `local` as a wall clock time in `canonical_timezone` and convert it to an instant.
///
/// A wall clock time that occurs twice resolves to its first occurrence.
/// A wall clock time skipped by a daylight saving change takes the offset
/// from before the change, so a skipped midnight resolves to the instant
/// the day actually starts.
pub fn to_local_instant(
    local: PrimitiveDateTime,
    canonical_timezone: &str,
) -> Option<OffsetDateTime> {
    let timezone = get_timezone(canonical_timezone)?;

    local.assume_timezone(timezone).take_first().or_else(|| {
        let offset = (local - Duration::DAY)
            .assume_timezone(timezone)
            .take_first()?
            .offset();

        Some(local.assume_offset(offset))
    })
}
