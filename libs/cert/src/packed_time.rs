//! Packed date/time encoding (§4.2).
//!
//! `Seconds = (((((year − 2000) · 12 + month − 1) · 31 + day − 1) · 24 + hour) · 60 + minute) · 60 + second`
//! `Days = Seconds / 86400`
//!
//! This is an ordinal-comparable encoding, not a calendar-accurate one: every
//! month is treated as 31 days wide so the arithmetic is a pure bijection
//! between (year, month, day, hour, minute, second) tuples in range and `u32`
//! values, not a real calendar normalization. `pack` and `unpack` are exact
//! arithmetic inverses of each other, which is what P6 requires — they do not
//! reject a nonexistent calendar date such as February 30th.
//!
//! The encoding fits 32 bits through year 2133.

use chrono::{DateTime, Datelike, Timelike, Utc};

pub const SECONDS_PER_DAY: u32 = 86_400;

/// Sentinel packed-date value meaning "no well-defined expiration"
/// (round-trips to 9999-12-31T23:59:59Z in X.509, §4.2).
pub const NO_WELL_DEFINED_EXPIRATION: u32 = 0;

/// Pack a (year, month, day, hour, minute, second) tuple into seconds since
/// the 2000-01-01 epoch, per the §4.2 formula. `year` must be in
/// `2000..=2133`ish for the result to fit in 32 bits; callers validating
/// wire input should treat out-of-range years as `overflow`.
pub fn pack_seconds(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> u32 {
    let y = (year - 2000) as u32;
    let mo = (month - 1) as u32;
    let d = (day - 1) as u32;
    (((((y * 12 + mo) * 31 + d) * 24 + hour as u32) * 60 + minute as u32) * 60 + second as u32)
}

/// Inverse of [`pack_seconds`].
pub fn unpack_seconds(packed: u32) -> (u16, u8, u8, u8, u8, u8) {
    let second = packed % 60;
    let t = packed / 60;
    let minute = t % 60;
    let t = t / 60;
    let hour = t % 24;
    let t = t / 24;
    let day = t % 31;
    let t = t / 31;
    let month = t % 12;
    let year = t / 12;
    (
        2000 + year as u16,
        month as u8 + 1,
        day as u8 + 1,
        hour as u8,
        minute as u8,
        second as u8,
    )
}

/// Pack a calendar date at 1-day resolution (used for certificate
/// not-before/not-after, §3).
pub fn pack_date(year: u16, month: u8, day: u8) -> u32 {
    pack_seconds(year, month, day, 0, 0, 0) / SECONDS_PER_DAY
}

/// Inverse of [`pack_date`].
pub fn unpack_date(packed_days: u32) -> (u16, u8, u8) {
    let (y, mo, d, _, _, _) = unpack_seconds(packed_days * SECONDS_PER_DAY);
    (y, mo, d)
}

/// Convert a packed (1-day resolution) date into packed-time seconds, for
/// comparison against a packed `effectiveTime`. The "no well-defined
/// expiration" sentinel is resolved to the maximum representable time rather
/// than 2000-01-01, which the raw arithmetic would otherwise produce.
pub fn packed_date_to_time(packed_date: u32) -> u32 {
    if packed_date == NO_WELL_DEFINED_EXPIRATION {
        return u32::MAX;
    }
    packed_date * SECONDS_PER_DAY
}

/// `SecondsSinceEpochToPackedCertTime`: convert a Unix timestamp into the
/// packed-time encoding.
pub fn seconds_since_unix_epoch_to_packed_time(unix_seconds: i64) -> Option<u32> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(unix_seconds, 0)?;
    if dt.year() < 2000 || dt.year() > 2133 {
        return None;
    }
    Some(pack_seconds(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sentinel_round_trips_to_9999() {
        assert_eq!(packed_date_to_time(NO_WELL_DEFINED_EXPIRATION), u32::MAX);
    }

    #[test]
    fn known_date_packs_as_expected() {
        // 2000-01-02T00:00:01 is exactly one day and one second past epoch.
        let packed = pack_seconds(2000, 1, 2, 0, 0, 1);
        assert_eq!(packed, SECONDS_PER_DAY + 1);
        assert_eq!(unpack_seconds(packed), (2000, 1, 2, 0, 0, 1));
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_seconds_round_trip(
            year in 2000u16..2133,
            month in 1u8..=12,
            day in 1u8..=31,
            hour in 0u8..24,
            minute in 0u8..60,
            second in 0u8..60,
        ) {
            let packed = pack_seconds(year, month, day, hour, minute, second);
            prop_assert_eq!(unpack_seconds(packed), (year, month, day, hour, minute, second));
        }

        #[test]
        fn prop_pack_unpack_date_round_trip(
            year in 2000u16..2133,
            month in 1u8..=12,
            day in 1u8..=31,
        ) {
            let packed = pack_date(year, month, day);
            prop_assert_eq!(unpack_date(packed), (year, month, day));
        }
    }
}
