//! Broadcast date/time decoding.
//!
//! EIT start times are 40-bit fields: a 16-bit Modified Julian Date followed
//! by hour, minute and second as BCD byte pairs, expressed in Japan Standard
//! Time. Durations are 24-bit BCD hh:mm:ss. All results are milliseconds.

/// MJD of 1970-01-01.
pub const MJD_UNIX_EPOCH: i64 = 40587;

/// Broadcast local time offset from UTC in hours (JST).
pub const BROADCAST_UTC_OFFSET_HOURS: i64 = 9;

/// Start time value meaning "undefined" (all bits set).
pub const UNKNOWN_START_TIME: [u8; 5] = [0xFF; 5];

/// Duration value meaning "undefined" (all bits set).
pub const UNKNOWN_DURATION: [u8; 3] = [0xFF; 3];

/// Placeholder duration in milliseconds used in place of an undefined one.
pub const UNKNOWN_DURATION_PLACEHOLDER_MS: i64 = 1;

/// Decode one BCD byte (two decimal digits).
pub fn bcd_to_u8(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Whether the start time field is the "undefined" sentinel.
pub fn is_unknown_start_time(start_time: &[u8; 5]) -> bool {
    *start_time == UNKNOWN_START_TIME
}

/// Whether the duration field is the "undefined" sentinel.
pub fn is_unknown_duration(duration: &[u8; 3]) -> bool {
    *duration == UNKNOWN_DURATION
}

/// Convert MJD + local broadcast time of day to epoch milliseconds.
fn mjd_time_to_epoch_ms(mjd: u16, hour: u8, minute: u8, second: u8) -> i64 {
    ((mjd as i64 - MJD_UNIX_EPOCH) * 86_400
        + (hour as i64 - BROADCAST_UTC_OFFSET_HOURS) * 3_600
        + minute as i64 * 60
        + second as i64)
        * 1_000
}

/// Decode a 40-bit start time field into epoch milliseconds.
///
/// Returns `None` for the "undefined" sentinel.
pub fn decode_start_time(start_time: &[u8; 5]) -> Option<i64> {
    if is_unknown_start_time(start_time) {
        return None;
    }
    let mjd = u16::from_be_bytes([start_time[0], start_time[1]]);
    Some(mjd_time_to_epoch_ms(
        mjd,
        bcd_to_u8(start_time[2]),
        bcd_to_u8(start_time[3]),
        bcd_to_u8(start_time[4]),
    ))
}

/// Decode a bare 16-bit MJD date, taken as local midnight.
pub fn decode_mjd_date(mjd: u16) -> i64 {
    mjd_time_to_epoch_ms(mjd, 0, 0, 0)
}

/// Decode a 24-bit BCD duration into milliseconds.
///
/// Returns `None` for the "undefined" sentinel.
pub fn decode_duration(duration: &[u8; 3]) -> Option<i64> {
    if is_unknown_duration(duration) {
        return None;
    }
    let seconds = bcd_to_u8(duration[0]) as i64 * 3_600
        + bcd_to_u8(duration[1]) as i64 * 60
        + bcd_to_u8(duration[2]) as i64;
    Some(seconds * 1_000)
}

/// Decode a duration, substituting `placeholder_ms` for an undefined one.
pub fn decode_duration_or(duration: &[u8; 3], placeholder_ms: i64) -> i64 {
    decode_duration(duration).unwrap_or(placeholder_ms)
}
