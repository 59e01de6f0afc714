//! Calendar date conversions using O(1) algorithms
//!
//! Implements Howard Hinnant's civil_from_days and days_from_civil algorithms.
//! Reference: http://howardhinnant.github.io/date_algorithms.html
//!
//! Valid for all dates in the proleptic Gregorian calendar, including dates
//! before 1970 (negative day counts).

/// Days between 0000-03-01 and 1970-01-01
const EPOCH_SHIFT: i64 = 719_468;

/// Days in a 400-year era
const DAYS_PER_ERA: i64 = 146_097;

/// Check if year is a leap year (Gregorian calendar)
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Convert days since Unix epoch to civil date (year, month, day)
pub fn civil_from_days(days_since_epoch: i64) -> (i32, u8, u8) {
    // Shift epoch to 0000-03-01 so the leap day lands at the end of the year
    let z = days_since_epoch + EPOCH_SHIFT;

    let era = (if z >= 0 { z } else { z - (DAYS_PER_ERA - 1) }) / DAYS_PER_ERA;
    let doe = (z - era * DAYS_PER_ERA) as u32; // day of era [0, 146096]

    // year of era [0, 399]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;

    // day of year [0, 365], counted from March 1
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);

    // month [0, 11] where 0 = March
    let mp = (5 * doy + 2) / 153;

    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;

    let year = if m <= 2 { y + 1 } else { y };

    (year as i32, m, d)
}

/// Convert civil date (year, month, day) to days since Unix epoch
pub fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = year as i64;
    let m = month as i64;
    let d = day as i64;

    // March = month 0, February = month 11
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400; // [0, 399]
    let doy = (153 * m + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]

    era * DAYS_PER_ERA + doe - EPOCH_SHIFT
}

/// Day of week for a day count since Unix epoch, 0 = Sunday
pub fn weekday_from_days(days_since_epoch: i64) -> u8 {
    // 1970-01-01 was a Thursday
    (days_since_epoch + 4).rem_euclid(7) as u8
}
