//! strftime-style formatting of [`LocalTime`]
//!
//! Supports the conversions embedded applications actually use. Unknown
//! conversions are copied to the output unchanged.

use core::fmt::{self, Write};

use heapless::String;

use super::LocalTime;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn weekday_name(time: &LocalTime) -> &'static str {
    WEEKDAYS.get(time.weekday as usize).copied().unwrap_or("?")
}

fn month_name(time: &LocalTime) -> &'static str {
    MONTHS
        .get((time.month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

fn abbreviated(name: &'static str) -> &'static str {
    name.get(..3).unwrap_or(name)
}

fn push<const N: usize>(out: &mut String<N>, c: char) -> fmt::Result {
    out.push(c).map_err(|_| fmt::Error)
}

/// Append `time` rendered with `format` to `out`
///
/// Fails when `out` runs out of capacity.
pub fn format_into<const N: usize>(
    time: &LocalTime,
    format: &str,
    out: &mut String<N>,
) -> fmt::Result {
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            push(out, c)?;
            continue;
        }

        match chars.next() {
            Some('Y') => write!(out, "{}", time.year)?,
            Some('y') => write!(out, "{:02}", time.year.rem_euclid(100))?,
            Some('C') => write!(out, "{:02}", time.year.div_euclid(100))?,
            Some('m') => write!(out, "{:02}", time.month)?,
            Some('d') => write!(out, "{:02}", time.day)?,
            Some('e') => write!(out, "{:2}", time.day)?,
            Some('H') => write!(out, "{:02}", time.hour)?,
            Some('I') => write!(out, "{:02}", time.hour12())?,
            Some('M') => write!(out, "{:02}", time.minute)?,
            Some('S') => write!(out, "{:02}", time.second)?,
            Some('p') => out.write_str(if time.hour < 12 { "AM" } else { "PM" })?,
            Some('A') => out.write_str(weekday_name(time))?,
            Some('a') => out.write_str(abbreviated(weekday_name(time)))?,
            Some('B') => out.write_str(month_name(time))?,
            Some('b') | Some('h') => out.write_str(abbreviated(month_name(time)))?,
            Some('j') => write!(out, "{:03}", time.year_day + 1)?,
            Some('u') => write!(out, "{}", if time.weekday == 0 { 7 } else { time.weekday })?,
            Some('w') => write!(out, "{}", time.weekday)?,
            Some('F') => write!(out, "{:04}-{:02}-{:02}", time.year, time.month, time.day)?,
            Some('T') => write!(out, "{:02}:{:02}:{:02}", time.hour, time.minute, time.second)?,
            Some('R') => write!(out, "{:02}:{:02}", time.hour, time.minute)?,
            Some('D') => write!(
                out,
                "{:02}/{:02}/{:02}",
                time.month,
                time.day,
                time.year.rem_euclid(100)
            )?,
            Some('n') => push(out, '\n')?,
            Some('t') => push(out, '\t')?,
            Some('%') => push(out, '%')?,
            Some(other) => {
                push(out, '%')?;
                push(out, other)?;
            }
            None => push(out, '%')?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocalTime {
        // 2024-03-09 14:05:07 UTC, a Saturday
        LocalTime::from_unix(1_709_993_107, 0)
    }

    fn render(format: &str) -> String<64> {
        let mut out = String::new();
        format_into(&sample(), format, &mut out).unwrap();
        out
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(render("%Y-%m-%d %H:%M:%S").as_str(), "2024-03-09 14:05:07");
        assert_eq!(render("%F %T").as_str(), "2024-03-09 14:05:07");
        assert_eq!(render("%D %R").as_str(), "03/09/24 14:05");
        assert_eq!(render("%j").as_str(), "069");
        assert_eq!(render("%I %p").as_str(), "02 PM");
        assert_eq!(render("%e").as_str(), " 9");
    }

    #[test]
    fn test_names() {
        assert_eq!(
            render("%A, %B %d %Y %H:%M:%S").as_str(),
            "Saturday, March 09 2024 14:05:07"
        );
        assert_eq!(render("%a %b").as_str(), "Sat Mar");
        assert_eq!(render("%u %w").as_str(), "6 6");
    }

    #[test]
    fn test_literals_and_unknown_conversions() {
        assert_eq!(render("100%% at %H").as_str(), "100% at 14");
        assert_eq!(render("%Q").as_str(), "%Q");
        assert_eq!(render("trailing %").as_str(), "trailing %");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut out: String<8> = String::new();
        assert!(format_into(&sample(), "%A, %B %d %Y", &mut out).is_err());
    }
}
