//! Spreadsheet date serials (1900 date system).
//!
//! Serial 1 is 1900-01-01. The 1900 system also counts a 1900-02-29 that
//! never existed (serial 60), so every serial from 61 onward is one day
//! ahead of a plain day count from 1899-12-31.

use chrono::{Datelike, Duration, NaiveDate};

/// Largest serial a spreadsheet accepts (9999-12-31).
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Serial of the phantom 1900-02-29.
const PHANTOM_LEAP_DAY: i64 = 60;

fn epoch_before_leap_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or_default()
}

fn epoch_after_leap_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Convert a serial to a calendar date. The fractional part (time of day) is
/// dropped. Serial 60 resolves to 1900-02-28.
///
/// Returns `None` for serials below 1, above [`MAX_SERIAL`], or non-finite.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_SERIAL + 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    match days {
        d if d < PHANTOM_LEAP_DAY => epoch_before_leap_day().checked_add_signed(Duration::days(d)),
        PHANTOM_LEAP_DAY => NaiveDate::from_ymd_opt(1900, 2, 28),
        d => epoch_after_leap_day().checked_add_signed(Duration::days(d)),
    }
}

/// Convert a calendar date to its serial. Inverse of [`serial_to_date`] for
/// every date from 1900-01-01 on.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let leap_day_passed = date.year() > 1900 || (date.year() == 1900 && date.month() > 2);
    let epoch = if leap_day_passed {
        epoch_after_leap_day()
    } else {
        epoch_before_leap_day()
    };
    (date - epoch).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn known_serials() {
        assert_eq!(serial_to_date(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(serial_to_date(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(serial_to_date(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(serial_to_date(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(serial_to_date(MAX_SERIAL), Some(ymd(9999, 12, 31)));
    }

    #[test]
    fn phantom_leap_day_collapses_to_feb_28() {
        assert_eq!(serial_to_date(60.0), Some(ymd(1900, 2, 28)));
    }

    #[test]
    fn time_of_day_is_dropped() {
        assert_eq!(serial_to_date(45292.75), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(-3.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
        assert_eq!(serial_to_date(f64::INFINITY), None);
        assert_eq!(serial_to_date(MAX_SERIAL + 1.0), None);
    }

    #[test]
    fn date_to_serial_inverts() {
        for serial in [1.0, 2.0, 59.0, 61.0, 366.0, 36526.0, 45292.0, 46312.0] {
            let date = serial_to_date(serial).unwrap();
            assert_eq!(date_to_serial(date), serial, "serial {serial}");
        }
    }
}
