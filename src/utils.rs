//! Utility date equations for the calendrical engine.
//!
//! These are the epoch-day equations everything else is built on. The
//! conversions between Gregorian dates and epoch days must match the
//! reference floor-based epoch-day algorithm bit-exactly; the time zone and
//! limit computations depend on it.

pub(crate) const MS_PER_HOUR: i64 = 3_600_000;
pub(crate) const MS_PER_MINUTE: i64 = 60_000;

// ==== Epoch day equations ====

/// Returns the number of days since the Unix epoch for a proleptic Gregorian
/// date.
///
/// Functionally the same as Date's abstract operation `MakeDay`. `month` is
/// 1-indexed; a `month` of 0 is accepted and denotes December of the
/// preceding year, which lets [`iso_date_to_epoch_days`] carry euclidean
/// month remainders straight through.
pub(crate) fn epoch_days_from_gregorian_date(year: i32, month: u8, day: u8) -> i64 {
    let year = i64::from(year);
    let month = i64::from(month);
    let day = i64::from(day);

    // Shift to a March-based year so the leap day lands at the end.
    let shifted_year = if month <= 2 { year - 1 } else { year };
    let era = shifted_year.div_euclid(400);
    let year_of_era = shifted_year.rem_euclid(400);
    let shifted_month = (month + 9).rem_euclid(12);
    let day_of_year = (153 * shifted_month + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;

    era * 146_097 + day_of_era - 719_468
}

/// Converts epoch milliseconds into `(year, month, day)` Gregorian fields.
///
/// The inverse of [`epoch_days_from_gregorian_date`] composed with
/// [`epoch_days_to_epoch_ms`].
pub(crate) fn ymd_from_epoch_milliseconds(epoch_milliseconds: i64) -> (i32, u8, u8) {
    let epoch_days = epoch_milliseconds.div_euclid(i64::from(crate::MS_PER_DAY));

    let shifted = epoch_days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);

    (year as i32, month as u8, day as u8)
}

/// Functionally the same as Date's abstract operation `MakeDate`.
pub(crate) fn epoch_days_to_epoch_ms(day: i64, time: i64) -> i64 {
    day * i64::from(crate::MS_PER_DAY) + time
}

// ==== Calendar equations ====

/// The Gregorian leap year rule.
pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns 365 or 366 for the given year.
pub(crate) fn mathematical_days_in_year(year: i32) -> i32 {
    365 + i32::from(is_leap_year(year))
}

/// 12.2.31 `ISODaysInMonth ( year, month )`
pub(crate) fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => 28 + u8::from(is_leap_year(year)),
        _ => unreachable!("ISODaysInMonth panicking is an implementation error."),
    }
}

/// Returns the ISO day of week, Monday = 1 through Sunday = 7.
pub(crate) fn iso_day_of_week(epoch_days: i64) -> u16 {
    // 1970-01-01 was a Thursday.
    ((epoch_days + 3).rem_euclid(7) + 1) as u16
}

/// Returns the 1-based ordinal day of the year.
pub(crate) fn iso_day_of_year(year: i32, month: u8, day: u8) -> u16 {
    (epoch_days_from_gregorian_date(year, month, day)
        - epoch_days_from_gregorian_date(year, 1, 1)
        + 1) as u16
}

/// Returns the number of ISO weeks in a year: 52, or 53 when January 1st is
/// a Thursday (or a Wednesday of a leap year).
fn iso_weeks_in_year(year: i32) -> u8 {
    let jan_first_dow = iso_day_of_week(epoch_days_from_gregorian_date(year, 1, 1));
    if jan_first_dow == 4 || (jan_first_dow == 3 && is_leap_year(year)) {
        53
    } else {
        52
    }
}

/// Returns the ISO week-numbering `(week, year)` pair of a date.
///
/// Week 1 is the week containing January 4th; weeks run Monday through
/// Sunday, so the first and last days of a year can belong to the adjacent
/// week year.
pub(crate) fn iso_week_of_year(year: i32, month: u8, day: u8) -> (u8, i32) {
    let day_of_year = i64::from(iso_day_of_year(year, month, day));
    let day_of_week = i64::from(iso_day_of_week(epoch_days_from_gregorian_date(
        year, month, day,
    )));

    let week = (day_of_year + 10 - day_of_week).div_euclid(7);
    if week < 1 {
        return (iso_weeks_in_year(year - 1), year - 1);
    }
    if week > i64::from(iso_weeks_in_year(year)) {
        return (1, year + 1);
    }
    (week as u8, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_reference_points() {
        assert_eq!(epoch_days_from_gregorian_date(1970, 1, 1), 0);
        assert_eq!(epoch_days_from_gregorian_date(1969, 12, 31), -1);
        assert_eq!(epoch_days_from_gregorian_date(1970, 1, 2), 1);
        assert_eq!(epoch_days_from_gregorian_date(2000, 3, 1), 11_017);
        assert_eq!(epoch_days_from_gregorian_date(0, 1, 1), -719_528);
    }

    #[test]
    fn epoch_day_limit_points() {
        const MAX_DAYS_BASE: i64 = 100_000_000;
        assert_eq!(
            epoch_days_from_gregorian_date(-271_821, 4, 20).abs(),
            MAX_DAYS_BASE
        );
        assert_eq!(
            epoch_days_from_gregorian_date(-271_821, 4, 19).abs(),
            MAX_DAYS_BASE + 1
        );
        assert_eq!(
            epoch_days_from_gregorian_date(275_760, 9, 13).abs(),
            MAX_DAYS_BASE
        );
        assert_eq!(
            epoch_days_from_gregorian_date(275_760, 9, 14).abs(),
            MAX_DAYS_BASE + 1
        );
    }

    #[test]
    fn round_trips_through_epoch_milliseconds() {
        let cases = [
            (1970, 1, 1),
            (1969, 12, 31),
            (2020, 2, 29),
            (2021, 3, 1),
            (-271_821, 4, 20),
            (275_760, 9, 13),
            (1600, 2, 29),
            (1900, 2, 28),
        ];
        for (year, month, day) in cases {
            let days = epoch_days_from_gregorian_date(year, month, day);
            let ms = epoch_days_to_epoch_ms(days, 0);
            assert_eq!(
                ymd_from_epoch_milliseconds(ms),
                (year, month, day),
                "round trip failed for {year}-{month}-{day}"
            );
        }
    }

    #[test]
    fn month_zero_is_prior_december() {
        assert_eq!(
            epoch_days_from_gregorian_date(1970, 0, 31),
            epoch_days_from_gregorian_date(1969, 12, 31)
        );
    }

    #[test]
    fn leap_year_rule() {
        assert!(is_leap_year(2020));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2021));
        assert_eq!(iso_days_in_month(2020, 2), 29);
        assert_eq!(iso_days_in_month(2021, 2), 28);
        assert_eq!(mathematical_days_in_year(2400), 366);
    }

    #[test]
    fn day_of_week_reference_points() {
        // 1970-01-01: Thursday
        assert_eq!(iso_day_of_week(0), 4);
        // 2024-01-01: Monday
        assert_eq!(
            iso_day_of_week(epoch_days_from_gregorian_date(2024, 1, 1)),
            1
        );
        // 2023-12-31: Sunday
        assert_eq!(
            iso_day_of_week(epoch_days_from_gregorian_date(2023, 12, 31)),
            7
        );
    }

    #[test]
    fn week_of_year_reference_points() {
        // 2020-01-01 was a Wednesday of week 1.
        assert_eq!(iso_week_of_year(2020, 1, 1), (1, 2020));
        // 2021-01-01 was a Friday, still in week 53 of 2020.
        assert_eq!(iso_week_of_year(2021, 1, 1), (53, 2020));
        // 2019-12-30, a Monday, opens week 1 of 2020.
        assert_eq!(iso_week_of_year(2019, 12, 30), (1, 2020));
        // 2016-01-03, a Sunday, closes week 53 of 2015.
        assert_eq!(iso_week_of_year(2016, 1, 3), (53, 2015));
        // An unremarkable mid-year day.
        assert_eq!(iso_week_of_year(2021, 7, 16), (28, 2021));
    }

    #[test]
    fn day_of_year_reference_points() {
        assert_eq!(iso_day_of_year(2021, 1, 1), 1);
        assert_eq!(iso_day_of_year(2021, 12, 31), 365);
        assert_eq!(iso_day_of_year(2020, 12, 31), 366);
        assert_eq!(iso_day_of_year(2020, 3, 1), 61);
    }
}
