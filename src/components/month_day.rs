//! The `PlainMonthDay` component: a month and day with no year.

use core::str::FromStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode, MONTH_DAY_REFERENCE_YEAR},
        PartialDate, PlainDate,
    },
    iso::IsoDate,
    options::{DisplayCalendar, Overflow},
    parsers::{self, FormattableCalendar, FormattableDate, FormattableMonthDay},
    TemporalError, TemporalResult,
};

/// The native Rust implementation of a Temporal plain month-day.
///
/// The underlying ISO record is anchored at the ISO reference year 1972, the
/// first leap year after the epoch.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainMonthDay {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

impl PlainMonthDay {
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a new `PlainMonthDay`, applying the overflow policy against
    /// the reference year.
    pub fn new_with_overflow(
        month: u8,
        day: u8,
        calendar: Calendar,
        overflow: Overflow,
        reference_year: Option<i32>,
    ) -> TemporalResult<Self> {
        let year = reference_year.unwrap_or(MONTH_DAY_REFERENCE_YEAR);
        let iso = IsoDate::regulate(year, month, day, overflow)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainMonthDay` from a [`PartialDate`].
    pub fn from_partial(
        partial: PartialDate,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let overflow = overflow.unwrap_or_default();
        let iso = partial.calendar.month_day_from_partial(&partial, overflow)?;
        Ok(Self::new_unchecked(iso, partial.calendar))
    }

    /// Creates a `PlainMonthDay` from a raw [`crate::fields::FieldBag`],
    /// applying the fixed-order field preparation.
    pub fn from_field_bag(
        calendar: Calendar,
        bag: &crate::fields::FieldBag,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        use crate::fields::FieldMap;
        let prepared = crate::fields::prepare_calendar_fields(
            calendar,
            bag,
            FieldMap::DATE,
            FieldMap::DAY,
            false,
        )?;
        Self::from_partial(prepared.date, overflow)
    }

    /// Creates a new `PlainMonthDay` from this one, overriding the provided
    /// fields.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialDate cannot be empty."));
        }
        let mut merged = partial;
        merged.calendar = self.calendar;
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(self.month_code()?);
        }
        if merged.day.is_none() {
            merged.day = Some(self.iso.day);
        }
        Self::from_partial(merged, overflow)
    }

    /// Returns this month-day's [`Calendar`].
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Returns the ISO reference year this month-day is anchored at.
    #[inline]
    #[must_use]
    pub const fn iso_year(&self) -> i32 {
        self.iso.year
    }

    /// Returns this month-day's ISO month value.
    #[inline]
    #[must_use]
    pub const fn iso_month(&self) -> u8 {
        self.iso.month
    }

    /// Returns this month-day's ISO day value.
    #[inline]
    #[must_use]
    pub const fn iso_day(&self) -> u8 {
        self.iso.day
    }

    pub fn month_code(&self) -> TemporalResult<MonthCode> {
        self.calendar.month_code(&self.iso)
    }

    pub fn day(&self) -> TemporalResult<u8> {
        self.calendar.day(&self.iso)
    }

    /// Converts this month-day to a [`PlainDate`], taking the year from the
    /// provided partial.
    pub fn to_plain_date(&self, year_fields: Option<PartialDate>) -> TemporalResult<PlainDate> {
        let Some(year) = year_fields.and_then(|fields| fields.year) else {
            return Err(
                TemporalError::r#type().with_message("year is required to create a PlainDate.")
            );
        };
        PlainDate::from_partial(
            PartialDate::new()
                .with_year(Some(year))
                .with_month_code(Some(self.month_code()?))
                .with_day(Some(self.day()?))
                .with_calendar(self.calendar),
            None,
        )
    }

    /// Renders this month-day as an IXDTF string.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        FormattableMonthDay {
            date: FormattableDate(self.iso.year, self.iso.month, self.iso.day),
            calendar: FormattableCalendar {
                show: display_calendar,
                calendar: self.calendar.identifier(),
            },
        }
        .to_string()
    }
}

impl core::fmt::Display for PlainMonthDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl FromStr for PlainMonthDay {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parsers::parse_month_day(s.as_bytes())?;
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();
        let date = record
            .date
            .ok_or_else(|| TemporalError::range().with_message("No date found in string."))?;
        Self::new_with_overflow(date.month, date.day, calendar, Overflow::Reject, None)
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::PlainMonthDay;
    use crate::components::PartialDate;

    #[test]
    fn reference_year_is_a_leap_year() {
        // February 29th must be representable without a year.
        let leap_day = PlainMonthDay::from_str("02-29").unwrap();
        assert_eq!(leap_day.iso_year(), 1972);
        assert_eq!(leap_day.iso_month(), 2);
        assert_eq!(leap_day.iso_day(), 29);
    }

    #[test]
    fn to_plain_date_requires_year() {
        let month_day = PlainMonthDay::from_str("03-15").unwrap();
        assert!(month_day.to_plain_date(None).is_err());
        let date = month_day
            .to_plain_date(Some(PartialDate::new().with_year(Some(2024))))
            .unwrap();
        assert_eq!(date.iso_year(), 2024);
        assert_eq!(date.iso_month(), 3);
        assert_eq!(date.iso_day(), 15);
    }

    #[test]
    fn formats_without_reference_year() {
        let month_day = PlainMonthDay::from_str("12-25").unwrap();
        assert_eq!(month_day.to_string(), "12-25");
    }
}
