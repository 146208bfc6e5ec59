//! The `PlainYearMonth` component: a calendar month of a specific year.

use core::cmp::Ordering;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode},
        duration::normalized::NormalizedDurationRecord,
        timezone::TimeZone,
        Duration, PartialDate, PlainDate, PlainDateTime,
    },
    error::ErrorMessage,
    iso::{year_month_within_limits, IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, FormattableCalendar, FormattableDate, FormattableYearMonth},
    provider::NeverProvider,
    utils, TemporalError, TemporalResult,
};

/// The native Rust implementation of a Temporal plain year-month.
///
/// The underlying ISO record is anchored at a reference day of 1.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainYearMonth {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

impl PlainYearMonth {
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a new `PlainYearMonth`, applying the overflow policy and the
    /// year-month limits.
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        reference_day: Option<u8>,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let day = reference_day.unwrap_or(1);
        let iso = IsoDate::regulate(year, month, day, overflow)?;
        if !year_month_within_limits(iso.year, iso.month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::YearMonthOutOfRange));
        }
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainYearMonth` from a [`PartialDate`].
    pub fn from_partial(
        partial: PartialDate,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        // The reference day is always 1; a provided day is ignored.
        let partial = partial.with_day(None);
        let overflow = overflow.unwrap_or_default();
        let iso = partial.calendar.year_month_from_partial(&partial, overflow)?;
        if !year_month_within_limits(iso.year, iso.month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::YearMonthOutOfRange));
        }
        Ok(Self::new_unchecked(iso, partial.calendar))
    }

    /// Creates a `PlainYearMonth` from a raw [`crate::fields::FieldBag`],
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
            FieldMap::DATE.difference(FieldMap::DAY),
            FieldMap::YEAR,
            false,
        )?;
        Self::from_partial(prepared.date, overflow)
    }

    /// Returns this year-month's [`Calendar`].
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Returns this year-month's ISO year value.
    #[inline]
    #[must_use]
    pub const fn iso_year(&self) -> i32 {
        self.iso.year
    }

    /// Returns this year-month's ISO month value.
    #[inline]
    #[must_use]
    pub const fn iso_month(&self) -> u8 {
        self.iso.month
    }

    pub fn era(&self) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        self.calendar.era(&self.iso)
    }

    pub fn era_year(&self) -> TemporalResult<Option<i32>> {
        self.calendar.era_year(&self.iso)
    }

    pub fn year(&self) -> TemporalResult<i32> {
        self.calendar.year(&self.iso)
    }

    pub fn month(&self) -> TemporalResult<u8> {
        self.calendar.month(&self.iso)
    }

    pub fn month_code(&self) -> TemporalResult<MonthCode> {
        self.calendar.month_code(&self.iso)
    }

    pub fn days_in_month(&self) -> TemporalResult<u16> {
        self.calendar.days_in_month(&self.iso)
    }

    pub fn days_in_year(&self) -> TemporalResult<u16> {
        self.calendar.days_in_year(&self.iso)
    }

    pub fn months_in_year(&self) -> TemporalResult<u16> {
        self.calendar.months_in_year(&self.iso)
    }

    pub fn in_leap_year(&self) -> TemporalResult<bool> {
        self.calendar.in_leap_year(&self.iso)
    }

    /// Creates a new `PlainYearMonth` from this one, overriding the
    /// provided fields.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialDate cannot be empty."));
        }
        let mut merged = partial.with_day(None);
        merged.calendar = self.calendar;
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(self.month_code()?);
        }
        if merged.year.is_none() && (merged.era.is_none() || merged.era_year.is_none()) {
            merged.year = Some(self.year()?);
        }
        Self::from_partial(merged, overflow)
    }

    /// `AddDurationToYearMonth`
    ///
    /// A negative duration is anchored at the end of the month so that
    /// subtracting from a month lands in the expected earlier month.
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        let overflow = overflow.unwrap_or_default();
        let date_duration = duration.to_date_duration_record_without_time()?;

        // 10-13. Anchor at the first day, or the last for negative durations.
        let day = if duration.sign() == crate::Sign::Negative {
            utils::iso_days_in_month(self.iso.year, self.iso.month)
        } else {
            1
        };
        let anchor = IsoDate::new_unchecked(self.iso.year, self.iso.month, day);

        // 14. Let addedDate be ? CalendarDateAdd(calendar, date, durationToAdd, overflow).
        let added = self.calendar.date_add(&anchor, &date_duration, overflow)?;

        // 15. Return ! CalendarYearMonthFromFields(addedDate fields).
        Self::new_with_overflow(added.iso.year, added.iso.month, None, self.calendar, overflow)
    }

    /// Subtracts a `Duration` from this year-month.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.add(&duration.negated(), overflow)
    }

    /// Returns the duration from this year-month until `other`, in years
    /// and/or months.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Until, other, settings)
    }

    /// Returns the duration since `other` to this year-month.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Since, other, settings)
    }

    fn diff_internal(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }

        // Only year and month units are meaningful for a year-month.
        for unit in [settings.largest_unit, settings.smallest_unit]
            .into_iter()
            .flatten()
        {
            if !matches!(unit, Unit::Year | Unit::Month | Unit::Auto) {
                return Err(TemporalError::range().with_enum(ErrorMessage::UnitNotDate));
            }
        }

        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Date,
            Unit::Year,
            Unit::Month,
        )?;

        if self.iso.year == other.iso.year && self.iso.month == other.iso.month {
            return Ok(Duration::default());
        }

        let start = IsoDate::new_unchecked(self.iso.year, self.iso.month, 1);
        let end = IsoDate::new_unchecked(other.iso.year, other.iso.month, 1);
        let date_difference = self
            .calendar
            .date_until(&start, &end, resolved.largest_unit)?;

        let internal = NormalizedDurationRecord::from_date_duration(date_difference)?;
        let rounding_is_noop =
            resolved.smallest_unit == Unit::Month && resolved.increment.get() == 1;
        let result = if rounding_is_noop {
            Duration::from_normalized(internal, resolved.largest_unit)?
        } else {
            let dest_epoch_ns = end.as_nanoseconds().0;
            let anchor = PlainDateTime::new_unchecked(
                IsoDateTime::new_unchecked(start, IsoTime::default()),
                self.calendar,
            );
            internal
                .round_relative_duration(
                    dest_epoch_ns,
                    &anchor,
                    Option::<(&TimeZone, &NeverProvider)>::None,
                    resolved,
                )?
                .0
        };

        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }

    /// Compares the (year, month) records of two year-months.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        (self.iso.year, self.iso.month).cmp(&(other.iso.year, other.iso.month))
    }

    /// Converts this year-month to a [`PlainDate`], taking the day from the
    /// provided partial.
    pub fn to_plain_date(&self, day_fields: Option<PartialDate>) -> TemporalResult<PlainDate> {
        let Some(day) = day_fields.and_then(|fields| fields.day) else {
            return Err(
                TemporalError::r#type().with_message("day is required to create a PlainDate.")
            );
        };
        PlainDate::from_partial(
            PartialDate::new()
                .with_year(Some(self.calendar.year(&self.iso)?))
                .with_month_code(Some(self.month_code()?))
                .with_day(Some(day))
                .with_calendar(self.calendar),
            None,
        )
    }

    /// Renders this year-month as an IXDTF string.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        FormattableYearMonth {
            date: FormattableDate(self.iso.year, self.iso.month, self.iso.day),
            calendar: FormattableCalendar {
                show: display_calendar,
                calendar: self.calendar.identifier(),
            },
        }
        .to_string()
    }
}

impl core::fmt::Display for PlainYearMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl FromStr for PlainYearMonth {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parsers::parse_year_month(s.as_bytes())?;
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();
        let date = record
            .date
            .ok_or_else(|| TemporalError::range().with_message("No date found in string."))?;
        Self::new_with_overflow(date.year, date.month, None, calendar, Overflow::Reject)
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;
    use core::str::FromStr;

    use super::PlainYearMonth;
    use crate::components::Duration;
    use crate::options::{DifferenceSettings, Unit};

    #[test]
    fn add_anchors_negative_durations_at_month_end() {
        let year_month = PlainYearMonth::new_with_overflow(
            2024,
            3,
            None,
            Default::default(),
            Default::default(),
        )
        .unwrap();

        let forward = year_month
            .add(&Duration::from_str("P2M").unwrap(), None)
            .unwrap();
        assert_eq!((forward.iso_year(), forward.iso_month()), (2024, 5));

        let backward = year_month
            .subtract(&Duration::from_str("P1M").unwrap(), None)
            .unwrap();
        assert_eq!((backward.iso_year(), backward.iso_month()), (2024, 2));
    }

    #[test]
    fn until_in_years_and_months() {
        let start = PlainYearMonth::from_str("2020-01").unwrap();
        let end = PlainYearMonth::from_str("2021-03").unwrap();
        let result = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(result.years(), 1);
        assert_eq!(result.months(), 2);

        let months_only = start
            .until(
                &end,
                DifferenceSettings {
                    largest_unit: Some(Unit::Month),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(months_only.months(), 14);

        // Day units are not meaningful for year-months.
        assert!(start
            .until(
                &end,
                DifferenceSettings {
                    smallest_unit: Some(Unit::Day),
                    ..Default::default()
                },
            )
            .is_err());
    }

    #[test]
    fn compare_and_format() {
        let one = PlainYearMonth::from_str("2020-01").unwrap();
        let two = PlainYearMonth::from_str("2020-02").unwrap();
        assert_eq!(one.compare_iso(&two), Ordering::Less);
        assert_eq!(one.to_string(), "2020-01");
    }

    #[test]
    fn limits_are_enforced() {
        assert!(PlainYearMonth::from_str("-271821-03").is_err());
        assert!(PlainYearMonth::from_str("-271821-04").is_ok());
        assert!(PlainYearMonth::from_str("+275760-09").is_ok());
        assert!(PlainYearMonth::from_str("+275760-10").is_err());
    }
}
