//! The `PlainDate` component: a calendar date with no time or time zone.

use core::cmp::Ordering;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode},
        duration::normalized::NormalizedDurationRecord,
        duration::DateDuration,
        timezone::TimeZone,
        Duration, PlainDateTime, PlainMonthDay, PlainTime, PlainYearMonth,
    },
    fields::{prepare_calendar_fields, FieldBag, FieldMap},
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, IxdtfStringBuilder},
    provider::NeverProvider,
    TemporalError, TemporalResult,
};

/// A partial `PlainDate`: the intermediate form of `from`/`with` field
/// resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDate {
    /// A potentially present `year` field.
    pub year: Option<i32>,
    /// A potentially present `month` field.
    pub month: Option<u8>,
    /// A potentially present `monthCode` field.
    pub month_code: Option<MonthCode>,
    /// A potentially present `day` field.
    pub day: Option<u8>,
    /// A potentially present `era` field.
    pub era: Option<TinyAsciiStr<19>>,
    /// A potentially present `eraYear` field.
    pub era_year: Option<i32>,
    /// The calendar the fields resolve against.
    pub calendar: Calendar,
}

impl PartialDate {
    pub const fn new() -> Self {
        Self {
            year: None,
            month: None,
            month_code: None,
            day: None,
            era: None,
            era_year: None,
            calendar: Calendar::Iso,
        }
    }

    /// Returns whether every date field is absent.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.month_code.is_none()
            && self.day.is_none()
            && self.era.is_none()
            && self.era_year.is_none()
    }

    pub const fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub const fn with_month(mut self, month: Option<u8>) -> Self {
        self.month = month;
        self
    }

    pub const fn with_month_code(mut self, month_code: Option<MonthCode>) -> Self {
        self.month_code = month_code;
        self
    }

    pub const fn with_day(mut self, day: Option<u8>) -> Self {
        self.day = day;
        self
    }

    pub const fn with_era(mut self, era: Option<TinyAsciiStr<19>>) -> Self {
        self.era = era;
        self
    }

    pub const fn with_era_year(mut self, era_year: Option<i32>) -> Self {
        self.era_year = era_year;
        self
    }

    pub const fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Fills absent fields from an existing date, preserving the
    /// month/monthCode duality: a provided `month` suppresses the fallback
    /// `monthCode` and vice versa.
    pub(crate) fn with_fallback_date(&self, fallback: &PlainDate) -> TemporalResult<Self> {
        let mut merged = *self;
        merged.calendar = fallback.calendar;
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(fallback.month_code()?);
        }
        if merged.year.is_none() && (merged.era.is_none() || merged.era_year.is_none()) {
            merged.year = Some(fallback.calendar.year(&fallback.iso)?);
        }
        if merged.day.is_none() {
            merged.day = Some(fallback.calendar.day(&fallback.iso)?);
        }
        Ok(merged)
    }
}

/// The native Rust implementation of a Temporal plain date.
///
/// A `PlainDate` is an ISO date record paired with a calendar; the calendar
/// interprets the record's fields for every calendar-sensitive accessor.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDate {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

// ==== Private API ====

impl PlainDate {
    /// Creates a new `PlainDate` without validating the fields.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// `AddDurationToDate`
    pub(crate) fn add_duration_to_date(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        // 4. Let dateDuration be ToDateDurationRecordWithoutTime(duration).
        let date_duration = duration.to_date_duration_record_without_time()?;
        // 7. Let result be ? CalendarDateAdd(calendar, temporalDate.[[ISODate]], dateDuration, overflow).
        self.calendar
            .date_add(&self.iso, &date_duration, overflow.unwrap_or_default())
    }

    /// `DifferenceDate`
    pub(crate) fn internal_diff_date(
        &self,
        other: &Self,
        largest_unit: Unit,
    ) -> TemporalResult<DateDuration> {
        if self.iso == other.iso {
            return Ok(DateDuration::default());
        }

        if largest_unit == Unit::Day {
            let days = self.days_until(other);
            return DateDuration::new(0, 0, 0, days);
        }

        self.calendar.date_until(&self.iso, &other.iso, largest_unit)
    }

    /// `DifferenceTemporalPlainDate`
    pub(crate) fn diff_date(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 3. If CalendarEquals(temporalDate.[[Calendar]], other.[[Calendar]]) is false, throw a RangeError exception.
        if self.calendar != other.calendar {
            return Err(TemporalError::range()
                .with_enum(crate::error::ErrorMessage::CalendarMismatch));
        }

        // 5. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, DATE, « », "day", "day").
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Date,
            Unit::Day,
            Unit::Day,
        )?;

        // 6. If the dates are equal, return a zero duration.
        if self.iso == other.iso {
            return Ok(Duration::default());
        }

        // 9. Let dateDifference be ? DifferenceDate(calendarRec, temporalDate, other, settings.[[LargestUnit]]).
        let date_difference = self.internal_diff_date(other, resolved.largest_unit)?;
        let internal = NormalizedDurationRecord::from_date_duration(date_difference)?;

        // 11. If the rounding is a no-op, take the date difference as is.
        let rounding_is_noop = resolved.smallest_unit == Unit::Day && resolved.increment.get() == 1;
        let result = if rounding_is_noop {
            Duration::from_normalized(internal, Unit::Day)?
        } else {
            // 12. Round the difference relative to this date at midnight.
            let dest_epoch_ns = other.iso.as_nanoseconds().0;
            let anchor = PlainDateTime::new_unchecked(
                IsoDateTime::new_unchecked(self.iso, IsoTime::default()),
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

    /// `DaysUntil`: the exact epoch-day difference between two dates.
    #[inline]
    #[must_use]
    pub(crate) fn days_until(&self, other: &Self) -> i64 {
        other.iso.to_epoch_days() - self.iso.to_epoch_days()
    }
}

// ==== Public API ====

impl PlainDate {
    /// Creates a new `PlainDate`, constraining any out-of-range field.
    #[inline]
    pub fn new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, Overflow::Constrain)
    }

    /// Creates a new ISO `PlainDate`, constraining any out-of-range field.
    #[inline]
    pub fn new_iso(year: i32, month: u8, day: u8) -> TemporalResult<Self> {
        Self::new(year, month, day, Calendar::default())
    }

    /// Creates a new `PlainDate`, rejecting any out-of-range field.
    #[inline]
    pub fn try_new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, Overflow::Reject)
    }

    /// Creates a new ISO `PlainDate`, rejecting any out-of-range field.
    #[inline]
    pub fn try_new_iso(year: i32, month: u8, day: u8) -> TemporalResult<Self> {
        Self::try_new(year, month, day, Calendar::default())
    }

    /// Creates a new `PlainDate` with the provided overflow policy.
    ///
    /// This is the public face of `RegulateISODate`.
    #[inline]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let iso = IsoDate::new_with_overflow(year, month, day, overflow)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainDate` from a [`PartialDate`].
    #[inline]
    pub fn from_partial(partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        partial
            .calendar
            .date_from_partial(&partial, overflow.unwrap_or_default())
    }

    /// Creates a `PlainDate` from a raw [`FieldBag`], applying the
    /// fixed-order field preparation.
    pub fn from_field_bag(
        calendar: Calendar,
        bag: &FieldBag,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let prepared = prepare_calendar_fields(
            calendar,
            bag,
            FieldMap::DATE,
            FieldMap::DAY | FieldMap::YEAR,
            false,
        )?;
        Self::from_partial(prepared.date, overflow)
    }

    /// Creates a new `PlainDate` from this one, overriding the provided
    /// fields.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialDate cannot be empty."));
        }
        let merged = partial.with_fallback_date(self)?;
        Self::from_partial(merged, overflow)
    }

    /// Creates a new `PlainDate` with a different calendar, reinterpreting
    /// the same ISO date.
    pub fn with_calendar(&self, calendar: Calendar) -> TemporalResult<Self> {
        Ok(Self::new_unchecked(self.iso, calendar))
    }

    /// Returns this date's [`Calendar`].
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Returns this date's ISO year value.
    #[inline]
    #[must_use]
    pub const fn iso_year(&self) -> i32 {
        self.iso.year
    }

    /// Returns this date's ISO month value.
    #[inline]
    #[must_use]
    pub const fn iso_month(&self) -> u8 {
        self.iso.month
    }

    /// Returns this date's ISO day value.
    #[inline]
    #[must_use]
    pub const fn iso_day(&self) -> u8 {
        self.iso.day
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

    pub fn day(&self) -> TemporalResult<u8> {
        self.calendar.day(&self.iso)
    }

    pub fn day_of_week(&self) -> TemporalResult<u16> {
        self.calendar.day_of_week(&self.iso)
    }

    pub fn day_of_year(&self) -> TemporalResult<u16> {
        self.calendar.day_of_year(&self.iso)
    }

    pub fn week_of_year(&self) -> TemporalResult<Option<u8>> {
        self.calendar.week_of_year(&self.iso)
    }

    pub fn year_of_week(&self) -> TemporalResult<Option<i32>> {
        self.calendar.year_of_week(&self.iso)
    }

    pub fn days_in_week(&self) -> TemporalResult<u16> {
        self.calendar.days_in_week(&self.iso)
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

    /// Adds a `Duration` to this date.
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.add_duration_to_date(duration, overflow)
    }

    /// Subtracts a `Duration` from this date.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.add_duration_to_date(&duration.negated(), overflow)
    }

    /// Returns the duration from this date until `other`.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Until, other, settings)
    }

    /// Returns the duration since `other` to this date.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Since, other, settings)
    }

    /// Compares the ISO date records of two dates, ignoring calendars.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Converts this date to a [`PlainDateTime`], defaulting to midnight.
    pub fn to_plain_date_time(&self, time: Option<PlainTime>) -> TemporalResult<PlainDateTime> {
        PlainDateTime::from_date_and_time(*self, time.unwrap_or_default())
    }

    /// Converts this date to a [`PlainYearMonth`].
    pub fn to_plain_year_month(&self) -> TemporalResult<PlainYearMonth> {
        PlainYearMonth::from_partial(
            PartialDate::new()
                .with_year(Some(self.calendar.year(&self.iso)?))
                .with_month_code(Some(self.month_code()?))
                .with_calendar(self.calendar),
            None,
        )
    }

    /// Converts this date to a [`PlainMonthDay`].
    pub fn to_plain_month_day(&self) -> TemporalResult<PlainMonthDay> {
        PlainMonthDay::from_partial(
            PartialDate::new()
                .with_month_code(Some(self.month_code()?))
                .with_day(Some(self.day()?))
                .with_calendar(self.calendar),
            None,
        )
    }

    /// Renders this date as an IXDTF string.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        IxdtfStringBuilder::default()
            .with_date(self.iso.year, self.iso.month, self.iso.day)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build()
    }
}

impl core::fmt::Display for PlainDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl FromStr for PlainDate {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parsers::parse_date_time(s.as_bytes())?;
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();
        let date = record
            .date
            .ok_or_else(|| TemporalError::range().with_message("No date found in string."))?;
        Self::try_new(date.year, date.month, date.day, calendar)
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;
    use core::str::FromStr;

    use super::{PartialDate, PlainDate};
    use crate::components::Duration;
    use crate::options::{DifferenceSettings, Overflow, Unit};

    #[test]
    fn regulation_constrain_and_reject() {
        let constrained = PlainDate::new_iso(2021, 13, 45).unwrap();
        assert_eq!(constrained.iso_month(), 12);
        assert_eq!(constrained.iso_day(), 31);
        assert!(PlainDate::try_new_iso(2021, 13, 1).is_err());
        assert!(PlainDate::try_new_iso(2021, 2, 29).is_err());
        assert!(PlainDate::try_new_iso(2020, 2, 29).is_ok());
    }

    #[test]
    fn add_regulates_against_shifted_month_before_day_delta() {
        // Month arithmetic happens first: 2021-05-31 minus one month
        // constrains to 2021-04-30, and only then does the day step apply.
        // The result is 2021-04-29, not 2021-04-30.
        let date = PlainDate::try_new_iso(2021, 5, 31).unwrap();
        let duration = Duration::new(0, -1, 0, -1, 0, 0, 0, 0, 0, 0).unwrap();
        let result = date.add(&duration, Some(Overflow::Constrain)).unwrap();
        assert_eq!(result.iso_year(), 2021);
        assert_eq!(result.iso_month(), 4);
        assert_eq!(result.iso_day(), 29);
    }

    #[test]
    fn add_rejects_shifted_day_overflow() {
        let date = PlainDate::try_new_iso(2021, 1, 31).unwrap();
        let one_month = Duration::from_str("P1M").unwrap();
        let constrained = date.add(&one_month, Some(Overflow::Constrain)).unwrap();
        assert_eq!(constrained.iso_day(), 28);
        assert!(date.add(&one_month, Some(Overflow::Reject)).is_err());
    }

    #[test]
    fn month_end_difference_lands_on_month_boundary() {
        let start = PlainDate::try_new_iso(1970, 1, 31).unwrap();
        let end = PlainDate::try_new_iso(1970, 2, 28).unwrap();
        let result = start
            .until(
                &end,
                DifferenceSettings {
                    largest_unit: Some(Unit::Month),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.months(), 1);
        assert_eq!(result.days(), 0);
    }

    #[test]
    fn add_diff_round_trips_with_matching_largest_unit() {
        let start = PlainDate::try_new_iso(2019, 2, 28).unwrap();
        let duration = Duration::from_str("P1Y2M10D").unwrap();
        let end = start.add(&duration, Some(Overflow::Reject)).unwrap();
        let recovered = start
            .until(
                &end,
                DifferenceSettings {
                    largest_unit: Some(Unit::Year),
                    ..Default::default()
                },
            )
            .unwrap();
        let reapplied = start.add(&recovered, Some(Overflow::Reject)).unwrap();
        assert_eq!(reapplied, end);
    }

    #[test]
    fn date_until_largest_year_table() {
        // Format: (start, end, (years, months, weeks, days)).
        let tests = [
            ((2021, 7, 16), (2021, 7, 16), (0, 0, 0, 0)),
            ((2021, 7, 16), (2021, 7, 17), (0, 0, 0, 1)),
            ((2021, 7, 16), (2021, 8, 16), (0, 1, 0, 0)),
            ((2020, 12, 16), (2021, 1, 16), (0, 1, 0, 0)),
            ((2021, 1, 7), (2021, 3, 7), (0, 2, 0, 0)),
            ((2021, 7, 16), (2021, 8, 17), (0, 1, 0, 1)),
            ((2021, 7, 16), (2021, 8, 13), (0, 0, 0, 28)),
            ((2021, 7, 16), (2022, 7, 19), (1, 0, 0, 3)),
            ((2021, 7, 16), (2031, 12, 16), (10, 5, 0, 0)),
            ((1997, 12, 16), (2021, 7, 16), (23, 7, 0, 0)),
            ((1997, 7, 16), (2021, 7, 15), (23, 11, 0, 29)),
            ((1960, 2, 16), (2020, 3, 16), (60, 1, 0, 0)),
            ((2021, 3, 30), (2021, 7, 16), (0, 3, 0, 16)),
            ((2019, 12, 30), (2021, 7, 16), (1, 6, 0, 16)),
            ((1, 12, 25), (2021, 7, 16), (2019, 6, 0, 21)),
            ((2019, 12, 30), (2021, 3, 5), (1, 2, 0, 5)),
            ((2021, 7, 17), (2021, 7, 16), (0, 0, 0, -1)),
            ((2021, 8, 16), (2021, 7, 16), (0, -1, 0, 0)),
            ((2022, 7, 19), (2021, 7, 16), (-1, 0, 0, -3)),
            ((2031, 12, 16), (2021, 7, 16), (-10, -5, 0, 0)),
            ((2021, 7, 15), (1997, 7, 16), (-23, -11, 0, -30)),
            ((2021, 3, 15), (1960, 2, 16), (-61, 0, 0, -28)),
            ((2021, 7, 16), (2019, 12, 30), (-1, -6, 0, -17)),
            ((2021, 3, 5), (2019, 12, 30), (-1, -2, 0, -6)),
        ];

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Year),
            ..Default::default()
        };
        for ((y1, m1, d1), (y2, m2, d2), expected) in tests {
            let start = PlainDate::try_new_iso(y1, m1, d1).unwrap();
            let end = PlainDate::try_new_iso(y2, m2, d2).unwrap();
            let result = start.until(&end, settings).unwrap();
            assert_eq!(
                (
                    result.years(),
                    result.months(),
                    result.weeks(),
                    result.days()
                ),
                expected,
                "until failed for {start} -> {end}"
            );
        }
    }

    #[test]
    fn days_until_is_exact() {
        let start = PlainDate::try_new_iso(2020, 1, 1).unwrap();
        let end = PlainDate::try_new_iso(2021, 1, 1).unwrap();
        let result = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(result.days(), 366);
    }

    #[test]
    fn compare_is_lexicographic() {
        let one = PlainDate::try_new_iso(2000, 1, 1).unwrap();
        assert_eq!(one.compare_iso(&one), Ordering::Equal);
        let earlier = PlainDate::try_new_iso(1999, 12, 31).unwrap();
        assert_eq!(earlier.compare_iso(&one), Ordering::Less);
        assert_eq!(one.compare_iso(&earlier), Ordering::Greater);
    }

    #[test]
    fn with_preserves_unspecified_fields() {
        let date = PlainDate::try_new_iso(2024, 3, 31).unwrap();
        let with_month = date
            .with(
                PartialDate::new().with_month(Some(2)),
                Some(Overflow::Constrain),
            )
            .unwrap();
        assert_eq!(with_month.iso_month(), 2);
        assert_eq!(with_month.iso_day(), 29);
        assert!(date.with(PartialDate::default(), None).is_err());
    }

    #[test]
    fn parse_and_format() {
        let date = PlainDate::from_str("2024-03-15").unwrap();
        assert_eq!(date.iso_year(), 2024);
        assert_eq!(date.to_string(), "2024-03-15");

        let annotated = PlainDate::from_str("2024-03-15[u-ca=iso8601]").unwrap();
        assert_eq!(date, annotated);
        assert!(PlainDate::from_str("2024-03-15Z").is_err());
    }

    #[test]
    fn calendar_accessors() {
        let date = PlainDate::try_new_iso(2020, 2, 29).unwrap();
        assert_eq!(date.year().unwrap(), 2020);
        assert_eq!(date.month().unwrap(), 2);
        assert_eq!(date.month_code().unwrap().as_str(), "M02");
        assert_eq!(date.day().unwrap(), 29);
        // 2020-02-29 was a Saturday.
        assert_eq!(date.day_of_week().unwrap(), 6);
        assert_eq!(date.day_of_year().unwrap(), 60);
        assert_eq!(date.days_in_month().unwrap(), 29);
        assert_eq!(date.days_in_year().unwrap(), 366);
        assert!(date.in_leap_year().unwrap());
    }
}
