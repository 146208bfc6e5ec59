//! The `PlainDateTime` component: a calendar date combined with a wall-clock
//! time.

use core::cmp::Ordering;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode},
        timezone::TimeZone,
        Duration, PartialDate, PartialTime, PlainDate, PlainTime,
    },
    error::ErrorMessage,
    fields::{prepare_calendar_fields, FieldBag, FieldMap},
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, IxdtfStringBuilder},
    provider::NeverProvider,
    TemporalError, TemporalResult,
};

use super::instant::combined_subseconds;

/// A partial `PlainDateTime`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDateTime {
    /// The date fields.
    pub date: PartialDate,
    /// The time fields.
    pub time: PartialTime,
}

impl PartialDateTime {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.time.is_empty()
    }
}

/// The native Rust implementation of a Temporal plain date-time.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDateTime {
    pub(crate) iso: IsoDateTime,
    calendar: Calendar,
}

// ==== Private API ====

impl PlainDateTime {
    /// Creates a new `PlainDateTime` without validation.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDateTime, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// `AddDurationToDateTime`
    fn add_duration_to_date_time(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let result = self.iso.add_date_duration(
            self.calendar,
            &duration.date(),
            duration.to_normalized_time(),
            overflow.unwrap_or_default(),
        )?;
        // The combined result must satisfy the date-time limits.
        let validated = IsoDateTime::new(result.date, result.time)?;
        Ok(Self::new_unchecked(validated, self.calendar))
    }

    /// `DifferenceTemporalPlainDateTime`
    fn diff_internal(
        &self,
        op: DifferenceOperation,
        other: &Self,
        options: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }

        let resolved = ResolvedRoundingOptions::from_diff_settings(
            options,
            op,
            UnitGroup::DateTime,
            Unit::Day,
            Unit::Nanosecond,
        )?;

        if self.iso == other.iso {
            return Ok(Duration::default());
        }

        let internal = self.iso.diff(&other.iso, self.calendar, resolved.largest_unit)?;

        let result = if resolved.is_noop() {
            Duration::from_normalized(internal, resolved.largest_unit)?
        } else {
            let dest_epoch_ns = other.iso.as_nanoseconds().0;
            internal
                .round_relative_duration(
                    dest_epoch_ns,
                    self,
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
}

// ==== Public API ====

impl PlainDateTime {
    /// Creates a new `PlainDateTime`, constraining out-of-range fields.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            calendar,
            Overflow::Constrain,
        )
    }

    /// Creates a new `PlainDateTime`, rejecting out-of-range fields.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn try_new(
        year: i32,
        month: u8,
        day: u8,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            calendar,
            Overflow::Reject,
        )
    }

    /// Creates a new ISO `PlainDateTime`, rejecting out-of-range fields.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn try_new_iso(
        year: i32,
        month: u8,
        day: u8,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
    ) -> TemporalResult<Self> {
        Self::try_new(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Calendar::default(),
        )
    }

    /// Creates a new `PlainDateTime` with the provided overflow policy.
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let date = IsoDate::regulate(year, month, day, overflow)?;
        let time = IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )?;
        let iso = IsoDateTime::new(date, time)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Combines a `PlainDate` and a `PlainTime`, validating the combined
    /// limits.
    pub fn from_date_and_time(date: PlainDate, time: PlainTime) -> TemporalResult<Self> {
        let iso = IsoDateTime::new(date.iso, time.iso)?;
        Ok(Self::new_unchecked(iso, date.calendar()))
    }

    /// Creates a `PlainDateTime` from a [`PartialDateTime`].
    pub fn from_partial(
        partial: PartialDateTime,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let overflow = overflow.unwrap_or_default();
        let date = partial.date.calendar.date_from_partial(&partial.date, overflow)?;
        let time = IsoTime::default().with(partial.time, overflow)?;
        let iso = IsoDateTime::new(date.iso, time)?;
        Ok(Self::new_unchecked(iso, date.calendar()))
    }

    /// Creates a `PlainDateTime` from a raw [`FieldBag`].
    pub fn from_field_bag(
        calendar: Calendar,
        bag: &FieldBag,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let prepared = prepare_calendar_fields(
            calendar,
            bag,
            FieldMap::DATE | FieldMap::TIME,
            FieldMap::DAY | FieldMap::YEAR,
            false,
        )?;
        Self::from_partial(
            PartialDateTime {
                date: prepared.date,
                time: prepared.time,
            },
            overflow,
        )
    }

    /// Creates a new `PlainDateTime` from this one, overriding the provided
    /// fields.
    pub fn with(
        &self,
        partial: PartialDateTime,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialDateTime cannot be empty."));
        }
        let overflow = overflow.unwrap_or_default();
        let merged_date = partial.date.with_fallback_date(&self.to_plain_date())?;
        let date = self.calendar.date_from_partial(&merged_date, overflow)?;
        let time = self.iso.time.with(partial.time, overflow)?;
        let iso = IsoDateTime::new(date.iso, time)?;
        Ok(Self::new_unchecked(iso, self.calendar))
    }

    /// Creates a new `PlainDateTime` with the provided time (midnight when
    /// absent).
    pub fn with_time(&self, time: Option<PlainTime>) -> TemporalResult<Self> {
        let iso = IsoDateTime::new(self.iso.date, time.unwrap_or_default().iso)?;
        Ok(Self::new_unchecked(iso, self.calendar))
    }

    /// Creates a new `PlainDateTime` with a different calendar.
    pub fn with_calendar(&self, calendar: Calendar) -> TemporalResult<Self> {
        Ok(Self::new_unchecked(self.iso, calendar))
    }

    /// Returns this date-time's [`Calendar`].
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Returns this date-time's ISO year value.
    #[inline]
    #[must_use]
    pub const fn iso_year(&self) -> i32 {
        self.iso.date.year
    }

    /// Returns this date-time's ISO month value.
    #[inline]
    #[must_use]
    pub const fn iso_month(&self) -> u8 {
        self.iso.date.month
    }

    /// Returns this date-time's ISO day value.
    #[inline]
    #[must_use]
    pub const fn iso_day(&self) -> u8 {
        self.iso.date.day
    }

    pub fn era(&self) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        self.calendar.era(&self.iso.date)
    }

    pub fn era_year(&self) -> TemporalResult<Option<i32>> {
        self.calendar.era_year(&self.iso.date)
    }

    pub fn year(&self) -> TemporalResult<i32> {
        self.calendar.year(&self.iso.date)
    }

    pub fn month(&self) -> TemporalResult<u8> {
        self.calendar.month(&self.iso.date)
    }

    pub fn month_code(&self) -> TemporalResult<MonthCode> {
        self.calendar.month_code(&self.iso.date)
    }

    pub fn day(&self) -> TemporalResult<u8> {
        self.calendar.day(&self.iso.date)
    }

    pub fn day_of_week(&self) -> TemporalResult<u16> {
        self.calendar.day_of_week(&self.iso.date)
    }

    pub fn day_of_year(&self) -> TemporalResult<u16> {
        self.calendar.day_of_year(&self.iso.date)
    }

    pub fn days_in_month(&self) -> TemporalResult<u16> {
        self.calendar.days_in_month(&self.iso.date)
    }

    pub fn days_in_year(&self) -> TemporalResult<u16> {
        self.calendar.days_in_year(&self.iso.date)
    }

    pub fn in_leap_year(&self) -> TemporalResult<bool> {
        self.calendar.in_leap_year(&self.iso.date)
    }

    pub fn hour(&self) -> u8 {
        self.iso.time.hour
    }

    pub fn minute(&self) -> u8 {
        self.iso.time.minute
    }

    pub fn second(&self) -> u8 {
        self.iso.time.second
    }

    pub fn millisecond(&self) -> u16 {
        self.iso.time.millisecond
    }

    pub fn microsecond(&self) -> u16 {
        self.iso.time.microsecond
    }

    pub fn nanosecond(&self) -> u16 {
        self.iso.time.nanosecond
    }

    /// Adds a `Duration` to this date-time.
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.add_duration_to_date_time(duration, overflow)
    }

    /// Subtracts a `Duration` from this date-time.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.add_duration_to_date_time(&duration.negated(), overflow)
    }

    /// Returns the duration from this date-time until `other`.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Until, other, settings)
    }

    /// Returns the duration since `other` to this date-time.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Since, other, settings)
    }

    /// Rounds the time portion, balancing a day carry into the date.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        if resolved.is_noop() {
            return Ok(*self);
        }
        let result = self.iso.round(resolved)?;
        Ok(Self::new_unchecked(result, self.calendar))
    }

    /// Compares the ISO records of two date-times, ignoring calendars.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Returns the date portion as a [`PlainDate`].
    #[inline]
    #[must_use]
    pub fn to_plain_date(&self) -> PlainDate {
        PlainDate::new_unchecked(self.iso.date, self.calendar)
    }

    /// Returns the time portion as a [`PlainTime`].
    #[inline]
    #[must_use]
    pub fn to_plain_time(&self) -> PlainTime {
        PlainTime::new_unchecked(self.iso.time)
    }

    /// Renders this date-time as an IXDTF string.
    pub fn to_ixdtf_string(
        &self,
        options: ToStringRoundingOptions,
        display_calendar: DisplayCalendar,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        Ok(IxdtfStringBuilder::default()
            .with_date(rounded.date.year, rounded.date.month, rounded.date.day)
            .with_time(
                rounded.time.hour,
                rounded.time.minute,
                rounded.time.second,
                combined_subseconds(&rounded.time),
                resolved.precision,
            )
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }
}

impl core::fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self
            .to_ixdtf_string(ToStringRoundingOptions::default(), DisplayCalendar::Auto)
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&string)
    }
}

impl FromStr for PlainDateTime {
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
        let time = record
            .time
            .map(IsoTime::from_time_record)
            .transpose()?
            .unwrap_or_default();
        let iso = IsoDateTime::new(
            IsoDate::regulate(date.year, date.month, date.day, Overflow::Reject)?,
            time,
        )?;
        Ok(Self::new_unchecked(iso, calendar))
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;
    use core::str::FromStr;

    use super::{PartialDateTime, PlainDateTime};
    use crate::components::{Duration, PartialDate, PartialTime};
    use crate::options::{
        DifferenceSettings, RoundingIncrement, RoundingMode, RoundingOptions, Unit,
    };

    fn dt(
        year: i32,
        month: u8,
        day: u8,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> PlainDateTime {
        PlainDateTime::try_new_iso(year, month, day, hour, minute, second, 0, 0, 0).unwrap()
    }

    #[test]
    fn add_time_carries_into_date() {
        let start = dt(2020, 12, 31, 23, 0, 0);
        let result = start.add(&Duration::from_str("PT2H").unwrap(), None).unwrap();
        assert_eq!(result.iso_year(), 2021);
        assert_eq!(result.iso_month(), 1);
        assert_eq!(result.iso_day(), 1);
        assert_eq!(result.hour(), 1);
    }

    #[test]
    fn diff_borrows_a_day_on_sign_mismatch() {
        // The time difference points backwards relative to the date
        // difference, so a day is borrowed.
        let start = dt(2020, 1, 1, 23, 0, 0);
        let end = dt(2020, 1, 2, 1, 0, 0);
        let result = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(result.days(), 0);
        assert_eq!(result.hours(), 2);
    }

    #[test]
    fn diff_with_largest_unit_hours() {
        let start = dt(2020, 1, 1, 0, 0, 0);
        let end = dt(2020, 1, 3, 12, 0, 0);
        let result = start
            .until(
                &end,
                DifferenceSettings {
                    largest_unit: Some(Unit::Hour),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.days(), 0);
        assert_eq!(result.hours(), 60);
    }

    #[test]
    fn round_carries_day_overflow() {
        let date_time = dt(2020, 6, 15, 23, 45, 0);
        let options = RoundingOptions {
            smallest_unit: Some(Unit::Hour),
            rounding_mode: Some(RoundingMode::HalfExpand),
            ..Default::default()
        };
        let rounded = date_time.round(options).unwrap();
        assert_eq!(rounded.iso_day(), 16);
        assert_eq!(rounded.hour(), 0);
    }

    #[test]
    fn round_is_idempotent() {
        let date_time = dt(2021, 3, 3, 10, 44, 30);
        let options = RoundingOptions {
            smallest_unit: Some(Unit::Minute),
            increment: Some(RoundingIncrement::try_new(30).unwrap()),
            rounding_mode: Some(RoundingMode::HalfExpand),
            ..Default::default()
        };
        let once = date_time.round(options).unwrap();
        let twice = once.round(options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn with_merges_date_and_time_fields() {
        let date_time = dt(2021, 6, 15, 10, 30, 45);
        let result = date_time
            .with(
                PartialDateTime {
                    date: PartialDate::new().with_month(Some(2)),
                    time: PartialTime {
                        minute: Some(0),
                        ..Default::default()
                    },
                },
                None,
            )
            .unwrap();
        assert_eq!(result.iso_month(), 2);
        assert_eq!(result.iso_day(), 15);
        assert_eq!(result.hour(), 10);
        assert_eq!(result.minute(), 0);
        assert_eq!(result.second(), 45);
    }

    #[test]
    fn compare_orders_by_date_then_time() {
        let one = dt(2020, 1, 1, 0, 0, 0);
        let two = dt(2020, 1, 1, 0, 0, 1);
        let three = dt(2020, 1, 2, 0, 0, 0);
        assert_eq!(one.compare_iso(&two), Ordering::Less);
        assert_eq!(three.compare_iso(&two), Ordering::Greater);
    }

    #[test]
    fn parse_and_format() {
        let date_time = PlainDateTime::from_str("2024-03-15T08:09:10.5").unwrap();
        assert_eq!(date_time.millisecond(), 500);
        assert_eq!(date_time.to_string(), "2024-03-15T08:09:10.5");

        // A date-only string defaults to midnight.
        let midnight = PlainDateTime::from_str("2024-03-15").unwrap();
        assert_eq!(midnight.hour(), 0);
        assert!(PlainDateTime::from_str("2024-03-15T08:09:10Z").is_err());
    }
}
