//! The `PlainTime` component: a wall-clock time with no date.

use core::cmp::Ordering;
use core::str::FromStr;

use crate::{
    components::{duration::normalized::NormalizedDurationRecord, Duration},
    iso::IsoTime,
    options::{
        DifferenceOperation, DifferenceSettings, Overflow, ResolvedRoundingOptions,
        RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, FormattableTime},
    TemporalError, TemporalResult,
};

use super::duration::DateDuration;
use super::instant::combined_subseconds;

/// A `PartialTime` is a time whose fields may be absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialTime {
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub second: Option<i32>,
    pub millisecond: Option<i32>,
    pub microsecond: Option<i32>,
    pub nanosecond: Option<i32>,
}

impl PartialTime {
    pub const fn new() -> Self {
        Self {
            hour: None,
            minute: None,
            second: None,
            millisecond: None,
            microsecond: None,
            nanosecond: None,
        }
    }

    /// Returns whether every field is absent.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }
}

/// The native Rust implementation of a Temporal plain time.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainTime {
    pub(crate) iso: IsoTime,
}

// ==== Private API ====

impl PlainTime {
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoTime) -> Self {
        Self { iso }
    }

    /// `DifferenceTemporalPlainTime`
    fn diff_internal(
        &self,
        op: DifferenceOperation,
        other: &Self,
        options: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 3. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, time, « », "nanosecond", "hour").
        let resolved_options = ResolvedRoundingOptions::from_diff_settings(
            options,
            op,
            UnitGroup::Time,
            Unit::Hour,
            Unit::Nanosecond,
        )?;

        // 4. Let timeDuration be DifferenceTime(temporalTime.[[Time]], other.[[Time]]).
        let mut time_duration = self.iso.diff(&other.iso);

        // 5. Round per the resolved options.
        if !resolved_options.is_noop() {
            let increment = resolved_options
                .smallest_unit
                .as_nanoseconds()
                .ok_or(TemporalError::range().with_message("Invalid unit for time difference."))?
                .checked_mul(resolved_options.increment.as_extended_increment())
                .ok_or(TemporalError::range().with_message("increment exceeded a valid range."))?;
            time_duration = time_duration.round_inner(increment, resolved_options.rounding_mode)?;
        }

        let result = Duration::from_normalized(
            NormalizedDurationRecord::new(DateDuration::default(), time_duration)?,
            resolved_options.largest_unit,
        )?;
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

// ==== Public API ====

impl PlainTime {
    /// Creates a new `PlainTime`, constraining any out-of-range fields.
    #[inline]
    pub fn new(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Overflow::Constrain,
        )
    }

    /// Creates a new `PlainTime`, rejecting any out-of-range field.
    #[inline]
    pub fn try_new(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Overflow::Reject,
        )
    }

    /// Creates a new `PlainTime` with the provided overflow policy.
    #[inline]
    pub fn new_with_overflow(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let iso = IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )?;
        Ok(Self::new_unchecked(iso))
    }

    /// Creates a new `PlainTime` from a `PartialTime`, defaulting absent
    /// fields to zero.
    pub fn from_partial(partial: PartialTime, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialTime cannot be empty."));
        }
        let iso = IsoTime::default().with(partial, overflow.unwrap_or_default())?;
        Ok(Self::new_unchecked(iso))
    }

    /// Creates a `PlainTime` from a raw [`crate::fields::FieldBag`],
    /// applying the fixed-order field preparation.
    pub fn from_field_bag(
        bag: &crate::fields::FieldBag,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let prepared = crate::fields::prepare_calendar_fields(
            Default::default(),
            bag,
            crate::fields::FieldMap::TIME,
            crate::fields::FieldMap::empty(),
            false,
        )?;
        let iso = IsoTime::default().with(prepared.time, overflow.unwrap_or_default())?;
        Ok(Self::new_unchecked(iso))
    }

    /// Creates a new `PlainTime` from this one, overriding the provided
    /// fields.
    pub fn with(&self, partial: PartialTime, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialTime cannot be empty."));
        }
        let iso = self.iso.with(partial, overflow.unwrap_or_default())?;
        Ok(Self::new_unchecked(iso))
    }

    pub fn hour(&self) -> u8 {
        self.iso.hour
    }

    pub fn minute(&self) -> u8 {
        self.iso.minute
    }

    pub fn second(&self) -> u8 {
        self.iso.second
    }

    pub fn millisecond(&self) -> u16 {
        self.iso.millisecond
    }

    pub fn microsecond(&self) -> u16 {
        self.iso.microsecond
    }

    pub fn nanosecond(&self) -> u16 {
        self.iso.nanosecond
    }

    /// Adds a `Duration` to this time, wrapping around the clock. Calendar
    /// fields are ignored; whole days cancel out on a wall clock.
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        let norm = duration.to_normalized_time().add_days(duration.days())?;
        let (_, time) = self.iso.add(norm);
        Ok(Self::new_unchecked(time))
    }

    /// Subtracts a `Duration` from this time, wrapping around the clock.
    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add(&duration.negated())
    }

    /// Returns the duration from this time until `other`.
    pub fn until(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Until, other, options)
    }

    /// Returns the duration since `other` to this time.
    pub fn since(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Since, other, options)
    }

    /// Rounds this time to the resolved increment, dropping any day carry.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_time_options(options)?;
        let (_, time) = self.iso.round(resolved)?;
        Ok(Self::new_unchecked(time))
    }

    /// Compares two times field-wise.
    #[inline]
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Renders this time as an IXDTF string.
    pub fn to_ixdtf_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let (_, rounded) = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        let formattable = FormattableTime {
            hour: rounded.hour,
            minute: rounded.minute,
            second: rounded.second,
            nanosecond: combined_subseconds(&rounded),
            precision: resolved.precision,
            include_sep: true,
        };
        Ok(formattable.to_string())
    }
}

impl core::fmt::Display for PlainTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self
            .to_ixdtf_string(ToStringRoundingOptions::default())
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&string)
    }
}

impl FromStr for PlainTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parsers::parse_time(s.as_bytes())?;
        let time = record
            .time
            .ok_or_else(|| TemporalError::range().with_message("No time found in string."))?;
        Ok(Self::new_unchecked(IsoTime::from_time_record(time)?))
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;
    use core::str::FromStr;

    use super::{PartialTime, PlainTime};
    use crate::components::Duration;
    use crate::options::{DifferenceSettings, RoundingMode, RoundingOptions, Unit};

    #[test]
    fn constrain_clamps_reject_errors() {
        let constrained = PlainTime::new(25, 61, -1, 0, 0, 0).unwrap();
        assert_eq!(constrained.hour(), 23);
        assert_eq!(constrained.minute(), 59);
        assert_eq!(constrained.second(), 0);
        assert!(PlainTime::try_new(25, 0, 0, 0, 0, 0).is_err());
    }

    #[test]
    fn add_wraps_around_midnight() {
        let time = PlainTime::try_new(23, 30, 0, 0, 0, 0).unwrap();
        let result = time.add(&Duration::from_str("PT2H").unwrap()).unwrap();
        assert_eq!(result.hour(), 1);
        assert_eq!(result.minute(), 30);

        // Whole days cancel out.
        let result = time.add(&Duration::from_str("P1D").unwrap()).unwrap();
        assert_eq!(result, time);
    }

    #[test]
    fn with_overrides_only_provided_fields() {
        let time = PlainTime::try_new(1, 2, 3, 4, 5, 6).unwrap();
        let result = time
            .with(
                PartialTime {
                    minute: Some(59),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(result.hour(), 1);
        assert_eq!(result.minute(), 59);
        assert_eq!(result.second(), 3);
    }

    #[test]
    fn round_is_idempotent() {
        let time = PlainTime::try_new(10, 44, 30, 0, 0, 0).unwrap();
        let options = RoundingOptions {
            smallest_unit: Some(Unit::Minute),
            increment: Some(crate::options::RoundingIncrement::try_new(15).unwrap()),
            rounding_mode: Some(RoundingMode::HalfExpand),
            ..Default::default()
        };
        let once = time.round(options).unwrap();
        assert_eq!(once.minute(), 45);
        let twice = once.round(options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn until_balances_to_largest_unit() {
        let start = PlainTime::try_new(1, 0, 0, 0, 0, 0).unwrap();
        let end = PlainTime::try_new(3, 30, 0, 0, 0, 0).unwrap();
        let result = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(result.hours(), 2);
        assert_eq!(result.minutes(), 30);

        let result = start
            .since(&end, DifferenceSettings::default())
            .unwrap();
        assert_eq!(result.hours(), -2);
        assert_eq!(result.minutes(), -30);
    }

    #[test]
    fn compare_is_total_order() {
        let one = PlainTime::try_new(1, 0, 0, 0, 0, 0).unwrap();
        let two = PlainTime::try_new(1, 0, 0, 0, 0, 1).unwrap();
        assert_eq!(one.compare(&two), Ordering::Less);
        assert_eq!(two.compare(&one), Ordering::Greater);
        assert_eq!(one.compare(&one), Ordering::Equal);
    }

    #[test]
    fn parse_and_format_round_trip() {
        let time = PlainTime::from_str("08:09:10.123").unwrap();
        assert_eq!(time.hour(), 8);
        assert_eq!(time.millisecond(), 123);
        assert_eq!(time.to_string(), "08:09:10.123");
    }
}
