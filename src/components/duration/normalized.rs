//! The normalized duration records.
//!
//! A `NormalizedTimeDuration` carries an entire clock-unit duration as a
//! single signed nanosecond count, so composing duration arithmetic never
//! re-accumulates rounding error across units. A `NormalizedDurationRecord`
//! pairs one with the calendar-unit `DateDuration`.

use core::num::NonZeroU128;
use core::ops::Add;

use num_traits::Euclid;

use crate::{
    components::{timezone::TimeZone, Duration, PlainDateTime},
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime},
    options::{Disambiguation, Overflow, ResolvedRoundingOptions, RoundingIncrement, RoundingMode, Unit},
    primitive::FiniteF64,
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    temporal_assert, Sign, TemporalError, TemporalResult, TemporalUnwrap, NS_PER_DAY,
};

use super::DateDuration;

/// The maximum magnitude of a time duration: 2^53 seconds, expressed in
/// nanoseconds, less one nanosecond.
pub(crate) const MAX_TIME_DURATION: i128 = 9_007_199_254_740_991_999_999_999;

const NS_PER_DAY_128BIT: i128 = NS_PER_DAY as i128;

// ==== NormalizedTimeDuration ====

/// A time duration represented in pure nanoseconds.
///
/// Invariant: `self.0.abs() <= MAX_TIME_DURATION`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NormalizedTimeDuration(pub(crate) i128);

impl NormalizedTimeDuration {
    /// `NormalizeTimeDuration`: collapses clock components into nanoseconds.
    ///
    /// The arithmetic is exact; the component magnitudes of any valid
    /// duration stay well inside an i128.
    pub(crate) fn from_components(
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> Self {
        let nanos = i128::from(hours) * 3_600_000_000_000
            + i128::from(minutes) * 60_000_000_000
            + i128::from(seconds) * 1_000_000_000
            + i128::from(milliseconds) * 1_000_000
            + microseconds * 1_000
            + nanoseconds;
        debug_assert!(nanos.abs() <= MAX_TIME_DURATION);
        Self(nanos)
    }

    /// `TimeDurationFromEpochNanosecondsDifference`
    pub(crate) fn from_nanosecond_difference(one: i128, two: i128) -> TemporalResult<Self> {
        let result = one - two;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationTimeOutOfRange));
        }
        Ok(Self(result))
    }

    /// `Add24HourDaysToTimeDuration`
    pub(crate) fn add_days(&self, days: i64) -> TemporalResult<Self> {
        let result = self.0 + i128::from(days) * NS_PER_DAY_128BIT;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationTimeOutOfRange));
        }
        Ok(Self(result))
    }

    pub(crate) fn checked_sub(&self, other: &Self) -> TemporalResult<Self> {
        let result = self.0 - other.0;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationTimeOutOfRange));
        }
        Ok(Self(result))
    }

    /// Truncating division by a unit length.
    pub(crate) fn divide(&self, divisor: i64) -> i128 {
        // Non-euclidean division is required for negative durations.
        self.0 / i128::from(divisor)
    }

    /// Truncating division with remainder.
    pub(crate) fn div_rem(&self, divisor: u64) -> (i128, i128) {
        (self.0 / i128::from(divisor), self.0 % i128::from(divisor))
    }

    /// Returns the fractional days value represented by this duration.
    pub(crate) fn as_fractional_days(&self) -> f64 {
        let days = self.0.div_euclid(NS_PER_DAY_128BIT);
        let remainder = self.0.rem_euclid(NS_PER_DAY_128BIT);
        days as f64 + (remainder as f64 / NS_PER_DAY as f64)
    }

    /// `TotalTimeDuration`: this duration counted fractionally in `unit`.
    pub(crate) fn total(&self, unit: Unit) -> TemporalResult<FiniteF64> {
        let length = unit.as_nanoseconds().temporal_unwrap()?.get() as i128;
        let (quotient, remainder) = (self.0.div_euclid(length), self.0.rem_euclid(length));
        FiniteF64::try_from(quotient as f64 + remainder as f64 / length as f64)
    }

    /// `TimeDurationSign`
    #[inline]
    #[must_use]
    pub(crate) fn sign(&self) -> Sign {
        Sign::from(self.0.cmp(&0) as i8)
    }

    #[inline]
    pub(crate) fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the whole-second component.
    pub(crate) fn seconds(&self) -> i64 {
        // MAX_TIME_DURATION divided down to seconds is within an i64.
        (self.0 / 1_000_000_000) as i64
    }

    /// Returns the sub-second component.
    pub(crate) fn subseconds(&self) -> i32 {
        // The remainder of a division by 10^9 is within an i32.
        (self.0 % 1_000_000_000) as i32
    }

    /// `RoundTimeDurationToIncrement`
    pub(crate) fn round_inner(
        &self,
        increment: NonZeroU128,
        mode: RoundingMode,
    ) -> TemporalResult<Self> {
        let rounded = IncrementRounder::<i128>::from_signed_num(self.0, increment)?.round(mode);
        if rounded.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationTimeOutOfRange));
        }
        Ok(Self(rounded))
    }
}

/// `AddTimeDuration`
impl Add<Self> for NormalizedTimeDuration {
    type Output = TemporalResult<Self>;

    fn add(self, rhs: Self) -> Self::Output {
        let result = self.0 + rhs.0;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationTimeOutOfRange));
        }
        Ok(Self(result))
    }
}

// ==== NormalizedDurationRecord ====

/// A record pairing a `DateDuration` with a `NormalizedTimeDuration`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedDurationRecord {
    date: DateDuration,
    norm: NormalizedTimeDuration,
}

impl NormalizedDurationRecord {
    /// `CombineDateAndTimeDuration`: the two parts must agree in sign.
    pub(crate) fn new(date: DateDuration, norm: NormalizedTimeDuration) -> TemporalResult<Self> {
        if date.sign() != Sign::Zero && norm.sign() != Sign::Zero && date.sign() != norm.sign() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationSignMismatch));
        }
        Ok(Self { date, norm })
    }

    pub(crate) fn from_date_duration(date: DateDuration) -> TemporalResult<Self> {
        Self::new(date, NormalizedTimeDuration::default())
    }

    pub(crate) fn date(&self) -> DateDuration {
        self.date
    }

    pub(crate) fn normalized_time_duration(&self) -> NormalizedTimeDuration {
        self.norm
    }

    pub(crate) fn sign(&self) -> Sign {
        let date_sign = self.date.sign();
        if date_sign == Sign::Zero {
            return self.norm.sign();
        }
        date_sign
    }
}

/// `RoundTimeDuration`: rounds a day count plus time duration to a
/// non-calendar smallest unit, producing the record and the fractional
/// total.
pub(crate) fn round_time_duration(
    days: i64,
    norm: NormalizedTimeDuration,
    options: ResolvedRoundingOptions,
) -> TemporalResult<(NormalizedDurationRecord, FiniteF64)> {
    // 1. Assert: IsCalendarUnit(unit) is false.
    match options.smallest_unit {
        // 2. If unit is "day", round the fractional day count.
        Unit::Day => {
            let fractional_days = days as f64 + norm.as_fractional_days();
            let rounded = IncrementRounder::<f64>::from_signed_num(
                fractional_days,
                options.increment.as_extended_increment(),
            )?
            .round(options.rounding_mode);
            let days = i64::try_from(rounded)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))?;
            let record = NormalizedDurationRecord::new(
                DateDuration::new(0, 0, 0, days)?,
                NormalizedTimeDuration::default(),
            )?;
            Ok((record, FiniteF64::try_from(fractional_days)?))
        }
        // 3. Else, round the time duration against the unit length.
        Unit::Hour
        | Unit::Minute
        | Unit::Second
        | Unit::Millisecond
        | Unit::Microsecond
        | Unit::Nanosecond => {
            let norm = norm.add_days(days)?;
            let divisor = options.smallest_unit.as_nanoseconds().temporal_unwrap()?;
            let total = norm.total(options.smallest_unit)?;
            let rounded = norm.round_inner(
                divisor
                    .checked_mul(options.increment.as_extended_increment())
                    .temporal_unwrap()?,
                options.rounding_mode,
            )?;
            let record =
                NormalizedDurationRecord::new(DateDuration::default(), rounded)?;
            Ok((record, total))
        }
        _ => Err(TemporalError::assert()),
    }
}

// ==== Relative duration rounding ====

// The nudge/bubble pass re-expresses a duration anchored at a reference
// date-time in the target units: one rounding pass through the calendar or
// clock units, then a carry pass bubbling an expanded unit upward.

#[derive(Debug)]
struct NudgeRecord {
    normalized: NormalizedDurationRecord,
    total: Option<FiniteF64>,
    nudge_epoch_ns: i128,
    expanded: bool,
}

pub(crate) type RelativeRoundResult = (Duration, Option<FiniteF64>);

fn to_date_value(value: i128) -> TemporalResult<i64> {
    i64::try_from(value)
        .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))
}

impl NormalizedDurationRecord {
    /// `NudgeToCalendarUnit`
    fn nudge_calendar_unit<P: TimeZoneProvider>(
        &self,
        sign: Sign,
        dest_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<(&TimeZone, &P)>,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let increment = i128::from(options.increment.get());
        let (r1, r2, start_duration, end_duration) = match options.smallest_unit {
            // 1. If unit is "year", then
            Unit::Year => {
                // a. Let years be RoundNumberToIncrement(duration.[[Years]], increment, "trunc").
                let years = IncrementRounder::from_signed_num(
                    i128::from(self.date().years),
                    options.increment.as_extended_increment(),
                )?
                .round(RoundingMode::Trunc);
                // b-c. Let r1 be years and r2 be years + increment × sign.
                let r1 = years;
                let r2 = years + increment * i128::from(sign.as_sign_multiplier());
                (
                    r1,
                    r2,
                    DateDuration::new(to_date_value(r1)?, 0, 0, 0)?,
                    DateDuration::new(to_date_value(r2)?, 0, 0, 0)?,
                )
            }
            // 2. Else if unit is "month", then
            Unit::Month => {
                let months = IncrementRounder::from_signed_num(
                    i128::from(self.date().months),
                    options.increment.as_extended_increment(),
                )?
                .round(RoundingMode::Trunc);
                let r1 = months;
                let r2 = months + increment * i128::from(sign.as_sign_multiplier());
                (
                    r1,
                    r2,
                    DateDuration::new(self.date().years, to_date_value(r1)?, 0, 0)?,
                    DateDuration::new(self.date().years, to_date_value(r2)?, 0, 0)?,
                )
            }
            // 3. Else if unit is "week", then
            Unit::Week => {
                // a-b. Find the week anchors on either side of the day delta.
                let iso_one = IsoDate::balance(
                    checked_year(dt.iso.date.year, self.date().years)?,
                    i32::from(dt.iso.date.month) + date_value_to_i32(self.date().months)?,
                    i32::from(dt.iso.date.day),
                );
                let iso_two = IsoDate::balance(
                    iso_one.year,
                    i32::from(iso_one.month),
                    i32::from(iso_one.day) + date_value_to_i32(self.date().days)?,
                );

                // g. Let untilResult be CalendarDateUntil(calendar, weeksStart, weeksEnd, week).
                let until_result = dt.calendar().date_until(&iso_one, &iso_two, Unit::Week)?;

                // h. Let weeks be RoundNumberToIncrement(duration.[[Weeks]] + untilResult.[[Weeks]], increment, "trunc").
                let weeks = IncrementRounder::from_signed_num(
                    i128::from(self.date().weeks + until_result.weeks),
                    options.increment.as_extended_increment(),
                )?
                .round(RoundingMode::Trunc);
                let r1 = weeks;
                let r2 = weeks + increment * i128::from(sign.as_sign_multiplier());
                (
                    r1,
                    r2,
                    DateDuration::new(self.date().years, self.date().months, to_date_value(r1)?, 0)?,
                    DateDuration::new(self.date().years, self.date().months, to_date_value(r2)?, 0)?,
                )
            }
            Unit::Day => {
                let days = IncrementRounder::from_signed_num(
                    i128::from(self.date().days),
                    options.increment.as_extended_increment(),
                )?
                .round(RoundingMode::Trunc);
                let r1 = days;
                let r2 = days + increment * i128::from(sign.as_sign_multiplier());
                (
                    r1,
                    r2,
                    DateDuration::new(
                        self.date().years,
                        self.date().months,
                        self.date().weeks,
                        to_date_value(r1)?,
                    )?,
                    DateDuration::new(
                        self.date().years,
                        self.date().months,
                        self.date().weeks,
                        to_date_value(r2)?,
                    )?,
                )
            }
            _ => return Err(TemporalError::assert()),
        };

        // 5-6. Apply the candidate durations to the anchor date-time.
        let start = dt.iso.add_date_duration(
            dt.calendar(),
            &start_duration,
            NormalizedTimeDuration::default(),
            Overflow::Constrain,
        )?;
        let end = dt.iso.add_date_duration(
            dt.calendar(),
            &end_duration,
            NormalizedTimeDuration::default(),
            Overflow::Constrain,
        )?;

        // 7-8. Resolve both candidates to instants.
        let (start_epoch_ns, end_epoch_ns) = match tz {
            None => (start.as_nanoseconds().0, end.as_nanoseconds().0),
            Some((timezone, provider)) => (
                timezone
                    .get_epoch_nanoseconds_for(start, Disambiguation::Compatible, provider)?
                    .0,
                timezone
                    .get_epoch_nanoseconds_for(end, Disambiguation::Compatible, provider)?
                    .0,
            ),
        };

        // 9. If endEpochNs = startEpochNs, throw a RangeError exception.
        if end_epoch_ns == start_epoch_ns {
            return Err(TemporalError::range()
                .with_message("endEpochNs cannot be equal to startEpochNs"));
        }

        // 12-13. Let progress be (destEpochNs - startEpochNs) / (endEpochNs - startEpochNs),
        // and total be r1 + progress × increment × sign.
        let progress =
            (dest_epoch_ns - start_epoch_ns) as f64 / (end_epoch_ns - start_epoch_ns) as f64;
        let total = r1 as f64
            + progress * options.increment.get() as f64 * f64::from(sign.as_sign_multiplier());

        // 14-15. Let roundedUnit be ApplyUnsignedRoundingMode(total, r1, r2, unsignedRoundingMode).
        let rounded_unit =
            IncrementRounder::from_signed_num(total, options.increment.as_extended_increment())?
                .round(options.rounding_mode);

        // 17-19. Pick whichever candidate the rounding landed on.
        if rounded_unit == r2 {
            Ok(NudgeRecord {
                normalized: NormalizedDurationRecord::new(
                    end_duration,
                    NormalizedTimeDuration::default(),
                )?,
                total: Some(FiniteF64::try_from(total)?),
                nudge_epoch_ns: end_epoch_ns,
                expanded: true,
            })
        } else {
            Ok(NudgeRecord {
                normalized: NormalizedDurationRecord::new(
                    start_duration,
                    NormalizedTimeDuration::default(),
                )?,
                total: Some(FiniteF64::try_from(total)?),
                nudge_epoch_ns: start_epoch_ns,
                expanded: false,
            })
        }
    }

    /// `NudgeToZonedTime`: rounds the time portion against the actual length
    /// of the anchor day in the time zone.
    fn nudge_to_zoned_time<P: TimeZoneProvider>(
        &self,
        sign: Sign,
        dt: &PlainDateTime,
        timezone: &TimeZone,
        provider: &P,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        // 1-4. Anchor the duration's date portion.
        let start = dt
            .calendar()
            .date_add(&dt.iso.date, &self.date(), Overflow::Constrain)?;
        let start_date_time = IsoDateTime::new_unchecked(start.iso, dt.iso.time);

        // 5-6. The day the rounded time may spill into.
        let end_date = IsoDate::balance(
            start.iso.year,
            i32::from(start.iso.month),
            i32::from(start.iso.day) + i32::from(sign.as_sign_multiplier()),
        );
        let end_date_time = IsoDateTime::new_unchecked(end_date, dt.iso.time);

        // 7-9. Resolve both days and measure the day span.
        let start_epoch_ns = timezone
            .get_epoch_nanoseconds_for(start_date_time, Disambiguation::Compatible, provider)?
            .0;
        let end_epoch_ns = timezone
            .get_epoch_nanoseconds_for(end_date_time, Disambiguation::Compatible, provider)?
            .0;
        let day_span =
            NormalizedTimeDuration::from_nanosecond_difference(end_epoch_ns, start_epoch_ns)?;
        // 10. Assert: TimeDurationSign(daySpan) = sign.
        temporal_assert!(day_span.sign() as i8 == sign.as_sign_multiplier());

        // 11-12. Round the time duration.
        let unit_length = options.smallest_unit.as_nanoseconds().temporal_unwrap()?;
        let increment_ns = unit_length
            .checked_mul(options.increment.as_extended_increment())
            .temporal_unwrap()?;
        let mut rounded_time = self
            .normalized_time_duration()
            .round_inner(increment_ns, options.rounding_mode)?;

        // 13-15. Did the rounding spill past the day span?
        let beyond_day_span = rounded_time.checked_sub(&day_span)?;
        let (did_round_beyond_day, day_delta, nudged_epoch_ns) =
            if beyond_day_span.sign() as i8 != -sign.as_sign_multiplier() {
                rounded_time = beyond_day_span.round_inner(increment_ns, options.rounding_mode)?;
                (
                    true,
                    i64::from(sign.as_sign_multiplier()),
                    rounded_time.0 + end_epoch_ns,
                )
            } else {
                (false, 0, rounded_time.0 + start_epoch_ns)
            };

        // 16-17. Fold the day delta into the date portion.
        let date_duration = self.date().adjust_days(self.date().days + day_delta)?;
        Ok(NudgeRecord {
            normalized: NormalizedDurationRecord::new(date_duration, rounded_time)?,
            total: None,
            nudge_epoch_ns: nudged_epoch_ns,
            expanded: did_round_beyond_day,
        })
    }

    /// `NudgeToDayOrTime`: fixed-length rounding without a time zone.
    fn nudge_to_day_or_time(
        &self,
        dest_epoch_ns: i128,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        // 2. Let norm be ! Add24HourDaysToTimeDuration(duration.[[Time]], duration.[[Days]]).
        let norm = self
            .normalized_time_duration()
            .add_days(self.date().days)?;

        // 3-4. Total the duration in the smallest unit.
        let total = norm.total(options.smallest_unit)?;

        // 5. Let roundedNorm be ? RoundTimeDurationToIncrement(norm, unitLength × increment, roundingMode).
        let unit_length = options.smallest_unit.as_nanoseconds().temporal_unwrap()?;
        let rounded_norm = norm.round_inner(
            unit_length
                .checked_mul(options.increment.as_extended_increment())
                .temporal_unwrap()?,
            options.rounding_mode,
        )?;

        // 6. Let diffNorm be ! SubtractTimeDuration(roundedNorm, norm).
        let diff_norm = rounded_norm.checked_sub(&norm)?;

        // 7-12. Work out whether the rounding expanded across a day boundary.
        let whole_days = norm.divide(NS_PER_DAY as i64);
        let (rounded_whole_days, rounded_remainder) = rounded_norm.div_rem(NS_PER_DAY);
        let day_delta = rounded_whole_days - whole_days;
        let did_expand_days = day_delta.signum() as i8 == norm.sign() as i8;

        // 13. Let nudgedEpochNs be AddTimeDurationToEpochNanoseconds(diffNorm, destEpochNs).
        let nudged_epoch_ns = diff_norm.0 + dest_epoch_ns;

        // 14-16. Only re-split days off the time duration when days can be
        // expressed at all.
        let mut days = 0;
        let mut remainder = rounded_norm;
        if options.largest_unit.max(Unit::Day) == options.largest_unit {
            days = to_date_value(rounded_whole_days)?;
            remainder = NormalizedTimeDuration(rounded_remainder);
        }

        // 17. Let resultDuration be CombineDateAndTimeDuration(...).
        let result_duration = NormalizedDurationRecord::new(
            DateDuration::new(
                self.date().years,
                self.date().months,
                self.date().weeks,
                days,
            )?,
            remainder,
        )?;

        Ok(NudgeRecord {
            normalized: result_duration,
            total: Some(total),
            nudge_epoch_ns: nudged_epoch_ns,
            expanded: did_expand_days,
        })
    }

    /// `BubbleRelativeDuration`: carries an expanded unit into the
    /// next-coarser calendar units, one unit at a time.
    #[allow(clippy::too_many_arguments)]
    fn bubble_relative_duration<P: TimeZoneProvider>(
        &self,
        sign: Sign,
        nudge_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<(&TimeZone, &P)>,
        largest_unit: Unit,
        smallest_unit: Unit,
    ) -> TemporalResult<NormalizedDurationRecord> {
        let mut duration = *self;
        // 3. If smallestUnit is "year", return duration.
        if smallest_unit == Unit::Year {
            return Ok(duration);
        }

        // 6-8. Walk from one unit above smallestUnit up through largestUnit.
        let mut unit = smallest_unit + 1;
        while unit != Unit::Auto && unit <= largest_unit {
            // Weeks only participate when they are the largest unit.
            if unit == Unit::Week && largest_unit != Unit::Week {
                unit = unit + 1;
                continue;
            }

            let end_duration = match unit {
                Unit::Year => DateDuration::new(
                    duration.date().years + i64::from(sign.as_sign_multiplier()),
                    0,
                    0,
                    0,
                )?,
                Unit::Month => DateDuration::new(
                    duration.date().years,
                    duration.date().months + i64::from(sign.as_sign_multiplier()),
                    0,
                    0,
                )?,
                Unit::Week => DateDuration::new(
                    duration.date().years,
                    duration.date().months,
                    duration.date().weeks + i64::from(sign.as_sign_multiplier()),
                    0,
                )?,
                Unit::Day => DateDuration::new(
                    duration.date().years,
                    duration.date().months,
                    duration.date().weeks,
                    duration.date().days + i64::from(sign.as_sign_multiplier()),
                )?,
                _ => return Err(TemporalError::assert()),
            };

            // v. Let end be the end duration applied to the anchor.
            let end = dt.iso.add_date_duration(
                dt.calendar(),
                &end_duration,
                NormalizedTimeDuration::default(),
                Overflow::Constrain,
            )?;

            // vi-vii. Resolve to an instant.
            let end_epoch_ns = match tz {
                None => end.as_nanoseconds().0,
                Some((timezone, provider)) => {
                    timezone
                        .get_epoch_nanoseconds_for(end, Disambiguation::Compatible, provider)?
                        .0
                }
            };

            // viii-xi. Keep bubbling while the nudged instant reaches the
            // next unit boundary.
            let beyond_end = nudge_epoch_ns - end_epoch_ns;
            if beyond_end.signum() as i8 != -sign.as_sign_multiplier() {
                duration = NormalizedDurationRecord::from_date_duration(end_duration)?;
            } else {
                break;
            }
            unit = unit + 1;
        }

        Ok(duration)
    }

    /// `RoundRelativeDuration`
    ///
    /// Re-expresses this duration, anchored at `dt` (and optionally a time
    /// zone), in the resolved largest/smallest units, also computing the
    /// fractional total of the smallest unit where the pass produces one.
    pub(crate) fn round_relative_duration<P: TimeZoneProvider>(
        &self,
        dest_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<(&TimeZone, &P)>,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<RelativeRoundResult> {
        // 1-3. A unit rounds irregularly when its length depends on the
        // calendar (or, for days, on the time zone).
        let irregular_unit = options.smallest_unit.is_calendar_unit()
            || (tz.is_some() && options.smallest_unit == Unit::Day);

        let sign = self.sign();

        // 5-7. Nudge the duration toward the destination.
        let nudge_result = if irregular_unit {
            self.nudge_calendar_unit(sign, dest_epoch_ns, dt, tz, options)?
        } else if let Some((timezone, provider)) = tz {
            self.nudge_to_zoned_time(sign, dt, timezone, provider, options)?
        } else {
            self.nudge_to_day_or_time(dest_epoch_ns, options)?
        };

        // 8. Set duration to nudgeResult.[[Duration]].
        let mut duration = nudge_result.normalized;

        // 9. Bubble an expanded unit into the coarser units.
        if nudge_result.expanded && options.smallest_unit != Unit::Week {
            let start_unit = options.smallest_unit.max(Unit::Day);
            duration = duration.bubble_relative_duration(
                sign,
                nudge_result.nudge_epoch_ns,
                dt,
                tz,
                options.largest_unit,
                start_unit,
            )?;
        }

        // 10. Balance the time portion no coarser than hours.
        let largest_unit = if options.largest_unit.is_calendar_unit()
            || options.largest_unit == Unit::Day
        {
            Unit::Hour
        } else {
            options.largest_unit
        };

        // 11-12. Balance and recombine.
        let result = Duration::from_normalized(duration, largest_unit)?;
        Ok((result, nudge_result.total))
    }

    /// `TotalRelativeDuration`
    pub(crate) fn total_relative_duration<P: TimeZoneProvider>(
        &self,
        dest_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<(&TimeZone, &P)>,
        unit: Unit,
    ) -> TemporalResult<FiniteF64> {
        if unit.is_calendar_unit() || (tz.is_some() && unit == Unit::Day) {
            let options = ResolvedRoundingOptions {
                largest_unit: unit,
                smallest_unit: unit,
                increment: RoundingIncrement::ONE,
                rounding_mode: RoundingMode::Trunc,
            };
            let nudged = self.nudge_calendar_unit(self.sign(), dest_epoch_ns, dt, tz, options)?;
            return nudged.total.temporal_unwrap();
        }
        self.normalized_time_duration()
            .add_days(self.date().days)?
            .total(unit)
    }
}

fn checked_year(year: i32, delta: i64) -> TemporalResult<i32> {
    i32::try_from(i64::from(year) + delta)
        .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))
}

fn date_value_to_i32(value: i64) -> TemporalResult<i32> {
    i32::try_from(value)
        .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))
}

#[cfg(test)]
mod tests {
    use super::{NormalizedDurationRecord, NormalizedTimeDuration, MAX_TIME_DURATION};
    use crate::components::duration::DateDuration;
    use crate::options::Unit;
    use crate::Sign;

    #[test]
    fn max_time_duration_seconds_fit_in_i64() {
        let max_seconds = MAX_TIME_DURATION.div_euclid(1_000_000_000);
        assert!(max_seconds <= i128::from(i64::MAX));
    }

    #[test]
    fn normalization_is_exact() {
        let norm = NormalizedTimeDuration::from_components(1, 30, 0, 0, 0, 1);
        assert_eq!(norm.0, 5_400_000_000_001);
        assert_eq!(norm.seconds(), 5400);
        assert_eq!(norm.subseconds(), 1);
        assert_eq!(norm.sign(), Sign::Positive);
    }

    #[test]
    fn record_requires_sign_agreement() {
        let norm = NormalizedTimeDuration::from_components(-1, 0, 0, 0, 0, 0);
        let date = DateDuration::new(0, 0, 0, 1).unwrap();
        assert!(NormalizedDurationRecord::new(date, norm).is_err());
        assert!(NormalizedDurationRecord::new(date.negated(), norm).is_ok());
    }

    #[test]
    fn total_is_fractional() {
        let norm = NormalizedTimeDuration::from_components(0, 90, 0, 0, 0, 0);
        assert_eq!(norm.total(Unit::Hour).unwrap().as_inner(), 1.5);
        let negative = NormalizedTimeDuration::from_components(0, -90, 0, 0, 0, 0);
        assert_eq!(negative.total(Unit::Hour).unwrap().as_inner(), -1.5);
    }
}
