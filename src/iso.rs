//! The internal ISO calendar field records.
//!
//! The three record types are the slots every user-facing component is built
//! from:
//!
//!   - `IsoDate` — the `[[ISOYear]]`, `[[ISOMonth]]`, `[[ISODay]]` slots.
//!   - `IsoTime` — the `[[ISOHour]]` through `[[ISONanosecond]]` slots.
//!   - `IsoDateTime` — both of the above.
//!
//! The records are plain immutable values; all arithmetic produces new
//! records. Prefer `PlainDate`, `PlainTime`, and `PlainDateTime` unless
//! calling the calendar hooks directly.

use ixdtf::records::TimeRecord;

use crate::{
    components::{
        calendar::Calendar,
        duration::{
            normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
            DateDuration,
        },
        PartialTime,
    },
    error::{ErrorMessage, TemporalError},
    options::{Overflow, ResolvedRoundingOptions, Unit},
    rounding::IncrementRounder,
    time::EpochNanoseconds,
    utils, TemporalResult, TemporalUnwrap, NS_PER_DAY,
};
use num_traits::{cast::FromPrimitive, Euclid};

/// The minimum year of a date within the supported limits.
pub(crate) const MIN_ISO_YEAR: i32 = -271_821;
/// The maximum year of a date within the supported limits.
pub(crate) const MAX_ISO_YEAR: i32 = 275_760;

/// `IsoDateTime` is the record of the `IsoDate` and `IsoTime` slots.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDateTime {
    /// The date fields.
    pub date: IsoDate,
    /// The time fields.
    pub time: IsoTime,
}

impl IsoDateTime {
    /// Creates a new `IsoDateTime` without any validation.
    pub(crate) fn new_unchecked(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Creates a new validated `IsoDateTime` that is within the supported
    /// limits.
    pub fn new(date: IsoDate, time: IsoTime) -> TemporalResult<Self> {
        if !iso_dt_within_valid_limits(date, &time) {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateTimeOutOfRange));
        }
        Ok(Self::new_unchecked(date, time))
    }

    /// Returns whether the `IsoDateTime` is within valid limits.
    pub(crate) fn is_within_limits(&self) -> bool {
        iso_dt_within_valid_limits(self.date, &self.time)
    }

    /// Creates an `IsoDateTime` from epoch nanoseconds with a local offset.
    ///
    /// The nanoseconds must have been validated by an `Instant`; the local
    /// conversion itself never fails.
    pub(crate) fn from_epoch_nanos(epoch_nanoseconds: &EpochNanoseconds, offset: i64) -> Self {
        // 2. Let remainderNs be epochNanoseconds modulo 10^6.
        let remainder_nanos = epoch_nanoseconds.0.rem_euclid(1_000_000);

        // 3. Let epochMilliseconds be 𝔽((epochNanoseconds - remainderNs) / 10^6).
        let epoch_millis = (epoch_nanoseconds.0 - remainder_nanos).div_euclid(1_000_000) as i64;

        let (year, month, day) = utils::ymd_from_epoch_milliseconds(epoch_millis);

        // 7. Let hour be ℝ(! HourFromTime(epochMilliseconds)).
        let hour = epoch_millis.div_euclid(3_600_000).rem_euclid(24);
        // 8. Let minute be ℝ(! MinFromTime(epochMilliseconds)).
        let minute = epoch_millis.div_euclid(60_000).rem_euclid(60);
        // 9. Let second be ℝ(! SecFromTime(epochMilliseconds)).
        let second = epoch_millis.div_euclid(1000).rem_euclid(60);
        // 10. Let millisecond be ℝ(! msFromTime(epochMilliseconds)).
        let millis = epoch_millis.rem_euclid(1000);
        // 11. Let microsecond be floor(remainderNs / 1000).
        let micros = remainder_nanos.div_euclid(1000);
        // 13. Let nanosecond be remainderNs modulo 1000.
        let nanos = remainder_nanos.rem_euclid(1000) as i64;

        Self::balance(
            year,
            i32::from(month),
            i32::from(day),
            hour,
            minute,
            second,
            millis,
            micros,
            i128::from(nanos + offset),
        )
    }

    /// `BalanceISODateTime`
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn balance(
        year: i32,
        month: i32,
        day: i32,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
        microsecond: i128,
        nanosecond: i128,
    ) -> Self {
        let (overflow_day, time) =
            IsoTime::balance(hour, minute, second, millisecond, microsecond, nanosecond);
        let date = IsoDate::balance(year, month, day + overflow_day as i32);
        Self::new_unchecked(date, time)
    }

    /// Returns this `IsoDateTime` as (unvalidated) epoch nanoseconds.
    pub fn as_nanoseconds(&self) -> EpochNanoseconds {
        utc_epoch_nanos(self.date, &self.time)
    }

    /// `AddDateTime`: adds a date duration and a normalized time duration to
    /// this date-time.
    pub(crate) fn add_date_duration(
        &self,
        calendar: Calendar,
        date_duration: &DateDuration,
        norm: NormalizedTimeDuration,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        // 1. Assert: IsValidISODate(year, month, day) is true.
        // 2. Assert: ISODateTimeWithinLimits(...) is true.
        // 3. Let timeResult be AddTime(hour, minute, second, millisecond, microsecond, nanosecond, norm).
        let (time_overflow_days, time_result) = self.time.add(norm);

        // 5. Let dateDuration be ? CreateTemporalDuration(years, months, weeks, days + timeResult.[[Days]], ...).
        let date_duration = DateDuration::new(
            date_duration.years,
            date_duration.months,
            date_duration.weeks,
            date_duration
                .days
                .checked_add(time_overflow_days)
                .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationInvalid))?,
        )?;

        // 6. Let addedDate be ? CalendarDateAdd(calendar, datePart, dateDuration, overflow).
        let added_date = calendar.date_add(&self.date, &date_duration, overflow)?;

        // 7. Return the combined ISO date-time record.
        Ok(Self::new_unchecked(added_date.iso, time_result))
    }

    /// Rounds this date-time's time to the resolved increment, balancing any
    /// day carry into the date.
    pub(crate) fn round(&self, resolved_options: ResolvedRoundingOptions) -> TemporalResult<Self> {
        let (rounded_days, rounded_time) = self.time.round(resolved_options)?;
        let balance_result = IsoDate::try_balance(
            self.date.year,
            self.date.month.into(),
            i64::from(self.date.day) + rounded_days,
        )?;
        Self::new(balance_result, rounded_time)
    }

    /// `DifferenceISODateTime`
    pub(crate) fn diff(
        &self,
        other: &Self,
        calendar: Calendar,
        largest_unit: Unit,
    ) -> TemporalResult<NormalizedDurationRecord> {
        // 4. Let timeDuration be DifferenceTime(h1, min1, s1, ms1, mus1, ns1, h2, min2, s2, ms2, mus2, ns2).
        let mut time_duration = self.time.diff(&other.time);

        // 5. Let timeSign be TimeDurationSign(timeDuration).
        let time_sign = time_duration.sign() as i8;

        // 6. Let dateSign be CompareISODate(y2, mon2, d2, y1, mon1, d1).
        let date_sign = other.date.cmp(&self.date) as i32;
        // 7. Let adjustedDate be CreateISODateRecord(y2, mon2, d2).
        let mut adjusted_date = other.date;

        // 8. If timeSign = -dateSign, then
        if i32::from(time_sign) == -date_sign {
            // a. Set adjustedDate to BalanceISODate(adjustedDate.[[Year]], adjustedDate.[[Month]], adjustedDate.[[Day]] + timeSign).
            adjusted_date = IsoDate::balance(
                adjusted_date.year,
                i32::from(adjusted_date.month),
                i32::from(adjusted_date.day) + i32::from(time_sign),
            );
            // b. Set timeDuration to ? Add24HourDaysToTimeDuration(timeDuration, -timeSign).
            time_duration = time_duration.add_days(-i64::from(time_sign))?;
        }

        // 11. Let dateLargestUnit be LargerOfTwoUnits("day", largestUnit).
        let date_largest_unit = largest_unit.max(Unit::Day);

        // 14. Let dateDifference be ? CalendarDateUntil(calendar, date1, date2, dateLargestUnit).
        let date_diff = calendar.date_until(&self.date, &adjusted_date, date_largest_unit)?;

        // 16. If largestUnit is not dateLargestUnit, then
        let days = if largest_unit == date_largest_unit {
            // 15. Let days be dateDifference.[[Days]].
            date_diff.days
        } else {
            // a. Set timeDuration to ? Add24HourDaysToTimeDuration(timeDuration, dateDifference.[[Days]]).
            time_duration = time_duration.add_days(date_diff.days)?;
            // b. Set days to 0.
            0
        };

        // 17. Return ? CombineDateAndTimeDuration(dateDifference, timeDuration).
        NormalizedDurationRecord::new(
            DateDuration::new_unchecked(date_diff.years, date_diff.months, date_diff.weeks, days),
            time_duration,
        )
    }
}

// ==== `IsoDate` section ====

/// `IsoDate` serves as the record for the `[[ISOYear]]`, `[[ISOMonth]]`, and
/// `[[ISODay]]` internal fields.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDate {
    /// An ISO year within the range -271821..=275760
    pub year: i32,
    /// An ISO month within the range 1..=12
    pub month: u8,
    /// An ISO day within the range 1..=31
    pub day: u8,
}

impl IsoDate {
    /// Creates a new `IsoDate` without determining its validity.
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// `RegulateISODate`
    pub(crate) fn regulate(
        year: i32,
        month: u8,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        match overflow {
            Overflow::Constrain => {
                let month = month.clamp(1, 12);
                let day = constrain_iso_day(year, month, day);
                Ok(Self::new_unchecked(year, month, day))
            }
            Overflow::Reject => {
                if !is_valid_date(year, month, day) {
                    return Err(TemporalError::range().with_enum(ErrorMessage::IsoDateInvalid));
                }
                Ok(Self::new_unchecked(year, month, day))
            }
        }
    }

    /// Regulates the fields and checks the result against the supported
    /// limits.
    pub(crate) fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let date = Self::regulate(year, month, day, overflow)?;
        if !iso_dt_within_valid_limits(date, &IsoTime::noon()) {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        Ok(date)
    }

    /// `BalanceISODate`
    ///
    /// Normalizes out-of-range month and day fields by carrying through epoch
    /// days, which avoids any per-day or per-year stepping.
    pub(crate) fn balance(year: i32, month: i32, day: i32) -> Self {
        let epoch_days = iso_date_to_epoch_days(year, month, i64::from(day));
        let ms = utils::epoch_days_to_epoch_ms(epoch_days, 0);
        let (year, month, day) = utils::ymd_from_epoch_milliseconds(ms);
        Self::new_unchecked(year, month, day)
    }

    /// Balances while rejecting intermediates outside the supported epoch-day
    /// range, which would otherwise lose precision in the millisecond
    /// conversion.
    pub(crate) fn try_balance(year: i32, month: i32, day: i64) -> TemporalResult<Self> {
        let epoch_days = iso_date_to_epoch_days(year, month, day);
        if MAX_EPOCH_DAYS < epoch_days.abs() {
            return Err(TemporalError::range().with_enum(ErrorMessage::EpochDaysOutOfRange));
        }
        let ms = utils::epoch_days_to_epoch_ms(epoch_days, 0);
        let (year, month, day) = utils::ymd_from_epoch_milliseconds(ms);
        Ok(Self::new_unchecked(year, month, day))
    }

    /// `CheckISODaysRange`
    pub(crate) fn is_valid_day_range(&self) -> TemporalResult<()> {
        if self.to_epoch_days().abs() > 100_000_000 {
            return Err(TemporalError::range().with_enum(ErrorMessage::EpochDaysOutOfRange));
        }
        Ok(())
    }

    /// Returns this `IsoDate` as (unvalidated) epoch nanoseconds at midnight.
    #[inline]
    pub(crate) fn as_nanoseconds(&self) -> EpochNanoseconds {
        utc_epoch_nanos(*self, &IsoTime::default())
    }

    /// Functionally the same as Date's abstract operation `MakeDay`.
    #[inline]
    pub(crate) fn to_epoch_days(self) -> i64 {
        utils::epoch_days_from_gregorian_date(self.year, self.month, self.day)
    }

    /// Returns whether the current `IsoDate` holds valid fields.
    pub(crate) fn is_valid(self) -> bool {
        is_valid_date(self.year, self.month, self.day)
    }

    /// `AddISODate`
    ///
    /// Note the regulation order: the day is regulated against the
    /// year/month-shifted date before the week and day deltas are applied.
    /// `2021-05-31 + { months: -1, days: -1 }` constrains to `2021-04-30`
    /// first and lands on `2021-04-29`.
    pub(crate) fn add_date_duration(
        self,
        duration: &DateDuration,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        // 3. Let intermediate be ! BalanceISOYearMonth(year + years, month + months).
        let intermediate = balance_iso_year_month_with_clamp(
            i64::from(self.year) + duration.years,
            i64::from(self.month) + duration.months,
        );

        // 4. Let intermediate be ? RegulateISODate(intermediate.[[Year]], intermediate.[[Month]], day, overflow).
        let intermediate =
            Self::new_with_overflow(intermediate.0, intermediate.1, self.day, overflow)?;

        // 5. Set days to days + 7 × weeks.
        let additional_days = duration.days + 7 * duration.weeks;
        // 6. Let d be intermediate.[[Day]] + days.
        let day = i64::from(intermediate.day) + additional_days;

        // 7. Return BalanceISODate(intermediate.[[Year]], intermediate.[[Month]], d).
        Self::try_balance(intermediate.year, intermediate.month.into(), day)
    }

    /// `DifferenceISODate`
    ///
    /// The year and month counts are found by candidate round-trip addition:
    /// a candidate is applied with constrain semantics and its `midSign`
    /// against the target decides whether the candidate overshot. Because
    /// the round trip constrains, a month-end pair such as `01-31 .. 02-28`
    /// counts as exactly one month — a debatable but deliberate policy that
    /// callers depend on.
    pub(crate) fn diff_iso_date(
        &self,
        other: &Self,
        largest_unit: Unit,
    ) -> TemporalResult<DateDuration> {
        // 3. Let sign be -CompareISODate(y1, m1, d1, y2, m2, d2).
        let sign = -(self.cmp(other) as i8);
        // 4. If sign = 0, return ! CreateDateDurationRecord(0, 0, 0, 0).
        if sign == 0 {
            return Ok(DateDuration::default());
        };

        // 6. If largestUnit is "year" or "month", then
        if largest_unit == Unit::Year || largest_unit == Unit::Month {
            // d. Let years be end.[[Year]] - start.[[Year]].
            let mut years = i64::from(other.year) - i64::from(self.year);
            // e. Let mid be ! AddISODate(y1, m1, d1, years, 0, 0, 0, "constrain").
            let mut mid = self.add_date_duration(
                &DateDuration::new_unchecked(years, 0, 0, 0),
                Overflow::Constrain,
            )?;
            // f. Let midSign be -CompareISODate(mid, y2, m2, d2).
            let mut mid_sign = -(mid.cmp(other) as i8);
            // g. If midSign is 0, the year candidate lands exactly.
            if mid_sign == 0 {
                return if largest_unit == Unit::Year {
                    DateDuration::new(years, 0, 0, 0)
                } else {
                    DateDuration::new(0, years * 12, 0, 0)
                };
            }
            // h. Let months be end.[[Month]] - start.[[Month]].
            let mut months = i64::from(other.month) - i64::from(self.month);
            // i. If midSign does not match, the year candidate overshot by
            //    the sign of the overall difference.
            if mid_sign != sign {
                years -= i64::from(sign);
                months += i64::from(sign) * 12;
            }
            // j-k. Re-anchor with the month candidate.
            mid = self.add_date_duration(
                &DateDuration::new_unchecked(years, months, 0, 0),
                Overflow::Constrain,
            )?;
            mid_sign = -(mid.cmp(other) as i8);
            // l. If midSign is 0, the month candidate lands exactly.
            if mid_sign == 0 {
                return if largest_unit == Unit::Year {
                    DateDuration::new(years, months, 0, 0)
                } else {
                    DateDuration::new(0, months + years * 12, 0, 0)
                };
            }
            // m. If midSign does not match, the month candidate overshot.
            if mid_sign != sign {
                months -= i64::from(sign);
                mid = self.add_date_duration(
                    &DateDuration::new_unchecked(years, months, 0, 0),
                    Overflow::Constrain,
                )?;
            }

            // n-o. The remaining days span less than one calendar month.
            let days = if mid.month == other.month {
                debug_assert_eq!(mid.year, other.year);
                i64::from(other.day) - i64::from(mid.day)
            } else if sign < 0 {
                -(i64::from(mid.day)
                    + i64::from(utils::iso_days_in_month(other.year, other.month))
                    - i64::from(other.day))
            } else {
                i64::from(other.day)
                    + i64::from(utils::iso_days_in_month(mid.year, mid.month))
                    - i64::from(mid.day)
            };

            // p. For a month largest unit, fold the years into the months.
            if largest_unit == Unit::Month {
                months += years * 12;
                years = 0;
            }
            return DateDuration::new(years, months, 0, days);
        }

        // The week/day largest units are an exact epoch-day difference.
        let days = other.to_epoch_days() - self.to_epoch_days();
        let (weeks, days) = if largest_unit == Unit::Week {
            (days / 7, days % 7)
        } else {
            (0, days)
        };
        DateDuration::new(0, 0, weeks, days)
    }
}

// ==== `IsoTime` section ====

/// An `IsoTime` record that contains the time slots.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoTime {
    /// A valid hour value between 0..=23
    pub hour: u8,
    /// A valid minute value between 0..=59
    pub minute: u8,
    /// A valid second value between 0..=59
    pub second: u8,
    /// A valid millisecond value between 0..=999
    pub millisecond: u16,
    /// A valid microsecond value between 0..=999
    pub microsecond: u16,
    /// A valid nanosecond value between 0..=999
    pub nanosecond: u16,
}

impl IsoTime {
    /// Creates a new `IsoTime` without any validation.
    pub(crate) fn new_unchecked(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        }
    }

    /// `RegulateTime`: creates a new `IsoTime`, constraining or rejecting
    /// each field independently.
    pub fn new(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        overflow: Overflow,
    ) -> TemporalResult<IsoTime> {
        match overflow {
            Overflow::Constrain => {
                let hour = hour.clamp(0, 23) as u8;
                let minute = minute.clamp(0, 59) as u8;
                let second = second.clamp(0, 59) as u8;
                let millisecond = millisecond.clamp(0, 999) as u16;
                let microsecond = microsecond.clamp(0, 999) as u16;
                let nanosecond = nanosecond.clamp(0, 999) as u16;
                Ok(Self::new_unchecked(
                    hour,
                    minute,
                    second,
                    millisecond,
                    microsecond,
                    nanosecond,
                ))
            }
            Overflow::Reject => {
                if !is_valid_time(hour, minute, second, millisecond, microsecond, nanosecond) {
                    return Err(TemporalError::range().with_enum(ErrorMessage::IsoTimeInvalid));
                };
                Ok(Self::new_unchecked(
                    hour as u8,
                    minute as u8,
                    second as u8,
                    millisecond as u16,
                    microsecond as u16,
                    nanosecond as u16,
                ))
            }
        }
    }

    /// Creates a new `IsoTime` with any missing fields taken from `self`.
    #[inline]
    pub(crate) fn with(&self, partial: PartialTime, overflow: Overflow) -> TemporalResult<Self> {
        let hour = partial.hour.unwrap_or(self.hour.into());
        let minute = partial.minute.unwrap_or(self.minute.into());
        let second = partial.second.unwrap_or(self.second.into());
        let millisecond = partial.millisecond.unwrap_or(self.millisecond.into());
        let microsecond = partial.microsecond.unwrap_or(self.microsecond.into());
        let nanosecond = partial.nanosecond.unwrap_or(self.nanosecond.into());
        Self::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )
    }

    /// Returns an `IsoTime` set to 12:00:00.
    pub(crate) const fn noon() -> Self {
        Self {
            hour: 12,
            minute: 0,
            second: 0,
            millisecond: 0,
            microsecond: 0,
            nanosecond: 0,
        }
    }

    /// Creates an `IsoTime` from a parsed time record.
    pub(crate) fn from_time_record(time_record: TimeRecord) -> TemporalResult<Self> {
        // A parsed :60 leap second is clamped.
        let second = time_record.second.clamp(0, 59);
        let fractional_seconds = time_record
            .fraction
            .map(|fraction| {
                fraction.to_nanoseconds().ok_or(
                    TemporalError::range()
                        .with_enum(ErrorMessage::FractionalTimeMoreThanNineDigits),
                )
            })
            .transpose()?
            .unwrap_or(0);

        let (millisecond, rem) = fractional_seconds.div_rem_euclid(&1_000_000);
        let (microsecond, nanosecond) = rem.div_rem_euclid(&1_000);

        Self::new(
            i32::from(time_record.hour),
            i32::from(time_record.minute),
            i32::from(second),
            millisecond as i32,
            microsecond as i32,
            nanosecond as i32,
            Overflow::Reject,
        )
    }

    /// `BalanceTime`: balances the provided values into a valid time,
    /// returning the carried day count.
    pub(crate) fn balance(
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
        microsecond: i128,
        nanosecond: i128,
    ) -> (i64, Self) {
        // 1. Set microsecond to microsecond + floor(nanosecond / 1000).
        // 2. Set nanosecond to nanosecond modulo 1000.
        let (quotient, nanosecond) = (nanosecond.div_euclid(1000), nanosecond.rem_euclid(1000));
        let microsecond = microsecond + quotient;

        // 3. Set millisecond to millisecond + floor(microsecond / 1000).
        // 4. Set microsecond to microsecond modulo 1000.
        let (quotient, microsecond) = (microsecond.div_euclid(1000), microsecond.rem_euclid(1000));
        let millisecond = millisecond + quotient as i64;

        // 5. Set second to second + floor(millisecond / 1000).
        // 6. Set millisecond to millisecond modulo 1000.
        let (quotient, millisecond) = div_mod(millisecond, 1000);
        let second = second + quotient;

        // 7. Set minute to minute + floor(second / 60).
        // 8. Set second to second modulo 60.
        let (quotient, second) = div_mod(second, 60);
        let minute = minute + quotient;

        // 9. Set hour to hour + floor(minute / 60).
        // 10. Set minute to minute modulo 60.
        let (quotient, minute) = div_mod(minute, 60);
        let hour = hour + quotient;

        // 11. Let days be floor(hour / 24).
        // 12. Set hour to hour modulo 24.
        let (days, hour) = div_mod(hour, 24);

        let time = Self::new_unchecked(
            hour as u8,
            minute as u8,
            second as u8,
            millisecond as u16,
            microsecond as u16,
            nanosecond as u16,
        );

        (days, time)
    }

    /// `DifferenceTime`: the signed field-wise difference from `self` to
    /// `other` as a normalized time duration.
    pub(crate) fn diff(&self, other: &Self) -> NormalizedTimeDuration {
        NormalizedTimeDuration::from_components(
            i64::from(other.hour) - i64::from(self.hour),
            i64::from(other.minute) - i64::from(self.minute),
            i64::from(other.second) - i64::from(self.second),
            i64::from(other.millisecond) - i64::from(self.millisecond),
            i128::from(other.microsecond) - i128::from(self.microsecond),
            i128::from(other.nanosecond) - i128::from(self.nanosecond),
        )
    }

    /// `RoundTime`: rounds the current `IsoTime`, returning the carried day
    /// count (0 or 1 for increment-valid inputs) and the rounded time.
    pub(crate) fn round(
        &self,
        resolved_options: ResolvedRoundingOptions,
    ) -> TemporalResult<(i64, Self)> {
        // 1-6. Let quantity be the time in smallestUnit-anchored units.
        let quantity = match resolved_options.smallest_unit {
            Unit::Day | Unit::Hour => {
                let minutes = i128::from(self.hour) * 60 + i128::from(self.minute);
                let seconds = minutes * 60 + i128::from(self.second);
                let millis = seconds * 1000 + i128::from(self.millisecond);
                let micros = millis * 1000 + i128::from(self.microsecond);
                micros * 1000 + i128::from(self.nanosecond)
            }
            Unit::Minute => {
                let seconds = i128::from(self.minute) * 60 + i128::from(self.second);
                let millis = seconds * 1000 + i128::from(self.millisecond);
                let micros = millis * 1000 + i128::from(self.microsecond);
                micros * 1000 + i128::from(self.nanosecond)
            }
            Unit::Second => {
                let millis = i128::from(self.second) * 1000 + i128::from(self.millisecond);
                let micros = millis * 1000 + i128::from(self.microsecond);
                micros * 1000 + i128::from(self.nanosecond)
            }
            Unit::Millisecond => {
                let micros = i128::from(self.millisecond) * 1000 + i128::from(self.microsecond);
                micros * 1000 + i128::from(self.nanosecond)
            }
            Unit::Microsecond => {
                i128::from(self.microsecond) * 1000 + i128::from(self.nanosecond)
            }
            Unit::Nanosecond => i128::from(self.nanosecond),
            _ => {
                return Err(TemporalError::range()
                    .with_message("Invalid smallestUnit value for time rounding."))
            }
        };

        // 7. Let unitLength be the length of smallestUnit in nanoseconds.
        let length = resolved_options
            .smallest_unit
            .as_nanoseconds()
            .temporal_unwrap()?;

        let increment = resolved_options
            .increment
            .as_extended_increment()
            .checked_mul(length)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::IncrementInvalid))?;

        // 8. Let result be RoundNumberToIncrement(quantity, increment × unitLength, roundingMode) / unitLength.
        let result = IncrementRounder::<i128>::from_signed_num(quantity, increment)?
            .round(resolved_options.rounding_mode)
            / length.get() as i128;

        let result_i64 = i64::from_i128(result)
            .ok_or(TemporalError::range().with_message("round result exceeded a valid range."))?;

        match resolved_options.smallest_unit {
            // 9. If unit is "day", the result is a day count with a zeroed time.
            Unit::Day => Ok((result_i64, Self::default())),
            // 10. If unit is "hour", return BalanceTime(result, 0, 0, 0, 0, 0).
            Unit::Hour => Ok(Self::balance(result_i64, 0, 0, 0, 0, 0)),
            Unit::Minute => Ok(Self::balance(self.hour.into(), result_i64, 0, 0, 0, 0)),
            Unit::Second => Ok(Self::balance(
                self.hour.into(),
                self.minute.into(),
                result_i64,
                0,
                0,
                0,
            )),
            Unit::Millisecond => Ok(Self::balance(
                self.hour.into(),
                self.minute.into(),
                self.second.into(),
                result_i64,
                0,
                0,
            )),
            Unit::Microsecond => Ok(Self::balance(
                self.hour.into(),
                self.minute.into(),
                self.second.into(),
                self.millisecond.into(),
                result_i64.into(),
                0,
            )),
            Unit::Nanosecond => Ok(Self::balance(
                self.hour.into(),
                self.minute.into(),
                self.second.into(),
                self.millisecond.into(),
                self.microsecond.into(),
                result_i64.into(),
            )),
            _ => Err(TemporalError::assert()),
        }
    }

    /// `AddTime`
    pub(crate) fn add(&self, norm: NormalizedTimeDuration) -> (i64, Self) {
        // 1. Set second to second + TimeDurationSeconds(norm).
        let seconds = i64::from(self.second) + norm.seconds();
        // 2. Set nanosecond to nanosecond + TimeDurationSubseconds(norm).
        let nanos = i64::from(self.nanosecond) + i64::from(norm.subseconds());
        // 3. Return BalanceTime(hour, minute, second, millisecond, microsecond, nanosecond).
        Self::balance(
            self.hour.into(),
            self.minute.into(),
            seconds,
            self.millisecond.into(),
            self.microsecond.into(),
            nanos.into(),
        )
    }

    /// Functionally the same as Date's `MakeTime`.
    pub(crate) fn to_epoch_ms(self) -> i64 {
        i64::from(self.hour) * utils::MS_PER_HOUR
            + i64::from(self.minute) * utils::MS_PER_MINUTE
            + i64::from(self.second) * 1000
            + i64::from(self.millisecond)
    }
}

// ==== `IsoDateTime` specific utility functions ====

const MAX_EPOCH_DAYS: i64 = 10i64.pow(8) + 1;

/// `ISODateTimeWithinLimits`
///
/// The boundary is deliberately asymmetric. The lower endpoint is the
/// minimum instant itself, exclusive: midnight on -271821-04-20 is outside
/// the limits while any later nanosecond of that day is inside. The upper
/// endpoint pads the maximum instant by one calendar day of time zone slop,
/// so the entirety of 275760-09-13 is inside and the following midnight is
/// not.
#[inline]
fn iso_dt_within_valid_limits(date: IsoDate, time: &IsoTime) -> bool {
    if utils::epoch_days_from_gregorian_date(date.year, date.month, date.day).abs() > MAX_EPOCH_DAYS
    {
        return false;
    }

    let ns = to_unchecked_epoch_nanoseconds(date, time);
    let max = crate::NS_MAX_INSTANT + i128::from(NS_PER_DAY);
    let min = crate::NS_MIN_INSTANT;

    min < ns && max > ns
}

/// `ISODateWithinLimits`, with the month clamped in place of a day.
#[inline]
pub(crate) fn year_month_within_limits(year: i32, month: u8) -> bool {
    if !(MIN_ISO_YEAR..=MAX_ISO_YEAR).contains(&year) {
        return false;
    } else if year == MIN_ISO_YEAR && month < 4 {
        return false;
    } else if year == MAX_ISO_YEAR && month > 9 {
        return false;
    }
    true
}

#[inline]
fn utc_epoch_nanos(date: IsoDate, time: &IsoTime) -> EpochNanoseconds {
    EpochNanoseconds::from(to_unchecked_epoch_nanoseconds(date, time))
}

#[inline]
fn to_unchecked_epoch_nanoseconds(date: IsoDate, time: &IsoTime) -> i128 {
    let ms = time.to_epoch_ms();
    let epoch_ms = utils::epoch_days_to_epoch_ms(date.to_epoch_days(), ms);
    i128::from(epoch_ms) * 1_000_000
        + i128::from(time.microsecond) * 1_000
        + i128::from(time.nanosecond)
}

// ==== `IsoDate` specific utility functions ====

/// Returns the epoch days for the given year, (1-indexed) month, and day,
/// carrying arbitrary month overflow into the year euclideanly.
#[inline]
pub(crate) fn iso_date_to_epoch_days(year: i32, month: i32, day: i64) -> i64 {
    // 1. Let resolvedYear be year + floor(month / 12).
    let resolved_year = year + month.div_euclid(12);
    // 2. Let resolvedMonth be month modulo 12.
    let resolved_month = month.rem_euclid(12) as u8;

    // 3. Find a time t such that EpochTimeToEpochYear(t) is resolvedYear,
    //    EpochTimeToMonthInYear(t) is resolvedMonth, and EpochTimeToDate(t) is 1.
    let epoch_days = utils::epoch_days_from_gregorian_date(resolved_year, resolved_month, 1);

    // 4. Return EpochTimeToDayNumber(t) + date - 1.
    epoch_days + day - 1
}

/// `IsValidISODate`
#[inline]
pub(crate) fn is_valid_date(year: i32, month: u8, day: u8) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    is_valid_iso_day(year, month, day)
}

/// `BalanceISOYearMonth` over i64 intermediates, clamping the year into the
/// i32 range; any clamped value fails the later limits check.
fn balance_iso_year_month_with_clamp(year: i64, month: i64) -> (i32, u8) {
    let y = year + (month - 1).div_euclid(12);
    let m = (month - 1).rem_euclid(12) + 1;
    (y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32, m as u8)
}

/// Note: month is 1 based.
#[inline]
pub(crate) fn constrain_iso_day(year: i32, month: u8, day: u8) -> u8 {
    let days_in_month = utils::iso_days_in_month(year, month);
    day.clamp(1, days_in_month)
}

#[inline]
pub(crate) fn is_valid_iso_day(year: i32, month: u8, day: u8) -> bool {
    let days_in_month = utils::iso_days_in_month(year, month);
    (1..=days_in_month).contains(&day)
}

// ==== `IsoTime` specific utilities ====

#[inline]
pub(crate) fn is_valid_time(
    hour: i32,
    minute: i32,
    second: i32,
    millisecond: i32,
    microsecond: i32,
    nanosecond: i32,
) -> bool {
    if !(0..=23).contains(&hour) {
        return false;
    }

    let minute_second = 0..=59;
    if !minute_second.contains(&minute) || !minute_second.contains(&second) {
        return false;
    }

    let sub_second = 0..=999;
    sub_second.contains(&millisecond)
        && sub_second.contains(&microsecond)
        && sub_second.contains(&nanosecond)
}

#[inline]
fn div_mod(dividend: i64, divisor: i64) -> (i64, i64) {
    (dividend.div_euclid(divisor), dividend.rem_euclid(divisor))
}

#[cfg(test)]
mod tests {
    use super::{IsoDate, IsoDateTime, IsoTime};

    #[test]
    fn balance_carries_month_overflow() {
        assert_eq!(IsoDate::balance(2021, 13, 1), IsoDate::new_unchecked(2022, 1, 1));
        assert_eq!(IsoDate::balance(2021, 1, 0), IsoDate::new_unchecked(2020, 12, 31));
        assert_eq!(IsoDate::balance(2021, 0, 31), IsoDate::new_unchecked(2020, 12, 31));
        assert_eq!(IsoDate::balance(2020, 1, 400), IsoDate::new_unchecked(2021, 2, 3));
    }

    #[test]
    fn balance_round_trips_valid_dates() {
        for (year, month, day) in [(2021, 7, 16), (2020, 2, 29), (1972, 12, 31), (1, 1, 1)] {
            let balanced = IsoDate::balance(year, i32::from(month), i32::from(day));
            assert_eq!(balanced, IsoDate::new_unchecked(year, month, day));
        }
    }

    #[test]
    fn datetime_limits_are_asymmetric() {
        let min_date = IsoDate::new_unchecked(-271_821, 4, 20);
        let just_under = IsoDate::new_unchecked(-271_821, 4, 19);
        let max_date = IsoDate::new_unchecked(275_760, 9, 13);
        let past_max = IsoDate::new_unchecked(275_760, 9, 14);

        // Midnight at the lower bound is invalid; one nanosecond later is valid.
        let midnight = IsoTime::default();
        let one_nano = IsoTime::new_unchecked(0, 0, 0, 0, 0, 1);
        let last_nano = IsoTime::new_unchecked(23, 59, 59, 999, 999, 999);

        assert!(IsoDateTime::new(min_date, midnight).is_err());
        assert!(IsoDateTime::new(min_date, one_nano).is_ok());
        assert!(IsoDateTime::new(just_under, last_nano).is_err());

        // The entire final day is valid; the following midnight is not.
        assert!(IsoDateTime::new(max_date, last_nano).is_ok());
        assert!(IsoDateTime::new(max_date, midnight).is_ok());
        assert!(IsoDateTime::new(past_max, midnight).is_err());
    }

    #[test]
    fn time_balance_carries_days() {
        let (days, time) = IsoTime::balance(25, 0, 0, 0, 0, 0);
        assert_eq!(days, 1);
        assert_eq!(time.hour, 1);

        let (days, time) = IsoTime::balance(0, 0, 0, 0, 0, -1);
        assert_eq!(days, -1);
        assert_eq!(
            time,
            IsoTime::new_unchecked(23, 59, 59, 999, 999, 999)
        );
    }
}
