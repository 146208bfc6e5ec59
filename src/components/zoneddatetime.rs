//! The `ZonedDateTime` component: an instant viewed through a time zone and
//! calendar.

use core::cmp::Ordering;
use core::num::NonZeroU128;

use ixdtf::records::UtcOffsetRecordOrZ;
use tinystr::TinyAsciiStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode},
        duration::normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
        timezone::{format_offset_minutes, TimeZone, UtcOffset},
        Duration, Instant, PartialDate, PartialTime, PlainDate, PlainDateTime, PlainTime,
    },
    error::ErrorMessage,
    fields::{prepare_calendar_fields, FieldBag, FieldMap},
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, Disambiguation, DisplayCalendar, DisplayOffset,
        DisplayTimeZone, OffsetDisambiguation, Overflow, ResolvedRoundingOptions,
        RoundingIncrement, RoundingMode, RoundingOptions, ToStringRoundingOptions, Unit,
        UnitGroup,
    },
    parsers::{self, IxdtfStringBuilder},
    primitive::FiniteF64,
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    time::EpochNanoseconds,
    Sign, TemporalError, TemporalResult, TemporalUnwrap,
};

use super::instant::combined_subseconds;

/// A partial `ZonedDateTime`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartialZonedDateTime {
    /// The `PartialDate` portion.
    pub date: PartialDate,
    /// The `PartialTime` portion.
    pub time: PartialTime,
    /// An optional UTC offset.
    pub offset: Option<UtcOffset>,
    /// The time zone value.
    pub timezone: Option<TimeZone>,
}

impl PartialZonedDateTime {
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.time.is_empty()
            && self.offset.is_none()
            && self.timezone.is_none()
    }

    pub const fn with_date(mut self, date: PartialDate) -> Self {
        self.date = date;
        self
    }

    pub const fn with_time(mut self, time: PartialTime) -> Self {
        self.time = time;
        self
    }

    pub const fn with_offset(mut self, offset: Option<UtcOffset>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_timezone(mut self, timezone: Option<TimeZone>) -> Self {
        self.timezone = timezone;
        self
    }
}

/// The native Rust implementation of a Temporal zoned date-time.
///
/// A `ZonedDateTime` stores only an instant, a calendar, and a time zone.
/// The instant is the single source of truth; every local field is freshly
/// derived through the zone, so nothing can go stale across a time zone or
/// calendar change.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedDateTime {
    instant: Instant,
    calendar: Calendar,
    tz: TimeZone,
}

// ==== Private API ====

impl ZonedDateTime {
    /// Creates a `ZonedDateTime` without validating the input.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(instant: Instant, calendar: Calendar, tz: TimeZone) -> Self {
        Self {
            instant,
            calendar,
            tz,
        }
    }

    /// `AddZonedDateTime`
    pub(crate) fn add_as_instant(
        &self,
        duration: &Duration,
        overflow: Overflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Instant> {
        // 1. If DateDurationSign(duration.[[Date]]) = 0, then
        if duration.date().sign() == Sign::Zero {
            // a. Return ? AddInstant(epochNanoseconds, duration.[[Time]]).
            return self.instant.add_time_duration(duration.to_normalized_time());
        }
        // 2. Let isoDateTime be GetISODateTimeFor(timeZone, epochNanoseconds).
        let iso_datetime = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        // 3. Let addedDate be ? CalendarDateAdd(calendar, isoDateTime.[[ISODate]], duration.[[Date]], overflow).
        let added_date = self
            .calendar
            .date_add(&iso_datetime.date, &duration.date(), overflow)?;
        // 4. Let intermediateDateTime be CombineISODateAndTimeRecord(addedDate, isoDateTime.[[Time]]).
        let intermediate = IsoDateTime::new_unchecked(added_date.iso, iso_datetime.time);
        // 5. If ISODateTimeWithinLimits(intermediateDateTime) is false, throw a RangeError exception.
        if !intermediate.is_within_limits() {
            return Err(
                TemporalError::range().with_enum(ErrorMessage::IntermediateDateTimeOutOfRange)
            );
        }
        // 6. Let intermediateNs be ! GetEpochNanosecondsFor(timeZone, intermediateDateTime, compatible).
        let intermediate_ns = self.tz.get_epoch_nanoseconds_for(
            intermediate,
            Disambiguation::Compatible,
            provider,
        )?;

        // 7. Return ? AddInstant(intermediateNs, duration.[[Time]]).
        Instant::from(intermediate_ns).add_time_duration(duration.to_normalized_time())
    }

    /// `AddDurationToZonedDateTime`
    fn add_internal(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let epoch_ns =
            self.add_as_instant(duration, overflow.unwrap_or_default(), provider)?;
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.tz.clone(),
        ))
    }

    /// `DifferenceZonedDateTimeWithRounding`
    pub(crate) fn diff_with_rounding(
        &self,
        other: &Self,
        resolved_options: ResolvedRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<NormalizedDurationRecord> {
        // 1. If UnitCategory(largestUnit) is time, the instants difference
        // suffices.
        if resolved_options.largest_unit.is_time_unit() {
            return self
                .instant
                .diff_instant_internal(&other.instant, resolved_options);
        }
        // 2. Let difference be ? DifferenceZonedDateTime(ns1, ns2, timeZone, calendar, largestUnit).
        let diff = self.diff_zoned_datetime(other, resolved_options.largest_unit, provider)?;
        // 3. If smallestUnit is nanosecond and roundingIncrement = 1, return difference.
        if resolved_options.smallest_unit == Unit::Nanosecond
            && resolved_options.increment == RoundingIncrement::ONE
        {
            return Ok(diff);
        }
        // 4. Let dateTime be GetISODateTimeFor(timeZone, ns1).
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        // 5. Return ? RoundRelativeDuration(difference, ns2, dateTime, timeZone, calendar, ...).
        let anchor = PlainDateTime::new_unchecked(iso, self.calendar);
        let (rounded, _) = diff.round_relative_duration(
            other.instant.as_i128(),
            &anchor,
            Some((&self.tz, provider)),
            resolved_options,
        )?;
        // Convert back into a normalized record for the caller to balance.
        NormalizedDurationRecord::new(rounded.date(), rounded.to_normalized_time())
    }

    /// `DifferenceZonedDateTimeWithTotal`
    pub(crate) fn diff_with_total(
        &self,
        other: &Self,
        unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<FiniteF64> {
        // 1. If UnitCategory(unit) is time, total the instant difference.
        if unit.is_time_unit() {
            let diff = NormalizedTimeDuration::from_nanosecond_difference(
                other.instant.as_i128(),
                self.instant.as_i128(),
            )?;
            return diff.total(unit);
        }

        // 2. Let difference be ? DifferenceZonedDateTime(ns1, ns2, timeZone, calendar, unit).
        let diff = self.diff_zoned_datetime(other, unit, provider)?;
        // 3. Let dateTime be GetISODateTimeFor(timeZone, ns1).
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        // 4. Return ? TotalRelativeDuration(difference, ns2, dateTime, timeZone, calendar, unit).
        let anchor = PlainDateTime::new_unchecked(iso, self.calendar);
        diff.total_relative_duration(
            other.instant.as_i128(),
            &anchor,
            Some((&self.tz, provider)),
            unit,
        )
    }

    /// `DifferenceZonedDateTime`
    ///
    /// Local-to-instant conversion is not bijective near an offset
    /// transition, so the day difference is searched over a small candidate
    /// window; the sign-consistent candidate wins.
    pub(crate) fn diff_zoned_datetime(
        &self,
        other: &Self,
        largest_unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<NormalizedDurationRecord> {
        // 1. If ns1 = ns2, return CombineDateAndTimeDuration(ZeroDateDuration(), 0).
        if self.instant == other.instant {
            return Ok(NormalizedDurationRecord::default());
        }
        // 2-3. Let startDateTime/endDateTime be the local date-times.
        let start = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        let end = self.tz.get_iso_datetime_for(&other.instant, provider)?;
        // 4. If ns2 - ns1 < 0, let sign be -1; else let sign be 1.
        let sign = if other.instant.as_i128() - self.instant.as_i128() < 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        // 5. If sign = 1, let maxDayCorrection be 2; else let maxDayCorrection be 1.
        let max_correction = if sign == Sign::Positive { 2 } else { 1 };
        // 7. Let timeDuration be DifferenceTime(startDateTime.[[Time]], endDateTime.[[Time]]).
        let time = start.time.diff(&end.time);
        // 8. If TimeDurationSign(timeDuration) = -sign, set dayCorrection to dayCorrection + 1.
        let mut day_correction: i8 = if time.sign() as i8 == -sign.as_sign_multiplier() {
            1
        } else {
            0
        };

        // 9-10. Search the candidate day shifts for a sign-consistent
        // residual.
        let mut intermediate_date_time = IsoDateTime::default();
        let mut time_duration = NormalizedTimeDuration::default();
        let mut success = false;
        while day_correction <= max_correction && !success {
            // a. Let intermediateDate be BalanceISODate(end.[[Year]], end.[[Month]], end.[[Day]] - dayCorrection × sign).
            let intermediate = IsoDate::balance(
                end.date.year,
                i32::from(end.date.month),
                i32::from(end.date.day) - i32::from(day_correction * sign.as_sign_multiplier()),
            );
            // b. Let intermediateDateTime be CombineISODateAndTimeRecord(intermediateDate, startDateTime.[[Time]]).
            intermediate_date_time = IsoDateTime::new_unchecked(intermediate, start.time);
            // c. Let intermediateNs be ? GetEpochNanosecondsFor(timeZone, intermediateDateTime, compatible).
            let intermediate_ns = self.tz.get_epoch_nanoseconds_for(
                intermediate_date_time,
                Disambiguation::Compatible,
                provider,
            )?;
            // d. Set timeDuration to TimeDurationFromEpochNanosecondsDifference(ns2, intermediateNs).
            time_duration = NormalizedTimeDuration::from_nanosecond_difference(
                other.instant.as_i128(),
                intermediate_ns.0,
            )?;
            // e-f. A residual not opposing the overall sign is a success.
            if time_duration.sign() as i8 != -sign.as_sign_multiplier() {
                success = true;
            }
            // g. Set dayCorrection to dayCorrection + 1.
            day_correction += 1;
        }
        // 11. Assert: success is true.
        //
        // Running out of candidates means the engine's own conversions
        // disagree with each other; never silently return a wrong result.
        if !success {
            return Err(
                TemporalError::assert().with_enum(ErrorMessage::ZonedDiffDayCorrectionExhausted)
            );
        }
        // 12. Let dateLargestUnit be LargerOfTwoUnits(largestUnit, day).
        let date_largest = largest_unit.max(Unit::Day);
        // 13. Let dateDifference be CalendarDateUntil(calendar, start.[[ISODate]], intermediate.[[ISODate]], dateLargestUnit).
        let date_diff =
            self.calendar
                .date_until(&start.date, &intermediate_date_time.date, date_largest)?;
        // 14. Return CombineDateAndTimeDuration(dateDifference, timeDuration).
        NormalizedDurationRecord::new(date_diff, time_duration)
    }

    /// `DifferenceTemporalZonedDateTime`
    fn diff_internal(
        &self,
        op: DifferenceOperation,
        other: &Self,
        options: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }

        // 4. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, datetime, « », nanosecond, hour).
        let resolved_options = ResolvedRoundingOptions::from_diff_settings(
            options,
            op,
            UnitGroup::DateTime,
            Unit::Hour,
            Unit::Nanosecond,
        )?;

        // 5. If UnitCategory(settings.[[LargestUnit]]) is time, the
        // difference never round-trips through local time.
        if resolved_options.largest_unit.is_time_unit() {
            let internal = self
                .instant
                .diff_instant_internal(&other.instant, resolved_options)?;
            let result = Duration::from_normalized(internal, resolved_options.largest_unit)?;
            return match op {
                DifferenceOperation::Since => Ok(result.negated()),
                DifferenceOperation::Until => Ok(result),
            };
        }

        // 7. Day lengths can vary between time zones; date-unit differences
        // require the same zone.
        if self.tz != other.tz {
            return Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneMismatch));
        }

        // 8. If the instants are equal, return a zero duration.
        if self.instant == other.instant {
            return Ok(Duration::default());
        }

        // 9-10. Difference with rounding, balancing time through hours.
        let internal = self.diff_with_rounding(other, resolved_options, provider)?;
        let result = Duration::from_normalized(internal, Unit::Hour)?;
        match op {
            DifferenceOperation::Since => Ok(result.negated()),
            DifferenceOperation::Until => Ok(result),
        }
    }
}

// ==== Public API ====

impl ZonedDateTime {
    /// Creates a new valid `ZonedDateTime`.
    #[inline]
    pub fn try_new(nanos: i128, calendar: Calendar, time_zone: TimeZone) -> TemporalResult<Self> {
        let instant = Instant::try_new(nanos)?;
        Ok(Self::new_unchecked(instant, calendar, time_zone))
    }

    /// Creates a new valid ISO `ZonedDateTime`.
    #[inline]
    pub fn try_new_iso(nanos: i128, time_zone: TimeZone) -> TemporalResult<Self> {
        Self::try_new(nanos, Calendar::default(), time_zone)
    }

    /// Returns this `ZonedDateTime`'s [`Calendar`].
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Returns this `ZonedDateTime`'s [`TimeZone`].
    #[inline]
    #[must_use]
    pub fn timezone(&self) -> &TimeZone {
        &self.tz
    }

    /// Returns the `epochMilliseconds` value.
    #[inline]
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.instant.epoch_milliseconds()
    }

    /// Returns the `epochNanoseconds` value.
    #[inline]
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> EpochNanoseconds {
        self.instant.epoch_nanoseconds()
    }

    /// Returns this `ZonedDateTime` as an [`Instant`].
    #[inline]
    #[must_use]
    pub fn to_instant(&self) -> Instant {
        self.instant
    }

    /// Creates a `ZonedDateTime` from a [`PartialZonedDateTime`].
    pub fn from_partial_with_provider(
        partial: PartialZonedDateTime,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let overflow = overflow.unwrap_or_default();
        let disambiguation = disambiguation.unwrap_or_default();
        let offset_option = offset_option.unwrap_or(OffsetDisambiguation::Reject);

        let date = partial
            .date
            .calendar
            .date_from_partial(&partial.date, overflow)?
            .iso;
        let time = if partial.time.is_empty() {
            None
        } else {
            Some(IsoTime::default().with(partial.time, overflow)?)
        };

        let offset_nanos = partial.offset.map(|offset| offset.nanoseconds());
        let timezone = partial.timezone.unwrap_or_default();

        let epoch_nanos = interpret_isodatetime_offset(
            date,
            time,
            false,
            offset_nanos,
            &timezone,
            disambiguation,
            offset_option,
            true,
            provider,
        )?;

        Ok(Self::new_unchecked(
            Instant::from(epoch_nanos),
            partial.date.calendar,
            timezone,
        ))
    }

    /// Creates a `ZonedDateTime` from a raw [`FieldBag`], applying the
    /// fixed-order field preparation including the offset and time zone
    /// fields.
    pub fn from_field_bag_with_provider(
        calendar: Calendar,
        bag: &FieldBag,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let prepared = prepare_calendar_fields(
            calendar,
            bag,
            FieldMap::all(),
            FieldMap::DAY | FieldMap::TIME_ZONE | FieldMap::YEAR,
            false,
        )?;
        let timezone = prepared.time_zone.temporal_unwrap()?;
        Self::from_partial_with_provider(
            PartialZonedDateTime {
                date: prepared.date,
                time: prepared.time,
                offset: prepared.offset,
                timezone: Some(timezone),
            },
            overflow,
            disambiguation,
            offset_option,
            provider,
        )
    }

    /// Creates a new `ZonedDateTime` from this one, overriding the provided
    /// fields.
    pub fn with(
        &self,
        partial: PartialZonedDateTime,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(
                TemporalError::r#type().with_message("PartialZonedDateTime cannot be empty.")
            );
        }
        let overflow = overflow.unwrap_or_default();
        let disambiguation = disambiguation.unwrap_or_default();
        let offset_option = offset_option.unwrap_or(OffsetDisambiguation::Prefer);

        let iso_date_time = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        let plain_date_time = PlainDateTime::new_unchecked(iso_date_time, self.calendar);

        // 23. Let dateTimeResult be ? InterpretTemporalDateTimeFields(calendar, fields, overflow).
        let merged_date = partial
            .date
            .with_fallback_date(&plain_date_time.to_plain_date())?;
        let result_date = self.calendar.date_from_partial(&merged_date, overflow)?;
        let time = iso_date_time.time.with(partial.time, overflow)?;

        // 24. Let newOffsetNanoseconds be ! ParseDateTimeUTCOffset(fields.[[OffsetString]]).
        let original_offset = self.offset_nanoseconds_with_provider(provider)?;
        let new_offset_nanos = partial
            .offset
            .map(|offset| offset.nanoseconds())
            .or(Some(original_offset));

        // 25. Let epochNanoseconds be ? InterpretISODateTimeOffset(...).
        let epoch_nanos = interpret_isodatetime_offset(
            result_date.iso,
            Some(time),
            false,
            new_offset_nanos,
            &self.tz,
            disambiguation,
            offset_option,
            true,
            provider,
        )?;

        Ok(Self::new_unchecked(
            Instant::from(epoch_nanos),
            self.calendar,
            self.tz.clone(),
        ))
    }

    /// Creates a new `ZonedDateTime` with the provided time zone, keeping
    /// the instant.
    pub fn with_timezone(&self, timezone: TimeZone) -> TemporalResult<Self> {
        Self::try_new(self.instant.as_i128(), self.calendar, timezone)
    }

    /// Creates a new `ZonedDateTime` with the provided calendar, keeping
    /// the instant.
    pub fn with_calendar(&self, calendar: Calendar) -> TemporalResult<Self> {
        Self::try_new(self.instant.as_i128(), calendar, self.tz.clone())
    }

    /// Adds a `Duration` to this `ZonedDateTime`.
    pub fn add_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(duration, overflow, provider)
    }

    /// Subtracts a `Duration` from this `ZonedDateTime`.
    pub fn subtract_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(&duration.negated(), overflow, provider)
    }

    /// Returns the duration from this `ZonedDateTime` until `other`.
    pub fn until_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Until, other, settings, provider)
    }

    /// Returns the duration since `other` to this `ZonedDateTime`.
    pub fn since_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Since, other, settings, provider)
    }

    /// Rounds this `ZonedDateTime` in its local time line.
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        if resolved.is_noop() {
            return Ok(self.clone());
        }

        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;

        // Day rounding measures against the actual day span of the zone.
        if resolved.smallest_unit == Unit::Day {
            let start = self.tz.get_start_of_day(&iso.date, provider)?;
            let tomorrow = IsoDate::balance(
                iso.date.year,
                i32::from(iso.date.month),
                i32::from(iso.date.day) + 1,
            );
            let end = self.tz.get_start_of_day(&tomorrow, provider)?;
            let day_length = end.0 - start.0;
            let day_progress = self.instant.as_i128() - start.0;
            let increment = NonZeroU128::new(day_length.unsigned_abs())
                .ok_or(TemporalError::assert().with_enum(ErrorMessage::AssertionFailed))?;
            let rounded = IncrementRounder::<i128>::from_signed_num(day_progress, increment)?
                .round(resolved.rounding_mode);
            return Self::try_new(start.0 + rounded, self.calendar, self.tz.clone());
        }

        // Otherwise round the local clock and map it back through the
        // original offset.
        let rounded_iso = iso.round(resolved)?;
        let offset = self.offset_nanoseconds_with_provider(provider)?;
        let epoch_nanos = interpret_isodatetime_offset(
            rounded_iso.date,
            Some(rounded_iso.time),
            false,
            Some(offset),
            &self.tz,
            Disambiguation::Compatible,
            OffsetDisambiguation::Prefer,
            false,
            provider,
        )?;
        Ok(Self::new_unchecked(
            Instant::from(epoch_nanos),
            self.calendar,
            self.tz.clone(),
        ))
    }

    /// Compares the instants of two `ZonedDateTime`s.
    ///
    /// Field-wise equality (including calendar and time zone identity) is
    /// `PartialEq`; this ordering intentionally ignores both.
    #[inline]
    #[must_use]
    pub fn compare_instant(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }

    /// Returns the first instant of this date in the zone.
    pub fn start_of_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        let epoch_nanos = self.tz.get_start_of_day(&iso.date, provider)?;
        Ok(Self::new_unchecked(
            Instant::from(epoch_nanos),
            self.calendar,
            self.tz.clone(),
        ))
    }

    /// Returns the length of this date in hours, which is not 24 across a
    /// transition.
    pub fn hours_in_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u8> {
        // 4-6. Today and tomorrow as local dates.
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        let today = iso.date;
        let tomorrow = IsoDate::balance(
            today.year,
            i32::from(today.month),
            i32::from(today.day) + 1,
        );
        // 7-9. The difference of the two start-of-days.
        let today_ns = self.tz.get_start_of_day(&today, provider)?;
        let tomorrow_ns = self.tz.get_start_of_day(&tomorrow, provider)?;
        let diff = NormalizedTimeDuration::from_nanosecond_difference(tomorrow_ns.0, today_ns.0)?;
        // 10. Return TotalTimeDuration(diff, hour).
        Ok(diff.divide(3_600_000_000_000) as u8)
    }
}

// ==== Accessors ====

impl ZonedDateTime {
    /// Returns the `year` value for this `ZonedDateTime`.
    pub fn year_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<i32> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        self.calendar.year(&iso.date)
    }

    /// Returns the `month` value for this `ZonedDateTime`.
    pub fn month_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        self.calendar.month(&iso.date)
    }

    /// Returns the `monthCode` value for this `ZonedDateTime`.
    pub fn month_code_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<MonthCode> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        self.calendar.month_code(&iso.date)
    }

    /// Returns the `day` value for this `ZonedDateTime`.
    pub fn day_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        self.calendar.day(&iso.date)
    }

    /// Returns the `era` value for this `ZonedDateTime`.
    pub fn era_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        self.calendar.era(&iso.date)
    }

    /// Returns the `hour` value for this `ZonedDateTime`.
    pub fn hour_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.tz.get_iso_datetime_for(&self.instant, provider)?.time.hour)
    }

    /// Returns the `minute` value for this `ZonedDateTime`.
    pub fn minute_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.tz.get_iso_datetime_for(&self.instant, provider)?.time.minute)
    }

    /// Returns the `second` value for this `ZonedDateTime`.
    pub fn second_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.tz.get_iso_datetime_for(&self.instant, provider)?.time.second)
    }

    /// Returns the `millisecond` value for this `ZonedDateTime`.
    pub fn millisecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self
            .tz
            .get_iso_datetime_for(&self.instant, provider)?
            .time
            .millisecond)
    }

    /// Returns the `microsecond` value for this `ZonedDateTime`.
    pub fn microsecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self
            .tz
            .get_iso_datetime_for(&self.instant, provider)?
            .time
            .microsecond)
    }

    /// Returns the `nanosecond` value for this `ZonedDateTime`.
    pub fn nanosecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self
            .tz
            .get_iso_datetime_for(&self.instant, provider)?
            .time
            .nanosecond)
    }

    /// Returns the offset string for this `ZonedDateTime`.
    pub fn offset_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        let offset = self.tz.get_offset_nanos_for(self.instant.as_i128(), provider)?;
        let (sign, hour, minute) = nanoseconds_to_offset_minutes(offset)?;
        Ok(format_offset_minutes(
            i16::from(sign.as_sign_multiplier()) * (i16::from(hour) * 60 + i16::from(minute)),
        )
        .to_string())
    }

    /// Returns the offset nanoseconds for this `ZonedDateTime`.
    pub fn offset_nanoseconds_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<i64> {
        let offset = self.tz.get_offset_nanos_for(self.instant.as_i128(), provider)?;
        Ok(offset as i64)
    }

    /// Returns the local date as a [`PlainDate`].
    pub fn to_plain_date_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDate> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        Ok(PlainDate::new_unchecked(iso.date, self.calendar))
    }

    /// Returns the local time as a [`PlainTime`].
    pub fn to_plain_time_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainTime> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        Ok(PlainTime::new_unchecked(iso.time))
    }

    /// Returns the local date-time as a [`PlainDateTime`].
    pub fn to_plain_date_time_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDateTime> {
        let iso = self.tz.get_iso_datetime_for(&self.instant, provider)?;
        Ok(PlainDateTime::new_unchecked(iso, self.calendar))
    }

    /// Renders this `ZonedDateTime` as an IXDTF string.
    #[allow(clippy::too_many_arguments)]
    pub fn to_ixdtf_string_with_provider(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded_instant = Instant::try_new(
            IncrementRounder::<i128>::from_signed_num(
                self.instant.as_i128(),
                resolved
                    .smallest_unit
                    .as_nanoseconds()
                    .temporal_unwrap()?
                    .checked_mul(resolved.increment.as_extended_increment())
                    .temporal_unwrap()?,
            )?
            .round(resolved.rounding_mode),
        )?;

        let offset = self
            .tz
            .get_offset_nanos_for(rounded_instant.as_i128(), provider)?;
        let (sign, offset_hour, offset_minute) = nanoseconds_to_offset_minutes(offset)?;
        let iso = self.tz.get_iso_datetime_for(&rounded_instant, provider)?;

        let timezone_identifier = self.tz.identifier();
        Ok(IxdtfStringBuilder::default()
            .with_date(iso.date.year, iso.date.month, iso.date.day)
            .with_time(
                iso.time.hour,
                iso.time.minute,
                iso.time.second,
                combined_subseconds(&iso.time),
                resolved.precision,
            )
            .with_minute_offset(sign, offset_hour, offset_minute, display_offset)
            .with_timezone(&timezone_identifier, display_timezone)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }

    /// Creates a `ZonedDateTime` from an IXDTF string.
    pub fn from_utf8_with_provider(
        source: &[u8],
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let record = parsers::parse_zoned_date_time(source)?;
        let annotation = record.tz.temporal_unwrap()?;
        let timezone = TimeZone::from_time_zone_record(annotation.tz, provider)?;
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();

        let date = record
            .date
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate))?;
        let time = record.time.map(IsoTime::from_time_record).transpose()?;

        // An offset parsed with sub-minute precision must match exactly;
        // minute-precision offsets tolerate rounded zone data.
        let (is_exact, offset_nanos, match_minutes) = match record.offset {
            Some(UtcOffsetRecordOrZ::Z) => (true, Some(0), false),
            Some(UtcOffsetRecordOrZ::Offset(offset)) => (
                false,
                Some(parsers::utc_offset_record_to_nanoseconds(&offset)?),
                !parsers::utc_offset_record_is_sub_minute(&offset),
            ),
            None => (false, None, false),
        };

        let iso_date = IsoDate::regulate(date.year, date.month, date.day, Overflow::Reject)?;
        let epoch_nanos = interpret_isodatetime_offset(
            iso_date,
            time,
            is_exact,
            offset_nanos,
            &timezone,
            disambiguation,
            offset_option,
            match_minutes,
            provider,
        )?;

        Ok(Self::new_unchecked(
            Instant::from(epoch_nanos),
            calendar,
            timezone,
        ))
    }

    /// Creates a `ZonedDateTime` from a string with the default
    /// disambiguation options.
    pub fn from_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        Self::from_utf8_with_provider(
            source.as_bytes(),
            Disambiguation::Compatible,
            OffsetDisambiguation::Reject,
            provider,
        )
    }
}

/// `InterpretISODateTimeOffset`
#[allow(clippy::too_many_arguments)]
pub(crate) fn interpret_isodatetime_offset(
    date: IsoDate,
    time: Option<IsoTime>,
    is_exact: bool,
    offset_nanos: Option<i64>,
    timezone: &TimeZone,
    disambiguation: Disambiguation,
    offset_option: OffsetDisambiguation,
    match_minutes: bool,
    provider: &impl TimeZoneProvider,
) -> TemporalResult<EpochNanoseconds> {
    // 1. If time is start-of-day, resolve through GetStartOfDay.
    let Some(time) = time else {
        return timezone.get_start_of_day(&date, provider);
    };

    match (is_exact, offset_nanos) {
        // 4. If offsetBehaviour is exact, or offsetBehaviour is option and
        // offsetOption is use, compute the instant from the offset alone.
        (_, Some(offset)) if is_exact || offset_option == OffsetDisambiguation::Use => {
            // a. Balance the local time shifted by the offset.
            let balanced = IsoDateTime::balance(
                date.year,
                date.month.into(),
                date.day.into(),
                time.hour.into(),
                time.minute.into(),
                time.second.into(),
                time.millisecond.into(),
                time.microsecond.into(),
                i128::from(i64::from(time.nanosecond) - offset),
            );
            // b. Perform ? CheckISODaysRange(balanced.[[ISODate]]).
            balanced.date.is_valid_day_range()?;
            // c-e. The result must be a valid epoch value.
            let epoch_nanos = balanced.as_nanoseconds();
            epoch_nanos.check_validity()?;
            Ok(epoch_nanos)
        }
        // 5-6. offsetBehaviour is option with prefer or reject: check the
        // offset against the zone's readings.
        (false, Some(offset))
            if offset_option == OffsetDisambiguation::Prefer
                || offset_option == OffsetDisambiguation::Reject =>
        {
            // 7. Perform ? CheckISODaysRange(isoDate).
            date.is_valid_day_range()?;
            let iso = IsoDateTime::new_unchecked(date, time);
            // 8. Let utcEpochNanoseconds be GetUTCEpochNanoseconds(isoDateTime).
            let utc_epochs = iso.as_nanoseconds();
            // 9. Let possibleEpochNs be ? GetPossibleEpochNanoseconds(timeZone, isoDateTime).
            let possible_nanos = timezone.get_possible_epoch_ns_for(iso, provider)?;
            // 10. For each element candidate of possibleEpochNs, do
            for candidate in &possible_nanos {
                // a. Let candidateOffset be utcEpochNanoseconds - candidate.
                let candidate_offset = utc_epochs.0 - candidate.0;
                // b. If candidateOffset = offsetNanoseconds, return candidate.
                if candidate_offset == i128::from(offset) {
                    return Ok(*candidate);
                }
                // c. If matchBehaviour is match-minutes, compare rounded to
                // minute precision.
                if match_minutes {
                    let rounded_candidate = IncrementRounder::<i128>::from_signed_num(
                        candidate_offset,
                        NonZeroU128::new(60_000_000_000).expect("60e9 is not zero"),
                    )?
                    .round(RoundingMode::HalfExpand);
                    if rounded_candidate == i128::from(offset) {
                        return Ok(*candidate);
                    }
                }
            }

            // 11. If offsetOption is reject, throw a RangeError exception.
            if offset_option == OffsetDisambiguation::Reject {
                return Err(
                    TemporalError::range().with_enum(ErrorMessage::TimeZoneUnresolvableOffset)
                );
            }
            // 12. Fall back to disambiguation.
            timezone.disambiguate_possible_epoch_nanos(
                possible_nanos,
                iso,
                disambiguation,
                provider,
            )
        }
        // 3. offsetBehaviour is wall, or the offset is ignored.
        _ => {
            let iso = IsoDateTime::new_unchecked(date, time);
            timezone.get_epoch_nanoseconds_for(iso, disambiguation, provider)
        }
    }
}

/// Splits an offset nanosecond value into minute-precision components,
/// rounding sub-minute offsets half-expand.
pub(crate) fn nanoseconds_to_offset_minutes(
    nanoseconds: i128,
) -> TemporalResult<(Sign, u8, u8)> {
    const NS_PER_MINUTE: i128 = 60_000_000_000;
    let rounded = IncrementRounder::<i128>::from_signed_num(
        nanoseconds,
        NonZeroU128::new(NS_PER_MINUTE as u128).expect("constant is not zero"),
    )?
    .round(RoundingMode::HalfExpand);
    let offset_minutes = (rounded / NS_PER_MINUTE) as i32;
    let sign = if offset_minutes < 0 {
        Sign::Negative
    } else {
        Sign::Positive
    };
    let hour = offset_minutes.unsigned_abs() / 60;
    let minute = offset_minutes.unsigned_abs() % 60;
    Ok((sign, hour as u8, minute as u8))
}

#[cfg(test)]
mod tests;
