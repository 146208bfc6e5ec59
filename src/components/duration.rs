//! The `Duration` component and its methods.

use core::cmp::Ordering;
use core::str::FromStr;

use ixdtf::records::TimeDurationRecord;

use crate::{
    components::{PlainDateTime, ZonedDateTime},
    error::ErrorMessage,
    iso::{IsoDateTime, IsoTime},
    options::{
        Overflow, RelativeTo, ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions,
        Unit,
    },
    parsers::{
        self, FormattableDateDuration, FormattableDuration, FormattableTimeDuration, Precision,
    },
    primitive::FiniteF64,
    provider::{NeverProvider, TimeZoneProvider},
    Sign, TemporalError, TemporalResult, NS_PER_DAY,
};

mod date;
pub(crate) mod normalized;

#[doc(inline)]
pub use date::DateDuration;

use date::duration_sign;
use normalized::{round_time_duration, NormalizedDurationRecord, NormalizedTimeDuration};

/// A `PartialDuration` is a duration whose fields may be absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDuration {
    pub years: Option<i64>,
    pub months: Option<i64>,
    pub weeks: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
    pub milliseconds: Option<i64>,
    pub microseconds: Option<i128>,
    pub nanoseconds: Option<i128>,
}

impl PartialDuration {
    /// Returns whether the `PartialDuration` is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The native Rust implementation of a Temporal duration.
///
/// The fields are conceptually integers and are stored as such; all ten
/// nonzero fields must agree in sign, and the combined clock-unit magnitude
/// is bounded below 2^53 seconds.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    years: i64,
    months: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
    microseconds: i128,
    nanoseconds: i128,
}

// ==== Creation ====

impl Duration {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new_unchecked(
        years: i64,
        months: i64,
        weeks: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> Self {
        Self {
            years,
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        }
    }

    /// Creates a new validated `Duration`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        years: i64,
        months: i64,
        weeks: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> TemporalResult<Self> {
        let duration = Self::new_unchecked(
            years,
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        );
        if !duration.is_valid() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationInvalid));
        }
        Ok(duration)
    }

    /// Creates a `Duration` from a [`PartialDuration`], defaulting absent
    /// fields to zero. An entirely empty partial is a `TypeError`.
    pub fn from_partial_duration(partial: PartialDuration) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_enum(ErrorMessage::FieldBagEmpty));
        }
        Self::new(
            partial.years.unwrap_or_default(),
            partial.months.unwrap_or_default(),
            partial.weeks.unwrap_or_default(),
            partial.days.unwrap_or_default(),
            partial.hours.unwrap_or_default(),
            partial.minutes.unwrap_or_default(),
            partial.seconds.unwrap_or_default(),
            partial.milliseconds.unwrap_or_default(),
            partial.microseconds.unwrap_or_default(),
            partial.nanoseconds.unwrap_or_default(),
        )
    }

    /// `TemporalDurationFromInternal`: balances a normalized record into
    /// duration fields no coarser than `largest_unit` on the time side.
    pub(crate) fn from_normalized(
        record: NormalizedDurationRecord,
        largest_unit: Unit,
    ) -> TemporalResult<Self> {
        let date = record.date();
        let norm = record.normalized_time_duration();
        let sign = i128::from(norm.sign().as_sign_multiplier());
        let mut nanoseconds = norm.0.abs();

        let mut days = 0i128;
        let mut hours = 0i128;
        let mut minutes = 0i128;
        let mut seconds = 0i128;
        let mut milliseconds = 0i128;
        let mut microseconds = 0i128;

        match largest_unit {
            // 4. If largestUnit is a date unit, balance the entire time
            // duration through days.
            Unit::Year | Unit::Month | Unit::Week | Unit::Day | Unit::Auto => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
                hours = minutes / 60;
                minutes %= 60;
                days = hours / 24;
                hours %= 24;
            }
            Unit::Hour => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
                hours = minutes / 60;
                minutes %= 60;
            }
            Unit::Minute => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
            }
            Unit::Second => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
            }
            Unit::Millisecond => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
            }
            Unit::Microsecond => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
            }
            Unit::Nanosecond => {}
        }

        let to_field = |value: i128| -> TemporalResult<i64> {
            i64::try_from(value * sign)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))
        };

        Self::new(
            date.years,
            date.months,
            date.weeks,
            date.days + to_field(days)?,
            to_field(hours)?,
            to_field(minutes)?,
            to_field(seconds)?,
            to_field(milliseconds)?,
            microseconds * sign,
            nanoseconds * sign,
        )
    }

    /// `IsValidDuration`
    pub(crate) fn is_valid(&self) -> bool {
        // 1-2. All nonzero fields agree in sign.
        let fields = [
            self.years,
            self.months,
            self.weeks,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
        ];
        let mut sign = 0i8;
        for value in fields
            .iter()
            .map(|&v| v.signum() as i8)
            .chain([self.microseconds.signum() as i8, self.nanoseconds.signum() as i8])
        {
            if value == 0 {
                continue;
            }
            if sign != 0 && value != sign {
                return false;
            }
            sign = value;
        }

        // 3-5. Calendar units are bounded below 2^32.
        const MAX_CALENDAR_VALUE: i64 = 1 << 32;
        if self.years.abs() >= MAX_CALENDAR_VALUE
            || self.months.abs() >= MAX_CALENDAR_VALUE
            || self.weeks.abs() >= MAX_CALENDAR_VALUE
        {
            return false;
        }

        // 6-7. The combined clock magnitude stays below 2^53 seconds. The
        // microsecond and nanosecond fields are caller-provided i128s, so
        // the combination itself must be overflow-checked.
        let clock_nanoseconds = i128::from(self.days) * NS_PER_DAY as i128
            + i128::from(self.hours) * 3_600_000_000_000
            + i128::from(self.minutes) * 60_000_000_000
            + i128::from(self.seconds) * 1_000_000_000
            + i128::from(self.milliseconds) * 1_000_000;
        let total_nanoseconds = self
            .microseconds
            .checked_mul(1_000)
            .and_then(|microsecond_ns| clock_nanoseconds.checked_add(microsecond_ns))
            .and_then(|total| total.checked_add(self.nanoseconds));
        match total_nanoseconds {
            Some(total) => total.abs() <= normalized::MAX_TIME_DURATION,
            None => false,
        }
    }
}

// ==== Getters ====

impl Duration {
    pub fn years(&self) -> i64 {
        self.years
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn weeks(&self) -> i64 {
        self.weeks
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn milliseconds(&self) -> i64 {
        self.milliseconds
    }

    pub fn microseconds(&self) -> i128 {
        self.microseconds
    }

    pub fn nanoseconds(&self) -> i128 {
        self.nanoseconds
    }

    /// Returns the calendar-unit portion of this duration.
    #[inline]
    #[must_use]
    pub fn date(&self) -> DateDuration {
        DateDuration::new_unchecked(self.years, self.months, self.weeks, self.days)
    }

    /// Returns the clock portion (hours and below) as a normalized time
    /// duration.
    pub(crate) fn to_normalized_time(&self) -> NormalizedTimeDuration {
        NormalizedTimeDuration::from_components(
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
            self.microseconds,
            self.nanoseconds,
        )
    }

    /// `ToDateDurationRecordWithoutTime`: folds whole days of the clock
    /// portion into the date portion.
    pub(crate) fn to_date_duration_record_without_time(&self) -> TemporalResult<DateDuration> {
        let days_from_time = self.to_normalized_time().divide(NS_PER_DAY as i64);
        let days = i64::try_from(days_from_time)
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))?;
        DateDuration::new(self.years, self.months, self.weeks, self.days + days)
    }

    /// `DurationSign`
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        let date_sign = duration_sign(&[
            self.years,
            self.months,
            self.weeks,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
        ]);
        if date_sign != Sign::Zero {
            return date_sign;
        }
        if self.microseconds != 0 {
            return Sign::from(self.microseconds.signum() as i8);
        }
        Sign::from(self.nanoseconds.signum() as i8)
    }

    /// Returns whether every field is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// `DefaultTemporalLargestUnit`: the coarsest nonzero unit of this
    /// duration.
    pub(crate) fn default_largest_unit(&self) -> Unit {
        if self.years != 0 {
            Unit::Year
        } else if self.months != 0 {
            Unit::Month
        } else if self.weeks != 0 {
            Unit::Week
        } else if self.days != 0 {
            Unit::Day
        } else if self.hours != 0 {
            Unit::Hour
        } else if self.minutes != 0 {
            Unit::Minute
        } else if self.seconds != 0 {
            Unit::Second
        } else if self.milliseconds != 0 {
            Unit::Millisecond
        } else if self.microseconds != 0 {
            Unit::Microsecond
        } else {
            Unit::Nanosecond
        }
    }
}

// ==== Methods ====

impl Duration {
    /// Returns the negation of this duration.
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            milliseconds: -self.milliseconds,
            microseconds: -self.microseconds,
            nanoseconds: -self.nanoseconds,
        }
    }

    /// Returns the absolute value of this duration.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            years: self.years.abs(),
            months: self.months.abs(),
            weeks: self.weeks.abs(),
            days: self.days.abs(),
            hours: self.hours.abs(),
            minutes: self.minutes.abs(),
            seconds: self.seconds.abs(),
            milliseconds: self.milliseconds.abs(),
            microseconds: self.microseconds.abs(),
            nanoseconds: self.nanoseconds.abs(),
        }
    }

    /// Adds two durations. Calendar units cannot be added without a
    /// relative reference point, so either operand containing years,
    /// months, or weeks is a `RangeError`.
    pub fn add(&self, other: &Self) -> TemporalResult<Self> {
        let largest_unit = self.default_largest_unit().max(other.default_largest_unit());
        if largest_unit.is_calendar_unit() {
            return Err(TemporalError::range().with_message(
                "Calendar units cannot be added without a relative reference point.",
            ));
        }
        let norm_one = self.to_normalized_time().add_days(self.days)?;
        let norm_two = other.to_normalized_time().add_days(other.days)?;
        let sum = (norm_one + norm_two)?;
        Self::from_normalized(
            NormalizedDurationRecord::new(DateDuration::default(), sum)?,
            largest_unit,
        )
    }

    /// Subtracts a duration from this one; `a.subtract(b)` is
    /// `a.add(-b)`.
    pub fn subtract(&self, other: &Self) -> TemporalResult<Self> {
        self.add(&other.negated())
    }

    /// Rounds this duration per the resolved options, anchored at the
    /// optional `relative_to`.
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let resolved =
            ResolvedRoundingOptions::from_duration_options(options, self.default_largest_unit())?;

        match relative_to {
            Some(RelativeTo::ZonedDateTime(zoned_date_time)) => {
                // Apply the duration in the zone, then re-difference with
                // rounding.
                let target_instant =
                    zoned_date_time.add_as_instant(self, Overflow::Constrain, provider)?;
                let target = ZonedDateTime::new_unchecked(
                    target_instant,
                    zoned_date_time.calendar(),
                    zoned_date_time.timezone().clone(),
                );
                let internal = zoned_date_time.diff_with_rounding(&target, resolved, provider)?;
                let largest_unit = if resolved.largest_unit.max(Unit::Day) == resolved.largest_unit
                {
                    Unit::Hour
                } else {
                    resolved.largest_unit
                };
                Self::from_normalized(internal, largest_unit)
            }
            Some(RelativeTo::PlainDate(plain_date)) => {
                // Anchor at local midnight of the relative date.
                let (time_overflow_days, target_time) =
                    IsoTime::default().add(self.to_normalized_time());
                let date_duration = self
                    .date()
                    .adjust_days(self.days + time_overflow_days)?;
                let target_date = plain_date.calendar().date_add(
                    &plain_date.iso,
                    &date_duration,
                    Overflow::Constrain,
                )?;

                let anchor = IsoDateTime::new_unchecked(plain_date.iso, IsoTime::default());
                let target = IsoDateTime::new_unchecked(target_date.iso, target_time);
                let dest_epoch_ns = target.as_nanoseconds().0;

                let internal =
                    anchor.diff(&target, plain_date.calendar(), resolved.largest_unit)?;
                let anchor_dt = PlainDateTime::new_unchecked(anchor, plain_date.calendar());
                let (result, _) = internal.round_relative_duration(
                    dest_epoch_ns,
                    &anchor_dt,
                    Option::<(&crate::TimeZone, &NeverProvider)>::None,
                    resolved,
                )?;
                Ok(result)
            }
            None => {
                let has_calendar_units = self.years != 0 || self.months != 0 || self.weeks != 0;
                if has_calendar_units
                    || resolved.largest_unit.is_calendar_unit()
                    || resolved.smallest_unit.is_calendar_unit()
                {
                    return Err(TemporalError::range().with_message(
                        "relativeTo is required to round calendar units.",
                    ));
                }
                let (record, _) =
                    round_time_duration(self.days, self.to_normalized_time(), resolved)?;
                Self::from_normalized(record, resolved.largest_unit)
            }
        }
    }

    /// Returns the total of this duration counted in `unit`.
    pub fn total_with_provider(
        &self,
        unit: Unit,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<FiniteF64> {
        match relative_to {
            Some(RelativeTo::ZonedDateTime(zoned_date_time)) => {
                let target_instant =
                    zoned_date_time.add_as_instant(self, Overflow::Constrain, provider)?;
                let target = ZonedDateTime::new_unchecked(
                    target_instant,
                    zoned_date_time.calendar(),
                    zoned_date_time.timezone().clone(),
                );
                zoned_date_time.diff_with_total(&target, unit, provider)
            }
            Some(RelativeTo::PlainDate(plain_date)) => {
                let (time_overflow_days, target_time) =
                    IsoTime::default().add(self.to_normalized_time());
                let date_duration = self
                    .date()
                    .adjust_days(self.days + time_overflow_days)?;
                let target_date = plain_date.calendar().date_add(
                    &plain_date.iso,
                    &date_duration,
                    Overflow::Constrain,
                )?;

                let anchor = IsoDateTime::new_unchecked(plain_date.iso, IsoTime::default());
                let target = IsoDateTime::new_unchecked(target_date.iso, target_time);
                let dest_epoch_ns = target.as_nanoseconds().0;

                let internal = anchor.diff(&target, plain_date.calendar(), unit.max(Unit::Day))?;
                let anchor_dt = PlainDateTime::new_unchecked(anchor, plain_date.calendar());
                internal.total_relative_duration(
                    dest_epoch_ns,
                    &anchor_dt,
                    Option::<(&crate::TimeZone, &NeverProvider)>::None,
                    unit,
                )
            }
            None => {
                let has_calendar_units = self.years != 0 || self.months != 0 || self.weeks != 0;
                if has_calendar_units || unit.is_calendar_unit() {
                    return Err(TemporalError::range().with_message(
                        "relativeTo is required to total calendar units.",
                    ));
                }
                self.to_normalized_time().add_days(self.days)?.total(unit)
            }
        }
    }

    /// Compares two durations, anchoring calendar units at `relative_to`.
    pub fn compare_with_provider(
        &self,
        other: &Self,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Ordering> {
        if self == other {
            return Ok(Ordering::Equal);
        }
        match relative_to {
            Some(RelativeTo::ZonedDateTime(zoned_date_time)) => {
                let one = zoned_date_time.add_as_instant(self, Overflow::Constrain, provider)?;
                let two = zoned_date_time.add_as_instant(other, Overflow::Constrain, provider)?;
                Ok(one.cmp(&two))
            }
            Some(RelativeTo::PlainDate(plain_date)) => {
                let days_one = date_duration_days(&self.date(), plain_date)?;
                let days_two = date_duration_days(&other.date(), plain_date)?;
                let norm_one = self.to_normalized_time().add_days(days_one)?;
                let norm_two = other.to_normalized_time().add_days(days_two)?;
                Ok(norm_one.cmp(&norm_two))
            }
            None => {
                let has_calendar_units = self.years != 0
                    || self.months != 0
                    || self.weeks != 0
                    || other.years != 0
                    || other.months != 0
                    || other.weeks != 0;
                if has_calendar_units {
                    return Err(TemporalError::range().with_message(
                        "relativeTo is required to compare calendar units.",
                    ));
                }
                let norm_one = self.to_normalized_time().add_days(self.days)?;
                let norm_two = other.to_normalized_time().add_days(other.days)?;
                Ok(norm_one.cmp(&norm_two))
            }
        }
    }

    /// Renders this duration as an ISO 8601 duration string.
    pub fn as_temporal_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        if options.smallest_unit == Some(Unit::Minute) {
            return Err(TemporalError::range()
                .with_message("smallestUnit cannot be minute for duration strings."));
        }
        let resolved = options.resolve()?;

        // Round the seconds-and-below portion; coarser fields are displayed
        // as they are (durations are not re-balanced for display).
        let seconds_norm = NormalizedTimeDuration::from_components(
            0,
            0,
            self.seconds,
            self.milliseconds,
            self.microseconds,
            self.nanoseconds,
        );
        let rounded = seconds_norm.round_inner(
            resolved
                .smallest_unit
                .as_nanoseconds()
                .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?
                .checked_mul(resolved.increment.as_extended_increment())
                .ok_or(TemporalError::range().with_enum(ErrorMessage::IncrementInvalid))?,
            resolved.rounding_mode,
        )?;

        let date = (self.years != 0 || self.months != 0 || self.weeks != 0 || self.days != 0)
            .then_some(FormattableDateDuration {
                years: self.years.unsigned_abs(),
                months: self.months.unsigned_abs(),
                weeks: self.weeks.unsigned_abs(),
                days: self.days.unsigned_abs(),
            });

        let time = FormattableTimeDuration {
            hours: self.hours.unsigned_abs(),
            minutes: self.minutes.unsigned_abs(),
            seconds: rounded.seconds().unsigned_abs(),
            fraction: rounded.subseconds().unsigned_abs(),
        };

        let duration = FormattableDuration {
            precision: resolved.precision,
            sign: self.sign(),
            date,
            time: Some(time),
        };
        Ok(duration.to_string())
    }
}

/// `DateDurationDays`: the day-equivalent of a date duration when anchored
/// at a plain date.
fn date_duration_days(
    duration: &DateDuration,
    plain_date: &crate::PlainDate,
) -> TemporalResult<i64> {
    // 1-2. Without calendar units the day count is literal.
    let years_months_weeks = DateDuration::new(duration.years, duration.months, duration.weeks, 0)?;
    if years_months_weeks.is_zero() {
        return Ok(duration.days);
    }
    // 3-5. Otherwise apply the calendar portion and count the day delta.
    let later = plain_date.calendar().date_add(
        &plain_date.iso,
        &years_months_weeks,
        Overflow::Constrain,
    )?;
    let delta = later.iso.to_epoch_days() - plain_date.iso.to_epoch_days();
    Ok(delta + duration.days)
}

impl From<DateDuration> for Duration {
    fn from(value: DateDuration) -> Self {
        Self {
            years: value.years,
            months: value.months,
            weeks: value.weeks,
            days: value.days,
            ..Default::default()
        }
    }
}

impl TryFrom<PartialDuration> for Duration {
    type Error = TemporalError;
    fn try_from(value: PartialDuration) -> Result<Self, Self::Error> {
        Self::from_partial_duration(value)
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self.as_temporal_string(ToStringRoundingOptions::default());
        debug_assert!(
            string.is_ok(),
            "Duration must render with default options."
        );
        f.write_str(&string.map_err(|_| core::fmt::Error)?)
    }
}

// ==== FromStr ====

impl FromStr for Duration {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_record = parsers::parse_duration(s.as_bytes())?;

        let (hours, minutes, seconds, milliseconds, microseconds, nanoseconds) =
            match parse_record.time {
                Some(TimeDurationRecord::Hours { hours, fraction }) => {
                    let unadjusted_fraction =
                        u64::from(fraction.and_then(|x| x.to_nanoseconds()).unwrap_or(0));
                    // The fraction is scaled against the unit it follows.
                    let fractional_hours_ns = unadjusted_fraction * 3600;
                    let minutes = fractional_hours_ns.div_euclid(60 * 1_000_000_000);
                    let fractional_minutes_ns = fractional_hours_ns.rem_euclid(60 * 1_000_000_000);

                    let seconds = fractional_minutes_ns.div_euclid(1_000_000_000);
                    let fractional_seconds_ns = fractional_minutes_ns.rem_euclid(1_000_000_000);

                    let milliseconds = fractional_seconds_ns.div_euclid(1_000_000);
                    let rem = fractional_seconds_ns.rem_euclid(1_000_000);

                    let microseconds = rem.div_euclid(1_000);
                    let nanoseconds = rem.rem_euclid(1_000);

                    (hours, minutes, seconds, milliseconds, microseconds, nanoseconds)
                }
                Some(TimeDurationRecord::Minutes {
                    hours,
                    minutes,
                    fraction,
                }) => {
                    let unadjusted_fraction =
                        u64::from(fraction.and_then(|x| x.to_nanoseconds()).unwrap_or(0));
                    let fractional_minutes_ns = unadjusted_fraction * 60;
                    let seconds = fractional_minutes_ns.div_euclid(1_000_000_000);
                    let fractional_seconds_ns = fractional_minutes_ns.rem_euclid(1_000_000_000);

                    let milliseconds = fractional_seconds_ns.div_euclid(1_000_000);
                    let rem = fractional_seconds_ns.rem_euclid(1_000_000);

                    let microseconds = rem.div_euclid(1_000);
                    let nanoseconds = rem.rem_euclid(1_000);

                    (hours, minutes, seconds, milliseconds, microseconds, nanoseconds)
                }
                Some(TimeDurationRecord::Seconds {
                    hours,
                    minutes,
                    seconds,
                    fraction,
                }) => {
                    let fraction_ns =
                        u64::from(fraction.and_then(|x| x.to_nanoseconds()).unwrap_or(0));
                    let milliseconds = fraction_ns.div_euclid(1_000_000);
                    let rem = fraction_ns.rem_euclid(1_000_000);

                    let microseconds = rem.div_euclid(1_000);
                    let nanoseconds = rem.rem_euclid(1_000);

                    (hours, minutes, seconds, milliseconds, microseconds, nanoseconds)
                }
                None => (0, 0, 0, 0, 0, 0),
            };

        let (years, months, weeks, days) = if let Some(date) = parse_record.date {
            (date.years, date.months, date.weeks, date.days)
        } else {
            (0, 0, 0, 0)
        };

        let sign = i64::from(parse_record.sign as i8);
        let as_signed = |value: u64| -> TemporalResult<i64> {
            i64::try_from(value)
                .map(|v| v * sign)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationInvalid))
        };

        Self::new(
            i64::from(years) * sign,
            i64::from(months) * sign,
            i64::from(weeks) * sign,
            as_signed(days)?,
            as_signed(hours)?,
            as_signed(minutes)?,
            as_signed(seconds)?,
            as_signed(milliseconds)?,
            i128::from(microseconds) * i128::from(sign),
            i128::from(nanoseconds) * i128::from(sign),
        )
    }
}

#[cfg(test)]
mod tests;
