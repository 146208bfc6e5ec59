//! The `Instant` component: an exact point on the timeline.

use core::str::FromStr;

use ixdtf::records::UtcOffsetRecordOrZ;

use crate::{
    components::{
        duration::normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
        duration::DateDuration,
        timezone::UtcOffset,
        Duration,
    },
    iso::{IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayOffset, ResolvedRoundingOptions,
        RoundingOptions, ToStringRoundingOptions, UnitGroup, Unit,
    },
    parsers::{self, IxdtfStringBuilder},
    time::EpochNanoseconds,
    Sign, TemporalError, TemporalResult,
};

/// The native Rust implementation of a Temporal instant.
///
/// An `Instant` is an exact time represented as nanoseconds since the Unix
/// epoch, with no calendar or location attached.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant(EpochNanoseconds);

impl From<EpochNanoseconds> for Instant {
    fn from(value: EpochNanoseconds) -> Self {
        Self(value)
    }
}

// ==== Private API ====

impl Instant {
    /// `AddInstant`: adds a normalized time duration, validating the result.
    pub(crate) fn add_time_duration(&self, norm: NormalizedTimeDuration) -> TemporalResult<Self> {
        Self::try_new(self.as_i128() + norm.0)
    }

    /// `DifferenceInstant`
    pub(crate) fn diff_instant_internal(
        &self,
        other: &Self,
        resolved_options: ResolvedRoundingOptions,
    ) -> TemporalResult<NormalizedDurationRecord> {
        let diff =
            NormalizedTimeDuration::from_nanosecond_difference(other.as_i128(), self.as_i128())?;
        if resolved_options.is_noop() {
            return NormalizedDurationRecord::new(DateDuration::default(), diff);
        }
        let increment = resolved_options
            .smallest_unit
            .as_nanoseconds()
            .ok_or(TemporalError::range().with_message("Invalid unit for instant difference."))?
            .checked_mul(resolved_options.increment.as_extended_increment())
            .ok_or(TemporalError::range().with_message("increment exceeded a valid range."))?;
        let rounded = diff.round_inner(increment, resolved_options.rounding_mode)?;
        NormalizedDurationRecord::new(DateDuration::default(), rounded)
    }

    fn diff_internal(
        &self,
        op: DifferenceOperation,
        other: &Self,
        options: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        let resolved_options = ResolvedRoundingOptions::from_diff_settings(
            options,
            op,
            UnitGroup::Time,
            Unit::Second,
            Unit::Nanosecond,
        )?;
        let internal = self.diff_instant_internal(other, resolved_options)?;
        let result = Duration::from_normalized(internal, resolved_options.largest_unit)?;
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

// ==== Public API ====

impl Instant {
    /// Creates a new `Instant`, validating the epoch range.
    #[inline]
    pub fn try_new(nanoseconds: i128) -> TemporalResult<Self> {
        Ok(Self(EpochNanoseconds::try_new(nanoseconds)?))
    }

    /// Creates a new `Instant` from epoch milliseconds.
    #[inline]
    pub fn from_epoch_milliseconds(epoch_milliseconds: i64) -> TemporalResult<Self> {
        Self::try_new(i128::from(epoch_milliseconds) * 1_000_000)
    }

    /// Returns the `epochNanoseconds` value of this `Instant`.
    #[inline]
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> EpochNanoseconds {
        self.0
    }

    /// Returns the underlying nanoseconds value.
    #[inline]
    #[must_use]
    pub fn as_i128(&self) -> i128 {
        self.0 .0
    }

    /// Returns the `epochMilliseconds` value of this `Instant`, floored
    /// toward the beginning of time.
    #[inline]
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.as_i128().div_euclid(1_000_000) as i64
    }

    /// Returns the `epochSeconds` value of this `Instant`, floored toward
    /// the beginning of time.
    #[inline]
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.as_i128().div_euclid(1_000_000_000) as i64
    }

    /// Adds a `Duration` to this `Instant`. Only time-unit fields are
    /// meaningful for an exact time; any date field is a `RangeError`.
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        if duration.date().sign() != Sign::Zero {
            return Err(TemporalError::range()
                .with_message("Date units cannot be added to an Instant."));
        }
        self.add_time_duration(duration.to_normalized_time())
    }

    /// Subtracts a `Duration` from this `Instant`.
    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add(&duration.negated())
    }

    /// Returns the duration from this `Instant` until `other`.
    pub fn until(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Until, other, options)
    }

    /// Returns the duration since `other` to this `Instant`.
    pub fn since(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_internal(DifferenceOperation::Since, other, options)
    }

    /// Rounds this `Instant` to the resolved increment.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved_options = ResolvedRoundingOptions::from_instant_options(options)?;
        let increment = resolved_options
            .smallest_unit
            .as_nanoseconds()
            .ok_or(TemporalError::range().with_message("Invalid unit for instant rounding."))?
            .checked_mul(resolved_options.increment.as_extended_increment())
            .ok_or(TemporalError::range().with_message("increment exceeded a valid range."))?;
        let rounded = crate::rounding::IncrementRounder::<i128>::from_signed_num(
            self.as_i128(),
            increment,
        )?
        .round(resolved_options.rounding_mode);
        Self::try_new(rounded)
    }

    /// Renders this instant as an IXDTF string at the provided offset, or at
    /// UTC with a `Z` designator.
    pub fn as_ixdtf_string(
        &self,
        offset: Option<UtcOffset>,
        options: ToStringRoundingOptions,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded = self
            .diff_round_for_string(ResolvedRoundingOptions::from_to_string_options(&resolved))?;

        let offset_nanoseconds = offset.map_or(0, |o| o.nanoseconds());
        let datetime =
            IsoDateTime::from_epoch_nanos(&EpochNanoseconds::from(rounded), offset_nanoseconds);
        let builder = IxdtfStringBuilder::default()
            .with_date(datetime.date.year, datetime.date.month, datetime.date.day)
            .with_time(
                datetime.time.hour,
                datetime.time.minute,
                datetime.time.second,
                combined_subseconds(&datetime.time),
                resolved.precision,
            );
        let builder = match offset {
            None => builder.with_z(DisplayOffset::Auto),
            Some(offset) => {
                let minutes = offset.minutes();
                builder.with_minute_offset(
                    if minutes < 0 { Sign::Negative } else { Sign::Positive },
                    (minutes.abs() / 60) as u8,
                    (minutes.abs() % 60) as u8,
                    DisplayOffset::Auto,
                )
            }
        };
        Ok(builder.build())
    }

    fn diff_round_for_string(
        &self,
        resolved_options: ResolvedRoundingOptions,
    ) -> TemporalResult<i128> {
        if resolved_options.is_noop() {
            return Ok(self.as_i128());
        }
        let increment = resolved_options
            .smallest_unit
            .as_nanoseconds()
            .ok_or(TemporalError::range().with_message("Invalid unit for instant rounding."))?
            .checked_mul(resolved_options.increment.as_extended_increment())
            .ok_or(TemporalError::range().with_message("increment exceeded a valid range."))?;
        Ok(
            crate::rounding::IncrementRounder::<i128>::from_signed_num(self.as_i128(), increment)?
                .round(resolved_options.rounding_mode),
        )
    }
}

/// Combines the sub-second time fields into nanoseconds for formatting.
pub(crate) fn combined_subseconds(time: &IsoTime) -> u32 {
    u32::from(time.millisecond) * 1_000_000
        + u32::from(time.microsecond) * 1_000
        + u32::from(time.nanosecond)
}

impl FromStr for Instant {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parsers::parse_instant(s.as_bytes())?;
        // Validated by `parse_instant`.
        let date = record.date.ok_or_else(TemporalError::assert)?;
        let time = record.time.ok_or_else(TemporalError::assert)?;
        let offset = record.offset.ok_or_else(TemporalError::assert)?;

        let offset_nanoseconds = match offset {
            UtcOffsetRecordOrZ::Z => 0,
            UtcOffsetRecordOrZ::Offset(record) => {
                parsers::utc_offset_record_to_nanoseconds(&record)?
            }
        };

        let iso = IsoDateTime::new_unchecked(
            crate::iso::IsoDate::new_unchecked(date.year, date.month, date.day),
            IsoTime::from_time_record(time)?,
        );
        Self::try_new(iso.as_nanoseconds().0 - i128::from(offset_nanoseconds))
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::Instant;
    use crate::options::{DifferenceSettings, RoundingMode, RoundingOptions, Unit};
    use crate::{NS_MAX_INSTANT, NS_MIN_INSTANT};

    #[test]
    fn instant_validates_range() {
        assert!(Instant::try_new(NS_MAX_INSTANT).is_ok());
        assert!(Instant::try_new(NS_MAX_INSTANT + 1).is_err());
        assert!(Instant::try_new(NS_MIN_INSTANT - 1).is_err());
    }

    #[test]
    fn epoch_millisecond_truncation_is_floored() {
        let instant = Instant::try_new(-1).unwrap();
        assert_eq!(instant.epoch_milliseconds(), -1);
        let instant = Instant::try_new(1).unwrap();
        assert_eq!(instant.epoch_milliseconds(), 0);
    }

    #[test]
    fn instant_until_rounds_to_unit() {
        let start = Instant::try_new(0).unwrap();
        let end = Instant::try_new(3_661_000_000_000).unwrap();
        let result = start
            .until(
                &end,
                DifferenceSettings {
                    largest_unit: Some(Unit::Hour),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.hours(), 1);
        assert_eq!(result.minutes(), 1);
        assert_eq!(result.seconds(), 1);
    }

    #[test]
    fn instant_round_half_expand() {
        let instant = Instant::try_new(90 * 60 * 1_000_000_000).unwrap();
        let options = RoundingOptions {
            smallest_unit: Some(Unit::Hour),
            rounding_mode: Some(RoundingMode::HalfExpand),
            ..Default::default()
        };
        let rounded = instant.round(options).unwrap();
        assert_eq!(rounded.as_i128(), 2 * 3600 * 1_000_000_000);
    }

    #[test]
    fn instant_from_str() {
        let instant = Instant::from_str("1970-01-01T00:00:00Z").unwrap();
        assert_eq!(instant.as_i128(), 0);
        let offset = Instant::from_str("1970-01-01T01:00:00+01:00").unwrap();
        assert_eq!(offset.as_i128(), 0);
        assert!(Instant::from_str("1970-01-01T00:00:00").is_err());
    }

    #[test]
    fn instant_to_string_is_utc() {
        let instant = Instant::try_new(0).unwrap();
        assert_eq!(
            instant.as_ixdtf_string(None, Default::default()).unwrap(),
            "1970-01-01T00:00:00Z"
        );
    }
}
