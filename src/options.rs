//! Option types for the engine's operations.
//!
//! Every operation that accepts user-configurable behavior takes one of the
//! option records in this module. The string conversions implement the
//! canonical option value spellings.

use crate::parsers::Precision;
use crate::{error::ErrorMessage, TemporalError, TemporalResult, MS_PER_DAY, NS_PER_DAY};
use core::num::NonZeroU128;
use core::ops::Add;
use core::{fmt, str::FromStr};

mod increment;
mod relative_to;

pub use increment::RoundingIncrement;
pub use relative_to::RelativeTo;

// ==== RoundingOptions / DifferenceSettings ====

#[derive(Debug, Clone, Copy)]
pub(crate) enum DifferenceOperation {
    Until,
    Since,
}

/// Options for `toString` rounding of sub-second precision.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToStringRoundingOptions {
    pub precision: Precision,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedToStringRoundingOptions {
    pub(crate) precision: Precision,
    pub(crate) smallest_unit: Unit,
    pub(crate) rounding_mode: RoundingMode,
    pub(crate) increment: RoundingIncrement,
}

impl ToStringRoundingOptions {
    pub(crate) fn resolve(&self) -> TemporalResult<ResolvedToStringRoundingOptions> {
        let rounding_mode = self.rounding_mode.unwrap_or(RoundingMode::Trunc);
        match self.smallest_unit {
            Some(Unit::Minute) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Minute,
                smallest_unit: Unit::Minute,
                rounding_mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Second) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(0),
                smallest_unit: Unit::Second,
                rounding_mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Millisecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(3),
                smallest_unit: Unit::Millisecond,
                rounding_mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Microsecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(6),
                smallest_unit: Unit::Microsecond,
                rounding_mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Nanosecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(9),
                smallest_unit: Unit::Nanosecond,
                rounding_mode,
                increment: RoundingIncrement::ONE,
            }),
            None => match self.precision {
                Precision::Auto => Ok(ResolvedToStringRoundingOptions {
                    precision: Precision::Auto,
                    smallest_unit: Unit::Nanosecond,
                    rounding_mode,
                    increment: RoundingIncrement::ONE,
                }),
                Precision::Digit(0) => Ok(ResolvedToStringRoundingOptions {
                    precision: Precision::Digit(0),
                    smallest_unit: Unit::Second,
                    rounding_mode,
                    increment: RoundingIncrement::ONE,
                }),
                Precision::Digit(d) if (1..=3).contains(&d) => {
                    Ok(ResolvedToStringRoundingOptions {
                        precision: Precision::Digit(d),
                        smallest_unit: Unit::Millisecond,
                        rounding_mode,
                        increment: RoundingIncrement::try_new(10_u32.pow(3 - u32::from(d)))?,
                    })
                }
                Precision::Digit(d) if (4..=6).contains(&d) => {
                    Ok(ResolvedToStringRoundingOptions {
                        precision: Precision::Digit(d),
                        smallest_unit: Unit::Microsecond,
                        rounding_mode,
                        increment: RoundingIncrement::try_new(10_u32.pow(6 - u32::from(d)))?,
                    })
                }
                Precision::Digit(d) if (7..=9).contains(&d) => {
                    Ok(ResolvedToStringRoundingOptions {
                        precision: Precision::Digit(d),
                        smallest_unit: Unit::Nanosecond,
                        rounding_mode,
                        increment: RoundingIncrement::try_new(10_u32.pow(9 - u32::from(d)))?,
                    })
                }
                _ => Err(TemporalError::range()
                    .with_enum(ErrorMessage::FractionalDigitsPrecisionInvalid)),
            },
            _ => Err(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit)),
        }
    }
}

/// Options for the `until`/`since` family of operations.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy)]
pub struct DifferenceSettings {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

/// Options for the `round` family of operations.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct RoundingOptions {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

// Note: leaving both largest and smallest unit None would auto throw, so
// largest defaults to Auto.
impl Default for RoundingOptions {
    fn default() -> Self {
        Self {
            largest_unit: Some(Unit::Auto),
            smallest_unit: None,
            rounding_mode: None,
            increment: None,
        }
    }
}

/// Internal record of fully resolved rounding options.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRoundingOptions {
    pub(crate) largest_unit: Unit,
    pub(crate) smallest_unit: Unit,
    pub(crate) increment: RoundingIncrement,
    pub(crate) rounding_mode: RoundingMode,
}

impl ResolvedRoundingOptions {
    pub(crate) fn from_to_string_options(options: &ResolvedToStringRoundingOptions) -> Self {
        Self {
            largest_unit: Unit::Auto,
            smallest_unit: options.smallest_unit,
            increment: options.increment,
            rounding_mode: options.rounding_mode,
        }
    }

    /// `GetDifferenceSettings`
    pub(crate) fn from_diff_settings(
        options: DifferenceSettings,
        operation: DifferenceOperation,
        unit_group: UnitGroup,
        fallback_largest: Unit,
        fallback_smallest: Unit,
    ) -> TemporalResult<Self> {
        // 1. NOTE: The following steps read options and perform independent validation in alphabetical order.
        // 2. Let largestUnit be ? GetUnitValuedOption(options, "largestUnit", unitGroup, auto).
        unit_group.validate_unit(options.largest_unit, Some(Unit::Auto))?;

        // 4. Let roundingIncrement be ? GetRoundingIncrementOption(options).
        let increment = options.increment.unwrap_or_default();
        // 5. Let roundingMode be ? GetRoundingModeOption(options, trunc).
        // 6. If operation is since, set roundingMode to NegateRoundingMode(roundingMode).
        let rounding_mode = match operation {
            DifferenceOperation::Since => options
                .rounding_mode
                .unwrap_or(RoundingMode::Trunc)
                .negate(),
            DifferenceOperation::Until => options.rounding_mode.unwrap_or(RoundingMode::Trunc),
        };
        // 7. Let smallestUnit be ? GetUnitValuedOption(options, "smallestUnit", unitGroup, fallbackSmallestUnit).
        unit_group.validate_unit(options.smallest_unit, None)?;
        let smallest_unit = options.smallest_unit.unwrap_or(fallback_smallest);
        // 9. Let defaultLargestUnit be LargerOfTwoUnits(smallestLargestDefaultUnit, smallestUnit).
        let default_largest_unit = smallest_unit.max(fallback_largest);
        // 10. If largestUnit is auto, set largestUnit to defaultLargestUnit.
        let largest_unit = match options.largest_unit {
            Some(Unit::Auto) | None => default_largest_unit,
            Some(unit) => unit,
        };
        // 11. If LargerOfTwoUnits(largestUnit, smallestUnit) is not largestUnit, throw a RangeError exception.
        if largest_unit < smallest_unit {
            return Err(
                TemporalError::range().with_enum(ErrorMessage::SmallestUnitLargerThanLargestUnit)
            );
        }

        // 12. Let maximum be MaximumTemporalDurationRoundingIncrement(smallestUnit).
        // 13. If maximum is not unset, perform ? ValidateTemporalRoundingIncrement(roundingIncrement, maximum, false).
        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(max.into(), false)?;
        }

        Ok(ResolvedRoundingOptions {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    pub(crate) fn from_duration_options(
        options: RoundingOptions,
        existing_largest: Unit,
    ) -> TemporalResult<Self> {
        // If smallestUnitPresent is false and largestUnitPresent is false, throw a RangeError.
        if options.largest_unit.is_none() && options.smallest_unit.is_none() {
            return Err(TemporalError::range()
                .with_message("smallestUnit and largestUnit cannot both be None."));
        }

        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        // If smallestUnit is undefined, set smallestUnit to "nanosecond".
        let smallest_unit = options.smallest_unit.unwrap_or(Unit::Nanosecond);
        // Let defaultLargestUnit be LargerOfTwoUnits(existingLargestUnit, smallestUnit).
        let default_largest = existing_largest.max(smallest_unit);

        let largest_unit = match options.largest_unit {
            Some(Unit::Auto) | None => default_largest,
            Some(unit) => unit,
        };

        if largest_unit < smallest_unit {
            return Err(
                TemporalError::range().with_enum(ErrorMessage::SmallestUnitLargerThanLargestUnit)
            );
        }

        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(max.into(), false)?;
        }

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    pub(crate) fn from_datetime_options(options: RoundingOptions) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        let smallest_unit =
            UnitGroup::Time.validate_required_unit(options.smallest_unit, Some(Unit::Day))?;
        let (maximum, inclusive) = if smallest_unit == Unit::Day {
            (1, true)
        } else {
            let maximum = smallest_unit
                .to_maximum_rounding_increment()
                .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;
            (maximum, false)
        };

        increment.validate(maximum.into(), inclusive)?;

        Ok(Self {
            largest_unit: Unit::Auto,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    pub(crate) fn from_time_options(options: RoundingOptions) -> TemporalResult<Self> {
        let Some(smallest_unit) = options.smallest_unit else {
            return Err(TemporalError::range().with_enum(ErrorMessage::SmallestUnitIsRequired));
        };
        let increment = options.increment.unwrap_or(RoundingIncrement::ONE);
        let rounding_mode = options.rounding_mode.unwrap_or(RoundingMode::HalfExpand);

        let max = smallest_unit
            .to_maximum_rounding_increment()
            .ok_or_else(|| TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;

        increment.validate(u64::from(max), false)?;

        Ok(ResolvedRoundingOptions {
            largest_unit: Unit::Auto,
            increment,
            smallest_unit,
            rounding_mode,
        })
    }

    pub(crate) fn from_instant_options(options: RoundingOptions) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        let smallest_unit = UnitGroup::Time.validate_required_unit(options.smallest_unit, None)?;
        let maximum = match smallest_unit {
            Unit::Hour => 24u64,
            Unit::Minute => 24 * 60,
            Unit::Second => 24 * 3600,
            Unit::Millisecond => u64::from(MS_PER_DAY),
            Unit::Microsecond => u64::from(MS_PER_DAY) * 1000,
            Unit::Nanosecond => NS_PER_DAY,
            _ => return Err(TemporalError::range().with_enum(ErrorMessage::RoundToUnitInvalid)),
        };

        increment.validate(maximum, true)?;

        Ok(Self {
            largest_unit: Unit::Auto,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.smallest_unit == Unit::Nanosecond && self.increment == RoundingIncrement::ONE
    }
}

// ==== Units ====

/// Groups of units valid for an operation.
#[derive(Debug, Clone, Copy)]
pub enum UnitGroup {
    /// Only date units are valid.
    Date,
    /// Only time units are valid.
    Time,
    /// Date and time units are valid.
    DateTime,
}

impl UnitGroup {
    pub fn validate_required_unit(
        self,
        unit: Option<Unit>,
        extra_unit: Option<Unit>,
    ) -> TemporalResult<Unit> {
        let Some(unit) = unit else {
            return Err(TemporalError::range().with_enum(ErrorMessage::UnitRequired));
        };
        self.validate_unit(Some(unit), extra_unit)?;
        Ok(unit)
    }

    /// Note: this always rejects Auto unless `extra_unit` allows it.
    pub fn validate_unit(self, unit: Option<Unit>, extra_unit: Option<Unit>) -> TemporalResult<()> {
        match self {
            _ if unit == extra_unit => Ok(()),
            UnitGroup::Date => match unit {
                Some(unit) if unit.is_date_unit() => Ok(()),
                None => Ok(()),
                _ => Err(TemporalError::range().with_enum(ErrorMessage::UnitNotDate)),
            },
            UnitGroup::Time => match unit {
                Some(unit) if unit.is_time_unit() => Ok(()),
                None => Ok(()),
                _ => Err(TemporalError::range().with_enum(ErrorMessage::UnitNotTime)),
            },
            UnitGroup::DateTime if unit != Some(Unit::Auto) => Ok(()),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::UnitNoAutoDuringComparison)),
        }
    }
}

/// The unit of a rounding or difference operation.
///
/// The discriminants order the units by magnitude so `Ord` implements
/// `LargerOfTwoTemporalUnits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    /// The `Auto` unit
    Auto = 0,
    /// The `Nanosecond` unit
    Nanosecond,
    /// The `Microsecond` unit
    Microsecond,
    /// The `Millisecond` unit
    Millisecond,
    /// The `Second` unit
    Second,
    /// The `Minute` unit
    Minute,
    /// The `Hour` unit
    Hour,
    /// The `Day` unit
    Day,
    /// The `Week` unit
    Week,
    /// The `Month` unit
    Month,
    /// The `Year` unit
    Year,
}

impl Unit {
    /// Returns the `MaximumRoundingIncrement` for the current unit.
    #[inline]
    #[must_use]
    pub fn to_maximum_rounding_increment(self) -> Option<u32> {
        use Unit::{
            Auto, Day, Hour, Microsecond, Millisecond, Minute, Month, Nanosecond, Second, Week,
            Year,
        };
        let max = match self {
            Year | Month | Week | Day => return None,
            Hour => 24,
            Minute | Second => 60,
            Millisecond | Microsecond | Nanosecond => 1000,
            Auto => {
                debug_assert!(false, "Auto units should be resolved by this point");
                return None;
            }
        };

        Some(max)
    }

    /// Returns the length of this unit in nanoseconds, if it has a fixed one.
    #[must_use]
    pub const fn as_nanoseconds(&self) -> Option<NonZeroU128> {
        use Unit::{
            Auto, Day, Hour, Microsecond, Millisecond, Minute, Month, Nanosecond, Second, Week,
            Year,
        };
        match self {
            Year | Month | Week | Auto => None,
            Day => NonZeroU128::new(NS_PER_DAY as u128),
            Hour => NonZeroU128::new(3_600_000_000_000),
            Minute => NonZeroU128::new(60_000_000_000),
            Second => NonZeroU128::new(1_000_000_000),
            Millisecond => NonZeroU128::new(1_000_000),
            Microsecond => NonZeroU128::new(1_000),
            Nanosecond => NonZeroU128::new(1),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_calendar_unit(&self) -> bool {
        use Unit::{Month, Week, Year};
        matches!(self, Year | Month | Week)
    }

    #[inline]
    #[must_use]
    pub fn is_date_unit(&self) -> bool {
        use Unit::{Day, Month, Week, Year};
        matches!(self, Day | Year | Month | Week)
    }

    #[inline]
    #[must_use]
    pub fn is_time_unit(&self) -> bool {
        use Unit::{Hour, Microsecond, Millisecond, Minute, Nanosecond, Second};
        matches!(
            self,
            Hour | Minute | Second | Millisecond | Microsecond | Nanosecond
        )
    }
}

impl From<usize> for Unit {
    fn from(value: usize) -> Self {
        match value {
            10 => Self::Year,
            9 => Self::Month,
            8 => Self::Week,
            7 => Self::Day,
            6 => Self::Hour,
            5 => Self::Minute,
            4 => Self::Second,
            3 => Self::Millisecond,
            2 => Self::Microsecond,
            1 => Self::Nanosecond,
            _ => Self::Auto,
        }
    }
}

impl Add<usize> for Unit {
    type Output = Unit;

    fn add(self, rhs: usize) -> Self::Output {
        Unit::from(self as usize + rhs)
    }
}

/// A parsing error for `Unit`.
#[derive(Debug, Clone, Copy)]
pub struct ParseUnitError;

impl fmt::Display for ParseUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid Unit")
    }
}

impl FromStr for Unit {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "year" | "years" => Ok(Self::Year),
            "month" | "months" => Ok(Self::Month),
            "week" | "weeks" => Ok(Self::Week),
            "day" | "days" => Ok(Self::Day),
            "hour" | "hours" => Ok(Self::Hour),
            "minute" | "minutes" => Ok(Self::Minute),
            "second" | "seconds" => Ok(Self::Second),
            "millisecond" | "milliseconds" => Ok(Self::Millisecond),
            "microsecond" | "microseconds" => Ok(Self::Microsecond),
            "nanosecond" | "nanoseconds" => Ok(Self::Nanosecond),
            _ => Err(ParseUnitError),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => "auto",
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
            Self::Microsecond => "microsecond",
            Self::Nanosecond => "nanosecond",
        }
        .fmt(f)
    }
}

// ==== Overflow ====

/// The overflow policy for out-of-range field values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Clamp out-of-range values into range.
    #[default]
    Constrain,
    /// Reject out-of-range values.
    Reject,
}

/// A parsing error for `Overflow`.
#[derive(Debug, Clone, Copy)]
pub struct ParseOverflowError;

impl fmt::Display for ParseOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid overflow value")
    }
}

impl FromStr for Overflow {
    type Err = ParseOverflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constrain" => Ok(Self::Constrain),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseOverflowError),
        }
    }
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constrain => "constrain",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

// ==== Disambiguation ====

/// The disambiguation policy for local times that map onto zero or two
/// instants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguation {
    /// The default: earlier for a skipped time, the pre-transition offset
    /// otherwise.
    #[default]
    Compatible,
    /// Pick the earlier instant.
    Earlier,
    /// Pick the later instant.
    Later,
    /// Reject ambiguous or skipped local times.
    Reject,
}

/// A parsing error for `Disambiguation`.
#[derive(Debug, Clone, Copy)]
pub struct ParseDisambiguationError;

impl fmt::Display for ParseDisambiguationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid disambiguation value")
    }
}

impl FromStr for Disambiguation {
    type Err = ParseDisambiguationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compatible" => Ok(Self::Compatible),
            "earlier" => Ok(Self::Earlier),
            "later" => Ok(Self::Later),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseDisambiguationError),
        }
    }
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => "compatible",
            Self::Earlier => "earlier",
            Self::Later => "later",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// The offset disambiguation policy used when both an offset and a time zone
/// are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDisambiguation {
    /// Always use the parsed offset.
    Use,
    /// Prefer the parsed offset when the zone can confirm it.
    Prefer,
    /// Ignore the parsed offset.
    Ignore,
    /// Reject when the offset and zone disagree.
    Reject,
}

/// A parsing error for `OffsetDisambiguation`.
#[derive(Debug, Clone, Copy)]
pub struct ParseOffsetDisambiguationError;

impl fmt::Display for ParseOffsetDisambiguationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid offset disambiguation value")
    }
}

impl FromStr for OffsetDisambiguation {
    type Err = ParseOffsetDisambiguationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(Self::Use),
            "prefer" => Ok(Self::Prefer),
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseOffsetDisambiguationError),
        }
    }
}

impl fmt::Display for OffsetDisambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Use => "use",
            Self::Prefer => "prefer",
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

// ==== Rounding modes ====

/// The rounding mode of an operation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round toward positive infinity.
    Ceil,
    /// Round toward negative infinity.
    Floor,
    /// Round away from zero.
    Expand,
    /// Round toward zero.
    Trunc,
    /// Ties toward positive infinity.
    HalfCeil,
    /// Ties toward negative infinity.
    HalfFloor,
    /// Ties away from zero — the default.
    #[default]
    HalfExpand,
    /// Ties toward zero.
    HalfTrunc,
    /// Ties toward the even quotient.
    HalfEven,
}

/// The sign-resolved rounding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsignedRoundingMode {
    Infinity,
    Zero,
    HalfInfinity,
    HalfZero,
    HalfEven,
}

impl RoundingMode {
    /// Negates the current rounding mode.
    #[inline]
    #[must_use]
    pub const fn negate(self) -> Self {
        use RoundingMode::{
            Ceil, Expand, Floor, HalfCeil, HalfEven, HalfExpand, HalfFloor, HalfTrunc, Trunc,
        };

        match self {
            Ceil => Self::Floor,
            Floor => Self::Ceil,
            HalfCeil => Self::HalfFloor,
            HalfFloor => Self::HalfCeil,
            Trunc => Self::Trunc,
            Expand => Self::Expand,
            HalfTrunc => Self::HalfTrunc,
            HalfExpand => Self::HalfExpand,
            HalfEven => Self::HalfEven,
        }
    }

    /// Resolves this mode into an [`UnsignedRoundingMode`] given the sign of
    /// the quantity being rounded.
    #[inline]
    #[must_use]
    pub const fn get_unsigned_round_mode(self, is_positive: bool) -> UnsignedRoundingMode {
        use RoundingMode::{
            Ceil, Expand, Floor, HalfCeil, HalfEven, HalfExpand, HalfFloor, HalfTrunc, Trunc,
        };

        match self {
            Ceil if is_positive => UnsignedRoundingMode::Infinity,
            Ceil | Trunc => UnsignedRoundingMode::Zero,
            Floor if is_positive => UnsignedRoundingMode::Zero,
            Floor | Expand => UnsignedRoundingMode::Infinity,
            HalfCeil if is_positive => UnsignedRoundingMode::HalfInfinity,
            HalfCeil | HalfTrunc => UnsignedRoundingMode::HalfZero,
            HalfFloor if is_positive => UnsignedRoundingMode::HalfZero,
            HalfFloor | HalfExpand => UnsignedRoundingMode::HalfInfinity,
            HalfEven => UnsignedRoundingMode::HalfEven,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ceil" => Ok(Self::Ceil),
            "floor" => Ok(Self::Floor),
            "expand" => Ok(Self::Expand),
            "trunc" => Ok(Self::Trunc),
            "halfCeil" => Ok(Self::HalfCeil),
            "halfFloor" => Ok(Self::HalfFloor),
            "halfExpand" => Ok(Self::HalfExpand),
            "halfTrunc" => Ok(Self::HalfTrunc),
            "halfEven" => Ok(Self::HalfEven),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::RoundingModeInvalid)),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Expand => "expand",
            Self::Trunc => "trunc",
            Self::HalfCeil => "halfCeil",
            Self::HalfFloor => "halfFloor",
            Self::HalfExpand => "halfExpand",
            Self::HalfTrunc => "halfTrunc",
            Self::HalfEven => "halfEven",
        }
        .fmt(f)
    }
}

// ==== Display options ====

/// Whether to show the calendar annotation in `toString` output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisplayCalendar {
    /// Show the annotation for non-ISO calendars only.
    #[default]
    Auto,
    /// Always show the annotation.
    Always,
    /// Never show the annotation.
    Never,
    /// Show the annotation with the critical flag.
    Critical,
}

impl fmt::Display for DisplayCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCalendar::Auto => "auto",
            DisplayCalendar::Always => "always",
            DisplayCalendar::Never => "never",
            DisplayCalendar::Critical => "critical",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayCalendar {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "critical" => Ok(Self::Critical),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::CalendarNameInvalid)),
        }
    }
}

/// Whether to show the UTC offset in `toString` output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisplayOffset {
    #[default]
    Auto,
    Never,
}

impl fmt::Display for DisplayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayOffset::Auto => "auto",
            DisplayOffset::Never => "never",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayOffset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::OffsetOptionInvalid)),
        }
    }
}

/// Whether to show the time zone annotation in `toString` output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisplayTimeZone {
    #[default]
    Auto,
    Never,
    Critical,
}

impl fmt::Display for DisplayTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayTimeZone::Auto => "auto",
            DisplayTimeZone::Never => "never",
            DisplayTimeZone::Critical => "critical",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayTimeZone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            "critical" => Ok(Self::Critical),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneNameInvalid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DifferenceOperation, DifferenceSettings, ResolvedRoundingOptions, RoundingMode, Unit,
        UnitGroup,
    };

    #[test]
    fn unit_ordering_matches_magnitude() {
        assert!(Unit::Year > Unit::Month);
        assert!(Unit::Day > Unit::Hour);
        assert!(Unit::Nanosecond < Unit::Microsecond);
        assert_eq!(Unit::Minute.max(Unit::Hour), Unit::Hour);
    }

    #[test]
    fn difference_settings_reject_inverted_units() {
        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Hour),
            smallest_unit: Some(Unit::Day),
            ..Default::default()
        };
        let result = ResolvedRoundingOptions::from_diff_settings(
            settings,
            DifferenceOperation::Until,
            UnitGroup::DateTime,
            Unit::Day,
            Unit::Nanosecond,
        );
        assert!(result.is_err());
    }

    #[test]
    fn since_negates_rounding_mode() {
        let settings = DifferenceSettings {
            rounding_mode: Some(RoundingMode::Ceil),
            ..Default::default()
        };
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            DifferenceOperation::Since,
            UnitGroup::DateTime,
            Unit::Day,
            Unit::Nanosecond,
        )
        .unwrap();
        assert_eq!(resolved.rounding_mode, RoundingMode::Floor);
    }
}
