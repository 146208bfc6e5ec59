//! Error handling for the calendrical engine.
//!
//! Every fallible operation in this crate returns a [`TemporalError`]. The
//! error kinds mirror the error taxonomy surfaced to a host: `Range` for
//! values outside their valid domain, `Type` for the wrong kind of input,
//! `Syntax` for unparsable strings, and `Assert` for internal invariant
//! violations that must never be reported as a normal user-facing error.

use std::borrow::Cow;
use core::fmt;

/// The error kind of a [`TemporalError`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A generic error, usually configuration related.
    #[default]
    Generic,
    /// An error that maps to a host `TypeError`.
    Type,
    /// An error that maps to a host `RangeError`.
    Range,
    /// An error that maps to a host `SyntaxError`.
    Syntax,
    /// An internal assertion failure.
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => "Error",
            Self::Type => "TypeError",
            Self::Range => "RangeError",
            Self::Syntax => "SyntaxError",
            Self::Assert => "InternalError",
        }
        .fmt(f)
    }
}

/// Diagnostic messages for recurring error cases.
///
/// Using an enum keeps the common call sites allocation free while still
/// producing a precise message.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    // Range errors
    InstantOutOfRange,
    DateOutOfRange,
    DateTimeOutOfRange,
    YearMonthOutOfRange,
    EpochDaysOutOfRange,
    IntermediateDateTimeOutOfRange,
    DurationInvalid,
    DurationTimeOutOfRange,
    DurationSignMismatch,
    IsoDateInvalid,
    IsoTimeInvalid,
    MonthCodeInvalid,
    MonthCodeInvalidForCalendar,
    MonthAndMonthCodeUnresolvable,
    MonthNotInRange,
    EraInvalidForCalendar,
    EraYearNotInEraRange,
    NumberNotFinite,
    NumberNotIntegral,
    NumberNotPositive,
    FractionalDigitsPrecisionInvalid,
    FractionalTimeMoreThanNineDigits,
    IncrementExceedsMaximum,
    IncrementNotDivisible,
    IncrementInvalid,
    RoundingModeInvalid,
    RoundToUnitInvalid,
    SmallestUnitNotTimeUnit,
    SmallestUnitLargerThanLargestUnit,
    SmallestUnitIsRequired,
    UnitNotDate,
    UnitNotTime,
    UnitNoAutoDuringComparison,
    UnitRequired,
    CalendarNameInvalid,
    CalendarNotBuiltin,
    CalendarMismatch,
    CalendarFieldUnsupported,
    TimeZoneNameInvalid,
    TimeZoneInvalidIdentifier,
    TimeZoneMismatch,
    TimeZoneAmbiguousLocalTime,
    TimeZoneUnresolvableOffset,
    OffsetOptionInvalid,
    OffsetInvalidString,
    ParserNeedsDate,
    ParserNeedsTimeZone,
    ParserNeedsOffset,
    // Type errors
    FieldBagEmpty,
    FieldNotSupported,
    FieldTypeInvalid,
    // Assertions
    AssertionFailed,
    ZonedDiffDayCorrectionExhausted,
}

impl ErrorMessage {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::InstantOutOfRange => "Instant nanoseconds are not within a valid epoch range.",
            Self::DateOutOfRange => "Date is not within the supported date-time limits.",
            Self::DateTimeOutOfRange => "DateTime is not within the supported date-time limits.",
            Self::YearMonthOutOfRange => "YearMonth is not within the supported limits.",
            Self::EpochDaysOutOfRange => "Epoch days exceeded the maximum supported range.",
            Self::IntermediateDateTimeOutOfRange => {
                "Intermediate date-time was not within the supported limits."
            }
            Self::DurationInvalid => "Duration fields are not valid.",
            Self::DurationTimeOutOfRange => "Time duration exceeds the maximum duration range.",
            Self::DurationSignMismatch => {
                "Date and time portions of a duration must agree in sign."
            }
            Self::IsoDateInvalid => "Date fields are not a valid ISO date.",
            Self::IsoTimeInvalid => "Time fields are not a valid time.",
            Self::MonthCodeInvalid => "Month code was not a recognized month code value.",
            Self::MonthCodeInvalidForCalendar => {
                "Month code is not valid for the current calendar."
            }
            Self::MonthAndMonthCodeUnresolvable => {
                "month and monthCode fields could not be resolved."
            }
            Self::MonthNotInRange => "month value is not in a valid range.",
            Self::EraInvalidForCalendar => "Era is not valid for the current calendar.",
            Self::EraYearNotInEraRange => "eraYear is not valid for the provided era.",
            Self::NumberNotFinite => "Number value is not a finite value.",
            Self::NumberNotIntegral => "Number value is not an integral value.",
            Self::NumberNotPositive => "Number value must be a positive integer.",
            Self::FractionalDigitsPrecisionInvalid => {
                "fractionalSecondDigits must be in the range 0 through 9."
            }
            Self::FractionalTimeMoreThanNineDigits => {
                "Fractional seconds contained more than nine digits."
            }
            Self::IncrementExceedsMaximum => "roundingIncrement exceeds the unit maximum.",
            Self::IncrementNotDivisible => {
                "roundingIncrement does not evenly divide the unit maximum."
            }
            Self::IncrementInvalid => "roundingIncrement was not a valid increment value.",
            Self::RoundingModeInvalid => "roundingMode was not an accepted value.",
            Self::RoundToUnitInvalid => "Invalid roundTo unit provided.",
            Self::SmallestUnitNotTimeUnit => "smallestUnit must be a time unit.",
            Self::SmallestUnitLargerThanLargestUnit => {
                "smallestUnit cannot be larger than largestUnit."
            }
            Self::SmallestUnitIsRequired => "smallestUnit is required for this operation.",
            Self::UnitNotDate => "Unit was not a valid date unit.",
            Self::UnitNotTime => "Unit was not a valid time unit.",
            Self::UnitNoAutoDuringComparison => "Unit cannot be auto for this operation.",
            Self::UnitRequired => "A unit is required for this operation.",
            Self::CalendarNameInvalid => "Invalid calendarName option provided.",
            Self::CalendarNotBuiltin => "Calendar identifier is not a builtin calendar.",
            Self::CalendarMismatch => {
                "Calendars must be the same for the requested operation."
            }
            Self::CalendarFieldUnsupported => {
                "Calendrical math for non-ISO calendars is not supported by this engine."
            }
            Self::TimeZoneNameInvalid => "Invalid timeZoneName option provided.",
            Self::TimeZoneInvalidIdentifier => "Invalid time zone identifier provided.",
            Self::TimeZoneMismatch => {
                "Time zones must be the same for the requested operation."
            }
            Self::TimeZoneAmbiguousLocalTime => {
                "Local time was ambiguous or skipped and disambiguation is set to reject."
            }
            Self::TimeZoneUnresolvableOffset => {
                "Offset could not be matched against the time zone without disambiguation."
            }
            Self::OffsetOptionInvalid => "Invalid offset option provided.",
            Self::OffsetInvalidString => "Offset string was not a valid UTC offset.",
            Self::ParserNeedsDate => "Parsed string must contain a date component.",
            Self::ParserNeedsTimeZone => {
                "Parsed string must contain a time zone annotation."
            }
            Self::ParserNeedsOffset => "Parsed string must contain a UTC offset or designator.",
            Self::FieldBagEmpty => "No recognized fields were present in the fields bag.",
            Self::FieldNotSupported => "Field is not supported for the requested operation.",
            Self::FieldTypeInvalid => "Field value had an invalid type for its field key.",
            Self::AssertionFailed => "Internal engine invariant was violated.",
            Self::ZonedDiffDayCorrectionExhausted => {
                "Zoned difference day-correction search failed to converge."
            }
        }
    }
}

/// The error type returned by all fallible operations of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalError {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl TemporalError {
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: Cow::Borrowed(""),
        }
    }

    /// Create a generic error with a message.
    #[must_use]
    pub fn general(msg: &'static str) -> Self {
        Self::new(ErrorKind::Generic).with_message(msg)
    }

    /// Create a range error.
    #[must_use]
    pub const fn range() -> Self {
        Self::new(ErrorKind::Range)
    }

    /// Create a type error.
    #[must_use]
    pub const fn r#type() -> Self {
        Self::new(ErrorKind::Type)
    }

    /// Create a syntax error.
    #[must_use]
    pub const fn syntax() -> Self {
        Self::new(ErrorKind::Syntax)
    }

    /// Create an assertion error.
    ///
    /// Assertion errors signal an internal inconsistency rather than bad
    /// input and should be treated as a bug in the engine.
    #[must_use]
    pub const fn assert() -> Self {
        Self::new(ErrorKind::Assert)
    }

    /// Attach a message to this error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.msg = msg.into();
        self
    }

    /// Attach a predefined [`ErrorMessage`] to this error.
    #[must_use]
    pub fn with_enum(mut self, msg: ErrorMessage) -> Self {
        self.msg = Cow::Borrowed(msg.as_str());
        self
    }

    /// Returns this error's kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns this error's message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Consumes this error, returning its message.
    #[must_use]
    pub fn into_message(self) -> Cow<'static, str> {
        self.msg
    }
}

impl fmt::Display for TemporalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if !self.msg.is_empty() {
            write!(f, ": {}", self.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for TemporalError {}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ErrorMessage, TemporalError};

    #[test]
    fn display_includes_kind_and_message() {
        let err = TemporalError::range().with_enum(ErrorMessage::InstantOutOfRange);
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(
            err.to_string(),
            "RangeError: Instant nanoseconds are not within a valid epoch range."
        );
    }

    #[test]
    fn empty_message_displays_kind_only() {
        assert_eq!(TemporalError::r#type().to_string(), "TypeError");
    }
}
