//! IXDTF parsing and formatting.
//!
//! Parsing is delegated to `ixdtf`; the functions here layer the engine's
//! validation rules over the raw parse records (a date component is
//! mandatory for date-time strings, a `Z` designator is only allowed where an
//! exact time is expected, a zoned string needs a time zone annotation).
//!
//! Formatting uses `writeable` builders so `toString` renders each component
//! with an exact length hint and no intermediate allocations.

use crate::{
    error::ErrorMessage,
    options::{DisplayCalendar, DisplayOffset, DisplayTimeZone},
    Sign, TemporalError, TemporalResult,
};
use ixdtf::{
    encoding::Utf8,
    parsers::{IsoDurationParser, IxdtfParser},
    records::{DurationParseRecord, IxdtfParseRecord, UtcOffsetRecord, UtcOffsetRecordOrZ},
    ParseError,
};
use writeable::{impl_display_with_writeable, LengthHint, Writeable};

pub(crate) fn map_parse_error(err: ParseError) -> TemporalError {
    TemporalError::syntax().with_message(format!("{err}"))
}

#[derive(PartialEq)]
enum ParseVariant {
    YearMonth,
    MonthDay,
    DateTime,
    Time,
}

#[inline]
fn parse_ixdtf(source: &[u8], variant: ParseVariant) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let mut parser = IxdtfParser::from_utf8(source);

    let record = match variant {
        ParseVariant::YearMonth => parser.parse_year_month(),
        ParseVariant::MonthDay => parser.parse_month_day(),
        ParseVariant::DateTime => parser.parse(),
        ParseVariant::Time => parser.parse_time(),
    }
    .map_err(map_parse_error)?;

    // Validate that the DateRecord exists.
    if variant != ParseVariant::Time && record.date.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate));
    }

    Ok(record)
}

/// Parses a `DateTime` string for the plain types.
///
/// A `Z` designator denotes an exact time, which a plain type cannot
/// represent, so it is rejected here.
#[inline]
pub(crate) fn parse_date_time(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.offset == Some(UtcOffsetRecordOrZ::Z) {
        return Err(TemporalError::range()
            .with_message("UTC designator is not valid for a plain date-time string."));
    }
    Ok(record)
}

/// Parses a string for `ZonedDateTime`, requiring a time zone annotation.
#[inline]
pub(crate) fn parse_zoned_date_time(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.tz.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTimeZone));
    }
    Ok(record)
}

/// Parses an `Instant` string: a date-time with a UTC offset or designator.
#[inline]
pub(crate) fn parse_instant(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.time.is_none() {
        return Err(TemporalError::range()
            .with_message("Instant strings must contain a time component."));
    }
    if record.offset.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsOffset));
    }
    Ok(record)
}

/// Parses a `YearMonth` string.
#[inline]
pub(crate) fn parse_year_month(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::YearMonth)?;
    if record.offset == Some(UtcOffsetRecordOrZ::Z) {
        return Err(TemporalError::range()
            .with_message("UTC designator is not valid for a year-month string."));
    }
    Ok(record)
}

/// Parses a `MonthDay` string.
#[inline]
pub(crate) fn parse_month_day(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::MonthDay)?;
    if record.offset == Some(UtcOffsetRecordOrZ::Z) {
        return Err(TemporalError::range()
            .with_message("UTC designator is not valid for a month-day string."));
    }
    Ok(record)
}

/// Parses a `Time` string, falling back through the bracketed formats the
/// grammar allows a time to be embedded in.
#[inline]
pub(crate) fn parse_time(source: &[u8]) -> TemporalResult<IxdtfParseRecord<Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::Time)?;
    if record.offset == Some(UtcOffsetRecordOrZ::Z) {
        return Err(
            TemporalError::range().with_message("UTC designator is not valid for a time string.")
        );
    }
    Ok(record)
}

/// Parses a duration string.
#[inline]
pub(crate) fn parse_duration(source: &[u8]) -> TemporalResult<DurationParseRecord> {
    IsoDurationParser::<Utf8>::from_utf8(source)
        .parse()
        .map_err(map_parse_error)
}

/// Extracts a calendar annotation from any of the allowed IXDTF formats.
///
/// Returns `None` when the source is not one of the formats, `Some(&[])`
/// when it parsed without an annotation.
pub(crate) fn parse_allowed_calendar_formats(s: &str) -> Option<&[u8]> {
    if let Ok(record) = parse_ixdtf(s.as_bytes(), ParseVariant::DateTime) {
        return Some(record.calendar.unwrap_or(&[]));
    } else if let Ok(record) = IxdtfParser::from_utf8(s.as_bytes()).parse_time() {
        return Some(record.calendar.unwrap_or(&[]));
    } else if let Ok(record) = parse_ixdtf(s.as_bytes(), ParseVariant::YearMonth) {
        return Some(record.calendar.unwrap_or(&[]));
    } else if let Ok(record) = parse_ixdtf(s.as_bytes(), ParseVariant::MonthDay) {
        return Some(record.calendar.unwrap_or(&[]));
    }
    None
}

/// Converts a parsed UTC offset record into signed offset nanoseconds.
pub(crate) fn utc_offset_record_to_nanoseconds(record: &UtcOffsetRecord) -> TemporalResult<i64> {
    let fraction_ns = record
        .fraction()
        .map(|fraction| {
            fraction.to_nanoseconds().ok_or(
                TemporalError::range().with_enum(ErrorMessage::FractionalTimeMoreThanNineDigits),
            )
        })
        .transpose()?
        .unwrap_or(0);
    let hours_ns = i64::from(record.hour()) * 3_600_000_000_000;
    let minutes_ns = i64::from(record.minute()) * 60_000_000_000;
    let seconds_ns = i64::from(record.second().unwrap_or(0)) * 1_000_000_000;
    Ok((hours_ns + minutes_ns + seconds_ns + i64::from(fraction_ns))
        * i64::from(record.sign() as i8))
}

/// Returns whether a parsed offset record has sub-minute precision.
pub(crate) fn utc_offset_record_is_sub_minute(record: &UtcOffsetRecord) -> bool {
    record.second().is_some()
}

// ==== IXDTF formatting ====

/// Builder for an IXDTF-formatted string out of its formattable parts.
#[derive(Debug, Default)]
pub struct IxdtfStringBuilder<'a> {
    inner: FormattableIxdtf<'a>,
}

impl<'a> IxdtfStringBuilder<'a> {
    pub(crate) fn with_date(mut self, year: i32, month: u8, day: u8) -> Self {
        self.inner.date = Some(FormattableDate(year, month, day));
        self
    }

    pub(crate) fn with_time(
        mut self,
        hour: u8,
        minute: u8,
        second: u8,
        subsecond_nanoseconds: u32,
        precision: Precision,
    ) -> Self {
        self.inner.time = Some(FormattableTime {
            hour,
            minute,
            second,
            nanosecond: subsecond_nanoseconds,
            precision,
            include_sep: true,
        });
        self
    }

    pub(crate) fn with_minute_offset(
        mut self,
        sign: Sign,
        hour: u8,
        minute: u8,
        show: DisplayOffset,
    ) -> Self {
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: UtcOffsetPart::Offset(FormattableOffset {
                sign,
                time: FormattableTime {
                    hour,
                    minute,
                    second: 0,
                    nanosecond: 0,
                    precision: Precision::Minute,
                    include_sep: true,
                },
            }),
        });
        self
    }

    pub(crate) fn with_z(mut self, show: DisplayOffset) -> Self {
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: UtcOffsetPart::Z,
        });
        self
    }

    pub(crate) fn with_timezone(mut self, timezone: &'a str, show: DisplayTimeZone) -> Self {
        self.inner.timezone = Some(FormattableTimeZone { show, timezone });
        self
    }

    pub(crate) fn with_calendar(mut self, calendar: &'a str, show: DisplayCalendar) -> Self {
        self.inner.calendar = Some(FormattableCalendar { show, calendar });
        self
    }

    pub(crate) fn build(self) -> String {
        self.inner.write_to_string().into_owned()
    }
}

/// Sub-second precision of a formatted time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    /// Emit digits through the last nonzero sub-second digit.
    #[default]
    Auto,
    /// Emit minute precision and nothing below.
    Minute,
    /// Emit exactly the given number of fractional digits (0 through 9).
    Digit(u8),
}

#[derive(Debug)]
pub(crate) struct FormattableDate(pub(crate) i32, pub(crate) u8, pub(crate) u8);

impl Writeable for FormattableDate {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.2, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let year_length = if (0..=9999).contains(&self.0) { 4 } else { 7 };
        LengthHint::exact(6 + year_length)
    }
}

#[derive(Debug)]
pub(crate) struct FormattableTime {
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    /// Combined sub-second value in nanoseconds.
    pub(crate) nanosecond: u32,
    pub(crate) precision: Precision,
    pub(crate) include_sep: bool,
}

impl Writeable for FormattableTime {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_padded_u8(self.hour, sink)?;
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.minute, sink)?;
        if self.precision == Precision::Minute {
            return Ok(());
        }
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.second, sink)?;
        if (self.nanosecond == 0 && self.precision == Precision::Auto)
            || self.precision == Precision::Digit(0)
        {
            return Ok(());
        }
        sink.write_char('.')?;
        write_fraction(self.nanosecond, self.precision, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let sep = usize::from(self.include_sep);
        if self.precision == Precision::Minute {
            return LengthHint::exact(4 + sep);
        }
        let base = 6 + sep * 2;
        if (self.nanosecond == 0 && self.precision == Precision::Auto)
            || self.precision == Precision::Digit(0)
        {
            return LengthHint::exact(base);
        }
        if let Precision::Digit(d) = self.precision {
            return LengthHint::exact(base + 1 + usize::from(d));
        }
        LengthHint::between(base + 2, base + 10)
    }
}

#[derive(Debug)]
pub(crate) struct FormattableOffset {
    pub(crate) sign: Sign,
    pub(crate) time: FormattableTime,
}

impl Writeable for FormattableOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        match self.sign {
            Sign::Negative => sink.write_char('-')?,
            _ => sink.write_char('+')?,
        }
        self.time.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.time.writeable_length_hint() + 1
    }
}

#[derive(Debug)]
pub(crate) enum UtcOffsetPart {
    Z,
    Offset(FormattableOffset),
}

#[derive(Debug)]
pub(crate) struct FormattableUtcOffset {
    pub(crate) show: DisplayOffset,
    pub(crate) offset: UtcOffsetPart,
}

impl Writeable for FormattableUtcOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayOffset::Never {
            return Ok(());
        }
        match &self.offset {
            UtcOffsetPart::Z => sink.write_char('Z'),
            UtcOffsetPart::Offset(offset) => offset.write_to(sink),
        }
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.show == DisplayOffset::Never {
            return LengthHint::exact(0);
        }
        match &self.offset {
            UtcOffsetPart::Z => LengthHint::exact(1),
            UtcOffsetPart::Offset(o) => o.writeable_length_hint(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FormattableTimeZone<'a> {
    pub(crate) show: DisplayTimeZone,
    pub(crate) timezone: &'a str,
}

impl Writeable for FormattableTimeZone<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayTimeZone::Never {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayTimeZone::Critical {
            sink.write_char('!')?;
        }
        sink.write_str(self.timezone)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.show == DisplayTimeZone::Never {
            return LengthHint::exact(0);
        }
        let critical = usize::from(self.show == DisplayTimeZone::Critical);
        LengthHint::exact(2 + critical + self.timezone.len())
    }
}

#[derive(Debug)]
pub(crate) struct FormattableCalendar<'a> {
    pub(crate) show: DisplayCalendar,
    pub(crate) calendar: &'a str,
}

impl FormattableCalendar<'_> {
    fn is_shown(&self) -> bool {
        !(self.show == DisplayCalendar::Never
            || self.show == DisplayCalendar::Auto && self.calendar == "iso8601")
    }
}

impl Writeable for FormattableCalendar<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if !self.is_shown() {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayCalendar::Critical {
            sink.write_char('!')?;
        }
        sink.write_str("u-ca=")?;
        sink.write_str(self.calendar)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if !self.is_shown() {
            return LengthHint::exact(0);
        }
        let critical = usize::from(self.show == DisplayCalendar::Critical);
        LengthHint::exact(7 + critical + self.calendar.len())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FormattableIxdtf<'a> {
    pub(crate) date: Option<FormattableDate>,
    pub(crate) time: Option<FormattableTime>,
    pub(crate) utc_offset: Option<FormattableUtcOffset>,
    pub(crate) timezone: Option<FormattableTimeZone<'a>>,
    pub(crate) calendar: Option<FormattableCalendar<'a>>,
}

impl Writeable for FormattableIxdtf<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if let Some(date) = &self.date {
            date.write_to(sink)?;
        }
        if let Some(time) = &self.time {
            if self.date.is_some() {
                sink.write_char('T')?;
            }
            time.write_to(sink)?;
        }
        if let Some(offset) = &self.utc_offset {
            offset.write_to(sink)?;
        }
        if let Some(timezone) = &self.timezone {
            timezone.write_to(sink)?;
        }
        if let Some(calendar) = &self.calendar {
            calendar.write_to(sink)?;
        }

        Ok(())
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let mut hint = LengthHint::exact(0);
        if let Some(date) = &self.date {
            hint = hint + date.writeable_length_hint();
        }
        if let Some(time) = &self.time {
            hint = hint + time.writeable_length_hint() + usize::from(self.date.is_some());
        }
        if let Some(offset) = &self.utc_offset {
            hint = hint + offset.writeable_length_hint();
        }
        if let Some(timezone) = &self.timezone {
            hint = hint + timezone.writeable_length_hint();
        }
        if let Some(calendar) = &self.calendar {
            hint = hint + calendar.writeable_length_hint();
        }
        hint
    }
}

/// A formattable `YearMonth` string: the day is only rendered when a
/// calendar annotation is displayed.
#[derive(Debug)]
pub(crate) struct FormattableYearMonth<'a> {
    pub(crate) date: FormattableDate,
    pub(crate) calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableYearMonth<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.date.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.1, sink)?;
        if renders_reference_fields(&self.calendar) {
            sink.write_char('-')?;
            write_padded_u8(self.date.2, sink)?;
        }
        self.calendar.write_to(sink)
    }
}

/// A formattable `MonthDay` string: the year is only rendered when a
/// calendar annotation is displayed.
#[derive(Debug)]
pub(crate) struct FormattableMonthDay<'a> {
    pub(crate) date: FormattableDate,
    pub(crate) calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableMonthDay<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if renders_reference_fields(&self.calendar) {
            write_year(self.date.0, sink)?;
            sink.write_char('-')?;
        }
        write_padded_u8(self.date.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.2, sink)?;
        self.calendar.write_to(sink)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FormattableDateDuration {
    pub(crate) years: u64,
    pub(crate) months: u64,
    pub(crate) weeks: u64,
    pub(crate) days: u64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FormattableTimeDuration {
    pub(crate) hours: u64,
    pub(crate) minutes: u64,
    pub(crate) seconds: u64,
    /// Combined sub-second value in nanoseconds.
    pub(crate) fraction: u32,
}

pub(crate) struct FormattableDuration {
    pub(crate) precision: Precision,
    pub(crate) sign: Sign,
    pub(crate) date: Option<FormattableDateDuration>,
    pub(crate) time: Option<FormattableTimeDuration>,
}

impl Writeable for FormattableDuration {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.sign == Sign::Negative {
            sink.write_char('-')?;
        }
        sink.write_char('P')?;
        if let Some(date) = self.date {
            checked_write_u64_with_suffix(date.years, 'Y', sink)?;
            checked_write_u64_with_suffix(date.months, 'M', sink)?;
            checked_write_u64_with_suffix(date.weeks, 'W', sink)?;
            checked_write_u64_with_suffix(date.days, 'D', sink)?;
        }
        if let Some(time) = self.time {
            let unit_below_minute = self.date.is_none() && time.hours == 0 && time.minutes == 0;
            let write_second = time.seconds != 0
                || time.fraction != 0
                || unit_below_minute
                || matches!(self.precision, Precision::Digit(_));

            if time.hours != 0 || time.minutes != 0 || write_second {
                sink.write_char('T')?;
            }

            checked_write_u64_with_suffix(time.hours, 'H', sink)?;
            checked_write_u64_with_suffix(time.minutes, 'M', sink)?;
            if write_second {
                time.seconds.write_to(sink)?;
                if self.precision == Precision::Digit(0)
                    || (self.precision == Precision::Auto && time.fraction == 0)
                {
                    sink.write_char('S')?;
                    return Ok(());
                }
                sink.write_char('.')?;
                write_fraction(time.fraction, self.precision, sink)?;
                sink.write_char('S')?;
            }
        }
        Ok(())
    }
}

impl_display_with_writeable!(IxdtfStringBuilder<'_>);
impl_display_with_writeable!(FormattableIxdtf<'_>);
impl_display_with_writeable!(FormattableYearMonth<'_>);
impl_display_with_writeable!(FormattableMonthDay<'_>);
impl_display_with_writeable!(FormattableDuration);
impl_display_with_writeable!(FormattableDate);
impl_display_with_writeable!(FormattableTime);
impl_display_with_writeable!(FormattableUtcOffset);
impl_display_with_writeable!(FormattableOffset);
impl_display_with_writeable!(FormattableTimeZone<'_>);
impl_display_with_writeable!(FormattableCalendar<'_>);

impl Writeable for IxdtfStringBuilder<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        self.inner.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.inner.writeable_length_hint()
    }
}

// ==== Formatting primitives ====

/// Year-month and month-day strings only render their reference day/year when
/// a non-ISO calendar or a forced annotation is in play.
fn renders_reference_fields(calendar: &FormattableCalendar<'_>) -> bool {
    calendar.calendar != "iso8601"
        || matches!(
            calendar.show,
            DisplayCalendar::Always | DisplayCalendar::Critical
        )
}

fn write_padded_u8<W: core::fmt::Write + ?Sized>(num: u8, sink: &mut W) -> core::fmt::Result {
    if num < 10 {
        sink.write_char('0')?;
    }
    num.write_to(sink)
}

fn write_year<W: core::fmt::Write + ?Sized>(year: i32, sink: &mut W) -> core::fmt::Result {
    if (0..=9999).contains(&year) {
        // Four-digit years render unsigned and zero padded.
        let mut remainder = year;
        (remainder / 1000).write_to(sink)?;
        remainder %= 1000;
        (remainder / 100).write_to(sink)?;
        remainder %= 100;
        (remainder / 10).write_to(sink)?;
        (remainder % 10).write_to(sink)
    } else {
        // Extended years render with a sign and six digits.
        sink.write_char(if year < 0 { '-' } else { '+' })?;
        let mut divisor = 100_000;
        let mut remainder = year.unsigned_abs();
        while divisor != 0 {
            (remainder / divisor).write_to(sink)?;
            remainder %= divisor;
            divisor /= 10;
        }
        Ok(())
    }
}

fn write_fraction<W: core::fmt::Write + ?Sized>(
    nanoseconds: u32,
    precision: Precision,
    sink: &mut W,
) -> core::fmt::Result {
    debug_assert!(nanoseconds < 1_000_000_000);
    let mut digits = [0u8; 9];
    let mut value = nanoseconds;
    let mut last_nonzero = 1;
    for (i, digit) in digits.iter_mut().enumerate().rev() {
        *digit = (value % 10) as u8;
        value /= 10;
        if *digit != 0 && last_nonzero == 1 {
            last_nonzero = last_nonzero.max(i + 1);
        }
    }
    let count = match precision {
        Precision::Digit(d) if d <= 9 => usize::from(d),
        _ => last_nonzero,
    };
    for digit in digits.iter().take(count) {
        digit.write_to(sink)?;
    }
    Ok(())
}

fn checked_write_u64_with_suffix<W: core::fmt::Write + ?Sized>(
    value: u64,
    suffix: char,
    sink: &mut W,
) -> core::fmt::Result {
    if value == 0 {
        return Ok(());
    }
    value.write_to(sink)?;
    sink.write_char(suffix)
}

#[cfg(test)]
mod tests {
    use super::{FormattableDate, IxdtfStringBuilder, Precision};
    use crate::options::{DisplayCalendar, DisplayOffset};
    use crate::Sign;
    use writeable::Writeable;

    #[test]
    fn formats_basic_date_time() {
        let result = IxdtfStringBuilder::default()
            .with_date(2024, 3, 5)
            .with_time(8, 9, 10, 0, Precision::Auto)
            .build();
        assert_eq!(result, "2024-03-05T08:09:10");
    }

    #[test]
    fn formats_fractional_seconds() {
        let result = IxdtfStringBuilder::default()
            .with_date(2024, 3, 5)
            .with_time(8, 9, 10, 123_000_000, Precision::Auto)
            .build();
        assert_eq!(result, "2024-03-05T08:09:10.123");

        let result = IxdtfStringBuilder::default()
            .with_date(2024, 3, 5)
            .with_time(8, 9, 10, 120_000_000, Precision::Digit(5))
            .build();
        assert_eq!(result, "2024-03-05T08:09:10.12000");
    }

    #[test]
    fn formats_offset_and_calendar() {
        let result = IxdtfStringBuilder::default()
            .with_date(2024, 12, 31)
            .with_time(23, 59, 59, 0, Precision::Auto)
            .with_minute_offset(Sign::Negative, 5, 0, DisplayOffset::Auto)
            .with_calendar("gregory", DisplayCalendar::Auto)
            .build();
        assert_eq!(result, "2024-12-31T23:59:59-05:00[u-ca=gregory]");
    }

    #[test]
    fn formats_extended_years() {
        assert_eq!(FormattableDate(-271_821, 4, 20).to_string(), "-271821-04-20");
        assert_eq!(FormattableDate(275_760, 9, 13).to_string(), "+275760-09-13");
        assert_eq!(FormattableDate(32, 1, 2).to_string(), "0032-01-02");
    }
}
