//! The calendar abstraction.
//!
//! A [`Calendar`] is a canonical calendar identifier plus the field-access
//! and arithmetic hooks the date engines call back into. The ISO 8601
//! calendar is fully implemented; the remaining identifiers parse, compare,
//! and format, but their calendrical math needs locale data this engine does
//! not carry, so those hooks surface a `RangeError` through the same
//! signatures a locale-data-backed implementation would use.

use core::str::FromStr;

use tinystr::{tinystr, TinyAsciiStr};

use crate::{
    components::{duration::DateDuration, PartialDate, PlainDate},
    error::ErrorMessage,
    fields::FieldMap,
    iso::{constrain_iso_day, is_valid_iso_day, IsoDate},
    options::Overflow,
    parsers::parse_allowed_calendar_formats,
    utils, TemporalError, TemporalResult,
};

/// The built-in calendar identifiers.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calendar {
    /// The proleptic Gregorian reference calendar.
    #[default]
    Iso,
    Buddhist,
    Chinese,
    Coptic,
    Dangi,
    Ethiopian,
    EthiopianAmeteAlem,
    Gregorian,
    Hebrew,
    Indian,
    IslamicCivil,
    IslamicObservational,
    IslamicTabular,
    IslamicUmmAlQura,
    Japanese,
    Persian,
    Roc,
}

impl Calendar {
    /// Returns a `Calendar` from a slice of UTF-8 encoded bytes holding a
    /// BCP-47 calendar identifier.
    pub fn from_utf8(bytes: &[u8]) -> TemporalResult<Self> {
        let lowercase = bytes.to_ascii_lowercase();
        let calendar = match lowercase.as_slice() {
            b"iso8601" => Self::Iso,
            b"buddhist" => Self::Buddhist,
            b"chinese" => Self::Chinese,
            b"coptic" => Self::Coptic,
            b"dangi" => Self::Dangi,
            b"ethiopic" => Self::Ethiopian,
            b"ethioaa" | b"ethiopic-amete-alem" => Self::EthiopianAmeteAlem,
            b"gregory" => Self::Gregorian,
            b"hebrew" => Self::Hebrew,
            b"indian" => Self::Indian,
            b"islamic-civil" => Self::IslamicCivil,
            b"islamic" | b"islamic-rgsa" => Self::IslamicObservational,
            b"islamic-tbla" => Self::IslamicTabular,
            b"islamic-umalqura" => Self::IslamicUmmAlQura,
            b"japanese" => Self::Japanese,
            b"persian" => Self::Persian,
            b"roc" => Self::Roc,
            _ => {
                return Err(TemporalError::range().with_enum(ErrorMessage::CalendarNotBuiltin))
            }
        };
        Ok(calendar)
    }

    /// Returns the canonical identifier of this calendar.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Iso => "iso8601",
            Self::Buddhist => "buddhist",
            Self::Chinese => "chinese",
            Self::Coptic => "coptic",
            Self::Dangi => "dangi",
            Self::Ethiopian => "ethiopic",
            Self::EthiopianAmeteAlem => "ethioaa",
            Self::Gregorian => "gregory",
            Self::Hebrew => "hebrew",
            Self::Indian => "indian",
            Self::IslamicCivil => "islamic-civil",
            Self::IslamicObservational => "islamic",
            Self::IslamicTabular => "islamic-tbla",
            Self::IslamicUmmAlQura => "islamic-umalqura",
            Self::Japanese => "japanese",
            Self::Persian => "persian",
            Self::Roc => "roc",
        }
    }

    /// Returns whether this is the ISO 8601 calendar.
    #[inline]
    pub fn is_iso(&self) -> bool {
        matches!(self, Self::Iso)
    }

    fn unsupported() -> TemporalError {
        TemporalError::range().with_enum(ErrorMessage::CalendarFieldUnsupported)
    }
}

impl FromStr for Calendar {
    type Err = TemporalError;

    // `ParseTemporalCalendarString`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_allowed_calendar_formats(s) {
            Some([]) => Ok(Calendar::default()),
            Some(result) => Calendar::from_utf8(result),
            None => Calendar::from_utf8(s.as_bytes()),
        }
    }
}

// ==== Calendar operation hooks ====

impl Calendar {
    /// `CalendarDateFromFields`
    pub fn date_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<PlainDate> {
        let resolved = ResolvedCalendarFields::try_from_partial(partial, overflow, ResolutionType::Date)?;
        if self.is_iso() {
            return PlainDate::new_with_overflow(
                resolved.year,
                resolved.month_code.to_month_integer(),
                resolved.day,
                *self,
                overflow,
            );
        }
        Err(Self::unsupported())
    }

    /// `CalendarYearMonthFromFields`: resolves the fields to the first day
    /// of the month.
    pub(crate) fn year_month_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<IsoDate> {
        let resolved =
            ResolvedCalendarFields::try_from_partial(partial, overflow, ResolutionType::YearMonth)?;
        if self.is_iso() {
            return IsoDate::new_with_overflow(
                resolved.year,
                resolved.month_code.to_month_integer(),
                resolved.day,
                overflow,
            );
        }
        Err(Self::unsupported())
    }

    /// `CalendarMonthDayFromFields`: validates against the provided (or
    /// reference) year, then anchors the result at the ISO reference year.
    pub(crate) fn month_day_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<IsoDate> {
        let resolved =
            ResolvedCalendarFields::try_from_partial(partial, overflow, ResolutionType::MonthDay)?;
        if self.is_iso() {
            let validated = IsoDate::new_with_overflow(
                resolved.year,
                resolved.month_code.to_month_integer(),
                resolved.day,
                overflow,
            )?;
            return IsoDate::new_with_overflow(
                MONTH_DAY_REFERENCE_YEAR,
                validated.month,
                validated.day,
                Overflow::Constrain,
            );
        }
        Err(Self::unsupported())
    }

    /// `CalendarDateAdd`
    pub fn date_add(
        &self,
        date: &IsoDate,
        duration: &DateDuration,
        overflow: Overflow,
    ) -> TemporalResult<PlainDate> {
        if self.is_iso() {
            let result = date.add_date_duration(duration, overflow)?;
            return PlainDate::try_new(result.year, result.month, result.day, *self);
        }
        Err(Self::unsupported())
    }

    /// `CalendarDateUntil`
    pub fn date_until(
        &self,
        one: &IsoDate,
        two: &IsoDate,
        largest_unit: crate::options::Unit,
    ) -> TemporalResult<DateDuration> {
        if self.is_iso() {
            return one.diff_iso_date(two, largest_unit);
        }
        Err(Self::unsupported())
    }

    /// `CalendarEra`
    pub fn era(&self, _iso_date: &IsoDate) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        if self.is_iso() {
            return Ok(None);
        }
        Err(Self::unsupported())
    }

    /// `CalendarEraYear`
    pub fn era_year(&self, _iso_date: &IsoDate) -> TemporalResult<Option<i32>> {
        if self.is_iso() {
            return Ok(None);
        }
        Err(Self::unsupported())
    }

    /// `CalendarYear`
    pub fn year(&self, iso_date: &IsoDate) -> TemporalResult<i32> {
        if self.is_iso() {
            return Ok(iso_date.year);
        }
        Err(Self::unsupported())
    }

    /// `CalendarMonth`
    pub fn month(&self, iso_date: &IsoDate) -> TemporalResult<u8> {
        if self.is_iso() {
            return Ok(iso_date.month);
        }
        Err(Self::unsupported())
    }

    /// `CalendarMonthCode`
    pub fn month_code(&self, iso_date: &IsoDate) -> TemporalResult<MonthCode> {
        if self.is_iso() {
            return month_to_month_code(iso_date.month);
        }
        Err(Self::unsupported())
    }

    /// `CalendarDay`
    pub fn day(&self, iso_date: &IsoDate) -> TemporalResult<u8> {
        if self.is_iso() {
            return Ok(iso_date.day);
        }
        Err(Self::unsupported())
    }

    /// `CalendarDayOfWeek`
    pub fn day_of_week(&self, iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(utils::iso_day_of_week(iso_date.to_epoch_days()));
        }
        Err(Self::unsupported())
    }

    /// `CalendarDayOfYear`
    pub fn day_of_year(&self, iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(utils::iso_day_of_year(
                iso_date.year,
                iso_date.month,
                iso_date.day,
            ));
        }
        Err(Self::unsupported())
    }

    /// `CalendarWeekOfYear`
    pub fn week_of_year(&self, iso_date: &IsoDate) -> TemporalResult<Option<u8>> {
        if self.is_iso() {
            let (week, _) = utils::iso_week_of_year(iso_date.year, iso_date.month, iso_date.day);
            return Ok(Some(week));
        }
        Err(Self::unsupported())
    }

    /// `CalendarYearOfWeek`
    pub fn year_of_week(&self, iso_date: &IsoDate) -> TemporalResult<Option<i32>> {
        if self.is_iso() {
            let (_, year) = utils::iso_week_of_year(iso_date.year, iso_date.month, iso_date.day);
            return Ok(Some(year));
        }
        Err(Self::unsupported())
    }

    /// `CalendarDaysInWeek`
    pub fn days_in_week(&self, _iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(7);
        }
        Err(Self::unsupported())
    }

    /// `CalendarDaysInMonth`
    pub fn days_in_month(&self, iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(u16::from(utils::iso_days_in_month(
                iso_date.year,
                iso_date.month,
            )));
        }
        Err(Self::unsupported())
    }

    /// `CalendarDaysInYear`
    pub fn days_in_year(&self, iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(utils::mathematical_days_in_year(iso_date.year) as u16);
        }
        Err(Self::unsupported())
    }

    /// `CalendarMonthsInYear`
    pub fn months_in_year(&self, _iso_date: &IsoDate) -> TemporalResult<u16> {
        if self.is_iso() {
            return Ok(12);
        }
        Err(Self::unsupported())
    }

    /// `CalendarInLeapYear`
    pub fn in_leap_year(&self, iso_date: &IsoDate) -> TemporalResult<bool> {
        if self.is_iso() {
            return Ok(utils::is_leap_year(iso_date.year));
        }
        Err(Self::unsupported())
    }

    /// `CalendarFieldKeysToIgnore`
    ///
    /// The month/monthCode duality makes setting one clear the other; the
    /// era-aware calendars link era, eraYear, and year the same way.
    pub(crate) fn field_keys_to_ignore(&self, keys: FieldMap) -> FieldMap {
        let mut ignored = keys;
        if keys.intersects(FieldMap::MONTH | FieldMap::MONTH_CODE) {
            ignored |= FieldMap::MONTH | FieldMap::MONTH_CODE;
        }
        if !self.is_iso() && keys.intersects(FieldMap::ERA | FieldMap::ERA_YEAR | FieldMap::YEAR) {
            ignored |= FieldMap::ERA | FieldMap::ERA_YEAR | FieldMap::YEAR;
        }
        ignored
    }
}

// ==== MonthCode ====

/// The ISO reference year used to anchor a `PlainMonthDay`.
pub(crate) const MONTH_DAY_REFERENCE_YEAR: i32 = 1972;

/// A calendar-agnostic month label: `"M01"` through `"M13"`, with an `"L"`
/// suffix marking a leap month of a lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCode(pub(crate) TinyAsciiStr<4>);

impl MonthCode {
    /// Validates and creates a `MonthCode` from UTF-8 encoded bytes.
    pub fn try_from_utf8(bytes: &[u8]) -> TemporalResult<Self> {
        let (number, leap) = match bytes {
            [b'M', tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
                ((*tens - b'0') * 10 + (*ones - b'0'), false)
            }
            [b'M', tens @ b'0'..=b'9', ones @ b'0'..=b'9', b'L'] => {
                ((*tens - b'0') * 10 + (*ones - b'0'), true)
            }
            _ => return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeInvalid)),
        };
        if number == 0 || number > 13 || (leap && number == 13) {
            return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeInvalid));
        }
        let inner = TinyAsciiStr::<4>::try_from_utf8(bytes)
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::MonthCodeInvalid))?;
        Ok(Self(inner))
    }

    /// Returns the string form of this month code.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the ordinal month number of this code.
    #[inline]
    #[must_use]
    pub fn to_month_integer(&self) -> u8 {
        let bytes = self.0.all_bytes();
        (bytes[1] - b'0') * 10 + (bytes[2] - b'0')
    }

    /// Returns whether this code labels a leap month.
    #[inline]
    #[must_use]
    pub fn is_leap_month(&self) -> bool {
        self.0.len() == 4
    }

    /// Validates this code against a calendar's month structure.
    pub(crate) fn validate_for_calendar(&self, calendar: Calendar) -> TemporalResult<()> {
        let month = self.to_month_integer();
        let valid = match calendar {
            _ if !self.is_leap_month() && month <= 12 => true,
            Calendar::Chinese | Calendar::Dangi if self.is_leap_month() => true,
            Calendar::Coptic | Calendar::Ethiopian | Calendar::EthiopianAmeteAlem => month == 13,
            Calendar::Hebrew => self.is_leap_month() && month == 5,
            _ => false,
        };
        if !valid {
            return Err(
                TemporalError::range().with_enum(ErrorMessage::MonthCodeInvalidForCalendar)
            );
        }
        Ok(())
    }
}

impl FromStr for MonthCode {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_utf8(s.as_bytes())
    }
}

impl core::fmt::Display for MonthCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Formats a month number as its month code.
pub(crate) fn month_to_month_code(month: u8) -> TemporalResult<MonthCode> {
    if !(1..=13).contains(&month) {
        return Err(TemporalError::range().with_enum(ErrorMessage::MonthNotInRange));
    }
    let bytes = [b'M', b'0' + month / 10, b'0' + month % 10];
    MonthCode::try_from_utf8(&bytes)
}

// ==== Field resolution ====

/// The target shape a set of partial fields resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolutionType {
    Date,
    YearMonth,
    MonthDay,
}

/// The resolved year/monthCode/day values of a partial date.
#[derive(Debug)]
pub(crate) struct ResolvedCalendarFields {
    pub(crate) year: i32,
    pub(crate) month_code: MonthCode,
    pub(crate) day: u8,
}

impl ResolvedCalendarFields {
    pub(crate) fn try_from_partial(
        partial: &PartialDate,
        overflow: Overflow,
        resolution: ResolutionType,
    ) -> TemporalResult<Self> {
        let calendar = partial.calendar;
        if !calendar.is_iso() {
            return Err(Calendar::unsupported());
        }

        let year = resolve_iso_year(partial, resolution)?;
        let month_code = resolve_iso_month(partial.month_code, partial.month, overflow)?;
        month_code.validate_for_calendar(calendar)?;

        let day = match (partial.day, resolution) {
            (Some(day), _) => day,
            (None, ResolutionType::YearMonth) => 1,
            (None, _) => {
                return Err(
                    TemporalError::r#type().with_message("Required day field is empty.")
                )
            }
        };

        let day = if resolution == ResolutionType::MonthDay {
            day
        } else if overflow == Overflow::Constrain {
            constrain_iso_day(year, month_code.to_month_integer(), day)
        } else {
            if !is_valid_iso_day(year, month_code.to_month_integer(), day) {
                return Err(TemporalError::range().with_enum(ErrorMessage::IsoDateInvalid));
            }
            day
        };

        Ok(Self {
            year,
            month_code,
            day,
        })
    }
}

/// Resolves the year from a `year` field or an era/eraYear pair.
fn resolve_iso_year(partial: &PartialDate, resolution: ResolutionType) -> TemporalResult<i32> {
    const ISO_ERA: TinyAsciiStr<19> = tinystr!(19, "default");

    if let Some(era) = partial.era {
        if era != ISO_ERA {
            return Err(TemporalError::range().with_enum(ErrorMessage::EraInvalidForCalendar));
        }
        let Some(era_year) = partial.era_year else {
            return Err(TemporalError::r#type()
                .with_message("eraYear is required when era is provided."));
        };
        if partial.year.is_some_and(|year| year != era_year) {
            return Err(TemporalError::range().with_enum(ErrorMessage::EraYearNotInEraRange));
        }
        return Ok(era_year);
    }

    match (partial.year, resolution) {
        (Some(year), _) => Ok(year),
        (None, ResolutionType::MonthDay) => Ok(MONTH_DAY_REFERENCE_YEAR),
        (None, _) => Err(TemporalError::r#type()
            .with_message("Required fields missing to determine a year.")),
    }
}

/// Resolves `month` and `monthCode` into a single month code.
fn resolve_iso_month(
    month_code: Option<MonthCode>,
    month: Option<u8>,
    overflow: Overflow,
) -> TemporalResult<MonthCode> {
    match (month_code, month) {
        (None, None) => {
            Err(TemporalError::r#type().with_message("Month or monthCode must be provided."))
        }
        (None, Some(month)) => {
            if overflow == Overflow::Constrain {
                return month_to_month_code(month.clamp(1, 12));
            }
            if !(1..=12).contains(&month) {
                return Err(TemporalError::range().with_enum(ErrorMessage::MonthNotInRange));
            }
            month_to_month_code(month)
        }
        (Some(month_code), None) => {
            if month_code.is_leap_month() || month_code.to_month_integer() > 12 {
                return Err(
                    TemporalError::range().with_enum(ErrorMessage::MonthCodeInvalidForCalendar)
                );
            }
            Ok(month_code)
        }
        (Some(month_code), Some(month)) => {
            if month != month_code.to_month_integer() || month_code.is_leap_month() {
                return Err(
                    TemporalError::range().with_enum(ErrorMessage::MonthAndMonthCodeUnresolvable)
                );
            }
            Ok(month_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{month_to_month_code, Calendar, MonthCode, ResolvedCalendarFields};
    use crate::components::PartialDate;
    use crate::options::Overflow;
    use core::str::FromStr;

    #[test]
    fn calendar_from_str_is_case_insensitive() {
        let calendar = Calendar::from_utf8("iSo8601".as_bytes()).unwrap();
        assert_eq!(calendar, Calendar::default());
        let calendar = Calendar::from_utf8("GREGORY".as_bytes()).unwrap();
        assert_eq!(calendar, Calendar::Gregorian);
    }

    #[test]
    fn calendar_from_annotated_string() {
        let calendar = Calendar::from_str("2025-02-07T01:24:00[u-ca=japanese]").unwrap();
        assert_eq!(calendar, Calendar::Japanese);
        let calendar = Calendar::from_str("2025-02-07").unwrap();
        assert_eq!(calendar, Calendar::Iso);
        assert!(Calendar::from_str("not-a-calendar").is_err());
    }

    #[test]
    fn month_code_validation() {
        assert_eq!(MonthCode::from_str("M01").unwrap().to_month_integer(), 1);
        assert_eq!(MonthCode::from_str("M13").unwrap().to_month_integer(), 13);
        assert!(MonthCode::from_str("M05L").unwrap().is_leap_month());
        assert!(MonthCode::from_str("M00").is_err());
        assert!(MonthCode::from_str("M14").is_err());
        assert!(MonthCode::from_str("M13L").is_err());
        assert!(MonthCode::from_str("13").is_err());
        assert_eq!(month_to_month_code(9).unwrap().as_str(), "M09");
        assert_eq!(month_to_month_code(12).unwrap().as_str(), "M12");
    }

    #[test]
    fn day_overflow_resolution() {
        let bad_fields = PartialDate {
            year: Some(2019),
            month: Some(1),
            day: Some(32),
            ..Default::default()
        };

        let cal = Calendar::default();
        assert!(cal.date_from_partial(&bad_fields, Overflow::Reject).is_err());
        let constrained = cal
            .date_from_partial(&bad_fields, Overflow::Constrain)
            .unwrap();
        assert_eq!(constrained.day(), Ok(31));
    }

    #[test]
    fn unresolvable_month_and_month_code() {
        let bad_fields = PartialDate {
            year: Some(1976),
            month: Some(11),
            month_code: Some(MonthCode::from_str("M12").unwrap()),
            day: Some(18),
            ..Default::default()
        };

        let err = ResolvedCalendarFields::try_from_partial(
            &bad_fields,
            Overflow::Reject,
            super::ResolutionType::Date,
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_fields_fail_resolution() {
        let bad_fields = PartialDate {
            year: Some(2019),
            day: Some(19),
            ..Default::default()
        };
        let err = ResolvedCalendarFields::try_from_partial(
            &bad_fields,
            Overflow::Reject,
            super::ResolutionType::Date,
        );
        assert!(err.is_err());

        let err = ResolvedCalendarFields::try_from_partial(
            &PartialDate::default(),
            Overflow::Reject,
            super::ResolutionType::Date,
        );
        assert!(err.is_err());
    }
}
