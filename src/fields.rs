//! The calendar field bag and field preparation.
//!
//! A [`FieldBag`] is the dynamic, host-facing form of a partial date/time: a
//! map from field keys to raw values of the host's dynamic-value shape
//! (numbers or strings). [`prepare_calendar_fields`] converts a bag into
//! typed partial records, applying the per-field coercions and defaults.
//!
//! ## Field requirements
//!
//! |   Property   |            Conversion             |  Default  |
//! | -------------|-----------------------------------|-----------|
//! | "day"        | `ToPositiveIntegerWithTruncation` | undefined |
//! | "era"        |   `ToPrimitiveAndRequireString`   | undefined |
//! | "eraYear"    | `ToPositiveIntegerWithTruncation` | undefined |
//! | "hour"       |     `ToIntegerWithTruncation`     |     0     |
//! | "microsecond"|     `ToIntegerWithTruncation`     |     0     |
//! | "millisecond"|     `ToIntegerWithTruncation`     |     0     |
//! | "minute"     |     `ToIntegerWithTruncation`     |     0     |
//! | "month"      | `ToPositiveIntegerWithTruncation` | undefined |
//! | "monthCode"  |   `ToPrimitiveAndRequireString`   | undefined |
//! | "nanosecond" |     `ToIntegerWithTruncation`     |     0     |
//! | "offset"     |   `ToPrimitiveAndRequireString`   | undefined |
//! | "second"     |     `ToIntegerWithTruncation`     |     0     |
//! | "timeZone"   |              `None`               | undefined |
//! | "year"       |     `ToIntegerWithTruncation`     | undefined |
//!
//! The scan over requested fields happens in the fixed alphabetical order of
//! the table above. The order is a compatibility contract: reading a field
//! off a host object can run arbitrary host code, and a missing required
//! field reports the first hole found in this order.

use std::str::FromStr;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tinystr::TinyAsciiStr;

use crate::{
    components::{
        calendar::{Calendar, MonthCode},
        timezone::{TimeZone, UtcOffset},
        PartialDate, PartialTime,
    },
    error::ErrorMessage,
    iso::IsoDate,
    TemporalError, TemporalResult,
};

bitflags! {
    /// The set of active or requested calendar fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldMap: u16 {
        const DAY = 0b0000_0000_0000_0001;
        const ERA = 0b0000_0000_0000_0010;
        const ERA_YEAR = 0b0000_0000_0000_0100;
        const HOUR = 0b0000_0000_0000_1000;
        const MICROSECOND = 0b0000_0000_0001_0000;
        const MILLISECOND = 0b0000_0000_0010_0000;
        const MINUTE = 0b0000_0000_0100_0000;
        const MONTH = 0b0000_0000_1000_0000;
        const MONTH_CODE = 0b0000_0001_0000_0000;
        const NANOSECOND = 0b0000_0010_0000_0000;
        const OFFSET = 0b0000_0100_0000_0000;
        const SECOND = 0b0000_1000_0000_0000;
        const TIME_ZONE = 0b0001_0000_0000_0000;
        const YEAR = 0b0010_0000_0000_0000;
    }
}

impl FieldMap {
    /// The date fields.
    pub const DATE: Self = Self::DAY
        .union(Self::ERA)
        .union(Self::ERA_YEAR)
        .union(Self::MONTH)
        .union(Self::MONTH_CODE)
        .union(Self::YEAR);

    /// The time fields.
    pub const TIME: Self = Self::HOUR
        .union(Self::MINUTE)
        .union(Self::SECOND)
        .union(Self::MILLISECOND)
        .union(Self::MICROSECOND)
        .union(Self::NANOSECOND);
}

/// A key of the calendar field superset.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Day,
    Era,
    EraYear,
    Hour,
    Microsecond,
    Millisecond,
    Minute,
    Month,
    MonthCode,
    Nanosecond,
    Offset,
    Second,
    TimeZone,
    Year,
}

/// Every field key, in the alphabetical order of the property names.
const ALPHABETICAL_FIELD_KEYS: [FieldKey; 14] = [
    FieldKey::Day,
    FieldKey::Era,
    FieldKey::EraYear,
    FieldKey::Hour,
    FieldKey::Microsecond,
    FieldKey::Millisecond,
    FieldKey::Minute,
    FieldKey::Month,
    FieldKey::MonthCode,
    FieldKey::Nanosecond,
    FieldKey::Offset,
    FieldKey::Second,
    FieldKey::TimeZone,
    FieldKey::Year,
];

impl FieldKey {
    /// The property name of this key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Era => "era",
            Self::EraYear => "eraYear",
            Self::Hour => "hour",
            Self::Microsecond => "microsecond",
            Self::Millisecond => "millisecond",
            Self::Minute => "minute",
            Self::Month => "month",
            Self::MonthCode => "monthCode",
            Self::Nanosecond => "nanosecond",
            Self::Offset => "offset",
            Self::Second => "second",
            Self::TimeZone => "timeZone",
            Self::Year => "year",
        }
    }

    pub(crate) const fn flag(self) -> FieldMap {
        match self {
            Self::Day => FieldMap::DAY,
            Self::Era => FieldMap::ERA,
            Self::EraYear => FieldMap::ERA_YEAR,
            Self::Hour => FieldMap::HOUR,
            Self::Microsecond => FieldMap::MICROSECOND,
            Self::Millisecond => FieldMap::MILLISECOND,
            Self::Minute => FieldMap::MINUTE,
            Self::Month => FieldMap::MONTH,
            Self::MonthCode => FieldMap::MONTH_CODE,
            Self::Nanosecond => FieldMap::NANOSECOND,
            Self::Offset => FieldMap::OFFSET,
            Self::Second => FieldMap::SECOND,
            Self::TimeZone => FieldMap::TIME_ZONE,
            Self::Year => FieldMap::YEAR,
        }
    }

    const fn is_string_field(self) -> bool {
        matches!(
            self,
            Self::Era | Self::MonthCode | Self::Offset | Self::TimeZone
        )
    }
}

impl FromStr for FieldKey {
    type Err = TemporalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALPHABETICAL_FIELD_KEYS
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::FieldNotSupported))
    }
}

/// A raw, pre-coercion field value.
///
/// This is the dynamic-value boundary: a host hands the engine numbers or
/// strings, and [`prepare_calendar_fields`] performs the type-specific
/// conversion for the field it is assigned to.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A numeric value, possibly fractional.
    Number(f64),
    /// A string value.
    String(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// A bag of raw calendar fields keyed by [`FieldKey`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldBag {
    properties: FxHashMap<FieldKey, FieldValue>,
}

impl FieldBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a key-value pair, returning any previous value.
    pub fn insert(&mut self, key: FieldKey, value: FieldValue) -> TemporalResult<Option<FieldValue>> {
        match (&value, key.is_string_field()) {
            (FieldValue::String(_), true) | (FieldValue::Number(_), false) => {
                Ok(self.properties.insert(key, value))
            }
            _ => Err(TemporalError::r#type().with_enum(ErrorMessage::FieldTypeInvalid)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.properties.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the set of keys present in this bag.
    #[must_use]
    pub fn field_map(&self) -> FieldMap {
        self.properties
            .keys()
            .fold(FieldMap::empty(), |acc, key| acc | key.flag())
    }
}

impl From<IsoDate> for FieldBag {
    fn from(value: IsoDate) -> Self {
        let mut bag = Self::default();
        let _ = bag.insert(FieldKey::Year, FieldValue::from(value.year));
        let _ = bag.insert(FieldKey::Month, FieldValue::from(i32::from(value.month)));
        let _ = bag.insert(FieldKey::Day, FieldValue::from(i32::from(value.day)));
        bag
    }
}

/// The typed output of [`prepare_calendar_fields`].
#[derive(Debug, Clone)]
pub struct PreparedCalendarFields {
    pub(crate) date: PartialDate,
    pub(crate) time: PartialTime,
    pub(crate) offset: Option<UtcOffset>,
    pub(crate) time_zone: Option<TimeZone>,
}

/// `PrepareCalendarFields`
///
/// Scans the requested fields in the fixed alphabetical order, coercing each
/// present field by its type. A missing required field fails fast, naming
/// the first hole found in scan order. In partial mode absent fields stay
/// absent and an entirely empty result is an error; otherwise absent time
/// fields default to zero.
pub(crate) fn prepare_calendar_fields(
    calendar: Calendar,
    bag: &FieldBag,
    requested: FieldMap,
    required: FieldMap,
    partial: bool,
) -> TemporalResult<PreparedCalendarFields> {
    let mut fields = PreparedCalendarFields {
        date: PartialDate::new().with_calendar(calendar),
        time: PartialTime::new(),
        offset: None,
        time_zone: None,
    };
    let mut any_present = false;

    for key in ALPHABETICAL_FIELD_KEYS {
        if !requested.contains(key.flag()) {
            continue;
        }
        match bag.get(&key) {
            Some(value) => {
                any_present = true;
                assign_field(&mut fields, key, value)?;
            }
            None if required.contains(key.flag()) => {
                return Err(TemporalError::r#type()
                    .with_message(format!("missing required field '{}'", key.name())));
            }
            None if !partial => {
                // Absent optional time fields default to zero.
                if FieldMap::TIME.contains(key.flag()) {
                    assign_field(&mut fields, key, &FieldValue::Number(0.0))?;
                }
            }
            None => {}
        }
    }

    if partial && !any_present {
        return Err(TemporalError::r#type().with_enum(ErrorMessage::FieldBagEmpty));
    }

    Ok(fields)
}

fn assign_field(
    fields: &mut PreparedCalendarFields,
    key: FieldKey,
    value: &FieldValue,
) -> TemporalResult<()> {
    match key {
        FieldKey::Day => {
            fields.date.day =
                Some(to_positive_integer_with_truncation(value)?.min(f64::from(u8::MAX)) as u8)
        }
        FieldKey::Era => {
            fields.date.era = Some(
                TinyAsciiStr::<19>::try_from_str(require_string(value)?)
                    .map_err(|_| TemporalError::range().with_enum(ErrorMessage::EraInvalidForCalendar))?,
            )
        }
        FieldKey::EraYear => {
            fields.date.era_year =
                Some(to_positive_integer_with_truncation(value)?.min(f64::from(i32::MAX)) as i32)
        }
        FieldKey::Hour => fields.time.hour = Some(to_time_field(value)?),
        FieldKey::Microsecond => fields.time.microsecond = Some(to_time_field(value)?),
        FieldKey::Millisecond => fields.time.millisecond = Some(to_time_field(value)?),
        FieldKey::Minute => fields.time.minute = Some(to_time_field(value)?),
        FieldKey::Month => {
            fields.date.month =
                Some(to_positive_integer_with_truncation(value)?.min(f64::from(u8::MAX)) as u8)
        }
        FieldKey::MonthCode => {
            fields.date.month_code = Some(MonthCode::from_str(require_string(value)?)?)
        }
        FieldKey::Nanosecond => fields.time.nanosecond = Some(to_time_field(value)?),
        FieldKey::Offset => fields.offset = Some(UtcOffset::from_str(require_string(value)?)?),
        FieldKey::Second => fields.time.second = Some(to_time_field(value)?),
        FieldKey::TimeZone => {
            fields.time_zone = Some(TimeZone::from_identifier(require_string(value)?)?)
        }
        FieldKey::Year => {
            fields.date.year = Some(to_integer_with_truncation(value)?.clamp(
                f64::from(i32::MIN),
                f64::from(i32::MAX),
            ) as i32)
        }
    }
    Ok(())
}

/// `ToIntegerWithTruncation`
fn to_integer_with_truncation(value: &FieldValue) -> TemporalResult<f64> {
    let FieldValue::Number(number) = value else {
        return Err(TemporalError::r#type().with_enum(ErrorMessage::FieldTypeInvalid));
    };
    if !number.is_finite() {
        return Err(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite));
    }
    Ok(number.trunc())
}

/// `ToPositiveIntegerWithTruncation`
///
/// The callers saturate the result into the field's width; every valid month
/// or day is far below the saturation point, so constrain/reject behavior
/// downstream is unaffected.
fn to_positive_integer_with_truncation(value: &FieldValue) -> TemporalResult<f64> {
    let truncated = to_integer_with_truncation(value)?;
    if truncated < 1.0 {
        return Err(TemporalError::range().with_enum(ErrorMessage::NumberNotPositive));
    }
    Ok(truncated)
}

fn to_time_field(value: &FieldValue) -> TemporalResult<i32> {
    let truncated = to_integer_with_truncation(value)?;
    Ok(truncated.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

fn require_string(value: &FieldValue) -> TemporalResult<&str> {
    match value {
        FieldValue::String(s) => Ok(s),
        FieldValue::Number(_) => {
            Err(TemporalError::r#type().with_enum(ErrorMessage::FieldTypeInvalid))
        }
    }
}

/// `CalendarMergeFields`
///
/// Copies `base` minus the keys the calendar says are overridden, then lays
/// every override on top. Setting `month` clears a stale `monthCode` and
/// vice versa; era-aware calendars link `era`/`eraYear`/`year` the same way.
pub(crate) fn merge_calendar_fields(
    calendar: Calendar,
    base: &FieldBag,
    overrides: &FieldBag,
) -> TemporalResult<FieldBag> {
    let ignored = calendar.field_keys_to_ignore(overrides.field_map());

    let mut result = FieldBag::default();
    for key in ALPHABETICAL_FIELD_KEYS {
        if ignored.contains(key.flag()) {
            continue;
        }
        if let Some(value) = base.get(&key) {
            result.insert(key, value.clone())?;
        }
    }
    for key in ALPHABETICAL_FIELD_KEYS {
        if let Some(value) = overrides.get(&key) {
            result.insert(key, value.clone())?;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::{
        merge_calendar_fields, prepare_calendar_fields, FieldBag, FieldKey, FieldMap, FieldValue,
    };
    use crate::components::calendar::Calendar;

    #[test]
    fn rejects_mismatched_value_types() {
        let mut bag = FieldBag::new();
        assert!(bag.insert(FieldKey::Year, FieldValue::from("2024")).is_err());
        assert!(bag.insert(FieldKey::MonthCode, FieldValue::from(3)).is_err());
        assert!(bag.insert(FieldKey::Year, FieldValue::from(2024)).is_ok());
        assert!(bag.insert(FieldKey::MonthCode, FieldValue::from("M03")).is_ok());
    }

    #[test]
    fn missing_required_field_fails_on_first_in_alphabetical_order() {
        let mut bag = FieldBag::new();
        bag.insert(FieldKey::Month, FieldValue::from(3)).unwrap();
        // Both day and year are missing; day comes first alphabetically.
        let err = prepare_calendar_fields(
            Calendar::default(),
            &bag,
            FieldMap::DATE,
            FieldMap::DAY | FieldMap::YEAR,
            false,
        )
        .unwrap_err();
        assert!(err.message().contains("'day'"), "{}", err.message());
    }

    #[test]
    fn non_partial_defaults_time_fields_to_zero() {
        let mut bag = FieldBag::new();
        bag.insert(FieldKey::Hour, FieldValue::from(13)).unwrap();
        let fields = prepare_calendar_fields(
            Calendar::default(),
            &bag,
            FieldMap::TIME,
            FieldMap::empty(),
            false,
        )
        .unwrap();
        assert_eq!(fields.time.hour, Some(13));
        assert_eq!(fields.time.minute, Some(0));
        assert_eq!(fields.time.nanosecond, Some(0));
    }

    #[test]
    fn partial_mode_requires_at_least_one_field() {
        let bag = FieldBag::new();
        assert!(prepare_calendar_fields(
            Calendar::default(),
            &bag,
            FieldMap::DATE,
            FieldMap::empty(),
            true,
        )
        .is_err());
    }

    #[test]
    fn fractional_numbers_truncate() {
        let mut bag = FieldBag::new();
        bag.insert(FieldKey::Year, FieldValue::from(2024.9)).unwrap();
        bag.insert(FieldKey::Month, FieldValue::from(3.7)).unwrap();
        bag.insert(FieldKey::Day, FieldValue::from(5.2)).unwrap();
        let fields = prepare_calendar_fields(
            Calendar::default(),
            &bag,
            FieldMap::DATE,
            FieldMap::empty(),
            false,
        )
        .unwrap();
        assert_eq!(fields.date.year, Some(2024));
        assert_eq!(fields.date.month, Some(3));
        assert_eq!(fields.date.day, Some(5));
    }

    #[test]
    fn merge_clears_stale_month_code() {
        let mut base = FieldBag::new();
        base.insert(FieldKey::Year, FieldValue::from(2024)).unwrap();
        base.insert(FieldKey::MonthCode, FieldValue::from("M03")).unwrap();
        base.insert(FieldKey::Day, FieldValue::from(15)).unwrap();

        let mut overrides = FieldBag::new();
        overrides.insert(FieldKey::Month, FieldValue::from(7)).unwrap();

        let merged = merge_calendar_fields(Calendar::default(), &base, &overrides).unwrap();
        assert_eq!(merged.get(&FieldKey::MonthCode), None);
        assert_eq!(merged.get(&FieldKey::Month), Some(&FieldValue::from(7)));
        assert_eq!(merged.get(&FieldKey::Year), Some(&FieldValue::from(2024)));
    }
}
