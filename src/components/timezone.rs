//! The `TimeZone` component and UTC offset handling.

use core::{iter::Peekable, str::Chars, str::FromStr};

use ixdtf::{encoding::Utf8, records::TimeZoneRecord};

use crate::{
    components::{
        calendar::Calendar,
        duration::normalized::NormalizedTimeDuration,
        duration::DateDuration,
        Instant,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{Disambiguation, Overflow},
    parsers::{FormattableOffset, FormattableTime, Precision},
    provider::TimeZoneProvider,
    time::EpochNanoseconds,
    Sign, TemporalError, TemporalResult,
};

const NS_IN_HOUR: i128 = 60 * 60 * 1_000_000_000;
const NS_IN_MINUTE: i64 = 60_000_000_000;

/// A UTC offset in whole minutes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcOffset(pub(crate) i16);

impl UtcOffset {
    /// Creates a `UtcOffset` from signed minutes.
    #[inline]
    #[must_use]
    pub const fn from_minutes(minutes: i16) -> Self {
        Self(minutes)
    }

    /// Returns the offset in minutes.
    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i16 {
        self.0
    }

    /// Returns the offset in nanoseconds.
    #[inline]
    #[must_use]
    pub const fn nanoseconds(&self) -> i64 {
        self.0 as i64 * NS_IN_MINUTE
    }
}

impl FromStr for UtcOffset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = s.chars().peekable();
        if !cursor.peek().is_some_and(is_ascii_sign) {
            return Err(TemporalError::range().with_enum(ErrorMessage::OffsetInvalidString));
        }
        parse_offset(&mut cursor).map(Self)
    }
}

impl core::fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_offset_minutes(self.0).to_string())
    }
}

/// A time zone value: a named IANA zone, or a fixed UTC offset in minutes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeZone {
    IanaIdentifier(String),
    OffsetMinutes(i16),
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::IanaIdentifier("UTC".into())
    }
}

impl From<UtcOffset> for TimeZone {
    fn from(value: UtcOffset) -> Self {
        Self::OffsetMinutes(value.minutes())
    }
}

impl TimeZone {
    /// Parses a `TimeZone` from a string, verifying named identifiers
    /// against the provider.
    pub fn try_from_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        if source == "Z" {
            return Ok(Self::OffsetMinutes(0));
        }
        let mut cursor = source.chars().peekable();
        if cursor.peek().is_some_and(is_ascii_sign) {
            return parse_offset(&mut cursor).map(Self::OffsetMinutes);
        } else if provider.check_identifier(source) {
            return Ok(Self::IanaIdentifier(source.to_owned()));
        }
        Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneInvalidIdentifier))
    }

    /// Parses a `TimeZone` syntactically, without resolving named
    /// identifiers against a database.
    pub fn from_identifier(source: &str) -> TemporalResult<Self> {
        let mut cursor = source.chars().peekable();
        if cursor.peek().is_some_and(is_ascii_sign) {
            return parse_offset(&mut cursor).map(Self::OffsetMinutes);
        }
        if parse_iana_component(&mut cursor) {
            return Ok(Self::IanaIdentifier(source.to_owned()));
        }
        Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneInvalidIdentifier))
    }

    /// Converts a parsed time zone annotation into a `TimeZone`.
    pub(crate) fn from_time_zone_record(
        record: TimeZoneRecord<Utf8>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        match record {
            TimeZoneRecord::Name(name) => {
                let identifier = core::str::from_utf8(name).map_err(|_| {
                    TemporalError::range().with_enum(ErrorMessage::TimeZoneInvalidIdentifier)
                })?;
                if !provider.check_identifier(identifier) {
                    return Err(TemporalError::range()
                        .with_enum(ErrorMessage::TimeZoneInvalidIdentifier));
                }
                Ok(Self::IanaIdentifier(identifier.to_owned()))
            }
            TimeZoneRecord::Offset(offset) => {
                let minutes = (i16::from(offset.hour) * 60 + i16::from(offset.minute))
                    * i16::from(offset.sign as i8);
                Ok(Self::OffsetMinutes(minutes))
            }
            _ => Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneInvalidIdentifier)),
        }
    }

    /// Returns this time zone's identifier string.
    pub fn identifier(&self) -> String {
        match self {
            TimeZone::IanaIdentifier(identifier) => identifier.clone(),
            TimeZone::OffsetMinutes(minutes) => format_offset_minutes(*minutes).to_string(),
        }
    }
}

impl TimeZone {
    /// `GetISODateTimeFor`: instant plus offset into local wall-clock
    /// fields. Never fails for a valid instant.
    pub(crate) fn get_iso_datetime_for(
        &self,
        instant: &Instant,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<IsoDateTime> {
        let nanos = self.get_offset_nanos_for(instant.as_i128(), provider)?;
        Ok(IsoDateTime::from_epoch_nanos(
            &instant.epoch_nanoseconds(),
            nanos as i64,
        ))
    }

    /// `GetOffsetNanosecondsFor`
    pub(crate) fn get_offset_nanos_for(
        &self,
        utc_epoch: i128,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<i128> {
        // 1. Let parseResult be ! ParseTimeZoneIdentifier(timeZone).
        match self {
            // 2. If parseResult.[[OffsetMinutes]] is not empty, return parseResult.[[OffsetMinutes]] × (60 × 10^9).
            Self::OffsetMinutes(minutes) => Ok(i128::from(*minutes) * i128::from(NS_IN_MINUTE)),
            // 3. Return GetNamedTimeZoneOffsetNanoseconds(parseResult.[[Name]], epochNs).
            Self::IanaIdentifier(identifier) => {
                provider.get_named_tz_offset_nanoseconds(identifier, utc_epoch)
            }
        }
    }

    /// `GetEpochNanosecondsFor`
    pub(crate) fn get_epoch_nanoseconds_for(
        &self,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<EpochNanoseconds> {
        // 1. Let possibleEpochNs be ? GetPossibleEpochNanoseconds(timeZone, isoDateTime).
        let possible_nanos = self.get_possible_epoch_ns_for(iso, provider)?;
        // 2. Return ? DisambiguatePossibleEpochNanoseconds(possibleEpochNs, timeZone, isoDateTime, disambiguation).
        self.disambiguate_possible_epoch_nanos(possible_nanos, iso, disambiguation, provider)
    }

    /// `GetPossibleEpochNanoseconds`: zero, one, or two instants a local
    /// date-time can denote, ascending.
    pub(crate) fn get_possible_epoch_ns_for(
        &self,
        iso: IsoDateTime,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        let possible_nanoseconds = match self {
            // 2. If parseResult.[[OffsetMinutes]] is not empty, then
            Self::OffsetMinutes(minutes) => {
                // a. Shift the local time by the fixed offset.
                let balanced = IsoDateTime::balance(
                    iso.date.year,
                    iso.date.month.into(),
                    iso.date.day.into(),
                    iso.time.hour.into(),
                    i64::from(iso.time.minute) - i64::from(*minutes),
                    iso.time.second.into(),
                    iso.time.millisecond.into(),
                    iso.time.microsecond.into(),
                    iso.time.nanosecond.into(),
                );
                // b. Perform ? CheckISODaysRange(balanced.[[ISODate]]).
                balanced.date.is_valid_day_range()?;
                // c-d. The fixed-offset zone has exactly one reading.
                vec![balanced.as_nanoseconds()]
            }
            // 3. Else, defer to the zone data.
            Self::IanaIdentifier(identifier) => {
                iso.date.is_valid_day_range()?;
                provider.get_named_tz_epoch_nanoseconds(identifier, iso)?
            }
        };
        // 4-5. Every candidate must be a valid epoch value.
        for candidate in &possible_nanoseconds {
            candidate.check_validity()?;
        }
        Ok(possible_nanoseconds)
    }

    /// `DisambiguatePossibleEpochNanoseconds`
    pub(crate) fn disambiguate_possible_epoch_nanos(
        &self,
        nanos: Vec<EpochNanoseconds>,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<EpochNanoseconds> {
        // 1. Let n be possibleEpochNs's length.
        let n = nanos.len();
        // 2. If n = 1, return possibleEpochNs[0].
        if n == 1 {
            return Ok(nanos[0]);
        // 3. If n ≠ 0, pick by policy.
        } else if n != 0 {
            match disambiguation {
                // a. If disambiguation is earlier or compatible, return possibleEpochNs[0].
                Disambiguation::Compatible | Disambiguation::Earlier => return Ok(nanos[0]),
                // b. If disambiguation is later, return possibleEpochNs[n - 1].
                Disambiguation::Later => return Ok(nanos[n - 1]),
                // c-d. Reject the ambiguity.
                Disambiguation::Reject => {
                    return Err(TemporalError::range()
                        .with_enum(ErrorMessage::TimeZoneAmbiguousLocalTime))
                }
            }
        }
        // 4. Assert: n = 0 — the local time was skipped.
        // 5. If disambiguation is reject, throw.
        if disambiguation == Disambiguation::Reject {
            return Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneAmbiguousLocalTime));
        }

        // 6-11. Probe three hours on either side of the gap. The probes are
        // comfortably past any real transition while staying within the same
        // rule period.
        let before = iso.add_date_duration(
            Calendar::default(),
            &DateDuration::default(),
            NormalizedTimeDuration(-3 * NS_IN_HOUR),
            Overflow::Constrain,
        )?;
        let after = iso.add_date_duration(
            Calendar::default(),
            &DateDuration::default(),
            NormalizedTimeDuration(3 * NS_IN_HOUR),
            Overflow::Constrain,
        )?;

        let before_possible = self.get_possible_epoch_ns_for(before, provider)?;
        debug_assert_eq!(before_possible.len(), 1);
        let after_possible = self.get_possible_epoch_ns_for(after, provider)?;
        debug_assert_eq!(after_possible.len(), 1);

        // 12-14. The gap width is the offset shift across the transition.
        let offset_before = self.get_offset_nanos_for(before_possible[0].0, provider)?;
        let offset_after = self.get_offset_nanos_for(after_possible[0].0, provider)?;
        let nanoseconds = offset_after - offset_before;

        // 16. If disambiguation is earlier, shift backward across the gap.
        if disambiguation == Disambiguation::Earlier {
            let time_duration = NormalizedTimeDuration(-nanoseconds);
            let earlier_time = iso.time.add(time_duration);
            let earlier_date = IsoDate::balance(
                iso.date.year,
                iso.date.month.into(),
                i32::from(iso.date.day) + earlier_time.0 as i32,
            );

            let earlier = IsoDateTime::new_unchecked(earlier_date, earlier_time.1);
            let possible = self.get_possible_epoch_ns_for(earlier, provider)?;
            return possible
                .first()
                .copied()
                .ok_or(TemporalError::assert().with_enum(ErrorMessage::AssertionFailed));
        }

        // 17-25. Compatible and later shift forward across the gap.
        let time_duration = NormalizedTimeDuration(nanoseconds);
        let later_time = iso.time.add(time_duration);
        let later_date = IsoDate::balance(
            iso.date.year,
            iso.date.month.into(),
            i32::from(iso.date.day) + later_time.0 as i32,
        );
        let later = IsoDateTime::new_unchecked(later_date, later_time.1);
        let possible = self.get_possible_epoch_ns_for(later, provider)?;
        possible
            .last()
            .copied()
            .ok_or(TemporalError::assert().with_enum(ErrorMessage::AssertionFailed))
    }

    /// `GetStartOfDay`
    ///
    /// Resolves local midnight of the date. When midnight falls into a
    /// spring-forward gap, the result is the first valid instant of the day
    /// rather than literal midnight.
    pub(crate) fn get_start_of_day(
        &self,
        iso_date: &IsoDate,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<EpochNanoseconds> {
        // 1. Let isoDateTime be CombineISODateAndTimeRecord(isoDate, MidnightTimeRecord()).
        let iso = IsoDateTime::new_unchecked(*iso_date, IsoTime::default());
        // 2. Let possibleEpochNs be ? GetPossibleEpochNanoseconds(timeZone, isoDateTime).
        let possible_nanos = self.get_possible_epoch_ns_for(iso, provider)?;
        // 3. If possibleEpochNs is not empty, return possibleEpochNs[0].
        if let Some(first) = possible_nanos.first() {
            return Ok(*first);
        }
        // 4-7. Midnight was skipped; compatible disambiguation lands on the
        // first valid instant after the transition.
        self.disambiguate_possible_epoch_nanos(
            possible_nanos,
            iso,
            Disambiguation::Compatible,
            provider,
        )
    }
}

pub(crate) fn format_offset_minutes(minutes: i16) -> FormattableOffset {
    let sign = if minutes < 0 {
        Sign::Negative
    } else {
        Sign::Positive
    };
    FormattableOffset {
        sign,
        time: FormattableTime {
            hour: (minutes.unsigned_abs() / 60) as u8,
            minute: (minutes.unsigned_abs() % 60) as u8,
            second: 0,
            nanosecond: 0,
            precision: Precision::Minute,
            include_sep: true,
        },
    }
}

// ==== Offset parsing ====

#[inline]
pub(crate) fn parse_offset(chars: &mut Peekable<Chars<'_>>) -> TemporalResult<i16> {
    let sign = chars.next().map_or(1, |c| if c == '+' { 1 } else { -1 });
    // First offset portion
    let hours = parse_digit_pair(chars)?;

    let separated = chars.peek().is_some_and(|ch| *ch == ':');
    if separated {
        let _ = chars.next();
    }

    let digit_peek = chars.peek().map(|ch| ch.is_ascii_digit());

    let minutes = match digit_peek {
        Some(true) => parse_digit_pair(chars)?,
        Some(false) => return Err(non_ascii_digit()),
        None => 0,
    };

    if chars.peek().is_some() {
        return Err(
            TemporalError::range().with_message("Unexpected content after a minute offset.")
        );
    }

    Ok((hours * 60 + minutes) * sign)
}

fn parse_digit_pair(chars: &mut Peekable<Chars<'_>>) -> TemporalResult<i16> {
    let valid = chars
        .peek()
        .map_or(Err(abrupt_end()), |ch| Ok(ch.is_ascii_digit()))?;
    let first = if valid {
        chars.next().expect("validated.")
    } else {
        return Err(non_ascii_digit());
    };
    let valid = chars
        .peek()
        .map_or(Err(abrupt_end()), |ch| Ok(ch.is_ascii_digit()))?;
    let second = if valid {
        chars.next().expect("validated.")
    } else {
        return Err(non_ascii_digit());
    };

    let tens = (first.to_digit(10).expect("validated") * 10) as i16;
    let ones = second.to_digit(10).expect("validated") as i16;

    Ok(tens + ones)
}

fn parse_iana_component(chars: &mut Peekable<Chars<'_>>) -> bool {
    // Confirm a leading time zone char.
    if !chars.peek().is_some_and(is_tz_leading_char) {
        return false;
    }
    chars.next();

    // Consume the component.
    while chars.peek().is_some_and(is_tz_char) {
        chars.next();
    }

    // Parse any sub components.
    if chars.peek().is_some_and(|ch| *ch == '/') {
        chars.next();
        return parse_iana_component(chars);
    }

    // Confirm the full source text has been parsed.
    chars.peek().is_none()
}

fn abrupt_end() -> TemporalError {
    TemporalError::range().with_message("Abrupt end while parsing offset string")
}

fn non_ascii_digit() -> TemporalError {
    TemporalError::range().with_message("Non ascii digit found while parsing offset string")
}

fn is_ascii_sign(ch: &char) -> bool {
    *ch == '+' || *ch == '-'
}

fn is_tz_leading_char(ch: &char) -> bool {
    ch.is_alphabetic() || *ch == '.' || *ch == '_'
}

fn is_tz_char(ch: &char) -> bool {
    is_tz_leading_char(ch) || ch.is_ascii_digit() || *ch == '+' || *ch == '-'
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::{TimeZone, UtcOffset};
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};
    use crate::options::Disambiguation;
    use crate::tzdb::CompiledTzdbProvider;

    fn local(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> IsoDateTime {
        IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(year, month, day),
            IsoTime::new_unchecked(hour, minute, 0, 0, 0, 0),
        )
    }

    #[test]
    fn offset_parse_and_format_round_trip() {
        for source in ["+09:30", "-09:30", "-12:30", "+00:00"] {
            let offset = UtcOffset::from_str(source).unwrap();
            assert_eq!(offset.to_string(), source);
        }
        assert_eq!(UtcOffset::from_str("+0930").unwrap().minutes(), 570);
        assert_eq!(UtcOffset::from_str("-05").unwrap().minutes(), -300);
        assert!(UtcOffset::from_str("0930").is_err());
        assert!(UtcOffset::from_str("+9").is_err());
    }

    #[test]
    fn identifier_round_trip() {
        let provider = &CompiledTzdbProvider;
        let zone = TimeZone::try_from_str_with_provider("America/New_York", provider).unwrap();
        assert_eq!(zone.identifier(), "America/New_York");
        let offset = TimeZone::try_from_str_with_provider("+09:30", provider).unwrap();
        assert_eq!(offset.identifier(), "+09:30");
        assert!(TimeZone::try_from_str_with_provider("Not/AZone", provider).is_err());
    }

    #[test]
    fn gap_disambiguation_policies() {
        let provider = &CompiledTzdbProvider;
        let zone = TimeZone::IanaIdentifier("America/New_York".into());
        // 02:30 on 2020-03-08 does not exist in New York.
        let skipped = local(2020, 3, 8, 2, 30);

        let compatible = zone
            .get_epoch_nanoseconds_for(skipped, Disambiguation::Compatible, provider)
            .unwrap();
        let earlier = zone
            .get_epoch_nanoseconds_for(skipped, Disambiguation::Earlier, provider)
            .unwrap();
        let later = zone
            .get_epoch_nanoseconds_for(skipped, Disambiguation::Later, provider)
            .unwrap();
        assert!(zone
            .get_epoch_nanoseconds_for(skipped, Disambiguation::Reject, provider)
            .is_err());

        // Compatible matches later for a gap; earlier shifts backward an hour.
        assert_eq!(compatible, later);
        assert_eq!(
            later.as_i128() - earlier.as_i128(),
            3_600_000_000_000i128
        );
        // Later resolves to local 03:30 EDT == 07:30Z.
        assert_eq!(later.as_i128(), 1_583_652_600i128 * 1_000_000_000);
    }

    #[test]
    fn overlap_disambiguation_policies() {
        let provider = &CompiledTzdbProvider;
        let zone = TimeZone::IanaIdentifier("America/New_York".into());
        // 01:30 on 2020-11-01 happens twice in New York.
        let repeated = local(2020, 11, 1, 1, 30);

        let compatible = zone
            .get_epoch_nanoseconds_for(repeated, Disambiguation::Compatible, provider)
            .unwrap();
        let earlier = zone
            .get_epoch_nanoseconds_for(repeated, Disambiguation::Earlier, provider)
            .unwrap();
        let later = zone
            .get_epoch_nanoseconds_for(repeated, Disambiguation::Later, provider)
            .unwrap();

        // Compatible picks the earlier (pre-transition) reading.
        assert_eq!(compatible, earlier);
        assert_eq!(later.as_i128() - earlier.as_i128(), 3_600_000_000_000i128);
    }

    #[test]
    fn start_of_day_skips_into_gap() {
        let provider = &CompiledTzdbProvider;
        // Paris springs forward at 02:00 local; midnight exists.
        let zone = TimeZone::IanaIdentifier("America/New_York".into());
        let normal = IsoDate::new_unchecked(2020, 6, 1);
        let start = zone.get_start_of_day(&normal, provider).unwrap();
        // 2020-06-01T00:00-04:00 == 04:00Z.
        assert_eq!(
            start.as_i128(),
            (1_590_969_600 + 4 * 3600) as i128 * 1_000_000_000
        );
    }

    #[test]
    fn fixed_offset_zone_has_single_reading() {
        let provider = &CompiledTzdbProvider;
        let zone = TimeZone::OffsetMinutes(-300);
        let iso = local(2020, 11, 1, 1, 30);
        let possible = zone.get_possible_epoch_ns_for(iso, provider).unwrap();
        assert_eq!(possible.len(), 1);
    }
}
