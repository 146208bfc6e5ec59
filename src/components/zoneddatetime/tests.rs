use core::str::FromStr;

use super::ZonedDateTime;
use crate::components::{Duration, PartialDate, PartialZonedDateTime};
use crate::options::{
    DifferenceSettings, Disambiguation, OffsetDisambiguation, RoundingOptions, Unit,
};
use crate::tzdb::CompiledTzdbProvider;
use crate::{Calendar, TimeZone};

const PROVIDER: &CompiledTzdbProvider = &CompiledTzdbProvider;
const NS_PER_HOUR: i128 = 3_600_000_000_000;

fn new_york() -> TimeZone {
    TimeZone::IanaIdentifier("America/New_York".into())
}

#[test]
fn derives_local_fields_through_offset() {
    let nov_30_2023_utc = 1_701_308_952_000_000_000i128;
    let zdt = ZonedDateTime::try_new(
        nov_30_2023_utc,
        Calendar::default(),
        TimeZone::OffsetMinutes(0),
    )
    .unwrap();

    assert_eq!(zdt.year_with_provider(PROVIDER).unwrap(), 2023);
    assert_eq!(zdt.month_with_provider(PROVIDER).unwrap(), 11);
    assert_eq!(zdt.day_with_provider(PROVIDER).unwrap(), 30);
    assert_eq!(zdt.hour_with_provider(PROVIDER).unwrap(), 1);
    assert_eq!(zdt.minute_with_provider(PROVIDER).unwrap(), 49);
    assert_eq!(zdt.second_with_provider(PROVIDER).unwrap(), 12);

    let zdt_minus_five = ZonedDateTime::try_new(
        nov_30_2023_utc,
        Calendar::default(),
        TimeZone::OffsetMinutes(-300),
    )
    .unwrap();

    assert_eq!(zdt_minus_five.year_with_provider(PROVIDER).unwrap(), 2023);
    assert_eq!(zdt_minus_five.day_with_provider(PROVIDER).unwrap(), 29);
    assert_eq!(zdt_minus_five.hour_with_provider(PROVIDER).unwrap(), 20);
}

#[test]
fn add_time_units_skips_local_round_trip() {
    // 2020-03-08T01:30-05:00 in New York, 30 minutes before the spring
    // forward gap.
    let zdt =
        ZonedDateTime::from_str_with_provider("2020-03-08T01:30:00-05:00[America/New_York]", PROVIDER)
            .unwrap();

    // Adding two exact hours crosses the transition: local time reads 04:30.
    let later = zdt
        .add_with_provider(&Duration::from_str("PT2H").unwrap(), None, PROVIDER)
        .unwrap();
    assert_eq!(later.hour_with_provider(PROVIDER).unwrap(), 4);
    assert_eq!(
        later.epoch_nanoseconds().as_i128() - zdt.epoch_nanoseconds().as_i128(),
        2 * NS_PER_HOUR
    );
}

#[test]
fn add_calendar_units_round_trips_through_local_time() {
    let zdt =
        ZonedDateTime::from_str_with_provider("2020-03-07T02:30:00-05:00[America/New_York]", PROVIDER)
            .unwrap();

    // Adding one calendar day lands on 02:30 local the next day, but that
    // local time is skipped; compatible disambiguation moves it to 03:30.
    let next_day = zdt
        .add_with_provider(&Duration::from_str("P1D").unwrap(), None, PROVIDER)
        .unwrap();
    assert_eq!(next_day.day_with_provider(PROVIDER).unwrap(), 8);
    assert_eq!(next_day.hour_with_provider(PROVIDER).unwrap(), 3);
    assert_eq!(next_day.minute_with_provider(PROVIDER).unwrap(), 30);
    // The elapsed exact time is 24 hours: the skipped hour cancels the
    // shifted wall clock.
    assert_eq!(
        next_day.epoch_nanoseconds().as_i128() - zdt.epoch_nanoseconds().as_i128(),
        24 * NS_PER_HOUR
    );
}

#[test]
fn diff_in_days_accounts_for_short_day() {
    // The spring-forward day is only 23 hours long.
    let start =
        ZonedDateTime::from_str_with_provider("2020-03-08T00:00:00-05:00[America/New_York]", PROVIDER)
            .unwrap();
    let end =
        ZonedDateTime::from_str_with_provider("2020-03-09T00:00:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    assert_eq!(
        end.epoch_nanoseconds().as_i128() - start.epoch_nanoseconds().as_i128(),
        23 * NS_PER_HOUR
    );

    let result = start
        .until_with_provider(
            &end,
            DifferenceSettings {
                largest_unit: Some(Unit::Day),
                ..Default::default()
            },
            PROVIDER,
        )
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 0);

    let in_hours = start
        .until_with_provider(
            &end,
            DifferenceSettings {
                largest_unit: Some(Unit::Hour),
                ..Default::default()
            },
            PROVIDER,
        )
        .unwrap();
    assert_eq!(in_hours.hours(), 23);
}

#[test]
fn hours_in_day_across_transitions() {
    let short_day =
        ZonedDateTime::from_str_with_provider("2020-03-08T12:00:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    assert_eq!(short_day.hours_in_day_with_provider(PROVIDER).unwrap(), 23);

    let long_day =
        ZonedDateTime::from_str_with_provider("2020-11-01T12:00:00-05:00[America/New_York]", PROVIDER)
            .unwrap();
    assert_eq!(long_day.hours_in_day_with_provider(PROVIDER).unwrap(), 25);

    let normal_day =
        ZonedDateTime::from_str_with_provider("2020-06-01T12:00:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    assert_eq!(normal_day.hours_in_day_with_provider(PROVIDER).unwrap(), 24);
}

#[test]
fn offset_rejection_on_mismatch() {
    // The declared offset contradicts the zone.
    let result = ZonedDateTime::from_utf8_with_provider(
        "2020-06-01T12:00:00-05:00[America/New_York]".as_bytes(),
        Disambiguation::Compatible,
        OffsetDisambiguation::Reject,
        PROVIDER,
    );
    assert!(result.is_err());

    // Ignoring the offset resolves through the zone instead.
    let ignored = ZonedDateTime::from_utf8_with_provider(
        "2020-06-01T12:00:00-05:00[America/New_York]".as_bytes(),
        Disambiguation::Compatible,
        OffsetDisambiguation::Ignore,
        PROVIDER,
    )
    .unwrap();
    assert_eq!(ignored.hour_with_provider(PROVIDER).unwrap(), 12);
}

#[test]
fn repeated_local_time_resolves_by_offset() {
    // 01:30 repeats on 2020-11-01; the offsets pick the readings apart.
    let first =
        ZonedDateTime::from_str_with_provider("2020-11-01T01:30:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    let second =
        ZonedDateTime::from_str_with_provider("2020-11-01T01:30:00-05:00[America/New_York]", PROVIDER)
            .unwrap();
    assert_eq!(
        second.epoch_nanoseconds().as_i128() - first.epoch_nanoseconds().as_i128(),
        NS_PER_HOUR
    );
}

#[test]
fn from_partial_resolves_through_zone() {
    let partial = PartialZonedDateTime::default()
        .with_date(
            PartialDate::new()
                .with_year(Some(2020))
                .with_month(Some(6))
                .with_day(Some(1)),
        )
        .with_timezone(Some(new_york()));

    let zdt = ZonedDateTime::from_partial_with_provider(partial, None, None, None, PROVIDER)
        .unwrap();
    // Start of day in New York is 04:00Z during daylight time.
    assert_eq!(zdt.hour_with_provider(PROVIDER).unwrap(), 0);
    assert_eq!(
        zdt.epoch_nanoseconds().as_i128(),
        (1_590_969_600 + 4 * 3600) as i128 * 1_000_000_000
    );
}

#[test]
fn with_replaces_local_fields() {
    let zdt =
        ZonedDateTime::from_str_with_provider("2020-06-01T12:30:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    let changed = zdt
        .with(
            PartialZonedDateTime::default().with_date(PartialDate::new().with_day(Some(15))),
            None,
            None,
            None,
            PROVIDER,
        )
        .unwrap();
    assert_eq!(changed.day_with_provider(PROVIDER).unwrap(), 15);
    assert_eq!(changed.hour_with_provider(PROVIDER).unwrap(), 12);
    assert_eq!(changed.minute_with_provider(PROVIDER).unwrap(), 30);
}

#[test]
fn round_to_day_uses_actual_day_length() {
    // Past local noon on the 23-hour day rounds up to the next midnight.
    let zdt =
        ZonedDateTime::from_str_with_provider("2020-03-08T13:00:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    let rounded = zdt
        .round_with_provider(
            RoundingOptions {
                smallest_unit: Some(Unit::Day),
                ..Default::default()
            },
            PROVIDER,
        )
        .unwrap();
    assert_eq!(rounded.day_with_provider(PROVIDER).unwrap(), 9);
    assert_eq!(rounded.hour_with_provider(PROVIDER).unwrap(), 0);
}

#[test]
fn equality_includes_zone_identity() {
    let zoned =
        ZonedDateTime::from_str_with_provider("2020-06-01T12:00:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    let fixed_offset = zoned.with_timezone(TimeZone::OffsetMinutes(-240)).unwrap();

    // Same instant, different time zone value: not equal, but the instants
    // compare equal.
    assert_ne!(zoned, fixed_offset);
    assert_eq!(
        zoned.compare_instant(&fixed_offset),
        core::cmp::Ordering::Equal
    );
}

#[test]
fn to_string_round_trips() {
    let zdt =
        ZonedDateTime::from_str_with_provider("2020-06-01T12:30:00-04:00[America/New_York]", PROVIDER)
            .unwrap();
    let string = zdt
        .to_ixdtf_string_with_provider(
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            PROVIDER,
        )
        .unwrap();
    assert_eq!(string, "2020-06-01T12:30:00-04:00[America/New_York]");

    let reparsed = ZonedDateTime::from_str_with_provider(&string, PROVIDER).unwrap();
    assert_eq!(reparsed, zdt);
}
