use core::str::FromStr;

use super::{DateDuration, Duration, PartialDuration};
use crate::options::{RoundingMode, RoundingOptions, ToStringRoundingOptions, Unit};
use crate::Sign;

#[test]
fn duration_new_validates_sign_consistency() {
    assert!(Duration::new(1, 0, 0, 0, 0, 0, 0, 0, 0, -1).is_err());
    assert!(Duration::new(0, 0, 0, -1, -2, 0, 0, 0, 0, -1).is_ok());
    assert!(Duration::new(0, 0, 0, 0, 0, 0, 0, 0, 0, 0).is_ok());
}

#[test]
fn duration_sign_and_negation() {
    let duration = Duration::new(0, 0, 0, 0, -5, -30, 0, 0, 0, 0).unwrap();
    assert_eq!(duration.sign(), Sign::Negative);
    let negated = duration.negated();
    assert_eq!(negated.hours(), 5);
    assert_eq!(negated.minutes(), 30);
    assert_eq!(negated.sign(), Sign::Positive);
    assert_eq!(duration.abs(), negated);
    assert!(Duration::default().is_zero());
}

#[test]
fn partial_duration_requires_a_field() {
    assert!(Duration::from_partial_duration(PartialDuration::default()).is_err());
    let duration = Duration::from_partial_duration(PartialDuration {
        hours: Some(3),
        minutes: Some(45),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(duration.hours(), 3);
    assert_eq!(duration.minutes(), 45);
    assert_eq!(duration.days(), 0);
}

#[test]
fn parses_iso_duration_strings() {
    let complex = Duration::from_str("P1Y2M3DT4H5M6.789S").unwrap();
    assert_eq!(complex.years(), 1);
    assert_eq!(complex.months(), 2);
    assert_eq!(complex.days(), 3);
    assert_eq!(complex.hours(), 4);
    assert_eq!(complex.minutes(), 5);
    assert_eq!(complex.seconds(), 6);
    assert_eq!(complex.milliseconds(), 789);

    let negative = Duration::from_str("-P1D").unwrap();
    assert_eq!(negative.days(), -1);

    let fractional_hours = Duration::from_str("PT1.5H").unwrap();
    assert_eq!(fractional_hours.hours(), 1);
    assert_eq!(fractional_hours.minutes(), 30);

    assert!(Duration::from_str("one day").is_err());
}

#[test]
fn formats_iso_duration_strings() {
    let duration = Duration::new(1, 2, 0, 3, 4, 5, 6, 789, 0, 0).unwrap();
    assert_eq!(
        duration
            .as_temporal_string(ToStringRoundingOptions::default())
            .unwrap(),
        "P1Y2M3DT4H5M6.789S"
    );

    assert_eq!(
        Duration::default()
            .as_temporal_string(ToStringRoundingOptions::default())
            .unwrap(),
        "PT0S"
    );

    let negative = Duration::new(0, 0, 0, -1, -2, 0, 0, 0, 0, 0).unwrap();
    assert_eq!(
        negative
            .as_temporal_string(ToStringRoundingOptions::default())
            .unwrap(),
        "-P1DT2H"
    );
}

#[test]
fn adds_time_durations() {
    let commute = Duration::from_str("PT45M").unwrap();
    let lunch = Duration::from_str("PT1H").unwrap();
    let total = commute.add(&lunch).unwrap();
    assert_eq!(total.hours(), 1);
    assert_eq!(total.minutes(), 45);

    let shortened = lunch
        .subtract(&Duration::from_str("PT15M").unwrap())
        .unwrap();
    assert_eq!(shortened.minutes(), 45);

    // Calendar units need a reference point.
    assert!(Duration::from_str("P1M")
        .unwrap()
        .add(&Duration::from_str("P1D").unwrap())
        .is_err());
}

#[test]
fn rounds_time_durations_without_relative_to() {
    let duration = Duration::from_str("PT1H55M").unwrap();
    let options = RoundingOptions {
        smallest_unit: Some(Unit::Hour),
        rounding_mode: Some(RoundingMode::HalfExpand),
        ..Default::default()
    };
    let rounded = duration
        .round_with_provider(options, None, &crate::tzdb::CompiledTzdbProvider)
        .unwrap();
    assert_eq!(rounded.hours(), 2);
    assert_eq!(rounded.minutes(), 0);
}

#[test]
fn total_of_time_durations() {
    let duration = Duration::from_str("PT90M").unwrap();
    let total = duration
        .total_with_provider(Unit::Hour, None, &crate::tzdb::CompiledTzdbProvider)
        .unwrap();
    assert_eq!(total.as_inner(), 1.5);
}

#[test]
fn from_date_duration_preserves_fields() {
    let date_duration = DateDuration::new(1, 2, 3, 4).unwrap();
    let duration = Duration::from(date_duration);
    assert_eq!(duration.years(), 1);
    assert_eq!(duration.months(), 2);
    assert_eq!(duration.weeks(), 3);
    assert_eq!(duration.days(), 4);
    assert!(duration.to_normalized_time().is_zero());
}
