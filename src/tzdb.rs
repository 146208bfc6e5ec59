//! A built-in, deterministic time zone provider.
//!
//! This provider resolves a small set of IANA identifiers from compiled-in
//! daylight-saving rules (current-era rules applied proleptically), which is
//! enough for hosts without a time zone database and for exercising every
//! gap/overlap path in tests without OS tzdata. Hosts that carry real tzdata
//! should implement [`TimeZoneProvider`] over it instead.
//!
//! Resolved transition instants are memoized in a process-wide,
//! mutex-guarded, append-only map keyed by zone identifier and year.

use std::sync::{LazyLock, Mutex};

use rustc_hash::FxHashMap;

use crate::{
    error::ErrorMessage,
    iso::IsoDateTime,
    provider::TimeZoneProvider,
    time::EpochNanoseconds,
    utils, TemporalError, TemporalResult,
};

const NS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Which Sunday of the month a rule transitions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleSunday {
    First,
    Second,
    Last,
}

/// The clock the rule's transition time is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleBasis {
    Standard,
    Daylight,
    Utc,
}

#[derive(Debug, Clone, Copy)]
struct TransitionRule {
    month: u8,
    sunday: RuleSunday,
    /// Seconds after midnight on the rule's clock.
    transition_time: i64,
    basis: RuleBasis,
}

#[derive(Debug, Clone, Copy)]
struct ZoneRules {
    std_offset: i64,
    dst_offset: i64,
    /// The rule switching onto `dst_offset`, if the zone observes DST.
    dst_start: Option<TransitionRule>,
    /// The rule switching back onto `std_offset`.
    dst_end: Option<TransitionRule>,
}

/// US rule: second Sunday in March 02:00 standard time through first Sunday
/// in November 02:00 daylight time.
const fn us_rules(std_offset: i64) -> ZoneRules {
    ZoneRules {
        std_offset,
        dst_offset: std_offset + 3600,
        dst_start: Some(TransitionRule {
            month: 3,
            sunday: RuleSunday::Second,
            transition_time: 2 * 3600,
            basis: RuleBasis::Standard,
        }),
        dst_end: Some(TransitionRule {
            month: 11,
            sunday: RuleSunday::First,
            transition_time: 2 * 3600,
            basis: RuleBasis::Daylight,
        }),
    }
}

/// EU rule: last Sunday in March through last Sunday in October, both at
/// 01:00 UTC.
const fn eu_rules(std_offset: i64) -> ZoneRules {
    ZoneRules {
        std_offset,
        dst_offset: std_offset + 3600,
        dst_start: Some(TransitionRule {
            month: 3,
            sunday: RuleSunday::Last,
            transition_time: 3600,
            basis: RuleBasis::Utc,
        }),
        dst_end: Some(TransitionRule {
            month: 10,
            sunday: RuleSunday::Last,
            transition_time: 3600,
            basis: RuleBasis::Utc,
        }),
    }
}

const fn fixed_rules(std_offset: i64) -> ZoneRules {
    ZoneRules {
        std_offset,
        dst_offset: std_offset,
        dst_start: None,
        dst_end: None,
    }
}

static ZONES: &[(&str, ZoneRules)] = &[
    ("UTC", fixed_rules(0)),
    ("Etc/UTC", fixed_rules(0)),
    ("America/New_York", us_rules(-5 * 3600)),
    ("America/Chicago", us_rules(-6 * 3600)),
    ("America/Los_Angeles", us_rules(-8 * 3600)),
    ("America/Phoenix", fixed_rules(-7 * 3600)),
    ("Europe/London", eu_rules(0)),
    ("Europe/Paris", eu_rules(3600)),
    ("Asia/Tokyo", fixed_rules(9 * 3600)),
    ("Asia/Kolkata", fixed_rules(5 * 3600 + 1800)),
    // Southern hemisphere: first Sunday in October 02:00 standard time
    // through first Sunday in April 03:00 daylight time.
    (
        "Australia/Sydney",
        ZoneRules {
            std_offset: 10 * 3600,
            dst_offset: 11 * 3600,
            dst_start: Some(TransitionRule {
                month: 10,
                sunday: RuleSunday::First,
                transition_time: 2 * 3600,
                basis: RuleBasis::Standard,
            }),
            dst_end: Some(TransitionRule {
                month: 4,
                sunday: RuleSunday::First,
                transition_time: 3 * 3600,
                basis: RuleBasis::Daylight,
            }),
        },
    ),
];

fn zone_rules(identifier: &str) -> Option<&'static ZoneRules> {
    ZONES
        .iter()
        .find(|(name, _)| *name == identifier)
        .map(|(_, rules)| rules)
}

/// A year's transitions: `(instant, offset in effect from that instant)`,
/// ascending.
type YearTransitions = [(i128, i64); 2];

static TRANSITION_CACHE: LazyLock<Mutex<FxHashMap<(&'static str, i32), YearTransitions>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

fn rule_transition_epoch(rules: &ZoneRules, rule: &TransitionRule, year: i32) -> i128 {
    let first_of_month = utils::epoch_days_from_gregorian_date(year, rule.month, 1);
    // iso_day_of_week: Monday = 1 .. Sunday = 7.
    let first_sunday = first_of_month + i64::from((7 - utils::iso_day_of_week(first_of_month)) % 7);
    let day = match rule.sunday {
        RuleSunday::First => first_sunday,
        RuleSunday::Second => first_sunday + 7,
        RuleSunday::Last => {
            let days_in_month = i64::from(utils::iso_days_in_month(year, rule.month));
            let last_day = first_of_month + days_in_month - 1;
            first_sunday + 7 * ((last_day - first_sunday) / 7)
        }
    };
    let base_offset = match rule.basis {
        RuleBasis::Standard => rules.std_offset,
        RuleBasis::Daylight => rules.dst_offset,
        RuleBasis::Utc => 0,
    };
    i128::from(day * SECONDS_PER_DAY + rule.transition_time - base_offset) * NS_PER_SECOND
}

/// Resolves (and memoizes) the two transition instants of a year.
fn transitions_for_year(
    identifier: &'static str,
    rules: &ZoneRules,
    year: i32,
) -> TemporalResult<Option<YearTransitions>> {
    let (Some(start), Some(end)) = (rules.dst_start.as_ref(), rules.dst_end.as_ref()) else {
        return Ok(None);
    };

    let mut cache = TRANSITION_CACHE
        .lock()
        .map_err(|_| TemporalError::general("Unable to acquire time zone cache lock"))?;
    if let Some(cached) = cache.get(&(identifier, year)) {
        return Ok(Some(*cached));
    }

    let mut transitions = [
        (rule_transition_epoch(rules, start, year), rules.dst_offset),
        (rule_transition_epoch(rules, end, year), rules.std_offset),
    ];
    transitions.sort_by_key(|(instant, _)| *instant);

    #[cfg(feature = "log")]
    log::debug!("tzdb: resolved transitions for {identifier} in {year}");

    cache.insert((identifier, year), transitions);
    Ok(Some(transitions))
}

/// Gathers the transition list of a three-year window around `year`.
fn transition_window(
    identifier: &'static str,
    rules: &ZoneRules,
    year: i32,
) -> TemporalResult<Vec<(i128, i64)>> {
    let mut window = Vec::with_capacity(6);
    for y in year.saturating_sub(1)..=year.saturating_add(1) {
        if let Some(transitions) = transitions_for_year(identifier, rules, y)? {
            window.extend(transitions);
        }
    }
    window.sort_by_key(|(instant, _)| *instant);
    Ok(window)
}

fn offset_seconds_at(
    identifier: &'static str,
    rules: &ZoneRules,
    utc_epoch: i128,
) -> TemporalResult<i64> {
    if rules.dst_start.is_none() {
        return Ok(rules.std_offset);
    }
    let epoch_millis = utc_epoch.div_euclid(1_000_000);
    let (year, _, _) =
        utils::ymd_from_epoch_milliseconds(epoch_millis.clamp(
            i128::from(i64::MIN),
            i128::from(i64::MAX),
        ) as i64);
    let window = transition_window(identifier, rules, year)?;

    // The offset in effect before the window's first transition is the
    // opposite side of whichever rule fires first.
    let Some(first) = window.first() else {
        return Ok(rules.std_offset);
    };
    let mut current = if first.1 == rules.dst_offset {
        rules.std_offset
    } else {
        rules.dst_offset
    };
    for (instant, offset) in window {
        if utc_epoch >= instant {
            current = offset;
        } else {
            break;
        }
    }
    Ok(current)
}

/// The provider over the compiled-in rule set.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompiledTzdbProvider;

impl CompiledTzdbProvider {
    fn resolve(&self, identifier: &str) -> TemporalResult<(&'static str, &'static ZoneRules)> {
        ZONES
            .iter()
            .find(|(name, _)| *name == identifier)
            .map(|(name, rules)| (*name, rules))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::TimeZoneInvalidIdentifier))
    }
}

impl TimeZoneProvider for CompiledTzdbProvider {
    fn check_identifier(&self, identifier: &str) -> bool {
        zone_rules(identifier).is_some()
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        iso_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        let (name, rules) = self.resolve(identifier)?;
        let local_epoch = iso_datetime.as_nanoseconds().0;

        let mut candidate_offsets = [rules.std_offset, rules.dst_offset];
        candidate_offsets.sort_unstable();
        let mut possible = Vec::with_capacity(2);
        for (index, offset) in candidate_offsets.into_iter().enumerate() {
            if index > 0 && candidate_offsets[index - 1] == offset {
                continue;
            }
            let candidate = local_epoch - i128::from(offset) * NS_PER_SECOND;
            if offset_seconds_at(name, rules, candidate)? == offset {
                possible.push(EpochNanoseconds::from(candidate));
            }
        }
        // A larger offset maps the same local time onto an earlier instant.
        possible.sort_by_key(EpochNanoseconds::as_i128);
        Ok(possible)
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        utc_epoch: i128,
    ) -> TemporalResult<i128> {
        let (name, rules) = self.resolve(identifier)?;
        Ok(i128::from(offset_seconds_at(name, rules, utc_epoch)?) * NS_PER_SECOND)
    }
}

/// The process-wide provider instance.
pub static TZ_PROVIDER: CompiledTzdbProvider = CompiledTzdbProvider;

#[cfg(test)]
mod tests {
    use super::{CompiledTzdbProvider, TimeZoneProvider};
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};

    const NS_PER_HOUR: i128 = 3_600_000_000_000;

    fn local(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> IsoDateTime {
        IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(year, month, day),
            IsoTime::new_unchecked(hour, minute, 0, 0, 0, 0),
        )
    }

    #[test]
    fn identifier_checks() {
        let provider = CompiledTzdbProvider;
        assert!(provider.check_identifier("UTC"));
        assert!(provider.check_identifier("America/New_York"));
        assert!(!provider.check_identifier("Mars/Olympus_Mons"));
    }

    #[test]
    fn new_york_offsets_across_spring_forward() {
        let provider = CompiledTzdbProvider;
        // 2020-03-08T07:00:00Z is the EST->EDT transition instant.
        let transition = 1_583_650_800i128 * 1_000_000_000;
        let before = provider
            .get_named_tz_offset_nanoseconds("America/New_York", transition - 1)
            .unwrap();
        let after = provider
            .get_named_tz_offset_nanoseconds("America/New_York", transition)
            .unwrap();
        assert_eq!(before, -5 * NS_PER_HOUR);
        assert_eq!(after, -4 * NS_PER_HOUR);
    }

    #[test]
    fn spring_forward_gap_has_no_instants() {
        let provider = CompiledTzdbProvider;
        let possible = provider
            .get_named_tz_epoch_nanoseconds("America/New_York", local(2020, 3, 8, 2, 30))
            .unwrap();
        assert!(possible.is_empty());
    }

    #[test]
    fn fall_back_overlap_has_two_instants() {
        let provider = CompiledTzdbProvider;
        let possible = provider
            .get_named_tz_epoch_nanoseconds("America/New_York", local(2020, 11, 1, 1, 30))
            .unwrap();
        assert_eq!(possible.len(), 2);
        assert!(possible[0] < possible[1]);
        // The two readings are exactly one hour apart.
        assert_eq!(possible[1].as_i128() - possible[0].as_i128(), NS_PER_HOUR);
    }

    #[test]
    fn unambiguous_local_time_has_one_instant() {
        let provider = CompiledTzdbProvider;
        let possible = provider
            .get_named_tz_epoch_nanoseconds("America/New_York", local(2020, 6, 1, 12, 0))
            .unwrap();
        assert_eq!(possible.len(), 1);
        // 2020-06-01T12:00-04:00 == 2020-06-01T16:00Z
        assert_eq!(
            possible[0].as_i128(),
            1_591_027_200i128 * 1_000_000_000
        );
    }

    #[test]
    fn southern_hemisphere_dst_is_inverted() {
        let provider = CompiledTzdbProvider;
        // January is daylight time in Sydney (+11), July is standard (+10).
        let january = provider
            .get_named_tz_offset_nanoseconds("Australia/Sydney", 1_578_873_600_000_000_000)
            .unwrap();
        let july = provider
            .get_named_tz_offset_nanoseconds("Australia/Sydney", 1_593_561_600_000_000_000)
            .unwrap();
        assert_eq!(january, 11 * NS_PER_HOUR);
        assert_eq!(july, 10 * NS_PER_HOUR);
    }

    #[test]
    fn utc_is_fixed() {
        let provider = CompiledTzdbProvider;
        assert_eq!(
            provider.get_named_tz_offset_nanoseconds("UTC", 0).unwrap(),
            0
        );
        let possible = provider
            .get_named_tz_epoch_nanoseconds("UTC", local(1970, 1, 1, 0, 0))
            .unwrap();
        assert_eq!(possible.len(), 1);
        assert_eq!(possible[0].as_i128(), 0);
    }
}
