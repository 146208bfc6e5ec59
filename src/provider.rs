//! The time zone provider boundary.
//!
//! Named time zone resolution is a host concern: the engine only needs the
//! two conversions below plus an identifier check. Hosts with access to real
//! tzdata implement [`TimeZoneProvider`] over it; the built-in
//! [`crate::tzdb`] module provides a deterministic rule-based implementation
//! for tests and hosts without a database.

use crate::{iso::IsoDateTime, time::EpochNanoseconds, TemporalResult};

/// The hooks a named time zone database must provide.
pub trait TimeZoneProvider {
    /// Returns whether the identifier names a zone this provider resolves.
    fn check_identifier(&self, identifier: &str) -> bool;

    /// Returns the possible epoch nanoseconds for a local date-time: zero
    /// results for a skipped local time, two (ascending) for a repeated one,
    /// and one otherwise.
    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        iso_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>>;

    /// Returns the UTC offset of the zone, in nanoseconds, at the provided
    /// epoch nanoseconds.
    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        utc_epoch: i128,
    ) -> TemporalResult<i128>;
}

/// A provider for operations that are statically known not to touch a named
/// time zone. Calling into it is an implementation error.
pub struct NeverProvider;

impl TimeZoneProvider for NeverProvider {
    fn check_identifier(&self, _: &str) -> bool {
        unimplemented!()
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        _: &str,
        _: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        unimplemented!()
    }

    fn get_named_tz_offset_nanoseconds(&self, _: &str, _: i128) -> TemporalResult<i128> {
        unimplemented!()
    }
}

impl<T: TimeZoneProvider> TimeZoneProvider for &T {
    fn check_identifier(&self, identifier: &str) -> bool {
        (**self).check_identifier(identifier)
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        iso_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        (**self).get_named_tz_epoch_nanoseconds(identifier, iso_datetime)
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        utc_epoch: i128,
    ) -> TemporalResult<i128> {
        (**self).get_named_tz_offset_nanoseconds(identifier, utc_epoch)
    }
}
