//! The `relativeTo` option used by `Duration` rounding and totals.

use crate::components::{PlainDate, ZonedDateTime};

/// The relative-to anchor for duration arithmetic involving calendar units.
#[derive(Debug, Clone)]
pub enum RelativeTo {
    /// A `PlainDate` anchor; the duration is measured from local midnight.
    PlainDate(PlainDate),
    /// A `ZonedDateTime` anchor; day lengths follow the zone's offsets.
    ZonedDateTime(ZonedDateTime),
}

impl From<PlainDate> for RelativeTo {
    fn from(value: PlainDate) -> Self {
        Self::PlainDate(value)
    }
}

impl From<ZonedDateTime> for RelativeTo {
    fn from(value: ZonedDateTime) -> Self {
        Self::ZonedDateTime(value)
    }
}
