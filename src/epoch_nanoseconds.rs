//! The `EpochNanoseconds` type, an offset in nanoseconds from the Unix epoch.

use crate::{error::ErrorMessage, TemporalError, TemporalResult};

/// Nanoseconds since the Unix epoch, the internal representation of an
/// exact time.
///
/// A valid value lies within ±8,640,000,000,000,000,000,000 nanoseconds
/// (±100,000,000 days) of the epoch. Construction through `From<i128>` does
/// not validate; use [`EpochNanoseconds::try_new`] or
/// [`EpochNanoseconds::check_validity`] where the range matters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochNanoseconds(pub(crate) i128);

impl From<i128> for EpochNanoseconds {
    fn from(value: i128) -> Self {
        Self(value)
    }
}

impl EpochNanoseconds {
    /// Creates a validated `EpochNanoseconds`.
    pub fn try_new(value: i128) -> TemporalResult<Self> {
        let nanos = Self(value);
        nanos.check_validity()?;
        Ok(nanos)
    }

    /// Returns the underlying nanosecond value.
    #[inline]
    #[must_use]
    pub fn as_i128(&self) -> i128 {
        self.0
    }

    /// Asserts that this value is within the valid epoch range.
    pub fn check_validity(&self) -> TemporalResult<()> {
        if !is_valid_epoch_nanos(&self.0) {
            return Err(TemporalError::range().with_enum(ErrorMessage::InstantOutOfRange));
        }
        Ok(())
    }
}

/// Utility for determining if the nanos are within a valid range.
#[inline]
#[must_use]
pub(crate) fn is_valid_epoch_nanos(nanos: &i128) -> bool {
    (crate::NS_MIN_INSTANT..=crate::NS_MAX_INSTANT).contains(nanos)
}

#[cfg(test)]
mod tests {
    use super::EpochNanoseconds;
    use crate::{NS_MAX_INSTANT, NS_MIN_INSTANT};

    #[test]
    fn boundary_validity() {
        assert!(EpochNanoseconds::try_new(NS_MAX_INSTANT).is_ok());
        assert!(EpochNanoseconds::try_new(NS_MIN_INSTANT).is_ok());
        assert!(EpochNanoseconds::try_new(NS_MAX_INSTANT + 1).is_err());
        assert!(EpochNanoseconds::try_new(NS_MIN_INSTANT - 1).is_err());
    }
}
