//! The `DateDuration` record.

use crate::{error::ErrorMessage, Sign, TemporalError, TemporalResult, NS_PER_DAY};

/// The maximum magnitude of the `days` field: the maximum time duration
/// expressed in whole days.
pub(crate) const MAX_DATE_DURATION_DAYS: i64 =
    (super::normalized::MAX_TIME_DURATION / NS_PER_DAY as i128) as i64;

/// The calendar-unit portion of a duration: years, months, weeks, and days.
///
/// All nonzero fields must share one sign, and the year/month/week
/// magnitudes are bounded below 2^32.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateDuration {
    /// `DateDuration`'s internal year value.
    pub years: i64,
    /// `DateDuration`'s internal month value.
    pub months: i64,
    /// `DateDuration`'s internal week value.
    pub weeks: i64,
    /// `DateDuration`'s internal day value.
    pub days: i64,
}

impl DateDuration {
    /// Creates a new, unvalidated `DateDuration`.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(years: i64, months: i64, weeks: i64, days: i64) -> Self {
        Self {
            years,
            months,
            weeks,
            days,
        }
    }

    /// Creates a new `DateDuration`, validating the field invariants.
    #[inline]
    pub fn new(years: i64, months: i64, weeks: i64, days: i64) -> TemporalResult<Self> {
        let duration = Self::new_unchecked(years, months, weeks, days);
        duration.check_validity()?;
        Ok(duration)
    }

    /// `IsValidDuration`, restricted to the date fields.
    pub(crate) fn check_validity(&self) -> TemporalResult<()> {
        let fields = [self.years, self.months, self.weeks, self.days];
        let mut sign = Sign::Zero;
        for field in fields {
            let field_sign = Sign::from(field.signum() as i8);
            if field_sign == Sign::Zero {
                continue;
            }
            if sign != Sign::Zero && field_sign != sign {
                return Err(TemporalError::range().with_enum(ErrorMessage::DurationSignMismatch));
            }
            sign = field_sign;
        }
        const MAX_CALENDAR_VALUE: i64 = 1 << 32;
        if self.years.abs() >= MAX_CALENDAR_VALUE
            || self.months.abs() >= MAX_CALENDAR_VALUE
            || self.weeks.abs() >= MAX_CALENDAR_VALUE
            || self.days.abs() > MAX_DATE_DURATION_DAYS
        {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationInvalid));
        }
        Ok(())
    }

    /// Returns the sign of this `DateDuration`.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        duration_sign(&[self.years, self.months, self.weeks, self.days])
    }

    /// Returns whether every field is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// Returns a negated `DateDuration`.
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
        }
    }

    /// Returns a new `DateDuration` with the provided `days` value.
    #[inline]
    pub(crate) fn adjust_days(&self, days: i64) -> TemporalResult<Self> {
        Self::new(self.years, self.months, self.weeks, days)
    }
}

/// `DurationSign`: the sign of the first nonzero field.
pub(crate) fn duration_sign(fields: &[i64]) -> Sign {
    for field in fields {
        match field.signum() {
            1 => return Sign::Positive,
            -1 => return Sign::Negative,
            _ => {}
        }
    }
    Sign::Zero
}

#[cfg(test)]
mod tests {
    use super::DateDuration;
    use crate::Sign;

    #[test]
    fn sign_consistency_is_enforced() {
        assert!(DateDuration::new(1, 0, 0, -1).is_err());
        assert!(DateDuration::new(0, -2, 0, -1).is_ok());
        assert!(DateDuration::new(0, 0, 0, 0).is_ok());
    }

    #[test]
    fn sign_reads_first_nonzero_field() {
        assert_eq!(DateDuration::new(0, 0, 0, -5).unwrap().sign(), Sign::Negative);
        assert_eq!(DateDuration::new(1, 2, 0, 0).unwrap().sign(), Sign::Positive);
        assert_eq!(DateDuration::default().sign(), Sign::Zero);
    }
}
