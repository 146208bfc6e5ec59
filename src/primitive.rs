//! The `FiniteF64` numeric primitive.
//!
//! Calendar and clock arithmetic in this crate is integer based; floats only
//! appear at the edges, for the fractional `total` API and for rounding
//! progress computations. `FiniteF64` is an f64 that is known to be finite.

use crate::{error::ErrorMessage, TemporalError, TemporalResult};
use num_traits::{AsPrimitive, FromPrimitive};

#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct FiniteF64(pub(crate) f64);

impl FiniteF64 {
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> f64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    #[inline]
    #[must_use]
    pub fn negate(&self) -> Self {
        if self.is_zero() {
            return *self;
        }
        Self(-self.0)
    }

    #[inline]
    pub fn checked_add(&self, other: &Self) -> TemporalResult<Self> {
        let result = self.0 + other.0;
        if !result.is_finite() {
            return Err(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite));
        }
        Ok(Self(result))
    }

    #[inline]
    #[must_use]
    pub fn copysign(&self, sign: f64) -> Self {
        Self(self.0.copysign(sign))
    }

    /// Truncates this value into a valid `i32` date field value.
    pub(crate) fn as_date_value(&self) -> TemporalResult<i32> {
        if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&self.0) {
            return Err(TemporalError::range().with_message("number exceeds a valid date value."));
        }
        Ok(self.0 as i32)
    }
}

impl AsPrimitive<i64> for FiniteF64 {
    fn as_(self) -> i64 {
        self.0 as i64
    }
}

impl AsPrimitive<i128> for FiniteF64 {
    fn as_(self) -> i128 {
        self.0 as i128
    }
}

impl TryFrom<f64> for FiniteF64 {
    type Error = TemporalError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite));
        }
        Ok(Self(value))
    }
}

impl TryFrom<i64> for FiniteF64 {
    type Error = TemporalError;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let result = f64::from_i64(value)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite))?;
        Ok(Self(result))
    }
}

impl TryFrom<i128> for FiniteF64 {
    type Error = TemporalError;
    fn try_from(value: i128) -> Result<Self, Self::Error> {
        let result = f64::from_i128(value)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite))?;
        if !result.is_finite() {
            return Err(TemporalError::range().with_enum(ErrorMessage::NumberNotFinite));
        }
        Ok(Self(result))
    }
}

impl From<i8> for FiniteF64 {
    fn from(value: i8) -> Self {
        Self(f64::from(value))
    }
}

impl From<i32> for FiniteF64 {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<u8> for FiniteF64 {
    fn from(value: u8) -> Self {
        Self(f64::from(value))
    }
}

impl From<u16> for FiniteF64 {
    fn from(value: u16) -> Self {
        Self(f64::from(value))
    }
}

impl From<u32> for FiniteF64 {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl PartialEq<f64> for FiniteF64 {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<f64> for FiniteF64 {
    fn partial_cmp(&self, other: &f64) -> Option<core::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::FiniteF64;

    #[test]
    fn rejects_non_finite() {
        assert!(FiniteF64::try_from(f64::NAN).is_err());
        assert!(FiniteF64::try_from(f64::INFINITY).is_err());
        assert!(FiniteF64::try_from(2.5f64).is_ok());
    }

    #[test]
    fn negate_preserves_zero() {
        assert_eq!(FiniteF64::from(0u8).negate(), 0.0);
        assert_eq!(FiniteF64::from(3i32).negate(), -3.0);
    }
}
