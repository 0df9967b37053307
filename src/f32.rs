//! Module for convenient handling of primitive [`f32`] types.
//!
//! In a nutshell, this exports restricted type wrappers around [`f32`] values
//! with certain guarantees to be valid numbers: [`UnitF32`] for thresholds
//! and energies in `[0, 1]` and [`Bpm`] for tempo hints.

use core::cmp::Ordering;
use core::fmt::{Display, Formatter};
use core::ops::RangeInclusive;
use thiserror::Error;

/// The underlying value is not valid, i.e., not finite or not in a finite
/// range.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidF32Error {
    #[error("value is not a number (NaN)")]
    NAN,
    #[error("value is infinite")]
    Infinite,
    #[error("finite value {0} is not in finite range {1:?}")]
    NotInRange(f32 /* finite */, RangeInclusive<f32>),
}

/// A finite f32 that is [`Ord`] and [`Eq`].
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
struct FiniteF32(f32 /* finite: not NaN or infinite */);

impl Ord for FiniteF32 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Finite values always have a total order.
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

impl Eq for FiniteF32 {}

impl TryFrom<f32> for FiniteF32 {
    type Error = InvalidF32Error;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value.is_nan() {
            Err(InvalidF32Error::NAN)
        } else if value.is_infinite() {
            Err(InvalidF32Error::Infinite)
        } else {
            Ok(Self(value))
        }
    }
}

fn f32_is_finite_and_in_range(
    value: f32,
    range: RangeInclusive<f32>,
) -> Result<FiniteF32, InvalidF32Error> {
    let finite_f32 = FiniteF32::try_from(value)?;
    if range.contains(&finite_f32.0) {
        Ok(finite_f32)
    } else {
        Err(InvalidF32Error::NotInRange(value, range))
    }
}

/// Checks that a value is finite. Used for configuration values without a
/// natural range, such as the sigmoid constants.
pub fn ensure_finite(value: f32) -> Result<f32, InvalidF32Error> {
    FiniteF32::try_from(value).map(|v| v.0)
}

/// A value in range `0.0..=1.0`.
///
/// Typically, this is a threshold for the compressed loudness or the
/// tempo confidence.
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Ord, Eq)]
#[repr(transparent)]
pub struct UnitF32(FiniteF32);

impl UnitF32 {
    pub(crate) const VALID_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn raw(self) -> f32 {
        self.0 .0
    }
}

impl TryFrom<f32> for UnitF32 {
    type Error = InvalidF32Error;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        f32_is_finite_and_in_range(value, Self::VALID_RANGE).map(Self)
    }
}

impl Display for UnitF32 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// A tempo in beats per minute in range `(0.0..Infinity)`.
///
/// Zero is rejected: hosts report an unknown tempo as `0`, which must not be
/// mistaken for an actual (infinitely slow) tempo.
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Ord, Eq)]
#[repr(transparent)]
pub struct Bpm(FiniteF32);

impl Bpm {
    const VALID_RANGE: RangeInclusive<f32> = f32::MIN_POSITIVE..=f32::MAX;

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn raw(self) -> f32 {
        self.0 .0
    }

    /// Duration of one beat in seconds.
    #[must_use]
    pub fn period_secs(self) -> f32 {
        60.0 / self.raw()
    }
}

impl TryFrom<f32> for Bpm {
    type Error = InvalidF32Error;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        f32_is_finite_and_in_range(value, Self::VALID_RANGE).map(Self)
    }
}

impl Display for Bpm {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} BPM", self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_f32_finite() {
        assert_eq!(FiniteF32::try_from(0.0), Ok(FiniteF32(0.0)));
        assert_eq!(FiniteF32::try_from(-42.0), Ok(FiniteF32(-42.0)));
        assert_eq!(FiniteF32::try_from(f32::NAN), Err(InvalidF32Error::NAN));
        assert_eq!(
            FiniteF32::try_from(f32::NEG_INFINITY),
            Err(InvalidF32Error::Infinite)
        );
        assert_eq!(ensure_finite(15.0), Ok(15.0));
        assert_eq!(ensure_finite(f32::INFINITY), Err(InvalidF32Error::Infinite));
    }

    #[test]
    fn test_type_unit_f32() {
        assert_eq!(UnitF32::try_from(f32::NAN), Err(InvalidF32Error::NAN));
        assert_eq!(
            UnitF32::try_from(1.1),
            Err(InvalidF32Error::NotInRange(1.1, UnitF32::VALID_RANGE))
        );
        assert_eq!(
            UnitF32::try_from(-0.1),
            Err(InvalidF32Error::NotInRange(-0.1, UnitF32::VALID_RANGE))
        );
        check!(UnitF32::try_from(0.0).unwrap().raw() == 0.0);
        check!(UnitF32::try_from(0.75).unwrap().raw() == 0.75);
        check!(UnitF32::try_from(1.0).unwrap().raw() == 1.0);
    }

    #[test]
    fn test_type_bpm() {
        check!(Bpm::try_from(0.0).is_err());
        check!(Bpm::try_from(-120.0).is_err());
        check!(Bpm::try_from(f32::INFINITY).is_err());
        check!(Bpm::try_from(f32::NAN).is_err());

        let bpm = Bpm::try_from(120.0).unwrap();
        check!(bpm.raw() == 120.0);
        check!(bpm.period_secs() == 0.5);
    }
}
