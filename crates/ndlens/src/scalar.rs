//! Scalar trait for tensor element types.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};

/// Trait for scalar types supported by ndlens.
///
/// Elements are plain `Copy` values; arithmetic kernels additionally rely on
/// the four basic operators. Integer and floating point types are supported.
pub trait Scalar:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Lossy conversion from `f64`, used by `arange`/`linspace` and `mean`.
    fn from_f64(value: f64) -> Self;

    /// Lossy conversion to `f64`.
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($($t:ty => $one:expr),* $(,)?) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn one() -> Self {
                    $one
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_scalar! {
    f32 => 1.0,
    f64 => 1.0,
    i8 => 1,
    i16 => 1,
    i32 => 1,
    i64 => 1,
    isize => 1,
    u8 => 1,
    u16 => 1,
    u32 => 1,
    u64 => 1,
    usize => 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_one() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(f64::one(), 1.0);
        assert_eq!(i32::zero(), 0);
        assert_eq!(u8::one(), 1);
    }

    #[test]
    fn test_f64_conversions() {
        assert_eq!(i64::from_f64(3.7), 3);
        assert_eq!(f32::from_f64(0.5), 0.5);
        assert_eq!(7u16.to_f64(), 7.0);
    }
}
