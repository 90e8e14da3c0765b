//! Random tensor construction.
//!
//! There is no global generator: randomness comes from an explicit
//! [`TensorRng`] (or any [`rand::Rng`]) passed to the creation helpers, so
//! two generators seeded alike produce identical tensors.

use rand::distr::StandardUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{Result, TensorError};
use crate::lens::LensMut;
use crate::scalar::Scalar;
use crate::strides::shape_size;
use crate::tensor::Tensor;

/// Element types that can be sampled from the unit interval.
pub trait RandomUniform: Scalar {
    /// Sample from the uniform distribution on `[0, 1)`.
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self;
}

/// Element types that can be sampled from a standard normal distribution.
pub trait RandomNormal: Scalar {
    fn sample_normal<R: Rng>(rng: &mut R) -> Self;
}

macro_rules! impl_random {
    ($($t:ty),*) => {
        $(
            impl RandomUniform for $t {
                fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
                    rng.sample(StandardUniform)
                }
            }

            impl RandomNormal for $t {
                fn sample_normal<R: Rng>(rng: &mut R) -> Self {
                    rng.sample(StandardNormal)
                }
            }
        )*
    };
}

impl_random!(f32, f64);

impl<T: RandomUniform> Tensor<T> {
    /// Uniform values in `[0, 1)` drawn from `rng`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndlens::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let t1: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// let t2: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        let data = (0..shape_size(shape)).map(|_| T::sample_uniform(rng)).collect();
        Self::from_parts(data, shape.to_vec())
    }
}

impl<T: RandomNormal> Tensor<T> {
    /// Standard normal values drawn from `rng`.
    pub fn randn_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        let data = (0..shape_size(shape)).map(|_| T::sample_normal(rng)).collect();
        Self::from_parts(data, shape.to_vec())
    }
}

/// A reseedable generator for tensor creation.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, TensorRng};
///
/// let mut rng = TensorRng::seed_from_u64(7);
/// let a = rng.uniform::<f64>(&[3], -1.0, 1.0).unwrap();
/// assert!(a.values().all(|x| (-1.0..1.0).contains(&x)));
///
/// rng.reseed(7);
/// assert_eq!(rng.uniform::<f64>(&[3], -1.0, 1.0).unwrap(), a);
/// ```
#[derive(Debug, Clone)]
pub struct TensorRng {
    seed: u64,
    rng: StdRng,
}

impl TensorRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A generator with a seed taken from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::seed_from_u64(rand::rng().random())
    }

    /// The seed this generator was last (re)seeded with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        log::debug!("TensorRng reseeded with {}", seed);
        *self = Self::seed_from_u64(seed);
    }

    /// The underlying generator, for sampling outside this module.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Values uniformly distributed in `[low, high)`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `low <= high` and both are finite.
    pub fn uniform<T: RandomUniform>(
        &mut self,
        shape: &[usize],
        low: T,
        high: T,
    ) -> Result<Tensor<T>> {
        let (lo, hi) = (low.to_f64(), high.to_f64());
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(TensorError::InvalidArgument {
                op: "uniform",
                reason: "bounds must be finite with low <= high",
            });
        }
        let span = high - low;
        let mut out = Tensor::random_with_rng(shape, &mut self.rng);
        out.apply_scalar_(low, |u, low| low + u * span);
        Ok(out)
    }

    /// Normally distributed values with the given mean and standard
    /// deviation.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative or non-finite `std`.
    pub fn normal<T: RandomNormal>(
        &mut self,
        shape: &[usize],
        mean: T,
        std: T,
    ) -> Result<Tensor<T>> {
        let sigma = std.to_f64();
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(TensorError::InvalidArgument {
                op: "normal",
                reason: "standard deviation must be finite and non-negative",
            });
        }
        let mut out = Tensor::randn_with_rng(shape, &mut self.rng);
        out.apply_scalar_(mean, |z, mean| mean + z * std);
        Ok(out)
    }
}

impl Default for TensorRng {
    fn default() -> Self {
        Self::seed_from_u64(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::Lens;

    #[test]
    fn test_random_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let t: Tensor<f32> = Tensor::random_with_rng(&[4, 5], &mut rng);
        assert_eq!(t.shape(), &[4, 5]);
        for v in t.values() {
            assert!((0.0..1.0).contains(&v), "value {} not in [0, 1)", v);
        }
    }

    #[test]
    fn test_random_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(12345);
        let t1: Tensor<f64> = Tensor::random_with_rng(&[3, 4], &mut rng1);
        let mut rng2 = StdRng::seed_from_u64(12345);
        let t2: Tensor<f64> = Tensor::random_with_rng(&[3, 4], &mut rng2);
        assert_eq!(t1.data(), t2.data());
    }

    #[test]
    fn test_random_scalar_and_empty() {
        let mut rng = TensorRng::seed_from_u64(3);
        let s = rng.uniform::<f64>(&[], 0.0, 1.0).unwrap();
        assert_eq!(s.size(), 1);
        let e = rng.normal::<f32>(&[2, 0], 0.0, 1.0).unwrap();
        assert_eq!(e.size(), 0);
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = TensorRng::seed_from_u64(99);
        let t = rng.uniform(&[1000], 5.0f64, 7.0).unwrap();
        assert!(t.values().all(|x| (5.0..7.0).contains(&x)));
        assert!(matches!(
            rng.uniform(&[2], 1.0f64, 0.0),
            Err(TensorError::InvalidArgument { op: "uniform", .. })
        ));
        assert!(rng.uniform(&[2], 0.0f64, f64::INFINITY).is_err());
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = TensorRng::seed_from_u64(2024);
        let t = rng.normal(&[4000], 10.0f64, 2.0).unwrap();
        let mean = t.mean().unwrap();
        assert!((mean - 10.0).abs() < 0.2, "mean {} too far from 10", mean);
        let var = t.values().map(|x| (x - mean).powi(2)).sum::<f64>() / 4000.0;
        assert!(var > 3.0 && var < 5.0, "variance {} too far from 4", var);
        assert!(rng.normal(&[2], 0.0f64, -1.0).is_err());
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let mut rng = TensorRng::seed_from_u64(5);
        let first = rng.normal::<f64>(&[6], 0.0, 1.0).unwrap();
        let second = rng.normal::<f64>(&[6], 0.0, 1.0).unwrap();
        assert_ne!(first, second);
        rng.reseed(5);
        assert_eq!(rng.seed(), 5);
        assert_eq!(rng.normal::<f64>(&[6], 0.0, 1.0).unwrap(), first);
    }

    #[test]
    fn test_entropy_seed_is_recorded() {
        let a = TensorRng::from_entropy();
        let mut b = TensorRng::seed_from_u64(a.seed());
        let mut a = a;
        assert_eq!(
            a.uniform::<f64>(&[4], 0.0, 1.0).unwrap(),
            b.uniform::<f64>(&[4], 0.0, 1.0).unwrap()
        );
    }
}
