//! The module that contains all the available parameter initializers for digitnet.
//!
//! Every initializer draws from a generator that is passed in, so a seeded `StdRng` makes the
//! initialization of a whole network reproducible.

use std::ops::Range;

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::utils::Matrix;

#[derive(Debug, Clone, PartialEq)]
/// The enum that contains all of the possible Initializers.
pub enum Initializer {
    /// Every parameter is the same constant.
    Constant(f64),
    /// Uniformly distributed inside of the interval.
    UniformRandom(Range<f64>),
    /// Normally distributed with some mean and standard deviation.
    NormalRandom {
        /// The mean of the Normal distribution
        mean: f64,
        /// The standard deviation of the Normal distribution
        standard_deviation: f64,
    },
    /// He initialization, normally distributed with a mean of **0.0** and a standard deviation of
    /// **sqrt(2.0 / inputs_amount)**.
    HeNormal,
    /// He scaled, but uniformly distributed in `[-scale, scale]` where
    /// **scale = sqrt(2.0 / inputs_amount)**.
    HeUniform,
}

impl Initializer {
    fn he_scale(inputs_amount: usize) -> f64 {
        (2.0 / inputs_amount.max(1) as f64).sqrt()
    }

    /// Generates just one number for a layer that has **inputs_amount** inputs.
    pub fn initialize_0d<R: Rng + ?Sized>(&self, inputs_amount: usize, rng: &mut R) -> f64 {
        match self {
            Initializer::Constant(constant) => *constant,
            Initializer::UniformRandom(interval) => {
                if interval.start < interval.end {
                    Uniform::new(interval.start, interval.end).sample(rng)
                } else {
                    interval.start
                }
            }
            Initializer::NormalRandom {
                mean,
                standard_deviation,
            } => match Normal::new(*mean, *standard_deviation) {
                Ok(distribution) => distribution.sample(rng),
                // a non-finite or negative deviation collapses onto the mean
                Err(_) => *mean,
            },
            Initializer::HeNormal => {
                let scale = Self::he_scale(inputs_amount);
                match Normal::new(0.0, scale) {
                    Ok(distribution) => distribution.sample(rng),
                    Err(_) => 0.0,
                }
            }
            Initializer::HeUniform => {
                let scale = Self::he_scale(inputs_amount);
                Uniform::new_inclusive(-scale, scale).sample(rng)
            }
        }
    }

    /// Generates a Vec of **count** numbers.
    pub fn initialize_1d<R: Rng + ?Sized>(
        &self,
        count: usize,
        inputs_amount: usize,
        rng: &mut R,
    ) -> Vec<f64> {
        (0..count)
            .map(|_| self.initialize_0d(inputs_amount, rng))
            .collect()
    }

    /// Generates a `rows x cols` Matrix for a layer with **rows** inputs, filled row-major.
    pub fn initialize_2d<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Matrix {
        let (rows, cols) = shape;
        Matrix::from_fn(rows, cols, |_, _| self.initialize_0d(rows, rng))
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::HeNormal
    }
}
