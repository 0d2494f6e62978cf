//! Sources of standard-normal samples that drive the stochastic term of the column.
//!
//! The integrator only asks for "the next N(0, 1) sample", so the true generator can be
//! swapped for a fixed sequence when the deterministic parts of a step are tested.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Produces independent, identically distributed standard-normal samples.
pub trait NoiseSource {
    /// Returns the next sample of the stream.
    fn next_normal(&mut self) -> f64;
}

/// Gaussian white noise from a seeded pseudo-random number generator.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    /// Seeded generator, so that trajectories are reproducible for a fixed seed.
    rand: StdRng,
}

impl GaussianNoise {
    /// Creates a reproducible stream from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rand: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a stream seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rand: StdRng::from_os_rng(),
        }
    }
}

impl NoiseSource for GaussianNoise {
    #[inline]
    fn next_normal(&mut self) -> f64 {
        self.rand.sample(StandardNormal)
    }
}

/// Replays a fixed list of samples, starting over once the list is exhausted.
/// An empty list behaves like a stream of zeros.
#[derive(Debug, Clone, Default)]
pub struct SequenceNoise {
    samples: Vec<f64>,
    cursor: usize,
}

impl SequenceNoise {
    /// A stream replaying `samples` in order.
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }

    /// A stream that only ever yields zero.
    pub fn silent() -> Self {
        Self::default()
    }

    /// How many samples have been handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl NoiseSource for SequenceNoise {
    fn next_normal(&mut self) -> f64 {
        let sample = if self.samples.is_empty() {
            0.0
        } else {
            self.samples[self.cursor % self.samples.len()]
        };
        self.cursor += 1;
        sample
    }
}
