//! Fixed-step stochastic Runge-Kutta integrator (SRK4) for systems with additive noise on a
//! single variable.
//!
//! One step:
//! 1. Draw one standard-normal sample `xi` from the noise source.
//! 2. For the stages `i = 0..4`, evaluate the drift at slot `i` of every buffer and write
//!    `y_{i+1} = y_0 + A[i] * dt * f(y_i)` into slot `i + 1`.
//! 3. Combine the five slots with the weights `{-3, 2, 4, 2, 1} / 6`. The noise-bearing
//!    variable additionally receives `amplitude * sqrt(dt) * xi`.
//!
//! The stochastic increment is added once, after the deterministic combination, so that its
//! variance per step is exactly `amplitude^2 * dt` (Euler-Maruyama scaling). The noise is
//! never fed into the intermediate stages.

use super::{noise::NoiseSource, stage_buffer::StageBuffer};

/// Step fractions at which the stages are evaluated.
pub const A: [f64; 4] = [0.5, 0.5, 1.0, 1.0];

/// The variable that carries additive white noise, and the noise amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseChannel {
    pub index: usize,
    pub amplitude: f64,
}

/// A system of `N` stochastic differential equations `dy = f(y) dt + b dW`, where `b` is
/// non-zero for at most one variable.
pub trait StochasticSystem<const N: usize> {
    /// The deterministic time derivative at `point`. Must not depend on anything but
    /// `point` and the system's own (immutable) configuration.
    fn drift(&self, point: &[f64; N]) -> [f64; N];

    /// The variable receiving additive noise, if any.
    fn noise_channel(&self) -> Option<NoiseChannel>;
}

/// The SRK4 integrator with its fixed step size in ms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srk4 {
    dt: f64,
}

impl Srk4 {
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advances `buffers` by one step of size `dt`.
    ///
    /// Exactly one sample is drawn per step, also when the system has no noise channel or a
    /// zero amplitude, so that the stream stays aligned with the step count.
    pub fn step<S, R, const N: usize>(
        &self,
        system: &S,
        buffers: &mut [StageBuffer; N],
        noise: &mut R,
    ) where
        S: StochasticSystem<N> + ?Sized,
        R: NoiseSource + ?Sized,
    {
        let xi = noise.next_normal();

        for (stage, &fraction) in A.iter().enumerate() {
            let point: [f64; N] = std::array::from_fn(|i| buffers[i].slot(stage));
            let derivative = system.drift(&point);

            for (buffer, rate) in buffers.iter_mut().zip(derivative) {
                let value = buffer.current() + fraction * self.dt * rate;
                buffer.set_stage(stage + 1, value);
            }
        }

        let increment = system
            .noise_channel()
            .map(|channel| (channel.index, channel.amplitude * self.dt.sqrt() * xi));

        for (index, buffer) in buffers.iter_mut().enumerate() {
            match increment {
                Some((channel, dw)) if channel == index => buffer.commit(dw),
                _ => buffer.commit(0.0),
            }
        }
    }
}
