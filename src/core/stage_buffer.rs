//! A `StageBuffer` holds one dynamic variable of the column together with its four
//! intermediate Runge-Kutta stage values.
//!
//! Layout: `[current, y1, y2, y3, y4]`.
//! - `current` is the physical value carried from one step to the next.
//! - `y1..y4` are the stage values `current + A[i] * dt * f(y_i)` written during a step.
//!
//! After `commit` the stage slots still hold the values of the finished step. They are stale
//! and are only meaningful again once the next step has overwritten them.

/// Fixed combination weights applied to `[current, y1, y2, y3, y4]`.
pub const WEIGHTS: [f64; 5] = [-3.0, 2.0, 4.0, 2.0, 1.0];

/// Number of slots in a stage buffer (the current value plus four stages).
pub const SLOTS: usize = 5;

/// The current value of a variable plus its four stage values.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StageBuffer {
    slots: [f64; SLOTS],
}

impl StageBuffer {
    /// Creates a buffer holding `value` with cleared stage slots.
    #[inline]
    pub fn new(value: f64) -> Self {
        Self {
            slots: [value, 0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Creates a buffer from all five slots. Mainly useful for testing the combination.
    #[inline]
    pub fn from_slots(slots: [f64; SLOTS]) -> Self {
        Self { slots }
    }

    /// The value carried between steps.
    #[inline]
    pub fn current(&self) -> f64 {
        self.slots[0]
    }

    /// Returns slot `index`, where 0 is the current value and 1..=4 are the stage values.
    #[inline]
    pub fn slot(&self, index: usize) -> f64 {
        self.slots[index]
    }

    /// Writes the stage value of `stage` (1..=4).
    #[inline]
    pub fn set_stage(&mut self, stage: usize, value: f64) {
        debug_assert!((1..SLOTS).contains(&stage), "stage {} out of range", stage);
        self.slots[stage] = value;
    }

    /// Weighted combination `(-3*y0 + 2*y1 + 4*y2 + 2*y3 + y4) / 6`.
    ///
    /// Because every stage value already contains `y0`, this is the classical RK4 update
    /// `y0 + (k1 + 2*k2 + 2*k3 + k4) / 6` written over stage values instead of increments.
    #[inline]
    pub fn combined(&self) -> f64 {
        self.slots
            .iter()
            .zip(WEIGHTS.iter())
            .map(|(value, weight)| value * weight)
            .sum::<f64>()
            / 6.0
    }

    /// Replaces the current value with the combined stage values plus `extra`
    /// (the stochastic increment on the noise channel, zero elsewhere).
    #[inline]
    pub fn commit(&mut self, extra: f64) {
        self.slots[0] = self.combined() + extra;
    }

    /// Puts the buffer back to `value` and clears every stage slot.
    #[inline]
    pub fn reset(&mut self, value: f64) {
        *self = Self::new(value);
    }
}
