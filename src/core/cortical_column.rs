//! A `CorticalColumn` owns the state of one column and advances it in time.
//!
//! The column keeps one `StageBuffer` per dynamic variable, the parameters it was built with,
//! the fixed integration step and its own noise stream. External code interacts with it in
//! two ways only:
//! - a stimulation protocol sets the external input between steps through `Stimulation`,
//! - a data-logging collaborator reads the current values through `readout`.
//!
//! Columns never share state, so independent columns can be advanced on separate threads.

use super::{
    integrator::Srk4,
    model::{ColumnModel, State, Variable},
    noise::{GaussianNoise, NoiseSource},
    parameters::{ColumnParameters, FreeParameters},
    snapshot::ColumnSnapshot,
    stage_buffer::StageBuffer,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// The capability handed to a stimulation protocol: it may change the external input of a
/// column between two steps, nothing else.
pub trait Stimulation {
    /// Sets the external drive in ms^-1. Takes effect with the next step.
    fn set_input(&mut self, input: f64);

    /// The external drive currently applied.
    fn input(&self) -> f64;
}

/// Current values of all variables after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnReadout {
    values: State,
}

impl ColumnReadout {
    #[inline]
    pub fn get(&self, variable: Variable) -> f64 {
        self.values[variable.index()]
    }

    /// `(name, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Variable::ALL
            .iter()
            .map(move |&variable| (variable.name(), self.get(variable)))
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.iter().collect()
    }

    pub fn values(&self) -> &State {
        &self.values
    }

    /// False once the integration has blown up.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|value| value.is_finite())
    }
}

/// One cortical column with its parameters, state and noise stream.
#[derive(Debug, Clone)]
pub struct CorticalColumn<R: NoiseSource = GaussianNoise> {
    parameters: ColumnParameters,
    integrator: Srk4,
    variables: [StageBuffer; Variable::COUNT],

    /// External drive onto the pyramidal population, owned by the stimulation protocol.
    input: f64,

    noise: R,

    /// Number of completed steps.
    iteration_num: u64,
}

impl CorticalColumn<GaussianNoise> {
    /// Creates a column from the three regime-selecting parameters (`sigma_p`, `g_KNa`,
    /// `dphi`) with all other constants at their defaults.
    pub fn new(free: impl Into<FreeParameters>, dt: f64, seed: u64) -> Self {
        Self::from_parameters(ColumnParameters::with_free(free.into()), dt, seed)
    }

    /// Creates a column from a full parameter set.
    pub fn from_parameters(parameters: ColumnParameters, dt: f64, seed: u64) -> Self {
        Self::with_noise(parameters, dt, GaussianNoise::seeded(seed))
    }
}

impl<R: NoiseSource> CorticalColumn<R> {
    /// Creates a column that draws its noise from `noise`.
    pub fn with_noise(parameters: ColumnParameters, dt: f64, noise: R) -> Self {
        log::debug!(
            "cortical column: sigma_p = {}, g_KNa = {}, dphi = {}, dt = {} ms",
            parameters.sigma_p,
            parameters.g_kna,
            parameters.dphi,
            dt
        );

        let rest = ColumnModel::rest_state(&parameters);

        Self {
            variables: rest.map(StageBuffer::new),
            parameters,
            integrator: Srk4::new(dt),
            input: 0.0,
            noise,
            iteration_num: 0,
        }
    }

    /// Rebuilds a column from a snapshot. The noise stream is not part of a snapshot, the
    /// restored column continues with `noise`.
    pub fn restore(snapshot: ColumnSnapshot, noise: R) -> Self {
        log::debug!(
            "restoring cortical column at iteration {}",
            snapshot.iteration_num
        );

        Self {
            variables: snapshot.state.map(StageBuffer::new),
            integrator: Srk4::new(snapshot.dt),
            parameters: snapshot.parameters,
            input: snapshot.input,
            noise,
            iteration_num: snapshot.iteration_num,
        }
    }

    /// Advances the column by one step of `dt`.
    #[inline]
    pub fn iterate_ode(&mut self) {
        let model = ColumnModel::new(&self.parameters, self.input);
        self.integrator
            .step(&model, &mut self.variables, &mut self.noise);
        self.iteration_num += 1;
    }

    /// Advances the column by `steps` steps with the current input.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.iterate_ode();
        }
    }

    /// Current value of `variable`.
    #[inline]
    pub fn get(&self, variable: Variable) -> f64 {
        self.variables[variable.index()].current()
    }

    pub fn readout(&self) -> ColumnReadout {
        ColumnReadout {
            values: self.state(),
        }
    }

    fn state(&self) -> State {
        std::array::from_fn(|i| self.variables[i].current())
    }

    /// Captures parameters, step size, input and current values.
    pub fn snapshot(&self) -> ColumnSnapshot {
        ColumnSnapshot {
            parameters: self.parameters.clone(),
            dt: self.integrator.dt(),
            input: self.input,
            iteration_num: self.iteration_num,
            state: self.state(),
        }
    }

    /// Puts every variable back to its rest value. Input and noise stream are kept.
    pub fn reset(&mut self) {
        let rest = ColumnModel::rest_state(&self.parameters);
        for (buffer, value) in self.variables.iter_mut().zip(rest) {
            buffer.reset(value);
        }
        self.iteration_num = 0;
    }

    pub fn parameters(&self) -> &ColumnParameters {
        &self.parameters
    }

    /// Integration step in ms.
    pub fn dt(&self) -> f64 {
        self.integrator.dt()
    }

    /// Simulated time in ms.
    pub fn time(&self) -> f64 {
        self.iteration_num as f64 * self.integrator.dt()
    }

    pub fn iteration_num(&self) -> u64 {
        self.iteration_num
    }

    pub fn noise(&self) -> &R {
        &self.noise
    }
}

impl<R: NoiseSource> Stimulation for CorticalColumn<R> {
    fn set_input(&mut self, input: f64) {
        if input != self.input {
            log::trace!(
                "input {} -> {} at t = {} ms",
                self.input,
                input,
                self.time()
            );
        }
        self.input = input;
    }

    fn input(&self) -> f64 {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::noise::SequenceNoise;

    fn quiet_column() -> CorticalColumn<SequenceNoise> {
        let parameters = ColumnParameters::with_free([4.0, 1.33, 0.0].into());
        CorticalColumn::with_noise(parameters, 0.1, SequenceNoise::silent())
    }

    #[test]
    fn starts_at_rest() {
        let column = CorticalColumn::new([4.0, 1.33, 2.0], 0.1, 42);
        let readout = column.readout();

        assert_eq!(readout.get(Variable::Vp), -66.0);
        assert_eq!(readout.get(Variable::Vi), -64.0);
        assert_eq!(readout.get(Variable::Na), 9.5);
        assert_eq!(readout.get(Variable::s_ep), 0.0);
        assert_eq!(readout.get(Variable::x_gi), 0.0);
        assert_eq!(column.iteration_num(), 0);
    }

    #[test]
    fn readout_is_named() {
        let column = quiet_column();
        let map = column.readout().to_map();

        assert_eq!(map.len(), Variable::COUNT);
        assert_eq!(map["Vp"], -66.0);
        assert_eq!(map["Na"], 9.5);
    }

    #[test]
    fn one_noise_draw_per_step() {
        let mut column = quiet_column();
        column.run(25);

        assert_eq!(column.noise().draws(), 25);
        assert_eq!(column.iteration_num(), 25);
        assert!((column.time() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn input_depolarizes_the_pyramidal_population() {
        let mut resting = quiet_column();
        let mut driven = quiet_column();
        driven.set_input(2.0);
        assert_eq!(driven.input(), 2.0);

        resting.run(200);
        driven.run(200);

        assert!(driven.get(Variable::s_ep) > resting.get(Variable::s_ep));
        assert!(driven.get(Variable::Vp) > resting.get(Variable::Vp));
    }

    #[test]
    fn reset_returns_to_rest() {
        let mut column = quiet_column();
        column.set_input(1.0);
        column.run(50);
        column.reset();

        assert_eq!(column.get(Variable::Vp), -66.0);
        assert_eq!(column.get(Variable::x_ep), 0.0);
        assert_eq!(column.iteration_num(), 0);
        assert_eq!(column.input(), 1.0);
    }

    #[test]
    fn snapshot_captures_current_values() {
        let mut column = quiet_column();
        column.set_input(0.5);
        column.run(10);

        let snapshot = column.snapshot();
        assert_eq!(snapshot.iteration_num, 10);
        assert_eq!(snapshot.input, 0.5);
        assert_eq!(snapshot.dt, 0.1);
        assert_eq!(&snapshot.state, column.readout().values());

        let restored = CorticalColumn::restore(snapshot, SequenceNoise::silent());
        assert_eq!(restored.readout(), column.readout());
        assert_eq!(restored.input(), 0.5);
    }
}
