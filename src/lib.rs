//! Neural mass model of a single cortical column: a pyramidal and an interneuron population
//! coupled through conductance-based synapses, with a sodium-dependent potassium current
//! that produces slow oscillations and K-complexes.
//!
//! The stochastic differential equations are advanced with a fixed-step stochastic
//! Runge-Kutta scheme (see [`crate::core::integrator`]).

pub mod core;

pub use crate::core::{
    cortical_column::{ColumnReadout, CorticalColumn, Stimulation},
    integrator::{NoiseChannel, Srk4, StochasticSystem},
    model::{ColumnModel, Variable},
    noise::{GaussianNoise, NoiseSource, SequenceNoise},
    parameters::{ColumnParameters, FreeParameters},
    snapshot::ColumnSnapshot,
    stage_buffer::StageBuffer,
};
