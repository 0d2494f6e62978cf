pub mod cortical_column;
pub mod integrator;
pub mod model;
pub mod noise;
pub mod parameters;
pub mod snapshot;
pub mod stage_buffer;
