//! Checkpoints of a column.
//!
//! A snapshot stores everything needed to continue a simulation except the noise stream:
//! the parameters, the integration step, the external input, the step counter and the
//! current value of every variable. Snapshots are written with `bincode`.

use super::{model::State, parameters::ColumnParameters};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub parameters: ColumnParameters,

    /// Integration step in ms.
    pub dt: f64,

    pub input: f64,

    pub iteration_num: u64,

    /// Current values in `Variable` order.
    pub state: State,
}

impl ColumnSnapshot {
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self).context("failed to encode column snapshot")
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        bincode::deserialize_from(reader).context("failed to decode column snapshot")
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create snapshot file {}", path.display()))?;

        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("failed to write snapshot file {}", path.display()))?;

        log::info!(
            "saved column snapshot at iteration {} to {}",
            self.iteration_num,
            path.display()
        );
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open snapshot file {}", path.display()))?;

        let snapshot = Self::load(BufReader::new(file))
            .with_context(|| format!("invalid snapshot file {}", path.display()))?;

        log::info!(
            "loaded column snapshot at iteration {} from {}",
            snapshot.iteration_num,
            path.display()
        );
        Ok(snapshot)
    }
}
