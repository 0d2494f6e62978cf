//! Evokes K-complexes in a single noisy column with short stimulation pulses.
//!
//! The column runs in the N2-like default regime. Every few seconds a rectangular pulse is
//! applied to the pyramidal input. The membrane voltages and the sodium concentration are
//! printed once per millisecond, so the output can be piped into any plotting tool.

use anyhow::Result;
use cortical_column::{ColumnSnapshot, CorticalColumn, FreeParameters, Stimulation, Variable};

/// A train of rectangular input pulses.
struct PulseProtocol {
    /// Time of the first pulse in ms.
    onset: f64,
    /// Time between pulse onsets in ms.
    interval: f64,
    /// Pulse length in ms.
    duration: f64,
    /// Input during a pulse in ms^-1.
    strength: f64,
}

impl PulseProtocol {
    /// Sets the input of `target` for simulated time `time`.
    fn apply<S: Stimulation>(&self, time: f64, target: &mut S) {
        let since_onset = time - self.onset;
        let active = since_onset >= 0.0 && since_onset % self.interval < self.duration;

        target.set_input(if active { self.strength } else { 0.0 });
    }
}

fn main() -> Result<()> {
    let dt = 0.1;
    let duration_ms = 30_000.0;
    let steps_per_sample = ((1.0 / dt) as usize).max(1);

    let free = FreeParameters::try_from(&[4.0, 1.33, 2.0][..])?;
    let mut column = CorticalColumn::new(free, dt, 42);
    column.parameters().validate()?;

    let protocol = PulseProtocol {
        onset: 5_000.0,
        interval: 5_000.0,
        duration: 100.0,
        strength: 1.0,
    };

    println!("t_ms\tVp\tVi\tNa\tinput");

    let steps = (duration_ms / dt) as usize;

    for step in 0..steps {
        protocol.apply(column.time(), &mut column);
        column.iterate_ode();

        if step % steps_per_sample == 0 {
            println!(
                "{:.1}\t{:.4}\t{:.4}\t{:.4}\t{:.2}",
                column.time(),
                column.get(Variable::Vp),
                column.get(Variable::Vi),
                column.get(Variable::Na),
                column.input()
            );
        }
    }

    let readout = column.readout();
    if !readout.is_finite() {
        anyhow::bail!("integration diverged: {:?}", readout.to_map());
    }

    let path = std::env::temp_dir().join("k_complex_snapshot.bin");
    column.snapshot().save_to_file(&path)?;

    let restored = ColumnSnapshot::load_from_file(&path)?;
    eprintln!(
        "Snapshot of iteration {} written to {}",
        restored.iteration_num,
        path.display()
    );

    Ok(())
}
