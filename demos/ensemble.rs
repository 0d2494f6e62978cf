//! Simulates an ensemble of independent columns, one per thread, and reports how often the
//! pyramidal population enters the up state.
//!
//! Each column owns its own noise stream, so no synchronisation is needed between them.

use cortical_column::{CorticalColumn, Variable};
use std::thread;

/// Pyramidal voltage above which a sample counts as up state, in mV.
const UP_STATE_THRESHOLD: f64 = -64.0;

fn main() {
    let dt = 0.1;
    let steps = 100_000;
    let sigma_ps = [4.0, 4.3, 4.6, 4.9, 5.2, 5.5];

    println!(
        "Running {} columns for {} ms each...",
        sigma_ps.len(),
        steps as f64 * dt
    );

    let handles: Vec<_> = sigma_ps
        .iter()
        .enumerate()
        .map(|(seed, &sigma_p)| {
            thread::spawn(move || {
                let mut column = CorticalColumn::new([sigma_p, 1.33, 2.0], dt, seed as u64);
                let mut up_samples = 0usize;

                for _ in 0..steps {
                    column.iterate_ode();
                    if column.get(Variable::Vp) > UP_STATE_THRESHOLD {
                        up_samples += 1;
                    }
                }

                (sigma_p, up_samples, column.readout())
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok((sigma_p, up_samples, readout)) => println!(
                "sigma_p = {:.1}: up state {:.2}% of the time, final Vp = {:.3} mV, Na = {:.3} mM",
                sigma_p,
                100.0 * up_samples as f64 / steps as f64,
                readout.get(Variable::Vp),
                readout.get(Variable::Na)
            ),
            Err(_) => eprintln!("A column thread panicked."),
        }
    }
}
