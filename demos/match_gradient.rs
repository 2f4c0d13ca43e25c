//! Tune a color formula that pulls a dark synthetic gradient toward a
//! brighter reference gradient.
//!
//! This is the full optimizer loop without any file I/O: build two pixel
//! buffers, anneal, and print the `rio color`-ready formula at the end.
//! Progress blocks go to stderr, the final command to stdout.
//!
//! Run: cargo run --example match_gradient

use histmatch::{Annealer, ConsoleReporter, HistogramObjective, ParamState, Schedule};
use ndarray::Array3;

/// A smooth diagonal gradient with per-channel offsets, like a sky-to-ground
/// photo that has been normalized to [0, 1].
fn gradient(height: usize, width: usize, floor: f32, span: f32) -> Array3<f32> {
    Array3::from_shape_fn((3, height, width), |(c, y, x)| {
        let t = (y + x) as f32 / (height + width - 2) as f32;
        let channel_tint = 1.0 - 0.08 * c as f32;
        (floor + span * t * channel_tint).clamp(0.0, 1.0)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Underexposed source, well-exposed reference.
    let source = gradient(64, 64, 0.05, 0.45);
    let reference = gradient(64, 64, 0.30, 0.60);

    let objective = HistogramObjective::new(source, reference)?;
    let initial_energy = {
        use histmatch::Objective;
        objective.energy(&ParamState::default())?
    };
    eprintln!("Annealing... (initial hist distance {initial_energy:.4})");

    let mut annealer = Annealer::new(objective, None)?;
    annealer.set_seed(42);
    annealer.set_schedule(Schedule {
        tmax: 100.0,
        tmin: 1e-3,
        steps: 5000,
        updates: 20,
    })?;

    let result = annealer.run(&mut ConsoleReporter)?;

    eprintln!(
        "Done: hist distance {:.4} -> {:.4}",
        initial_energy, result.energy
    );
    println!(
        "rio color -j4 source.tif /tmp/output.tif {}",
        result.state.descriptor()
    );
    Ok(())
}
