//! The annealer on a synthetic objective, with no image data at all.
//!
//! The engine is generic over the `Objective` trait; anything that can score
//! a `ParamState` can be annealed. Here the target is a known point in
//! parameter space, so you can watch the search close in on it.
//!
//! Run: cargo run --example custom_objective

use histmatch::{Annealer, Objective, ParamState, Result, Schedule};

/// Squared distance to a fixed target state.
struct Bowl {
    target: ParamState,
}

impl Objective for Bowl {
    fn energy(&self, state: &ParamState) -> Result<f64> {
        let d = |a: f64, b: f64| (a - b) * (a - b);
        Ok(d(state.gamma_red, self.target.gamma_red)
            + d(state.gamma_green, self.target.gamma_green)
            + d(state.gamma_blue, self.target.gamma_blue)
            + d(state.contrast, self.target.contrast))
    }
}

fn main() -> Result<()> {
    let target = ParamState {
        gamma_red: 1.35,
        gamma_green: 0.80,
        gamma_blue: 1.10,
        contrast: 6.50,
    };

    let mut annealer = Annealer::new(
        Bowl {
            target: target.clone(),
        },
        None,
    )?;
    annealer.set_seed(7);
    annealer.set_schedule(Schedule {
        tmax: 1.0,
        tmin: 1e-5,
        steps: 20_000,
        updates: 0,
    })?;

    let result = annealer.run(&mut ())?;

    println!("target   {}", target.descriptor());
    println!("found    {}", result.state.descriptor());
    println!("residual {:.6}", result.energy);
    Ok(())
}
