//! The simulated-annealing engine.
//!
//! [`Annealer`] is a self-contained state machine: it owns the current and
//! best parameter states, the cooling [`Schedule`], and its own seedable RNG.
//! It is generic over [`Objective`], so the search loop never touches image
//! data directly and can be exercised with synthetic objectives.
//!
//! The move kernel is deliberately tiny: pick one of the four parameters
//! uniformly at random and multiply it by 0.9 or 1.1. Acceptance is the
//! standard Metropolis criterion under an exponentially interpolated
//! temperature.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg as PcgRng;

use crate::params::{Param, ParamState};
use crate::report::{ProgressSink, Report};
use crate::{Error, Result};

/// Cooling schedule and reporting cadence for one run.
///
/// Set once before the run starts; read-only during the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    /// Starting temperature.
    pub tmax: f64,
    /// Ending temperature.
    pub tmin: f64,
    /// Total iteration budget.
    pub steps: usize,
    /// Number of progress reports to emit across the run, evenly spaced and
    /// including the first and final step. 0 disables reporting.
    pub updates: usize,
}

impl Default for Schedule {
    /// The original tool's defaults: 5000 steps, a report every 20 steps.
    fn default() -> Self {
        Schedule {
            tmax: 100.0,
            tmin: 1e-3,
            steps: 5000,
            updates: 250,
        }
    }
}

impl Schedule {
    fn validate(&self) -> Result<()> {
        if !(self.tmax.is_finite() && self.tmin.is_finite()) {
            return Err(Error::Domain("schedule temperatures must be finite"));
        }
        if self.tmin <= 0.0 || self.tmax < self.tmin {
            return Err(Error::Domain(
                "schedule requires 0 < tmin <= tmax",
            ));
        }
        Ok(())
    }

    /// Temperature at `step`, exponentially interpolated so that step 0 sits
    /// at `tmax` and the final step at `tmin`.
    fn temperature(&self, step: usize) -> f64 {
        if self.steps <= 1 {
            return self.tmax;
        }
        let frac = step as f64 / (self.steps - 1) as f64;
        self.tmax * (self.tmin / self.tmax).powf(frac)
    }

    /// Step indices at which to report: `updates` evenly spaced checkpoints
    /// including step 0 and the final step (deduplicated when `updates`
    /// exceeds `steps`).
    fn checkpoints(&self) -> Vec<usize> {
        if self.steps == 0 || self.updates == 0 {
            return Vec::new();
        }
        if self.updates == 1 {
            return vec![0];
        }
        let mut marks = Vec::with_capacity(self.updates);
        for i in 0..self.updates {
            let step = i * (self.steps - 1) / (self.updates - 1);
            if marks.last() != Some(&step) {
                marks.push(step);
            }
        }
        marks
    }
}

/// A scalar objective over the parameter space; lower is better.
///
/// Implementations must be pure per state: the annealer may evaluate
/// arbitrarily many candidates in one run and assumes repeat evaluations of
/// the same state agree.
pub trait Objective {
    /// Energy of `state`. A returned `Err` terminates the run; a returned
    /// non-finite value merely discards the proposal that produced it.
    fn energy(&self, state: &ParamState) -> Result<f64>;
}

/// Best state found by a run, with its energy.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub state: ParamState,
    pub energy: f64,
}

/// The annealing state machine.
///
/// Each instance owns its own randomness: seed it with [`set_seed`] for
/// reproducible runs, otherwise it draws a fresh entropy seed, so independent
/// runs never share state.
///
/// [`set_seed`]: Annealer::set_seed
pub struct Annealer<O> {
    objective: O,
    state: ParamState,
    schedule: Schedule,
    rng: PcgRng,
}

impl<O: Objective> Annealer<O> {
    /// Build an engine around an objective, starting from `initial` (or the
    /// stock defaults).
    ///
    /// # Errors
    ///
    /// [`Error::NonFiniteParameter`] if the initial state fails validation;
    /// the run must not start from a broken state.
    pub fn new(objective: O, initial: Option<ParamState>) -> Result<Self> {
        let state = initial.unwrap_or_default();
        state.validate()?;
        Ok(Annealer {
            objective,
            state,
            schedule: Schedule::default(),
            rng: PcgRng::from_entropy(),
        })
    }

    /// Replace the cooling schedule.
    pub fn set_schedule(&mut self, schedule: Schedule) -> Result<()> {
        schedule.validate()?;
        self.schedule = schedule;
        Ok(())
    }

    /// Reseed the move-proposal RNG for a reproducible run.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = PcgRng::seed_from_u64(seed);
    }

    /// The current parameter state.
    pub fn state(&self) -> &ParamState {
        &self.state
    }

    /// The schedule the next run will use.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The wrapped objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Execute the full annealing run and return the best state seen.
    ///
    /// With `steps == 0` no move is proposed and the result is the initial
    /// state with its energy. Checkpoint reports go to `sink`; pass
    /// `&mut ()` to run silently.
    ///
    /// # Errors
    ///
    /// Propagates objective validation errors immediately, and fails with
    /// [`Error::NonFiniteParameter`] if a move drives a parameter to NaN or
    /// infinity. A *non-finite energy* is not an error: that single proposal
    /// is discarded as if it scored worse than any finite energy.
    pub fn run(&mut self, sink: &mut dyn ProgressSink) -> Result<SearchResult> {
        let schedule = self.schedule;
        let marks = schedule.checkpoints();
        let mut next_mark = 0;

        let mut energy = self.objective.energy(&self.state)?;
        if !energy.is_finite() {
            return Err(Error::Domain("initial state has non-finite energy"));
        }
        let mut best_state = self.state.clone();
        let mut best_energy = energy;

        let start = Instant::now();
        let mut trials = 0u64;
        let mut accepts = 0u64;
        let mut improves = 0u64;

        for step in 0..schedule.steps {
            let temperature = schedule.temperature(step);

            if next_mark < marks.len() && marks[next_mark] == step {
                let elapsed = start.elapsed();
                let remaining = (step > 0).then(|| {
                    elapsed.div_f64(step as f64).mul_f64((schedule.steps - step) as f64)
                });
                sink.report(&Report {
                    step,
                    total_steps: schedule.steps,
                    temperature,
                    energy,
                    state: &self.state,
                    acceptance: (trials > 0).then(|| accepts as f64 / trials as f64),
                    improvement: (trials > 0).then(|| improves as f64 / trials as f64),
                    best_state: &best_state,
                    best_energy,
                    elapsed,
                    remaining,
                });
                next_mark += 1;
                trials = 0;
                accepts = 0;
                improves = 0;
            }

            // Propose: one parameter, nudged up or down by 10%.
            let param = Param::ALL[self.rng.gen_range(0..Param::ALL.len())];
            let factor = if self.rng.gen_bool(0.5) { 1.1 } else { 0.9 };
            let old = self.state.get(param);
            let proposed = old * factor;
            if !proposed.is_finite() {
                return Err(Error::NonFiniteParameter(param.name(), proposed));
            }
            self.state.set(param, proposed);
            trials += 1;

            let candidate = self.objective.energy(&self.state)?;
            if !candidate.is_finite() {
                // Degenerate proposal (empty histogram, numeric blow-up):
                // discard this one move and keep annealing.
                self.state.set(param, old);
                continue;
            }

            let delta = candidate - energy;
            if delta <= 0.0 || self.rng.gen::<f64>() < (-delta / temperature).exp() {
                energy = candidate;
                accepts += 1;
                if candidate < best_energy {
                    best_energy = candidate;
                    best_state = self.state.clone();
                    improves += 1;
                    log::debug!(
                        "step {step}: new best {best_energy:.4} via {}",
                        best_state.descriptor()
                    );
                }
            } else {
                self.state.set(param, old);
            }
        }

        Ok(SearchResult {
            state: best_state,
            energy: best_energy,
        })
    }
}
