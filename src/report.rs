//! Progress reporting seam.
//!
//! The annealer pushes a [`Report`] to a [`ProgressSink`] at each checkpoint;
//! sinks only format output and return nothing to the engine. `()` is the
//! silent sink, [`ConsoleReporter`] renders the original tool's block format.

use std::time::Duration;

use crate::params::ParamState;

/// Everything the engine knows at a reporting checkpoint.
#[derive(Debug)]
pub struct Report<'a> {
    /// Current step index, `0..total_steps`.
    pub step: usize,
    /// Total step budget for the run.
    pub total_steps: usize,
    /// Temperature at this step.
    pub temperature: f64,
    /// Energy of the current state.
    pub energy: f64,
    /// Current state (the walker, not necessarily the best).
    pub state: &'a ParamState,
    /// Fraction of proposals accepted since the previous checkpoint.
    /// `None` before any move has been proposed.
    pub acceptance: Option<f64>,
    /// Fraction of proposals that set a new best energy since the previous
    /// checkpoint. `None` before any move has been proposed.
    pub improvement: Option<f64>,
    /// Best state seen so far.
    pub best_state: &'a ParamState,
    /// Energy of the best state.
    pub best_energy: f64,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Estimated wall-clock time to completion, extrapolated from the pace
    /// so far. `None` at step 0.
    pub remaining: Option<Duration>,
}

/// Consumer of checkpoint reports.
pub trait ProgressSink {
    fn report(&mut self, report: &Report<'_>);
}

/// The silent sink.
impl ProgressSink for () {
    fn report(&mut self, _report: &Report<'_>) {}
}

/// Renders reports to stderr in the original tool's block format.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ProgressSink for ConsoleReporter {
    fn report(&mut self, r: &Report<'_>) {
        eprintln!("{}", "-".repeat(80));
        eprintln!(
            "Current Formula\t{}\t(hist distance {:.4})",
            r.state.descriptor(),
            r.energy
        );
        eprintln!(
            "Best Formula\t{}\t(hist distance {:.4})",
            r.best_state.descriptor(),
            r.best_energy
        );
        eprintln!("Step {} of {}", r.step, r.total_steps);
        if let Some(acceptance) = r.acceptance {
            eprintln!("Acceptance Rate: {:.1}%", 100.0 * acceptance);
        }
        if let Some(improvement) = r.improvement {
            eprintln!("Improvement Rate: {:.1}%", 100.0 * improvement);
        }
        if let Some(remaining) = r.remaining {
            eprintln!(
                "Time {}  ({} Remaining)",
                time_string(r.elapsed),
                time_string(remaining)
            );
        }
    }
}

/// Format a duration as `H:MM:SS`, rounded to the nearest second.
fn time_string(d: Duration) -> String {
    let s = d.as_secs_f64().round() as u64;
    let (h, s) = (s / 3600, s % 3600);
    let (m, s) = (s / 60, s % 60);
    format!("{h:2}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_string_splits_units() {
        assert_eq!(time_string(Duration::from_secs(0)), " 0:00:00");
        assert_eq!(time_string(Duration::from_secs(59)), " 0:00:59");
        assert_eq!(time_string(Duration::from_secs(61)), " 0:01:01");
        assert_eq!(time_string(Duration::from_secs(3_661)), " 1:01:01");
        assert_eq!(time_string(Duration::from_secs(36_000)), "10:00:00");
    }

    #[test]
    fn time_string_rounds_to_nearest_second() {
        assert_eq!(time_string(Duration::from_millis(1_499)), " 0:00:01");
        assert_eq!(time_string(Duration::from_millis(1_501)), " 0:00:02");
    }
}
