//! # histmatch
//!
//! Search for a color formula that makes one image's tonal histogram look like
//! another's.
//!
//! ## The Problem
//!
//! Given a *source* image and a *reference* image, find per-channel gamma
//! values and a global sigmoidal contrast factor such that the transformed
//! source's per-channel histograms resemble the reference's. There is no
//! useful gradient here (histogram binning is piecewise constant), so the
//! search runs simulated annealing over the four-parameter space.
//!
//! ## Key Pieces
//!
//! | Item | Role |
//! |------|------|
//! | [`histogram_distance`] | Scalar dissimilarity between two sample arrays |
//! | [`HistogramObjective`] | Transforms the source, scores it against the reference |
//! | [`Annealer`] | Metropolis acceptance over a cooling schedule |
//! | [`ParamState::descriptor`] | Renders a state as a `rio color`-style formula |
//!
//! ## Quick Start
//!
//! ```rust
//! use histmatch::{Annealer, HistogramObjective, Schedule};
//! use ndarray::Array3;
//!
//! // Channel-first buffers, shape (3, height, width), values in [0, 1].
//! let source = Array3::<f32>::from_elem((3, 8, 8), 0.2);
//! let reference = Array3::<f32>::from_elem((3, 8, 8), 0.6);
//!
//! let objective = HistogramObjective::new(source, reference)?;
//! let mut annealer = Annealer::new(objective, None)?;
//! annealer.set_seed(7);
//! annealer.set_schedule(Schedule {
//!     tmax: 10.0,
//!     tmin: 1e-3,
//!     steps: 200,
//!     updates: 0,
//! })?;
//!
//! let result = annealer.run(&mut ())?;
//! println!("rio color {}  ({:.4})", result.state.descriptor(), result.energy);
//! # Ok::<(), histmatch::Error>(())
//! ```
//!
//! ## What Can Go Wrong
//!
//! 1. **Samples outside `[0, 1]`**: [`histogram_distance`] and
//!    [`HistogramObjective::new`] reject them. Normalize pixel data upstream.
//! 2. **Parameter drift**: moves are multiplicative, so values can creep
//!    toward 0 or grow without bound over a long run. That is a property of
//!    the heuristic, not an error; only non-finite values abort a run.
//! 3. **Degenerate proposals**: a proposal whose energy comes out non-finite
//!    is discarded (one move lost), while a validation error from the
//!    objective terminates the whole run. The two are deliberately distinct.
//! 4. **Too few steps**: annealing is a stochastic local search; short
//!    budgets give rough formulas. Increase `steps` for better fits.
//!
//! ## References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983). "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953). "Equation of State Calculations by Fast Computing Machines"
//! - Braun & Fairchild (1999). "Image Lightness Rescaling Using Sigmoidal
//!   Contrast Enhancement Functions"

use ndarray::{ArrayView, Dimension};
use thiserror::Error;

pub mod anneal;
pub mod energy;
pub mod ops;
pub mod params;
pub mod report;

pub use anneal::{Annealer, Objective, Schedule, SearchResult};
pub use energy::HistogramObjective;
pub use ops::{parse_operations, Bands, ColorOp};
pub use params::{Param, ParamState};
pub use report::{ConsoleReporter, ProgressSink, Report};

/// Histogram-matching error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Sample values fall outside the tolerance-widened `[0, 1]` range.
    #[error("sample values outside [0, 1]: min {0}, max {1}")]
    SampleOutOfRange(f32, f32),

    /// Image buffer does not have exactly 3 channels on its first axis.
    #[error("expected a 3-channel image buffer, got {0} channels")]
    ChannelMismatch(usize),

    /// A required parameter was not supplied.
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// A parameter name outside the fixed four-key set was supplied.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// A parameter value is NaN or infinite.
    #[error("parameter `{0}` is not finite ({1})")]
    NonFiniteParameter(&'static str, f64),

    /// An operation descriptor could not be parsed.
    #[error("cannot parse color operation `{0}`")]
    BadOperation(String),

    /// Domain error (invalid inputs for the mathematical definition).
    #[error("{0}")]
    Domain(&'static str),
}

/// Result type for histogram-matching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Tolerance absorbing floating-point rounding at the `[0, 1]` boundaries.
pub(crate) const RANGE_EPS: f32 = 1e-6;

/// Default histogram binning: 11 uniform edges over `[0, 1]` (10 bins).
fn default_edges() -> Vec<f64> {
    (0..=10).map(|i| i as f64 / 10.0).collect()
}

/// Squared-difference distance between the binned histograms of two sample
/// arrays.
///
/// Both inputs are interpreted as bags of scalar samples constrained to the
/// closed interval `[0, 1]` (within a small tolerance for floating-point
/// rounding). Each is binned over the shared `edges`, counts are normalized
/// by that input's total sample count, and the result is
///
/// Σ_bins (h_a\[k\] - h_b\[k\])²
///
/// The inputs may have different shapes and sizes; only the value
/// distributions are compared.
///
/// # Arguments
///
/// * `a`, `b` - Sample arrays of any dimensionality
/// * `edges` - Bin edges, strictly increasing, at least two. `None` means
///   11 uniform edges over `[0, 1]`.
///
/// # Errors
///
/// * [`Error::SampleOutOfRange`] if any sample is below `-1e-6` or above
///   `1 + 1e-6`. This indicates an upstream data-preparation bug and is not
///   recoverable here.
/// * [`Error::Domain`] for empty inputs or malformed edges.
///
/// # Example
///
/// ```rust
/// use histmatch::histogram_distance;
/// use ndarray::Array1;
///
/// let zeros = Array1::<f32>::zeros(100);
/// let ones = Array1::<f32>::ones(100);
///
/// // All mass in the first bin vs all mass in the last:
/// // (1-0)^2 + (0-1)^2 = 2, the maximum possible value.
/// let d = histogram_distance(zeros.view(), ones.view(), Some(&[0.0, 0.5, 1.0])).unwrap();
/// assert!((d - 2.0).abs() < 1e-12);
/// ```
pub fn histogram_distance<D, E>(
    a: ArrayView<'_, f32, D>,
    b: ArrayView<'_, f32, E>,
    edges: Option<&[f64]>,
) -> Result<f64>
where
    D: Dimension,
    E: Dimension,
{
    let owned_edges;
    let edges = match edges {
        Some(e) => e,
        None => {
            owned_edges = default_edges();
            owned_edges.as_slice()
        }
    };
    if edges.len() < 2 {
        return Err(Error::Domain("need at least two bin edges"));
    }
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Domain("bin edges must be strictly increasing"));
    }

    let hist_a = normalized_histogram(a, edges)?;
    let hist_b = normalized_histogram(b, edges)?;

    Ok(hist_a
        .iter()
        .zip(hist_b.iter())
        .map(|(&ha, &hb)| (ha - hb) * (ha - hb))
        .sum())
}

/// Bin `samples` over `edges` and normalize by total sample count.
///
/// Samples within `RANGE_EPS` outside `[edges[0], edges[last]]` are clamped
/// into the boundary bins, so the normalized counts always sum to 1.
fn normalized_histogram<D: Dimension>(
    samples: ArrayView<'_, f32, D>,
    edges: &[f64],
) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(Error::Domain("histogram input must be non-empty"));
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in samples.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) || min < -RANGE_EPS || max > 1.0 + RANGE_EPS {
        return Err(Error::SampleOutOfRange(min, max));
    }

    let nbins = edges.len() - 1;
    let lo = edges[0];
    let hi = edges[nbins];

    let mut counts = vec![0u64; nbins];
    for &v in samples.iter() {
        let v = f64::from(v);
        // Last edge is inclusive; rounding spill just outside the range lands
        // in the boundary bins.
        let k = if v <= lo {
            0
        } else if v >= hi {
            nbins - 1
        } else {
            edges.partition_point(|&e| e <= v) - 1
        };
        counts[k] += 1;
    }

    let total = samples.len() as f64;
    let hist: Vec<f64> = counts.iter().map(|&c| c as f64 / total).collect();

    debug_assert!(
        (hist.iter().sum::<f64>() - 1.0).abs() < f64::from(RANGE_EPS),
        "normalized histogram must sum to 1"
    );

    Ok(hist)
}
