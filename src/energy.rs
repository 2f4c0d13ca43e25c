//! The histogram-matching objective.
//!
//! [`HistogramObjective`] owns the source/reference pixel buffers for the
//! lifetime of one optimization run and scores candidate parameter states:
//! transform a working copy of the source with the state's color formula,
//! then sum the per-channel histogram distances against the reference.

use ndarray::{Array3, Axis};

use crate::anneal::Objective;
use crate::ops::parse_operations;
use crate::params::ParamState;
use crate::{histogram_distance, Error, Result, RANGE_EPS};

/// Readability scale applied to the summed channel distances.
///
/// Purely cosmetic, but preserved so reported energies match the original
/// tool's output.
const ENERGY_SCALE: f64 = 100.0;

/// Scores a [`ParamState`] by how far the transformed source's per-channel
/// histograms sit from the reference's.
///
/// The owned buffers are immutable after construction; every evaluation
/// works on a private clone of the source.
#[derive(Debug, Clone)]
pub struct HistogramObjective {
    source: Array3<f32>,
    reference: Array3<f32>,
}

impl HistogramObjective {
    /// Take ownership of the source and reference buffers.
    ///
    /// Both must be channel-first `(3, height, width)` with values in
    /// `[0, 1]` (within rounding tolerance). The two buffers' heights and
    /// widths need not match; only value distributions are compared.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] for a first axis that is not 3,
    /// [`Error::SampleOutOfRange`] for out-of-range pixel values, and
    /// [`Error::Domain`] for an empty buffer.
    pub fn new(source: Array3<f32>, reference: Array3<f32>) -> Result<Self> {
        validate_buffer(&source)?;
        validate_buffer(&reference)?;
        Ok(HistogramObjective { source, reference })
    }

    /// The owned source buffer.
    pub fn source(&self) -> &Array3<f32> {
        &self.source
    }

    /// The owned reference buffer.
    pub fn reference(&self) -> &Array3<f32> {
        &self.reference
    }
}

impl Objective for HistogramObjective {
    /// Energy of one candidate state.
    ///
    /// The state is rendered to its descriptor and re-parsed rather than
    /// applied directly: the descriptor's two-decimal rounding is part of the
    /// contract, so the score always matches what the printed formula would
    /// actually do.
    fn energy(&self, state: &ParamState) -> Result<f64> {
        let ops = parse_operations(&state.descriptor())?;

        let mut work = self.source.clone();
        for op in &ops {
            op.apply(&mut work);
        }

        let mut total = 0.0;
        for c in 0..3 {
            total += histogram_distance(
                self.reference.index_axis(Axis(0), c),
                work.index_axis(Axis(0), c),
                None,
            )?;
        }
        Ok(total * ENERGY_SCALE)
    }
}

impl crate::Annealer<HistogramObjective> {
    /// Convenience constructor for the common case: own the two image
    /// buffers and anneal from `initial` (or the stock defaults).
    ///
    /// Equivalent to [`HistogramObjective::new`] followed by
    /// [`crate::Annealer::new`].
    pub fn from_images(
        source: Array3<f32>,
        reference: Array3<f32>,
        initial: Option<ParamState>,
    ) -> Result<Self> {
        crate::Annealer::new(HistogramObjective::new(source, reference)?, initial)
    }
}

/// Check that a buffer is 3-channel, non-empty, and holds `[0, 1]` samples.
fn validate_buffer(arr: &Array3<f32>) -> Result<()> {
    let channels = arr.len_of(Axis(0));
    if channels != 3 {
        return Err(Error::ChannelMismatch(channels));
    }
    if arr.is_empty() {
        return Err(Error::Domain("image buffer must be non-empty"));
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in arr.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) || min < -RANGE_EPS || max > 1.0 + RANGE_EPS {
        return Err(Error::SampleOutOfRange(min, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// A state whose descriptor is the identity transform: unit gammas and
    /// zero contrast (0.00 renders as the identity sigmoid).
    fn identity_state() -> ParamState {
        ParamState {
            gamma_red: 1.0,
            gamma_green: 1.0,
            gamma_blue: 1.0,
            contrast: 0.0,
        }
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let four = Array3::<f32>::zeros((4, 2, 2));
        let three = Array3::<f32>::zeros((3, 2, 2));
        assert!(matches!(
            HistogramObjective::new(four, three),
            Err(Error::ChannelMismatch(4))
        ));
    }

    #[test]
    fn rejects_out_of_range_pixels() {
        let mut bad = Array3::<f32>::zeros((3, 2, 2));
        bad[[1, 0, 0]] = 1.5;
        let good = Array3::<f32>::zeros((3, 2, 2));
        assert!(matches!(
            HistogramObjective::new(bad, good),
            Err(Error::SampleOutOfRange(_, _))
        ));
    }

    #[test]
    fn rejects_empty_buffer() {
        let empty = Array3::<f32>::zeros((3, 0, 4));
        let good = Array3::<f32>::zeros((3, 2, 2));
        assert!(HistogramObjective::new(empty, good).is_err());
    }

    #[test]
    fn identical_buffers_score_zero_under_identity() {
        let img = Array3::from_shape_fn((3, 4, 4), |(c, y, x)| {
            (c * 16 + y * 4 + x) as f32 / 48.0
        });
        let objective = HistogramObjective::new(img.clone(), img).unwrap();
        let e = objective.energy(&identity_state()).unwrap();
        assert!(e.abs() < 1e-9, "identity on identical images, got {e}");
    }

    #[test]
    fn disjoint_constant_buffers_hit_the_scaled_maximum() {
        // Every channel: all mass in one bin vs all mass in another,
        // distance 2 per channel, times 3 channels, times the 100x scale.
        let source = Array3::from_elem((3, 4, 4), 0.15f32);
        let reference = Array3::from_elem((3, 4, 4), 0.75f32);
        let objective = HistogramObjective::new(source, reference).unwrap();
        let e = objective.energy(&identity_state()).unwrap();
        assert!((e - 600.0).abs() < 1e-6, "got {e}");
    }

    #[test]
    fn evaluation_does_not_mutate_owned_buffers() {
        let source = Array3::from_elem((3, 4, 4), 0.2f32);
        let reference = Array3::from_elem((3, 4, 4), 0.8f32);
        let objective = HistogramObjective::new(source.clone(), reference).unwrap();

        let state = ParamState::default();
        let e1 = objective.energy(&state).unwrap();
        let e2 = objective.energy(&state).unwrap();

        assert_eq!(e1, e2, "repeat evaluation must be deterministic");
        assert_eq!(objective.source(), &source, "source must stay untouched");
    }

    #[test]
    fn from_images_wires_the_full_estimator() {
        let img = Array3::from_elem((3, 4, 4), 0.5f32);
        let mut annealer =
            crate::Annealer::from_images(img.clone(), img, Some(identity_state())).unwrap();
        annealer.set_seed(1);
        annealer
            .set_schedule(crate::Schedule {
                tmax: 1.0,
                tmin: 1e-3,
                steps: 10,
                updates: 0,
            })
            .unwrap();
        let result = annealer.run(&mut ()).unwrap();
        assert_eq!(result.energy, 0.0);
    }

    #[test]
    fn source_and_reference_may_differ_in_size() {
        let source = Array3::from_elem((3, 2, 2), 0.4f32);
        let reference = Array3::from_elem((3, 7, 5), 0.4f32);
        let objective = HistogramObjective::new(source, reference).unwrap();
        let e = objective.energy(&identity_state()).unwrap();
        assert!(e.abs() < 1e-9);
    }
}
