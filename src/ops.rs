//! Pixel-transform operations and the descriptor grammar.
//!
//! A descriptor is a comma-separated list of operations:
//!
//! ```text
//! gamma <bands> <g>
//! sigmoidal <bands> <contrast> <bias>
//! ```
//!
//! where `<bands>` is any subset of `rgb`. This is the grammar
//! [`crate::ParamState::descriptor`] emits and the grammar the `rio color`
//! command line accepts, so a tuned formula can be pasted straight into a
//! batch job.

use ndarray::{Array3, Axis};

use crate::{Error, Result};

/// Which of the three channels an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bands {
    pub r: bool,
    pub g: bool,
    pub b: bool,
}

impl Bands {
    /// All three channels.
    pub const RGB: Bands = Bands {
        r: true,
        g: true,
        b: true,
    };

    fn parse(token: &str) -> Option<Bands> {
        if token.is_empty() {
            return None;
        }
        let mut bands = Bands {
            r: false,
            g: false,
            b: false,
        };
        for c in token.chars() {
            match c {
                'r' => bands.r = true,
                'g' => bands.g = true,
                'b' => bands.b = true,
                _ => return None,
            }
        }
        Some(bands)
    }

    /// Channel indices enabled by this band set, in `(r, g, b)` order.
    fn indices(self) -> impl Iterator<Item = usize> {
        [self.r, self.g, self.b]
            .into_iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
    }
}

/// One parsed pixel-transform operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorOp {
    /// Per-band gamma correction: `v ↦ v^(1/g)`.
    Gamma { bands: Bands, g: f64 },
    /// Rescaled logistic contrast curve with midpoint `bias`.
    Sigmoidal {
        bands: Bands,
        contrast: f64,
        bias: f64,
    },
}

impl ColorOp {
    /// Apply this operation in place to a channel-first `(3, h, w)` buffer.
    ///
    /// Both operations map `[0, 1]` onto `[0, 1]` (up to floating-point
    /// rounding), so a chain of them keeps buffers histogram-ready.
    pub fn apply(&self, arr: &mut Array3<f32>) {
        match *self {
            ColorOp::Gamma { bands, g } => {
                let exponent = (1.0 / g) as f32;
                for c in bands.indices() {
                    arr.index_axis_mut(Axis(0), c)
                        .mapv_inplace(|v| v.powf(exponent));
                }
            }
            ColorOp::Sigmoidal {
                bands,
                contrast,
                bias,
            } => {
                // Near-zero contrast is the identity; the rescaling below
                // would divide by ~0.
                if contrast.abs() < 1e-9 {
                    return;
                }
                let s = |x: f64| 1.0 / (1.0 + (contrast * (bias - x)).exp());
                let s0 = s(0.0);
                let scale = s(1.0) - s0;
                for c in bands.indices() {
                    arr.index_axis_mut(Axis(0), c)
                        .mapv_inplace(|v| (((s(f64::from(v))) - s0) / scale) as f32);
                }
            }
        }
    }
}

/// Parse an operation descriptor into a sequence of [`ColorOp`]s.
///
/// # Errors
///
/// [`Error::BadOperation`] for an unknown operation name, a malformed band
/// set, a wrong argument count, an unparseable number, or a non-positive
/// gamma.
///
/// # Example
///
/// ```rust
/// use histmatch::parse_operations;
///
/// let ops = parse_operations("gamma rb 1.10, sigmoidal rgb 12.00 0.5").unwrap();
/// assert_eq!(ops.len(), 2);
/// ```
pub fn parse_operations(descriptor: &str) -> Result<Vec<ColorOp>> {
    descriptor
        .split(',')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(parse_clause)
        .collect()
}

fn parse_clause(clause: &str) -> Result<ColorOp> {
    let bad = || Error::BadOperation(clause.to_string());

    let mut tokens = clause.split_whitespace();
    let name = tokens.next().ok_or_else(bad)?;
    let bands = tokens.next().and_then(Bands::parse).ok_or_else(bad)?;
    let args: Vec<f64> = tokens
        .map(|t| t.parse::<f64>().map_err(|_| bad()))
        .collect::<Result<_>>()?;

    match (name, args.as_slice()) {
        ("gamma", &[g]) => {
            if !g.is_finite() || g <= 0.0 {
                return Err(bad());
            }
            Ok(ColorOp::Gamma { bands, g })
        }
        ("sigmoidal", &[contrast, bias]) => {
            if !contrast.is_finite() || !bias.is_finite() {
                return Err(bad());
            }
            Ok(ColorOp::Sigmoidal {
                bands,
                contrast,
                bias,
            })
        }
        _ => Err(bad()),
    }
}
