//! The four-parameter search space and its formula rendering.
//!
//! A [`ParamState`] is the thing being searched over: one gamma per channel
//! plus a global sigmoidal contrast factor. [`ParamState::descriptor`] renders
//! a state as the operation string consumed by [`crate::parse_operations`]
//! (and by the `rio color` command line).

use crate::{Error, Result};

/// Names of the four tunable parameters.
///
/// The set is fixed: the annealer proposes moves by picking one of these
/// uniformly at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    GammaRed,
    GammaGreen,
    GammaBlue,
    Contrast,
}

impl Param {
    /// All parameters, in declaration order.
    pub const ALL: [Param; 4] = [
        Param::GammaRed,
        Param::GammaGreen,
        Param::GammaBlue,
        Param::Contrast,
    ];

    /// The external name of this parameter (as used by `from_pairs`).
    pub fn name(self) -> &'static str {
        match self {
            Param::GammaRed => "gamma_red",
            Param::GammaGreen => "gamma_green",
            Param::GammaBlue => "gamma_blue",
            Param::Contrast => "contrast",
        }
    }
}

/// A point in the search space.
///
/// Mutated in place by the annealer's perturbation step; cheap to clone for
/// best-so-far tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamState {
    pub gamma_red: f64,
    pub gamma_green: f64,
    pub gamma_blue: f64,
    pub contrast: f64,
}

impl Default for ParamState {
    /// Identity gammas and the stock contrast the original tool starts from.
    fn default() -> Self {
        ParamState {
            gamma_red: 1.0,
            gamma_green: 1.0,
            gamma_blue: 1.0,
            contrast: 10.0,
        }
    }
}

impl ParamState {
    /// Build a state from `(name, value)` pairs.
    ///
    /// All four parameters must be present and no other names are
    /// permitted; a repeated name keeps its last value. This is the construction path for externally supplied
    /// states (config files, CLI flags).
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`] for a name outside the fixed set,
    /// [`Error::MissingParameter`] if one of the four is absent, and
    /// [`Error::NonFiniteParameter`] for NaN/infinite values.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values: [Option<f64>; 4] = [None; 4];
        for (name, value) in pairs {
            let param = Param::ALL
                .iter()
                .copied()
                .find(|p| p.name() == name)
                .ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
            values[param as usize] = Some(value);
        }

        for (param, slot) in Param::ALL.iter().zip(values.iter()) {
            if slot.is_none() {
                return Err(Error::MissingParameter(param.name()));
            }
        }

        let state = ParamState {
            gamma_red: values[Param::GammaRed as usize].unwrap_or(1.0),
            gamma_green: values[Param::GammaGreen as usize].unwrap_or(1.0),
            gamma_blue: values[Param::GammaBlue as usize].unwrap_or(1.0),
            contrast: values[Param::Contrast as usize].unwrap_or(10.0),
        };
        state.validate()?;
        Ok(state)
    }

    /// Read one parameter.
    pub fn get(&self, param: Param) -> f64 {
        match param {
            Param::GammaRed => self.gamma_red,
            Param::GammaGreen => self.gamma_green,
            Param::GammaBlue => self.gamma_blue,
            Param::Contrast => self.contrast,
        }
    }

    /// Write one parameter.
    pub fn set(&mut self, param: Param, value: f64) {
        match param {
            Param::GammaRed => self.gamma_red = value,
            Param::GammaGreen => self.gamma_green = value,
            Param::GammaBlue => self.gamma_blue = value,
            Param::Contrast => self.contrast = value,
        }
    }

    /// Check that every parameter is finite.
    ///
    /// Value *ranges* are deliberately not enforced: multiplicative moves may
    /// drift values toward 0 or far above 1 and that is an accepted property
    /// of the heuristic. Only NaN/infinity is an error.
    pub fn validate(&self) -> Result<()> {
        for param in Param::ALL {
            let v = self.get(param);
            if !v.is_finite() {
                return Err(Error::NonFiniteParameter(param.name(), v));
            }
        }
        Ok(())
    }

    /// Render this state as an operation descriptor string.
    ///
    /// The grammar is fixed: per-channel gamma at two decimal digits, then a
    /// sigmoidal contrast over all bands with a 0.5 midpoint. Identical
    /// states produce byte-identical strings, so the descriptor doubles as
    /// the user-facing formula.
    ///
    /// ```rust
    /// use histmatch::ParamState;
    ///
    /// let s = ParamState::default();
    /// assert_eq!(
    ///     s.descriptor(),
    ///     "gamma r 1.00, gamma g 1.00, gamma b 1.00, sigmoidal rgb 10.00 0.5"
    /// );
    /// ```
    pub fn descriptor(&self) -> String {
        format!(
            "gamma r {:.2}, gamma g {:.2}, gamma b {:.2}, sigmoidal rgb {:.2} 0.5",
            self.gamma_red, self.gamma_green, self.gamma_blue, self.contrast
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_starting_point() {
        let s = ParamState::default();
        assert_eq!(s.gamma_red, 1.0);
        assert_eq!(s.gamma_green, 1.0);
        assert_eq!(s.gamma_blue, 1.0);
        assert_eq!(s.contrast, 10.0);
    }

    #[test]
    fn from_pairs_accepts_a_complete_set() {
        let s = ParamState::from_pairs([
            ("gamma_red", 1.2),
            ("gamma_green", 0.9),
            ("gamma_blue", 1.05),
            ("contrast", 12.0),
        ])
        .unwrap();
        assert_eq!(s.gamma_green, 0.9);
        assert_eq!(s.contrast, 12.0);
    }

    #[test]
    fn from_pairs_rejects_missing_key() {
        let err = ParamState::from_pairs([
            ("gamma_red", 1.2),
            ("gamma_green", 0.9),
            ("contrast", 12.0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("gamma_blue")));
    }

    #[test]
    fn from_pairs_rejects_unknown_key() {
        let err = ParamState::from_pairs([("bias", 0.5)]).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(_)));
    }

    #[test]
    fn from_pairs_rejects_non_finite_value() {
        let err = ParamState::from_pairs([
            ("gamma_red", f64::NAN),
            ("gamma_green", 1.0),
            ("gamma_blue", 1.0),
            ("contrast", 10.0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::NonFiniteParameter("gamma_red", _)));
    }

    #[test]
    fn descriptor_rounds_to_two_digits() {
        let s = ParamState {
            gamma_red: 1.23456,
            gamma_green: 0.987,
            gamma_blue: 1.0,
            contrast: 9.995,
        };
        assert_eq!(
            s.descriptor(),
            "gamma r 1.23, gamma g 0.99, gamma b 1.00, sigmoidal rgb 10.00 0.5"
        );
    }

    #[test]
    fn get_set_round_trip() {
        let mut s = ParamState::default();
        for param in Param::ALL {
            s.set(param, 2.5);
            assert_eq!(s.get(param), 2.5);
        }
    }
}
