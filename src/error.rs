//! Constructor-time validation failures.

use std::fmt;

/// Invalid input to [`crate::marginal::Marginal::new`] or [`crate::iso::Iso::new`].
///
/// Every variant corresponds to a failure mode in the data model: a
/// non-normalized element distribution, a non-positive mass, or a malformed
/// dimension. These fail at construction and are unrecoverable; they never
/// arise mid-enumeration (exhaustion of a generator is not an error).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsoSpecError {
    /// An element's atom count (`N`) was negative.
    NegativeAtomCount { element_index: usize },
    /// An element was declared with zero isotopes (`k == 0`).
    ZeroIsotopes { element_index: usize },
    /// An element's isotope probabilities did not sum to `1.0` within `1e-9`.
    ProbabilitiesNotNormalized { element_index: usize, sum: f64 },
    /// An isotope's mass was not strictly positive.
    NonPositiveMass {
        element_index: usize,
        isotope_index: usize,
    },
    /// The flattened `isotope_masses`/`isotope_probabilities` slices did not
    /// agree in length with `isotope_numbers`/`atom_counts`.
    DimensionMismatch,
}

impl fmt::Display for IsoSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsoSpecError::NegativeAtomCount { element_index } => {
                write!(f, "element {element_index} has a negative atom count")
            }
            IsoSpecError::ZeroIsotopes { element_index } => {
                write!(f, "element {element_index} declares zero isotopes")
            }
            IsoSpecError::ProbabilitiesNotNormalized { element_index, sum } => write!(
                f,
                "element {element_index}'s isotope probabilities sum to {sum}, not 1.0"
            ),
            IsoSpecError::NonPositiveMass {
                element_index,
                isotope_index,
            } => write!(
                f,
                "element {element_index} isotope {isotope_index} has a non-positive mass"
            ),
            IsoSpecError::DimensionMismatch => write!(
                f,
                "isotope_masses/isotope_probabilities length does not match isotope_numbers"
            ),
        }
    }
}

impl std::error::Error for IsoSpecError {}
