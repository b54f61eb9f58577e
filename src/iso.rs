//! The joint isotopic distribution of a whole molecule.

use crate::error::IsoSpecError;
use crate::marginal::Marginal;

/// A molecule's full set of per-element marginals, plus the aggregate
/// quantities that fall out of treating the elements as independent.
///
/// `Iso` owns the marginals; generators consume it by value
/// ([`Iso::into_marginals`]) rather than borrowing, since every generator in
/// this crate needs to hold the marginals for its whole lifetime.
pub struct Iso {
    marginals: Vec<Marginal>,
}

impl Iso {
    /// Build the joint distribution for a molecule.
    ///
    /// `isotope_numbers` gives each element's isotope count `k_i`;
    /// `atom_counts` gives each element's atom count `N_i`.
    /// `isotope_masses` and `isotope_probabilities` are flattened,
    /// concatenated per element in the same order, each of total length
    /// `sum(isotope_numbers)`.
    pub fn new(
        isotope_numbers: &[usize],
        atom_counts: &[i32],
        isotope_masses: &[f64],
        isotope_probabilities: &[f64],
    ) -> Result<Self, IsoSpecError> {
        if atom_counts.len() != isotope_numbers.len() {
            return Err(IsoSpecError::DimensionMismatch);
        }
        let total_k: usize = isotope_numbers.iter().sum();
        if isotope_masses.len() != total_k || isotope_probabilities.len() != total_k {
            return Err(IsoSpecError::DimensionMismatch);
        }

        let mut marginals = Vec::with_capacity(isotope_numbers.len());
        let mut offset = 0;
        for (element_index, (&k, &n)) in isotope_numbers.iter().zip(atom_counts).enumerate() {
            let masses = &isotope_masses[offset..offset + k];
            let probs = &isotope_probabilities[offset..offset + k];
            marginals.push(Marginal::new(masses, probs, n, element_index)?);
            offset += k;
        }

        Ok(Iso { marginals })
    }

    /// Build directly from already-validated marginals (used by callers,
    /// e.g. benches, that construct elements individually).
    pub fn from_marginals(marginals: Vec<Marginal>) -> Self {
        Iso { marginals }
    }

    pub fn marginals(&self) -> &[Marginal] {
        &self.marginals
    }

    pub fn into_marginals(self) -> Vec<Marginal> {
        self.marginals
    }

    pub fn element_count(&self) -> usize {
        self.marginals.len()
    }

    /// Sum of each marginal's mode log-probability — the log-probability of
    /// the single most probable joint configuration.
    pub fn mode_lprob(&self) -> f64 {
        self.marginals.iter().map(Marginal::mode_lprob).sum()
    }

    pub fn mode_mass(&self) -> f64 {
        self.marginals.iter().map(Marginal::mode_mass).sum()
    }

    pub fn mode_eprob(&self) -> f64 {
        self.mode_lprob().exp()
    }

    pub fn lightest_mass(&self) -> f64 {
        self.marginals.iter().map(Marginal::lightest_mass).sum()
    }

    pub fn heaviest_mass(&self) -> f64 {
        self.marginals.iter().map(Marginal::heaviest_mass).sum()
    }

    pub fn monoisotopic_mass(&self) -> f64 {
        self.marginals.iter().map(Marginal::monoisotopic_mass).sum()
    }

    pub fn theoretical_average_mass(&self) -> f64 {
        self.marginals
            .iter()
            .map(Marginal::theoretical_average_mass)
            .sum()
    }
}
