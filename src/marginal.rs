//! The multinomial sub-distribution generated by one element (a subisotopologue).

use std::rc::Rc;

use crate::conf::Conf;
use crate::element_table::tabulated_ln;
use crate::error::IsoSpecError;
use crate::numeric::{ln_factorial, unnormalized_log_prob};

/// Immutable description of one element's sub-distribution: the multinomial
/// over isotope counts for `N` atoms of `k` isotopes.
///
/// Construction locates the mode (the most probable configuration) via the
/// same seed-and-hill-climb procedure the original engine uses, so that
/// every search built from this marginal (a [`crate::marginal_trek::MarginalTrek`]
/// or a [`crate::precalculated_marginal::PrecalculatedMarginal`]) starts
/// from a locally optimal point.
#[derive(Debug, Clone)]
pub struct Marginal {
    k: usize,
    n: u32,
    atom_masses: Rc<[f64]>,
    atom_log_probs: Rc<[f64]>,
    loggamma_nominator: f64,
    mode_conf: Conf,
    mode_lprob: f64,
    mode_mass: f64,
    mode_eprob: f64,
    smallest_lprob: f64,
}

impl Marginal {
    /// Build the marginal for one element.
    ///
    /// `masses` and `probs` must have equal, non-zero length `k`; `probs`
    /// must sum to `1.0` within `1e-9`; every mass must be strictly
    /// positive; `n` must be non-negative. `element_index` is only used to
    /// identify which element failed validation.
    pub fn new(masses: &[f64], probs: &[f64], n: i32, element_index: usize) -> Result<Self, IsoSpecError> {
        if n < 0 {
            return Err(IsoSpecError::NegativeAtomCount { element_index });
        }
        let k = probs.len();
        if k == 0 {
            return Err(IsoSpecError::ZeroIsotopes { element_index });
        }
        if masses.len() != k {
            return Err(IsoSpecError::DimensionMismatch);
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(IsoSpecError::ProbabilitiesNotNormalized { element_index, sum });
        }
        for (isotope_index, &m) in masses.iter().enumerate() {
            if m <= 0.0 {
                return Err(IsoSpecError::NonPositiveMass {
                    element_index,
                    isotope_index,
                });
            }
        }
        let n = n as u32;

        let atom_log_probs: Rc<[f64]> = probs.iter().map(|&p| tabulated_ln(p)).collect::<Vec<_>>().into();
        let atom_masses: Rc<[f64]> = masses.into();
        let loggamma_nominator = ln_factorial(n);

        let mut conf = seed_configuration(n, probs);
        hill_climb(&mut conf, &atom_log_probs);

        let mode_lprob = loggamma_nominator + unnormalized_log_prob(&conf, &atom_log_probs);
        let mode_mass = mass_of(&conf, &atom_masses);
        let mode_eprob = mode_lprob.exp();
        let smallest_lprob = n as f64
            * atom_log_probs
                .iter()
                .cloned()
                .fold(f64::INFINITY, f64::min);

        Ok(Marginal {
            k,
            n,
            atom_masses,
            atom_log_probs,
            loggamma_nominator,
            mode_conf: conf.into(),
            mode_lprob,
            mode_mass,
            mode_eprob,
            smallest_lprob,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn atom_masses(&self) -> &[f64] {
        &self.atom_masses
    }

    pub fn atom_log_probs(&self) -> &[f64] {
        &self.atom_log_probs
    }

    pub fn mode_conf(&self) -> &Conf {
        &self.mode_conf
    }

    pub fn mode_lprob(&self) -> f64 {
        self.mode_lprob
    }

    pub fn mode_mass(&self) -> f64 {
        self.mode_mass
    }

    pub fn mode_eprob(&self) -> f64 {
        self.mode_eprob
    }

    pub fn smallest_lprob(&self) -> f64 {
        self.smallest_lprob
    }

    pub fn lightest_mass(&self) -> f64 {
        self.n as f64 * self.atom_masses.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn heaviest_mass(&self) -> f64 {
        self.n as f64
            * self
                .atom_masses
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max)
    }

    /// `N · masses[most-abundant isotope]`.
    pub fn monoisotopic_mass(&self) -> f64 {
        let (idx, _) = self
            .atom_log_probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .expect("k >= 1 is enforced at construction");
        self.n as f64 * self.atom_masses[idx]
    }

    /// `N · Σ_i probs[i]·masses[i]`.
    pub fn theoretical_average_mass(&self) -> f64 {
        let s: f64 = self
            .atom_log_probs
            .iter()
            .zip(self.atom_masses.iter())
            .map(|(&lp, &m)| lp.exp() * m)
            .sum();
        self.n as f64 * s
    }

    /// `logGamma(N+1) + unnormalized_logProb(conf)`.
    pub fn log_prob(&self, conf: &[i32]) -> f64 {
        self.loggamma_nominator + unnormalized_log_prob(conf, &self.atom_log_probs)
    }

    /// Every single-atom-transfer neighbour `(i -> j)` of `conf`: increment
    /// slot `i`, decrement slot `j`, for every `i != j` with `conf[j] > 0`.
    /// `O(k^2)` per call, the same neighbourhood every search in this crate
    /// walks: intentional, not an optimization target, since tie-breaking
    /// correctness depends on considering every transfer.
    pub(crate) fn neighbours(conf: &[i32]) -> Vec<Vec<i32>> {
        let k = conf.len();
        let mut out = Vec::with_capacity(k * k);
        for i in 0..k {
            for j in 0..k {
                if i != j && conf[j] > 0 {
                    let mut next = conf.to_vec();
                    next[i] += 1;
                    next[j] -= 1;
                    out.push(next);
                }
            }
        }
        out
    }
}

pub(crate) fn mass_of(conf: &[i32], masses: &[f64]) -> f64 {
    conf.iter().zip(masses).map(|(&c, &m)| c as f64 * m).sum()
}

/// Port of `initialConfigure` (original engine, `marginalTrek++.cpp`): seed
/// each slot at `floor(N·p_i) + 1`, then correct the sum back to exactly `N`
/// by adding any deficit to slot 0, or subtracting a surplus greedily from
/// slot 0 onward — cascading into later slots if a slot would go negative.
fn seed_configuration(n: u32, probs: &[f64]) -> Vec<i32> {
    let mut conf: Vec<i32> = probs.iter().map(|&p| (n as f64 * p) as i32 + 1).collect();
    let s: i32 = conf.iter().sum();
    let mut diff = n as i32 - s;

    if diff > 0 {
        conf[0] += diff;
    } else if diff < 0 {
        diff = -diff;
        let mut i = 0;
        while diff > 0 {
            let coord_diff = conf[i] - diff;
            if coord_diff >= 0 {
                conf[i] -= diff;
                diff = 0;
            } else {
                diff = -coord_diff;
                conf[i] = 0;
                i += 1;
            }
        }
    }
    conf
}

/// Greedy single-transfer hill climb: repeatedly apply whichever neighbour
/// transfer has the greatest log-probability gain, until none improves.
fn hill_climb(conf: &mut Vec<i32>, log_probs: &[f64]) {
    loop {
        let current = unnormalized_log_prob(conf, log_probs);
        let mut best: Option<(f64, Vec<i32>)> = None;
        for candidate in Marginal::neighbours(conf) {
            let lp = unnormalized_log_prob(&candidate, log_probs);
            if lp > current {
                let improves_on_best = match &best {
                    Some((best_lp, _)) => lp > *best_lp,
                    None => true,
                };
                if improves_on_best {
                    best = Some((lp, candidate));
                }
            }
        }
        match best {
            Some((_, candidate)) => *conf = candidate,
            None => break,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn water_hydrogen() -> Marginal {
        Marginal::new(
            &[1.00782503207, 2.0141017778],
            &[0.99985, 0.00015],
            2,
            0,
        )
        .unwrap()
    }

    #[test]
    fn mode_conf_sums_to_n() {
        let m = water_hydrogen();
        let sum: i32 = m.mode_conf().iter().sum();
        assert_eq!(sum, 2);
    }

    #[test]
    fn single_isotope_element_has_one_configuration() {
        let m = Marginal::new(&[12.0], &[1.0], 6, 0).unwrap();
        assert_eq!(&**m.mode_conf(), &[6]);
        assert!((m.mode_eprob() - 1.0).abs() < 1e-12);
        assert!((m.smallest_lprob() - m.mode_lprob()).abs() < 1e-12);
    }

    #[test]
    fn zero_atoms_has_one_empty_configuration() {
        let m = Marginal::new(&[12.0, 13.0033548378], &[0.9893, 0.0107], 0, 0).unwrap();
        assert_eq!(&**m.mode_conf(), &[0, 0]);
        assert!((m.mode_eprob() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_normalized_probabilities() {
        let err = Marginal::new(&[12.0, 13.0], &[0.5, 0.4], 10, 3).unwrap_err();
        assert_eq!(
            err,
            IsoSpecError::ProbabilitiesNotNormalized {
                element_index: 3,
                sum: 0.9
            }
        );
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = Marginal::new(&[0.0, 13.0], &[0.5, 0.5], 10, 1).unwrap_err();
        assert_eq!(
            err,
            IsoSpecError::NonPositiveMass {
                element_index: 1,
                isotope_index: 0
            }
        );
    }

    #[test]
    fn rejects_negative_atom_count() {
        let err = Marginal::new(&[1.0], &[1.0], -1, 0).unwrap_err();
        assert_eq!(err, IsoSpecError::NegativeAtomCount { element_index: 0 });
    }

    #[test]
    fn rejects_zero_isotopes() {
        let err = Marginal::new(&[], &[], 5, 2).unwrap_err();
        assert_eq!(err, IsoSpecError::ZeroIsotopes { element_index: 2 });
    }

    #[test]
    fn methane_carbon_mode_matches_scenario_b() {
        let m = Marginal::new(&[12.0, 13.0033548378], &[0.9893, 0.0107], 1, 0).unwrap();
        assert_eq!(&**m.mode_conf(), &[1, 0]);
        let expected_lprob = 0.9893_f64.ln();
        assert!((m.mode_lprob() - expected_lprob).abs() < 1e-9);
    }
}
