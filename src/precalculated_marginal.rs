//! Exhaustive, cutoff-bounded enumeration of one element's configurations.
//!
//! Where [`crate::marginal_trek::MarginalTrek`] is a lazily-extended search
//! structure, a [`PrecalculatedMarginal`] runs the search to completion once,
//! up front, discarding anything below a log-probability cutoff. Threshold
//! and layered joint generators both want this: they know in advance how far
//! down a given element's tail they can afford to look.

use crate::conf::Conf;
use crate::marginal::Marginal;
use crate::marginal_trek::MarginalTrek;

/// All configurations of one [`Marginal`] with log-probability `>= l_cutoff`.
/// Sorted in descending log-probability order when `sort` was requested at
/// construction, matching the original engine's `PrecalculatedMarginal(Marginal&&,
/// lCutOff, sort, ...)` constructor — callers that only need the set (e.g. a
/// companion-element cutoff bound) can skip the sort.
pub struct PrecalculatedMarginal {
    marginal: Marginal,
    confs: Vec<Conf>,
    lprobs: Vec<f64>,
    masses: Vec<f64>,
    eprobs: Vec<f64>,
}

impl PrecalculatedMarginal {
    /// Enumerate `marginal` down to `l_cutoff`.
    ///
    /// Unlike the original engine's constructor, the mode is only included
    /// if it clears `l_cutoff` on its own — pushing it unconditionally would
    /// violate the "threshold strictly above the mode produces an empty
    /// marginal" boundary case.
    pub fn new(marginal: Marginal, l_cutoff: f64, sort: bool) -> Self {
        let mode_lprob = marginal.mode_lprob();
        let mut trek = MarginalTrek::new(marginal);

        let mut kept = 0;
        if mode_lprob >= l_cutoff {
            loop {
                if !trek.probe_configuration_idx(kept) {
                    break;
                }
                if trek.conf_lprobs()[kept] < l_cutoff {
                    break;
                }
                kept += 1;
            }
        }

        let marginal = trek.marginal().clone();
        let mut confs = trek.confs()[..kept].to_vec();
        let mut lprobs = trek.conf_lprobs()[..kept].to_vec();
        let mut masses = trek.conf_masses()[..kept].to_vec();

        if sort {
            let mut order: Vec<usize> = (0..kept).collect();
            order.sort_by(|&a, &b| lprobs[b].total_cmp(&lprobs[a]));
            confs = order.iter().map(|&i| confs[i].clone()).collect();
            masses = order.iter().map(|&i| masses[i]).collect();
            lprobs = order.iter().map(|&i| lprobs[i]).collect();
        }

        let eprobs = lprobs.iter().map(|lp| lp.exp()).collect();

        PrecalculatedMarginal {
            marginal,
            confs,
            lprobs,
            masses,
            eprobs,
        }
    }

    pub fn marginal(&self) -> &Marginal {
        &self.marginal
    }

    pub fn len(&self) -> usize {
        self.confs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confs.is_empty()
    }

    pub fn confs(&self) -> &[Conf] {
        &self.confs
    }

    pub fn lprobs(&self) -> &[f64] {
        &self.lprobs
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn eprobs(&self) -> &[f64] {
        &self.eprobs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn carbon_marginal(n: i32) -> Marginal {
        Marginal::new(&[12.0, 13.0033548378], &[0.9893, 0.0107], n, 0).unwrap()
    }

    #[test]
    fn threshold_above_mode_is_empty() {
        let m = carbon_marginal(5);
        let mode_lprob = m.mode_lprob();
        let pm = PrecalculatedMarginal::new(m, mode_lprob + 1.0, true);
        assert!(pm.is_empty());
    }

    #[test]
    fn zero_cutoff_recovers_all_configurations() {
        let pm = PrecalculatedMarginal::new(carbon_marginal(5), f64::NEG_INFINITY, true);
        assert_eq!(pm.len(), 6);
        let total: f64 = pm.lprobs().iter().map(|lp| lp.exp()).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for (lp, ep) in pm.lprobs().iter().zip(pm.eprobs()) {
            assert!((lp.exp() - ep).abs() < 1e-12);
        }
    }

    #[test]
    fn configurations_are_sorted_descending() {
        let pm = PrecalculatedMarginal::new(carbon_marginal(10), -6.0, true);
        for window in pm.lprobs().windows(2) {
            assert!(window[0] >= window[1]);
        }
        assert!(pm.lprobs().iter().all(|&lp| lp >= -6.0));
    }

    #[test]
    fn unsorted_still_respects_cutoff_and_matches_sorted_as_a_set() {
        let sorted = PrecalculatedMarginal::new(carbon_marginal(10), -6.0, true);
        let unsorted = PrecalculatedMarginal::new(carbon_marginal(10), -6.0, false);
        assert_eq!(sorted.len(), unsorted.len());
        let mut sorted_lprobs = sorted.lprobs().to_vec();
        let mut unsorted_lprobs = unsorted.lprobs().to_vec();
        sorted_lprobs.sort_by(|a, b| a.total_cmp(b));
        unsorted_lprobs.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(sorted_lprobs, unsorted_lprobs);
    }
}
