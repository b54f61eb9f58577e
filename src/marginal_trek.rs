//! Best-first enumeration of a single [`Marginal`]'s configurations.

use std::collections::{BinaryHeap, HashMap};

use fnv::FnvBuildHasher;

use crate::arena::Arena;
use crate::conf::{Conf, ConfHeapEntry};
use crate::marginal::{mass_of, Marginal};
use crate::numeric::Summator;

const DEFAULT_TAB_SIZE: usize = 1000;
const DEFAULT_HASH_SIZE: usize = 1000;

/// Enumerates the configurations of one [`Marginal`] in descending
/// log-probability, memoizing everything it has produced so far and
/// extending the search lazily on demand.
///
/// Ordering guarantee (§8, invariant 3): successive [`MarginalTrek::probe_configuration_idx`]
/// extensions never decrease `conf_lprobs()`.
pub struct MarginalTrek {
    marginal: Marginal,
    pq: BinaryHeap<ConfHeapEntry>,
    visited: HashMap<Conf, (), FnvBuildHasher>,
    arena: Arena,
    total_prob: Summator,
    conf_lprobs: Vec<f64>,
    conf_masses: Vec<f64>,
    confs: Vec<Conf>,
}

impl MarginalTrek {
    pub fn new(marginal: Marginal) -> Self {
        Self::with_capacity(marginal, DEFAULT_TAB_SIZE, DEFAULT_HASH_SIZE)
    }

    pub fn with_capacity(marginal: Marginal, tab_size: usize, hash_size: usize) -> Self {
        let mut trek = MarginalTrek {
            marginal,
            pq: BinaryHeap::new(),
            visited: HashMap::with_capacity_and_hasher(hash_size, FnvBuildHasher::default()),
            arena: Arena::with_capacity(tab_size),
            total_prob: Summator::new(),
            conf_lprobs: Vec::new(),
            conf_masses: Vec::new(),
            confs: Vec::new(),
        };
        let mode_conf = trek.marginal.mode_conf().clone();
        trek.seed(&mode_conf);
        trek.restart_from_best_probe();
        trek
    }

    fn seed(&mut self, conf: &[i32]) {
        let handle = self.arena.make_copy(conf);
        let lprob = self.marginal.log_prob(&handle);
        let mass = mass_of(&handle, self.marginal.atom_masses());
        self.pq.push(ConfHeapEntry {
            lprob,
            mass,
            conf: handle.clone(),
        });
        self.visited.insert(handle, ());
    }

    /// Proceed to the next configuration and memoize it.
    fn add_next_conf(&mut self) -> bool {
        let top = match self.pq.pop() {
            Some(top) => top,
            None => return false,
        };

        self.total_prob.add(top.lprob.exp());
        self.conf_lprobs.push(top.lprob);
        self.conf_masses.push(top.mass);
        self.confs.push(top.conf.clone());

        for candidate in Marginal::neighbours(&top.conf) {
            if !self.visited.contains_key(candidate.as_slice()) {
                let handle = self.arena.make_copy(&candidate);
                let lprob = self.marginal.log_prob(&handle);
                let mass = mass_of(&handle, self.marginal.atom_masses());
                self.pq.push(ConfHeapEntry {
                    lprob,
                    mass,
                    conf: handle.clone(),
                });
                self.visited.insert(handle, ());
            }
        }

        true
    }

    /// Port of the `MarginalTrek` constructor's hill-climb safety net
    /// (`marginalTrek++.cpp`): because the mode found by [`Marginal::new`]
    /// is only a *local* optimum with respect to single-atom transfers, a
    /// max-heap seeded from it can still pop a handful of configurations
    /// before settling into non-increasing order, if the distribution is
    /// non-strictly unimodal near ties. Probe forward until log-probability
    /// would decrease, then restart real enumeration from the best
    /// configuration observed during that probe. This is a known limitation
    /// for pathological multi-modal distributions, not proven safe in
    /// general.
    fn restart_from_best_probe(&mut self) {
        let mut last_lprob = f64::NEG_INFINITY;
        loop {
            if !self.add_next_conf() {
                break;
            }
            let current = *self.conf_lprobs.last().expect("just pushed");
            if current < last_lprob {
                break;
            }
            last_lprob = current;
        }

        let (max_idx, _) = self
            .conf_lprobs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .expect("seeded with at least one configuration");
        let reseed = self.confs[max_idx].to_vec();

        self.pq.clear();
        self.visited.clear();
        self.conf_lprobs.clear();
        self.conf_masses.clear();
        self.confs.clear();
        self.total_prob = Summator::new();

        self.seed(&reseed);
        self.add_next_conf();
    }

    /// Ensure the `idx`-th most probable configuration has been memoized.
    /// Returns `false` if the distribution is exhausted before reaching it.
    pub fn probe_configuration_idx(&mut self, idx: usize) -> bool {
        while self.confs.len() <= idx {
            if !self.add_next_conf() {
                return false;
            }
        }
        true
    }

    /// Extend `confs()` until the accumulated probability reaches `cutoff`
    /// or the distribution is exhausted. Returns the index at which the
    /// cutoff was crossed among already-memoized configurations, or
    /// `confs().len()` after extending if unreachable from there — a direct
    /// port of `processUntilCutoff` (`marginalTrek++.h`).
    pub fn process_until_cutoff(&mut self, cutoff: f64) -> usize {
        let mut s = Summator::new();
        for (i, &lp) in self.conf_lprobs.iter().enumerate() {
            s.add(lp.exp());
            if s.get() >= cutoff {
                return i;
            }
        }
        while self.total_prob.get() < cutoff {
            if !self.add_next_conf() {
                break;
            }
        }
        self.confs.len()
    }

    pub fn k(&self) -> usize {
        self.marginal.k()
    }

    pub fn conf_lprobs(&self) -> &[f64] {
        &self.conf_lprobs
    }

    pub fn conf_masses(&self) -> &[f64] {
        &self.conf_masses
    }

    pub fn confs(&self) -> &[Conf] {
        &self.confs
    }

    pub fn marginal(&self) -> &Marginal {
        &self.marginal
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn carbon_marginal(n: i32) -> Marginal {
        Marginal::new(&[12.0, 13.0033548378], &[0.9893, 0.0107], n, 0).unwrap()
    }

    #[test]
    fn enumerates_all_six_configurations_of_c5() {
        let mut trek = MarginalTrek::new(carbon_marginal(5));
        let last_idx = trek.process_until_cutoff(1.0);
        assert_eq!(last_idx, 6);

        let total: f64 = trek.conf_lprobs().iter().map(|lp| lp.exp()).sum();
        assert!((total - 1.0).abs() < 1e-9);

        let mut seen_c13_counts: Vec<i32> = trek.confs().iter().map(|c| c[1]).collect();
        seen_c13_counts.sort_unstable();
        assert_eq!(seen_c13_counts, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn outputs_are_non_increasing_in_log_probability() {
        let mut trek = MarginalTrek::new(carbon_marginal(20));
        trek.probe_configuration_idx(15);
        for window in trek.conf_lprobs().windows(2) {
            assert!(window[0] >= window[1]);
        }
    }

    #[test]
    fn probing_past_the_end_returns_false() {
        let mut trek = MarginalTrek::new(carbon_marginal(1));
        // C1 has exactly 2 configurations: [1,0] and [0,1].
        assert!(trek.probe_configuration_idx(1));
        assert!(!trek.probe_configuration_idx(2));
    }
}
