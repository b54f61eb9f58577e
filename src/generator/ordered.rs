//! Global k-way merge yielding whole-molecule configurations in strict
//! descending log-probability order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use fnv::FnvBuildHasher;

use crate::iso::Iso;
use crate::marginal::Marginal;
use crate::marginal_trek::MarginalTrek;

use super::IsoGenerator;

#[derive(Clone)]
struct JointEntry {
    lprob: f64,
    mass: f64,
    indices: Vec<usize>,
}

impl PartialEq for JointEntry {
    fn eq(&self, other: &Self) -> bool {
        self.lprob == other.lprob
    }
}
impl Eq for JointEntry {}
impl PartialOrd for JointEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for JointEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lprob.total_cmp(&other.lprob)
    }
}

/// Yields whole-molecule configurations via a global priority queue over
/// partial products across every element's [`MarginalTrek`]: the seed is
/// every element at its mode, and successors of a joint configuration are
/// its one-step neighbours in any single marginal (advance exactly one
/// element's index by one).
pub struct IsoOrderedGenerator {
    treks: Vec<MarginalTrek>,
    pq: BinaryHeap<JointEntry>,
    visited: HashSet<Vec<usize>, FnvBuildHasher>,
    current: Option<JointEntry>,
    conf_len: usize,
}

impl IsoOrderedGenerator {
    pub fn new(iso: Iso) -> Self {
        let marginals = iso.into_marginals();
        let conf_len: usize = marginals.iter().map(Marginal::k).sum();
        let treks: Vec<MarginalTrek> = marginals.into_iter().map(MarginalTrek::new).collect();

        let indices = vec![0usize; treks.len()];
        let lprob: f64 = treks.iter().map(|t| t.conf_lprobs()[0]).sum();
        let mass: f64 = treks.iter().map(|t| t.conf_masses()[0]).sum();

        let mut visited = HashSet::default();
        visited.insert(indices.clone());

        let mut pq = BinaryHeap::new();
        pq.push(JointEntry { lprob, mass, indices });

        IsoOrderedGenerator {
            treks,
            pq,
            visited,
            current: None,
            conf_len,
        }
    }

    fn joint_lprob_and_mass(&self, indices: &[usize]) -> (f64, f64) {
        let lprob = indices
            .iter()
            .enumerate()
            .map(|(e, &i)| self.treks[e].conf_lprobs()[i])
            .sum();
        let mass = indices
            .iter()
            .enumerate()
            .map(|(e, &i)| self.treks[e].conf_masses()[i])
            .sum();
        (lprob, mass)
    }
}

impl IsoGenerator for IsoOrderedGenerator {
    fn advance_to_next(&mut self) -> bool {
        let top = match self.pq.pop() {
            Some(top) => top,
            None => {
                self.current = None;
                return false;
            }
        };

        for e in 0..self.treks.len() {
            let mut next_indices = top.indices.clone();
            next_indices[e] += 1;
            if self.visited.contains(&next_indices) {
                continue;
            }
            if !self.treks[e].probe_configuration_idx(next_indices[e]) {
                continue;
            }
            let (lprob, mass) = self.joint_lprob_and_mass(&next_indices);
            self.visited.insert(next_indices.clone());
            self.pq.push(JointEntry {
                lprob,
                mass,
                indices: next_indices,
            });
        }

        self.current = Some(top);
        true
    }

    fn mass(&self) -> f64 {
        self.current.as_ref().expect("advance_to_next must be called first").mass
    }

    fn lprob(&self) -> f64 {
        self.current.as_ref().expect("advance_to_next must be called first").lprob
    }

    fn conf_len(&self) -> usize {
        self.conf_len
    }

    fn get_conf_signature(&self, buf: &mut [i32]) {
        let current = self.current.as_ref().expect("advance_to_next must be called first");
        let mut offset = 0;
        for (e, &i) in current.indices.iter().enumerate() {
            let conf = &self.treks[e].confs()[i];
            buf[offset..offset + conf.len()].copy_from_slice(conf);
            offset += conf.len();
        }
    }
}
