//! Bounded Cartesian "odometer" walk over all elements' configurations.

use crate::conf::Conf;
use crate::iso::Iso;
use crate::marginal::Marginal;
use crate::precalculated_marginal::PrecalculatedMarginal;

use super::IsoGenerator;

/// Yields every whole-molecule configuration whose joint log-probability is
/// `>= threshold`, in unspecified (not sorted) order.
pub struct IsoThresholdGenerator {
    marginals: Vec<PrecalculatedMarginal>,
    threshold: f64,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
    current_lprob: f64,
    current_mass: f64,
}

impl IsoThresholdGenerator {
    /// `threshold` is absolute if `absolute` is set, otherwise relative to
    /// the molecule's mode log-probability. Configurations at exactly the
    /// resolved threshold are included.
    pub fn new(iso: Iso, threshold: f64, absolute: bool) -> Self {
        let mode_lprob = iso.mode_lprob();
        let absolute_threshold = if absolute { threshold } else { mode_lprob + threshold };

        let marginals = iso.into_marginals();
        let mode_lprobs: Vec<f64> = marginals.iter().map(Marginal::mode_lprob).collect();
        let total_mode: f64 = mode_lprobs.iter().sum();

        let precomputed: Vec<PrecalculatedMarginal> = marginals
            .into_iter()
            .zip(mode_lprobs.iter())
            .map(|(m, &m_mode)| {
                let others_mode_upper_bound = total_mode - m_mode;
                let cutoff = absolute_threshold - others_mode_upper_bound;
                PrecalculatedMarginal::new(m, cutoff, true)
            })
            .collect();

        let exhausted = precomputed.iter().any(PrecalculatedMarginal::is_empty);
        let indices = vec![0usize; precomputed.len()];

        IsoThresholdGenerator {
            marginals: precomputed,
            threshold: absolute_threshold,
            indices,
            started: false,
            exhausted,
            current_lprob: 0.0,
            current_mass: 0.0,
        }
    }

    fn current_combo_lprob(&self) -> f64 {
        self.indices
            .iter()
            .zip(self.marginals.iter())
            .map(|(&i, m)| m.lprobs()[i])
            .sum()
    }

    fn current_combo_mass(&self) -> f64 {
        self.indices
            .iter()
            .zip(self.marginals.iter())
            .map(|(&i, m)| m.masses()[i])
            .sum()
    }

    /// Advance the odometer by one combination; `false` once every
    /// combination has been visited (the indices have wrapped back to all
    /// zero).
    fn increment_odometer(&mut self) -> bool {
        for e in (0..self.indices.len()).rev() {
            self.indices[e] += 1;
            if self.indices[e] < self.marginals[e].len() {
                return true;
            }
            self.indices[e] = 0;
        }
        false
    }

    /// The per-element configuration handles of the current combination.
    pub fn current_confs(&self) -> Vec<Conf> {
        self.indices
            .iter()
            .zip(self.marginals.iter())
            .map(|(&i, m)| m.confs()[i].clone())
            .collect()
    }
}

impl IsoGenerator for IsoThresholdGenerator {
    fn advance_to_next(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        loop {
            if !self.started {
                self.started = true;
            } else if !self.increment_odometer() {
                self.exhausted = true;
                return false;
            }

            let lprob = self.current_combo_lprob();
            if lprob >= self.threshold {
                self.current_lprob = lprob;
                self.current_mass = self.current_combo_mass();
                return true;
            }
        }
    }

    fn mass(&self) -> f64 {
        self.current_mass
    }

    fn lprob(&self) -> f64 {
        self.current_lprob
    }

    fn conf_len(&self) -> usize {
        self.marginals.iter().map(|m| m.marginal().k()).sum()
    }

    fn get_conf_signature(&self, buf: &mut [i32]) {
        let mut offset = 0;
        for (&i, m) in self.indices.iter().zip(self.marginals.iter()) {
            let conf = &m.confs()[i];
            buf[offset..offset + conf.len()].copy_from_slice(conf);
            offset += conf.len();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn water() -> Iso {
        Iso::new(
            &[2, 3],
            &[2, 1],
            &[
                1.00782503207,
                2.0141017778,
                15.99491461957,
                16.99913170,
                17.9991610,
            ],
            &[0.99985, 0.00015, 0.99757, 0.00038, 0.00205],
        )
        .unwrap()
    }

    #[test]
    fn scenario_a_water_threshold() {
        let threshold = 0.0001_f64.ln();
        let mut gen = IsoThresholdGenerator::new(water(), threshold, true);

        let mut seen_16o = false;
        let mut seen_18o = false;
        let mut count = 0;
        while gen.advance_to_next() {
            count += 1;
            assert!(gen.lprob() >= threshold);
            let mut buf = vec![0i32; gen.conf_len()];
            gen.get_conf_signature(&mut buf);
            if buf == vec![2, 0, 1, 0, 0] {
                seen_16o = true;
                assert!((gen.mass() - 18.0105646).abs() < 1e-6);
            }
            if buf == vec![2, 0, 0, 0, 1] {
                seen_18o = true;
                assert!((gen.mass() - 20.0147556).abs() < 1e-6);
            }
        }
        assert!(count > 0);
        assert!(seen_16o);
        assert!(seen_18o);
    }

    #[test]
    fn scenario_b_methane_mode_threshold() {
        let methane = Iso::new(
            &[2, 2],
            &[1, 4],
            &[12.0, 13.0033548378, 1.00782503207, 2.0141017778],
            &[0.9893, 0.0107, 0.99985, 0.00015],
        )
        .unwrap();
        let mode_lprob = methane.mode_lprob();

        let mut gen = IsoThresholdGenerator::new(methane, mode_lprob, true);
        assert!(gen.advance_to_next());
        let mut buf = vec![0i32; gen.conf_len()];
        gen.get_conf_signature(&mut buf);
        assert_eq!(buf, vec![1, 0, 4, 0]);
        assert!((gen.mass() - 16.0313001).abs() < 1e-6);
        assert!(!gen.advance_to_next());
    }

    #[test]
    fn threshold_above_mode_yields_nothing() {
        let methane = Iso::new(
            &[2, 2],
            &[1, 4],
            &[12.0, 13.0033548378, 1.00782503207, 2.0141017778],
            &[0.9893, 0.0107, 0.99985, 0.00015],
        )
        .unwrap();
        let mode_lprob = methane.mode_lprob();
        let mut gen = IsoThresholdGenerator::new(methane, mode_lprob + 1.0, true);
        assert!(!gen.advance_to_next());
    }

    #[test]
    fn idempotent_across_runs() {
        let build = || {
            Iso::new(
                &[2, 2],
                &[1, 4],
                &[12.0, 13.0033548378, 1.00782503207, 2.0141017778],
                &[0.9893, 0.0107, 0.99985, 0.00015],
            )
            .unwrap()
        };

        let collect = |iso: Iso| {
            let mut gen = IsoThresholdGenerator::new(iso, -20.0, true);
            let mut out = Vec::new();
            while gen.advance_to_next() {
                let mut buf = vec![0i32; gen.conf_len()];
                gen.get_conf_signature(&mut buf);
                out.push((gen.mass(), gen.lprob(), buf));
            }
            out.sort_by(|a, b| a.2.cmp(&b.2));
            out
        };

        assert_eq!(collect(build()), collect(build()));
    }
}
