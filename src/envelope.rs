//! Tabulating a generator's pull-driven output into dense parallel arrays.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generator::{IsoGenerator, IsoLayeredGenerator, IsoOrderedGenerator, IsoThresholdGenerator};
use crate::iso::Iso;

/// Which output arrays to materialize while draining a generator.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvelopeOptions {
    pub get_masses: bool,
    pub get_probs: bool,
    pub get_lprobs: bool,
    pub get_confs: bool,
}

impl EnvelopeOptions {
    pub fn all() -> Self {
        EnvelopeOptions {
            get_masses: true,
            get_probs: true,
            get_lprobs: true,
            get_confs: true,
        }
    }
}

/// Configuration for [`FixedEnvelope::from_threshold`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdConfig {
    pub threshold: f64,
    pub absolute: bool,
}

/// Configuration for [`FixedEnvelope::from_layered`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayeredConfig {
    pub target_coverage: f64,
    pub optimize: bool,
}

/// Dense, parallel-array materialization of a drained generator.
///
/// Each of the four arrays is present only if its corresponding
/// [`EnvelopeOptions`] toggle was set. `masses`/`lprobs`/`probs`/`confs`
/// take the buffer (leaving `None` behind) when `release` is `true`, or
/// clone it otherwise — mirroring the "transfer ownership to caller, who
/// must free it" contract of the array outputs this replaces.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedEnvelope {
    conf_len: usize,
    masses: Option<Vec<f64>>,
    lprobs: Option<Vec<f64>>,
    probs: Option<Vec<f64>>,
    confs: Option<Vec<i32>>,
}

impl FixedEnvelope {
    pub fn from_generator<G: IsoGenerator>(mut gen: G, options: EnvelopeOptions) -> Self {
        let conf_len = gen.conf_len();
        let mut masses = options.get_masses.then(Vec::new);
        let mut lprobs = options.get_lprobs.then(Vec::new);
        let mut probs = options.get_probs.then(Vec::new);
        let mut confs = options.get_confs.then(Vec::new);

        while gen.advance_to_next() {
            if let Some(m) = masses.as_mut() {
                m.push(gen.mass());
            }
            if let Some(l) = lprobs.as_mut() {
                l.push(gen.lprob());
            }
            if let Some(p) = probs.as_mut() {
                p.push(gen.prob());
            }
            if let Some(c) = confs.as_mut() {
                let mut buf = vec![0i32; conf_len];
                gen.get_conf_signature(&mut buf);
                c.extend_from_slice(&buf);
            }
        }

        FixedEnvelope {
            conf_len,
            masses,
            lprobs,
            probs,
            confs,
        }
    }

    pub fn from_threshold(iso: Iso, config: ThresholdConfig, options: EnvelopeOptions) -> Self {
        let gen = IsoThresholdGenerator::new(iso, config.threshold, config.absolute);
        Self::from_generator(gen, options)
    }

    pub fn from_layered(iso: Iso, config: LayeredConfig, options: EnvelopeOptions) -> Self {
        let gen = IsoLayeredGenerator::new(iso, config.target_coverage, config.optimize);
        Self::from_generator(gen, options)
    }

    pub fn from_ordered(iso: Iso, options: EnvelopeOptions) -> Self {
        let gen = IsoOrderedGenerator::new(iso);
        Self::from_generator(gen, options)
    }

    /// Number of configurations tabulated.
    pub fn confs_no(&self) -> usize {
        if let Some(m) = &self.masses {
            return m.len();
        }
        if let Some(l) = &self.lprobs {
            return l.len();
        }
        if let Some(p) = &self.probs {
            return p.len();
        }
        if let Some(c) = &self.confs {
            return c.len() / self.conf_len.max(1);
        }
        0
    }

    pub fn conf_len(&self) -> usize {
        self.conf_len
    }

    pub fn masses(&mut self, release: bool) -> Option<Vec<f64>> {
        if release {
            self.masses.take()
        } else {
            self.masses.clone()
        }
    }

    pub fn lprobs(&mut self, release: bool) -> Option<Vec<f64>> {
        if release {
            self.lprobs.take()
        } else {
            self.lprobs.clone()
        }
    }

    pub fn probs(&mut self, release: bool) -> Option<Vec<f64>> {
        if release {
            self.probs.take()
        } else {
            self.probs.clone()
        }
    }

    /// Flattened configurations, element-major then isotope-major: length
    /// `confs_no() * conf_len()`.
    pub fn confs(&mut self, release: bool) -> Option<Vec<i32>> {
        if release {
            self.confs.take()
        } else {
            self.confs.clone()
        }
    }
}
