/*!
Exact enumeration of the isotopic fine structure of a chemical molecule.

A molecule's isotopic fine structure is the full discrete probability
distribution over its isotopologues — every way of assigning isotopes to its
atoms, each with a mass (sum of isotope masses) and a probability (the
multinomial likelihood of that assignment under each element's natural
abundances). Exhaustive enumeration is infeasible for anything but the
smallest molecules; this crate enumerates only the isotopologues a caller
actually wants, via best-first search bounded by a threshold, a target
coverage, or strict descending order.

## Enumerating above a threshold

```
# fn main() -> Result<(), Box<dyn std::error::Error>> {
use isospec::{EnvelopeOptions, FixedEnvelope, Iso, ThresholdConfig};

// Water: 2 hydrogens, 1 oxygen.
let water = Iso::new(
    &[2, 3],
    &[2, 1],
    &[1.00782503207, 2.0141017778, 15.99491461957, 16.99913170, 17.9991610],
    &[0.99985, 0.00015, 0.99757, 0.00038, 0.00205],
)?;

let mut envelope = FixedEnvelope::from_threshold(
    water,
    ThresholdConfig { threshold: 0.0001_f64.ln(), absolute: true },
    EnvelopeOptions::all(),
);
assert!(envelope.confs_no() > 0);
# Ok(())
# }
```

## Modules

- [`marginal`]: the per-element multinomial sub-distribution.
- [`marginal_trek`]: best-first enumeration of one marginal.
- [`precalculated_marginal`]: exhaustive cutoff-bounded enumeration of one marginal.
- [`iso`]: the joint distribution over all of a molecule's elements.
- [`generator`]: the threshold/layered/ordered whole-molecule generators.
- [`envelope`]: tabulating a generator into dense output arrays.
*/

mod arena;
mod conf;
mod element_table;
mod envelope;
mod error;
mod generator;
mod iso;
mod marginal;
mod marginal_trek;
mod numeric;
mod precalculated_marginal;

pub use crate::conf::Conf;
pub use crate::envelope::{EnvelopeOptions, FixedEnvelope, LayeredConfig, ThresholdConfig};
pub use crate::error::IsoSpecError;
pub use crate::generator::{IsoGenerator, IsoLayeredGenerator, IsoOrderedGenerator, IsoThresholdGenerator};
pub use crate::iso::Iso;
pub use crate::marginal::Marginal;
pub use crate::marginal_trek::MarginalTrek;
pub use crate::precalculated_marginal::PrecalculatedMarginal;
