//! Whole-molecule joint generators built atop per-element marginals.

mod layered;
mod ordered;
mod threshold;

pub use layered::IsoLayeredGenerator;
pub use ordered::IsoOrderedGenerator;
pub use threshold::IsoThresholdGenerator;

/// Common pull interface every joint generator implements.
///
/// Callers loop `while gen.advance_to_next() { ... }`; `mass`/`lprob`/`prob`
/// and [`IsoGenerator::get_conf_signature`] query the configuration most
/// recently advanced to. Querying before the first `advance_to_next` call,
/// or after it has returned `false`, is a documented precondition
/// violation, not a checked error.
pub trait IsoGenerator {
    fn advance_to_next(&mut self) -> bool;
    fn mass(&self) -> f64;
    fn lprob(&self) -> f64;
    fn prob(&self) -> f64 {
        self.lprob().exp()
    }
    /// Total length of a flattened configuration signature (sum of every
    /// element's isotope count `k`).
    fn conf_len(&self) -> usize;
    /// Write the current configuration into `buf`, element-major then
    /// isotope-major, as described in the output layout of [`crate::envelope::FixedEnvelope`].
    /// `buf.len()` must equal [`IsoGenerator::conf_len`].
    fn get_conf_signature(&self, buf: &mut [i32]);
}
