//! Fatal error taxonomy for the comparison engine.
//!
//! Only structural invariant violations surface here; data-quality issues
//! (malformed deprecation annotations) are recorded as actions and never
//! abort a run. The other fatal case the engine's contract names, an
//! unrecognized symbol kind, cannot occur in this implementation: symbol
//! kinds are a closed enum and every dispatch over them is exhaustive.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    /// A symbol's file path does not sit inside the cloned vendor layout, so
    /// its owning module cannot be determined. Partial results must not be
    /// trusted after this.
    #[error("cannot resolve owning module for path `{0}`")]
    ModuleResolution(String),
}
