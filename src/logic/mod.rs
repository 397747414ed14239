//! Update-detection and classification pipeline split into modular submodules.

pub mod aggregate;
pub mod check;
pub mod classify;
pub mod legacy;
pub mod phasing;
pub mod simulate;

// Re-export public APIs so callers can stay at `crate::logic::...`
pub use aggregate::{aggregate, last_index_refresh};
pub use check::{CheckError, EngineConfig, UpdateChecker};
pub use classify::{Classification, Classifier, PolicyVerdict, classify_policy};
pub use legacy::parse_upgradable;
pub use phasing::resolve_phasing;
pub use simulate::{SimulationOutput, parse_simulation};
