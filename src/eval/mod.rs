/// Dependency declaration and cycle detection.
pub mod declaration;
/// Shared evaluator and per-caller contexts.
pub mod evaluator;
/// Stable sample fingerprints.
pub mod fingerprint;
/// Host signals and snapshots.
pub mod signal;
