/// Footprint-matched render resolution.
pub mod resolution;
