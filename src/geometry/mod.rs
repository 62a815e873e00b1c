/// Per-sample world geometry.
pub mod sampler;
/// Target setup from mesh vertices.
pub mod target;
