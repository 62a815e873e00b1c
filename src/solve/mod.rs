/// Focal scale and shift solver.
pub mod intrinsics;
/// Perpendicular orientation solver.
pub mod orientation;
