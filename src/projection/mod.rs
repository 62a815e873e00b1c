/// Viewpoint-space projection of target corners.
pub mod projector;
