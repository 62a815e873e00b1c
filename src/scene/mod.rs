/// Keyframed scene values.
pub mod anim;
/// Scene boundary object.
pub mod document;
/// Stand-in host.
pub mod host;
/// JSON scene description.
pub mod model;
