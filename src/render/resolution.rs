use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::Footprint;

/// Render resolution whose aspect matches the target footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderResolution {
    /// Horizontal pixels.
    pub x: u32,
    /// Vertical pixels.
    pub y: u32,
    /// Pixel aspect as `(x, y)`; always square.
    pub pixel_aspect: (u32, u32),
}

impl RenderResolution {
    /// Derive a resolution from the target's in-plane footprint.
    ///
    /// Both axes are rounded to the nearest even integer (minimum 2) so common encoders accept
    /// them.
    pub fn for_footprint(footprint: Footprint, base_x: u32) -> SquinchResult<Self> {
        let aspect = footprint.aspect();
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(SquinchError::degenerate(format!(
                "target footprint has no usable aspect ({} x {})",
                footprint.width, footprint.height
            )));
        }
        let x = nearest_even(f64::from(base_x));
        let y = nearest_even(f64::from(x) / aspect);
        Ok(Self {
            x,
            y,
            pixel_aspect: (1, 1),
        })
    }

    /// `x / y` aspect ratio.
    pub fn aspect(&self) -> f64 {
        f64::from(self.x) / f64::from(self.y)
    }
}

fn nearest_even(v: f64) -> u32 {
    let half = (v / 2.0).round();
    let even = (half * 2.0).clamp(2.0, f64::from(u32::MAX - 1));
    even as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/resolution.rs"]
mod tests;
