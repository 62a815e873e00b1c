use crate::foundation::core::DVec3;
use crate::foundation::error::{SquinchError, SquinchResult};

/// Distances below this are treated as coincident points during target setup.
pub(crate) const LENGTH_EPSILON: f64 = 1e-8;

/// Relative out-of-plane deviation tolerated for target vertices.
pub(crate) const COPLANAR_TOLERANCE: f64 = 1e-6;

/// One of the four framing corners, labelled in the target's in-plane basis.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CornerLabel {
    /// Smallest `u`, smallest `v`.
    BottomLeft,
    /// Largest `u`, smallest `v`.
    BottomRight,
    /// Smallest `u`, largest `v`.
    TopLeft,
    /// Largest `u`, largest `v`.
    TopRight,
}

impl CornerLabel {
    /// All corners in storage order.
    pub const ALL: [CornerLabel; 4] = [
        CornerLabel::BottomLeft,
        CornerLabel::BottomRight,
        CornerLabel::TopLeft,
        CornerLabel::TopRight,
    ];

    /// Storage index inside `[_; 4]` corner arrays.
    pub fn index(self) -> usize {
        match self {
            Self::BottomLeft => 0,
            Self::BottomRight => 1,
            Self::TopLeft => 2,
            Self::TopRight => 3,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomLeft => "bottom_left",
            Self::BottomRight => "bottom_right",
            Self::TopLeft => "top_left",
            Self::TopRight => "top_right",
        }
    }
}

/// Local-space extent of the target footprint along its in-plane axes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Footprint {
    /// Extent along the in-plane `u` axis.
    pub width: f64,
    /// Extent along the in-plane `v` axis.
    pub height: f64,
}

impl Footprint {
    /// Width over height.
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }
}

/// Flat rectangular target, reduced to four local corners and a stored normal.
///
/// Built once at setup. The normal sign is fixed here and only read afterwards, so the value can
/// be shared freely between concurrent evaluations.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlanarTarget {
    local_corners: [DVec3; 4],
    local_normal: DVec3,
    footprint: Footprint,
}

impl PlanarTarget {
    /// Build a target from the local-space vertices of a planar mesh.
    ///
    /// Corner selection is deterministic for any vertex count >= 4: vertices are projected onto
    /// the plane's in-plane basis and the four bounding corners of that footprint are used.
    pub fn from_local_vertices(vertices: &[DVec3]) -> SquinchResult<Self> {
        if vertices.len() < 4 {
            return Err(SquinchError::degenerate(format!(
                "target needs at least 4 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(SquinchError::validation("target vertices must be finite"));
        }

        let normal = plane_normal(vertices)?;
        let (u, v) = in_plane_basis(normal);
        let centroid =
            vertices.iter().fold(DVec3::ZERO, |acc, &p| acc + p) / vertices.len() as f64;

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        let mut max_off_plane = 0.0f64;
        for &p in vertices {
            let d = p - centroid;
            let (a, b) = (d.dot(u), d.dot(v));
            min_u = min_u.min(a);
            max_u = max_u.max(a);
            min_v = min_v.min(b);
            max_v = max_v.max(b);
            max_off_plane = max_off_plane.max(d.dot(normal).abs());
        }

        let footprint = Footprint {
            width: max_u - min_u,
            height: max_v - min_v,
        };
        if footprint.width < LENGTH_EPSILON || footprint.height < LENGTH_EPSILON {
            return Err(SquinchError::degenerate(format!(
                "target footprint has zero area ({} x {})",
                footprint.width, footprint.height
            )));
        }
        let extent = footprint.width.max(footprint.height);
        if max_off_plane > COPLANAR_TOLERANCE * extent {
            return Err(SquinchError::validation(format!(
                "target vertices are not coplanar (max deviation {max_off_plane:e})"
            )));
        }

        let at = |a: f64, b: f64| centroid + u * a + v * b;
        let local_corners = [
            at(min_u, min_v),
            at(max_u, min_v),
            at(min_u, max_v),
            at(max_u, max_v),
        ];

        Ok(Self {
            local_corners,
            local_normal: normal,
            footprint,
        })
    }

    /// Axis-aligned `width x height` rectangle centered at the local origin in the XY plane.
    pub fn from_rect(width: f64, height: f64) -> SquinchResult<Self> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::from_local_vertices(&[
            DVec3::new(-hw, -hh, 0.0),
            DVec3::new(hw, -hh, 0.0),
            DVec3::new(-hw, hh, 0.0),
            DVec3::new(hw, hh, 0.0),
        ])
    }

    /// Local-space corner positions, indexed by [`CornerLabel::index`].
    pub fn local_corners(&self) -> &[DVec3; 4] {
        &self.local_corners
    }

    /// Local-space corner for `label`.
    pub fn local_corner(&self, label: CornerLabel) -> DVec3 {
        self.local_corners[label.index()]
    }

    /// Unit normal in local space, sign fixed at setup.
    pub fn local_normal(&self) -> DVec3 {
        self.local_normal
    }

    /// Local footprint extents.
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }
}

/// Normal of the first non-collinear vertex triple, canonicalized so that its
/// largest-magnitude component is positive.
fn plane_normal(vertices: &[DVec3]) -> SquinchResult<DVec3> {
    let p0 = vertices[0];
    let Some(p1) = vertices[1..]
        .iter()
        .copied()
        .find(|p| (*p - p0).length() > LENGTH_EPSILON)
    else {
        return Err(SquinchError::degenerate("target vertices are coincident"));
    };

    let e1 = p1 - p0;
    let Some(n) = vertices[1..]
        .iter()
        .map(|&p| e1.cross(p - p0))
        .find(|c| c.length() > LENGTH_EPSILON * e1.length())
    else {
        return Err(SquinchError::degenerate("target vertices are collinear"));
    };

    let n = n.normalize();
    let abs = n.abs();
    let dominant = if abs.x >= abs.y && abs.x >= abs.z {
        n.x
    } else if abs.y >= abs.z {
        n.y
    } else {
        n.z
    };
    Ok(if dominant < 0.0 { -n } else { n })
}

/// Right-handed in-plane basis `(u, v)` with `u x v == normal`.
fn in_plane_basis(normal: DVec3) -> (DVec3, DVec3) {
    let up_ref = if normal.dot(DVec3::Z).abs() < 0.999 {
        DVec3::Z
    } else {
        DVec3::Y
    };
    let u = up_ref.cross(normal).normalize();
    let v = normal.cross(u);
    (u, v)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/target.rs"]
mod tests;
