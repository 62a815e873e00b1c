use super::*;

fn approx(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < 1e-12
}

#[test]
fn rect_selects_labelled_corners() {
    let t = PlanarTarget::from_rect(4.0, 2.0).unwrap();
    assert!(approx(t.local_normal(), DVec3::Z));
    assert!(approx(
        t.local_corner(CornerLabel::BottomLeft),
        DVec3::new(-2.0, -1.0, 0.0)
    ));
    assert!(approx(
        t.local_corner(CornerLabel::TopRight),
        DVec3::new(2.0, 1.0, 0.0)
    ));
    assert_eq!(t.footprint().width, 4.0);
    assert_eq!(t.footprint().height, 2.0);
    assert_eq!(t.footprint().aspect(), 2.0);
}

#[test]
fn extra_vertices_reduce_to_bounding_corners() {
    // Subdivided 2x2 plane: 9 vertices, interior and edge midpoints included.
    let mut verts = Vec::new();
    for y in [-1.0, 0.0, 1.0] {
        for x in [-1.0, 0.0, 1.0] {
            verts.push(DVec3::new(x, y, 0.0));
        }
    }
    let t = PlanarTarget::from_local_vertices(&verts).unwrap();
    assert!(approx(
        t.local_corner(CornerLabel::BottomLeft),
        DVec3::new(-1.0, -1.0, 0.0)
    ));
    assert!(approx(
        t.local_corner(CornerLabel::BottomRight),
        DVec3::new(1.0, -1.0, 0.0)
    ));
    assert!(approx(
        t.local_corner(CornerLabel::TopLeft),
        DVec3::new(-1.0, 1.0, 0.0)
    ));
}

#[test]
fn normal_sign_is_independent_of_vertex_winding() {
    let ccw = [
        DVec3::new(-1.0, -1.0, 0.0),
        DVec3::new(1.0, -1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(-1.0, 1.0, 0.0),
    ];
    let mut cw = ccw;
    cw.reverse();
    let a = PlanarTarget::from_local_vertices(&ccw).unwrap();
    let b = PlanarTarget::from_local_vertices(&cw).unwrap();
    assert!(approx(a.local_normal(), b.local_normal()));
    assert_eq!(a.local_corners(), b.local_corners());
}

#[test]
fn vertical_plane_uses_world_up_for_v() {
    // Plane in XZ (normal along Y): v must follow +Z.
    let verts = [
        DVec3::new(-1.0, 0.0, -0.5),
        DVec3::new(1.0, 0.0, -0.5),
        DVec3::new(-1.0, 0.0, 0.5),
        DVec3::new(1.0, 0.0, 0.5),
    ];
    let t = PlanarTarget::from_local_vertices(&verts).unwrap();
    assert!(approx(t.local_normal(), DVec3::Y));
    assert!(t.local_corner(CornerLabel::TopLeft).z > 0.0);
    assert!((t.footprint().height - 1.0).abs() < 1e-12);
    let e1 = t.local_corner(CornerLabel::BottomRight) - t.local_corner(CornerLabel::BottomLeft);
    let e2 = t.local_corner(CornerLabel::TopLeft) - t.local_corner(CornerLabel::BottomLeft);
    assert!(e1.cross(e2).dot(t.local_normal()) > 0.0);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let too_few = [DVec3::ZERO, DVec3::X, DVec3::Y];
    assert!(matches!(
        PlanarTarget::from_local_vertices(&too_few),
        Err(SquinchError::DegenerateGeometry(_))
    ));

    let collinear = [
        DVec3::ZERO,
        DVec3::X,
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(3.0, 0.0, 0.0),
    ];
    assert!(matches!(
        PlanarTarget::from_local_vertices(&collinear),
        Err(SquinchError::DegenerateGeometry(_))
    ));

    assert!(matches!(
        PlanarTarget::from_rect(0.0, 1.0),
        Err(SquinchError::DegenerateGeometry(_))
    ));
}

#[test]
fn non_planar_vertices_are_rejected() {
    let bent = [
        DVec3::new(-1.0, -1.0, 0.0),
        DVec3::new(1.0, -1.0, 0.0),
        DVec3::new(-1.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.5),
    ];
    assert!(matches!(
        PlanarTarget::from_local_vertices(&bent),
        Err(SquinchError::Validation(_))
    ));
}
