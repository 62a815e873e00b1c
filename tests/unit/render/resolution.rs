use super::*;

fn fp(width: f64, height: f64) -> Footprint {
    Footprint { width, height }
}

#[test]
fn matches_footprint_aspect() {
    let r = RenderResolution::for_footprint(fp(4.0, 3.0), 1920).unwrap();
    assert_eq!((r.x, r.y), (1920, 1440));
    assert_eq!(r.pixel_aspect, (1, 1));
}

#[test]
fn rounds_both_axes_to_even() {
    let r = RenderResolution::for_footprint(fp(3.0, 1.0), 1001).unwrap();
    assert_eq!(r.x % 2, 0);
    assert_eq!(r.y % 2, 0);
    assert_eq!(r.x, 1002);
    assert_eq!(r.y, 334);
}

#[test]
fn clamps_to_minimum_of_two() {
    let r = RenderResolution::for_footprint(fp(1000.0, 1.0), 2).unwrap();
    assert_eq!((r.x, r.y), (2, 2));
}

#[test]
fn rejects_degenerate_footprint() {
    assert!(RenderResolution::for_footprint(fp(1.0, 0.0), 1920).is_err());
}
