use super::*;
use crate::foundation::core::DQuat;

fn snapshot() -> SignalSnapshot {
    SignalSnapshot {
        time: SampleTime::at_frame(7),
        viewpoint: Pose::at(DVec3::new(1.0, 2.0, 3.0)),
        target_world: DMat4::IDENTITY,
        corners: [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)],
        path_parameters: BTreeMap::from([(0, 0.25)]),
    }
}

#[test]
fn words_carry_raw_bits() {
    let s = snapshot();
    let mut out = Vec::new();
    s.write_words(Signal::Time, &mut out).unwrap();
    s.write_words(Signal::ViewpointLocation, &mut out).unwrap();
    s.write_words(Signal::PathParameter(0), &mut out).unwrap();
    assert_eq!(out, vec![7, 1.0f64.to_bits(), 2.0f64.to_bits(), 3.0f64.to_bits(), 0.25f64.to_bits()]);

    out.clear();
    s.write_words(Signal::TargetTransform, &mut out).unwrap();
    assert_eq!(out.len(), 16);
}

#[test]
fn missing_path_parameter_is_a_validation_error() {
    let s = snapshot();
    let err = s
        .write_words(Signal::PathParameter(3), &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, SquinchError::Validation(_)));
    assert!(err.to_string().contains("path[3]"));
}

#[test]
fn reader_records_touched_signals() {
    let s = snapshot();
    let declared = [Signal::ViewpointLocation, Signal::TargetTransform];
    let r = SignalReader::new(&s, &declared);
    assert_eq!(r.touched_mask(), 0);
    assert_eq!(r.viewpoint_location(), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(r.touched_mask(), Signal::ViewpointLocation.mask_bit());
    let _ = r.target_world();
    assert_eq!(
        r.touched_mask(),
        Signal::ViewpointLocation.mask_bit() | Signal::TargetTransform.mask_bit()
    );
}

#[test]
fn rotation_is_not_exposed_to_readers() {
    // Only the host sees the driven rotation; two snapshots differing only there read the same.
    let a = snapshot();
    let mut b = snapshot();
    b.viewpoint.rotation = DQuat::from_rotation_z(1.0);
    let all: Vec<Signal> = CornerLabel::ALL
        .map(Signal::Corner)
        .into_iter()
        .chain([Signal::ViewpointLocation, Signal::TargetTransform])
        .collect();
    let (ra, rb) = (SignalReader::new(&a, &all), SignalReader::new(&b, &all));
    assert_eq!(ra.viewpoint_location(), rb.viewpoint_location());
    assert_eq!(ra.corners(), rb.corners());
    assert_eq!(ra.target_world(), rb.target_world());
}

#[test]
fn display_names() {
    assert_eq!(Signal::Corner(CornerLabel::TopLeft).to_string(), "corner.top_left");
    assert_eq!(Signal::ViewpointRotation.to_string(), "viewpoint.rotation");
    assert_eq!(Signal::PathParameter(2).to_string(), "path[2]");
}
