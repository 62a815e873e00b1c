use super::*;
use crate::foundation::core::{DMat4, DVec3, Pose, SampleTime};
use std::collections::BTreeMap;

fn snapshot(x: f64) -> SignalSnapshot {
    SignalSnapshot {
        time: SampleTime::at_frame(1),
        viewpoint: Pose::at(DVec3::new(x, 0.0, 5.0)),
        target_world: DMat4::IDENTITY,
        corners: [DVec3::ZERO; 4],
        path_parameters: BTreeMap::new(),
    }
}

#[test]
fn keys_are_deterministic() {
    let signals = [Signal::Time, Signal::ViewpointLocation];
    let a = SampleKey::from_snapshot(&snapshot(1.0), &signals).unwrap();
    let b = SampleKey::from_snapshot(&snapshot(1.0), &signals).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn keys_change_with_declared_values_only() {
    let signals = [Signal::Time, Signal::ViewpointLocation];
    let a = SampleKey::from_snapshot(&snapshot(1.0), &signals).unwrap();
    let b = SampleKey::from_snapshot(&snapshot(1.5), &signals).unwrap();
    assert_ne!(a, b);
    assert_ne!(a.fingerprint, b.fingerprint);

    let mut rotated = snapshot(1.0);
    rotated.viewpoint.rotation = crate::foundation::core::DQuat::from_rotation_y(0.3);
    let c = SampleKey::from_snapshot(&rotated, &signals).unwrap();
    assert_eq!(a, c);
}

#[test]
fn signed_zero_is_a_distinct_key() {
    let signals = [Signal::ViewpointLocation];
    let a = SampleKey::from_snapshot(&snapshot(0.0), &signals).unwrap();
    let b = SampleKey::from_snapshot(&snapshot(-0.0), &signals).unwrap();
    assert_ne!(a, b);
}

#[test]
fn fingerprint_displays_as_hex() {
    let f = fingerprint_f64s(&[1.0, 2.0]);
    let s = f.to_string();
    assert_eq!(s.len(), 32);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(f, fingerprint_f64s(&[2.0, 1.0]));
}
