use super::*;

fn kf(keys: &[(u64, f64)], mode: InterpMode) -> Keyframes<f64> {
    Keyframes {
        keys: keys
            .iter()
            .map(|&(frame, value)| Keyframe {
                frame,
                value,
                ease: Ease::Linear,
            })
            .collect(),
        mode,
    }
}

#[test]
fn samples_between_keys_at_fractional_time() {
    let k = kf(&[(0, 0.0), (10, 10.0)], InterpMode::Linear);
    assert_eq!(k.sample(0.0).unwrap(), 0.0);
    assert_eq!(k.sample(2.5).unwrap(), 2.5);
    assert_eq!(k.sample(10.0).unwrap(), 10.0);
}

#[test]
fn clamps_outside_key_range() {
    let k = kf(&[(5, 1.0), (10, 2.0)], InterpMode::Linear);
    assert_eq!(k.sample(0.0).unwrap(), 1.0);
    assert_eq!(k.sample(99.0).unwrap(), 2.0);
}

#[test]
fn hold_keeps_previous_value() {
    let k = kf(&[(0, 1.0), (4, 3.0)], InterpMode::Hold);
    assert_eq!(k.sample(3.9).unwrap(), 1.0);
    assert_eq!(k.sample(4.0).unwrap(), 3.0);
}

#[test]
fn ease_shapes_progress() {
    let mut k = kf(&[(0, 0.0), (10, 1.0)], InterpMode::Linear);
    k.keys[0].ease = Ease::InQuad;
    assert!((k.sample(5.0).unwrap() - 0.25).abs() < 1e-12);
    assert_eq!(Ease::InOutCubic.apply(0.5), 0.5);
    assert_eq!(Ease::OutQuad.apply(2.0), 1.0);
}

#[test]
fn validation_rejects_bad_tracks() {
    assert!(kf(&[], InterpMode::Linear).validate().is_err());
    assert!(kf(&[(5, 0.0), (1, 1.0)], InterpMode::Linear).validate().is_err());
    assert!(kf(&[(0, f64::NAN)], InterpMode::Linear).validate().is_err());
    assert!(Track::Constant(f64::INFINITY).validate().is_err());
    assert!(Track::Constant(DVec3::ONE).validate().is_ok());
}

#[test]
fn tracks_parse_constant_or_keyframed() {
    let c: Track<DVec3> = serde_json::from_str("[1.0, 2.0, 3.0]").unwrap();
    assert_eq!(c.sample(7.0).unwrap(), DVec3::new(1.0, 2.0, 3.0));

    let k: Track<f64> = serde_json::from_str(
        r#"{ "keys": [ { "frame": 0, "value": 0.0 }, { "frame": 4, "value": 1.0, "ease": "in_quad" } ] }"#,
    )
    .unwrap();
    assert_eq!(k.sample(2.0).unwrap(), 0.5);
}
