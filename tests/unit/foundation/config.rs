use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = FramingConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.reference_sensor_width, 36.0);
    assert_eq!(cfg.up(), DVec3::Z);
}

#[test]
fn rejects_non_positive_values() {
    let bad_sensor = FramingConfig {
        reference_sensor_width: 0.0,
        ..FramingConfig::default()
    };
    assert!(bad_sensor.validate().is_err());

    let bad_eps = FramingConfig {
        depth_epsilon: f64::NAN,
        ..FramingConfig::default()
    };
    assert!(bad_eps.validate().is_err());

    let bad_up = FramingConfig {
        reference_up: DVec3::ZERO,
        ..FramingConfig::default()
    };
    assert!(bad_up.validate().is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: FramingConfig = serde_json::from_str(r#"{"reference_sensor_width": 24.0}"#).unwrap();
    assert_eq!(cfg.reference_sensor_width, 24.0);
    assert_eq!(cfg.depth_epsilon, 1e-4);
    assert_eq!(cfg.reference_up, DVec3::Z);
}
