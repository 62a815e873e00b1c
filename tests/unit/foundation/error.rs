use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SquinchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SquinchError::degenerate("x")
            .to_string()
            .contains("degenerate geometry:")
    );
    assert!(
        SquinchError::zero_span(0.0, 1e-9)
            .to_string()
            .contains("zero projected span:")
    );
    assert!(
        SquinchError::cyclic("a -> a")
            .to_string()
            .contains("cyclic dependency: a -> a")
    );
    assert!(
        SquinchError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        SquinchError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SquinchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn per_sample_classification() {
    assert!(SquinchError::degenerate("x").is_per_sample());
    assert!(SquinchError::zero_span(0.0, 1e-9).is_per_sample());
    assert!(!SquinchError::cyclic("a -> a").is_per_sample());
    assert!(!SquinchError::validation("x").is_per_sample());
}
