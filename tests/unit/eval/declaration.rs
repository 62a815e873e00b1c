use super::*;

#[test]
fn standard_declaration_orders_orientation_first() {
    let d = DependencyDeclaration::standard().unwrap();
    assert_eq!(d.order(), &[DerivedValue::Orientation, DerivedValue::Intrinsics]);
    assert_eq!(
        d.driver_of(Signal::ViewpointRotation),
        Some(DerivedValue::Orientation)
    );
}

#[test]
fn closure_follows_upstream_signals() {
    let d = DeclarationBuilder::new().path_parameter(0).build().unwrap();
    for derived in DerivedValue::ALL {
        assert!(d.depends_on(derived, Signal::ViewpointLocation));
        assert!(d.depends_on(derived, Signal::TargetTransform));
        assert!(d.depends_on(derived, Signal::Time));
        assert!(d.depends_on(derived, Signal::Subframe));
        assert!(d.depends_on(derived, Signal::PathParameter(0)));
        for c in CornerLabel::ALL {
            assert!(d.depends_on(derived, Signal::Corner(c)));
        }
        // The output written back into the rotation never feeds the computation.
        assert!(!d.depends_on(derived, Signal::ViewpointRotation));
    }
    assert!(!d.declared_signals().contains(&Signal::ViewpointRotation));
    assert!(
        d.inputs_of(DerivedValue::Intrinsics)
            .any(|i| i == Input::Derived(DerivedValue::Orientation))
    );
}

#[test]
fn signals_are_sorted_for_stable_keys() {
    let d = DeclarationBuilder::new()
        .path_parameter(4)
        .path_parameter(1)
        .build()
        .unwrap();
    let s = d.signals_for(DerivedValue::Intrinsics);
    assert!(s.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn reading_a_driven_signal_is_a_cycle() {
    let err = DeclarationBuilder::new()
        .declare(DerivedValue::Orientation, Signal::ViewpointRotation)
        .build()
        .unwrap_err();
    let SquinchError::CyclicDependency { path } = err else {
        panic!("expected cyclic dependency, got {err:?}");
    };
    assert_eq!(path, "orientation -> viewpoint.rotation -> orientation");
}

#[test]
fn indirect_cycle_through_intrinsics_is_reported() {
    let err = DeclarationBuilder::new()
        .drive(Signal::ViewpointLocation, DerivedValue::Intrinsics)
        .build()
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("cyclic dependency: "), "{msg}");
    assert!(msg.contains("intrinsics"), "{msg}");
    assert!(msg.contains("viewpoint.location"), "{msg}");
}

#[test]
fn extra_edges_between_derived_values_are_ordered() {
    // Intrinsics already reads orientation; re-declaring the edge is harmless.
    let d = DeclarationBuilder::new()
        .declare(DerivedValue::Intrinsics, DerivedValue::Orientation)
        .build()
        .unwrap();
    assert_eq!(d.order(), &[DerivedValue::Orientation, DerivedValue::Intrinsics]);

    let err = DeclarationBuilder::new()
        .declare(DerivedValue::Orientation, DerivedValue::Intrinsics)
        .build()
        .unwrap_err();
    assert!(matches!(err, SquinchError::CyclicDependency { .. }));
}
