use super::*;
use crate::foundation::core::{DVec3, FrameIndex};

const SCENE: &str = r#"{
    "duration": 10,
    "target": {
        "vertices": [[-2, -1, 0], [2, -1, 0], [2, 1, 0], [-2, 1, 0]],
        "transform": {
            "location": { "keys": [ { "frame": 0, "value": [0, 0, 0] }, { "frame": 10, "value": [10, 0, 0] } ] },
            "rotation_deg": [0, 0, 0]
        },
        "marker_offsets": { "top_right": [0.5, 0, 0] }
    },
    "viewpoint": {
        "motion": { "path": { "id": 3, "points": [[0, 0, 5], [10, 0, 5]], "offset": { "keys": [ { "frame": 0, "value": 0.0 }, { "frame": 10, "value": 1.0 } ] } } },
        "rotation_deg": [0, 0, 45]
    }
}"#;

fn host() -> SceneHost {
    let scene = Scene::from_reader(SCENE.as_bytes()).unwrap();
    SceneHost::new(&scene).unwrap()
}

#[test]
fn snapshot_resolves_every_signal() {
    let h = host();
    assert_eq!(h.path_parameters(), vec![3]);
    let s = h
        .snapshot(SampleTime {
            frame: FrameIndex(5),
            subframe: 0.0,
        })
        .unwrap();
    assert_eq!(s.time.frame, FrameIndex(5));
    assert!((s.viewpoint.location - DVec3::new(5.0, 0.0, 5.0)).length() < 1e-12);
    assert_eq!(s.path_parameters.get(&3), Some(&0.5));
    assert!((s.target_world.w_axis.x - 5.0).abs() < 1e-12);

    let bl = s.corners[CornerLabel::BottomLeft.index()];
    assert!((bl - DVec3::new(3.0, -1.0, 0.0)).length() < 1e-12);
    let tr = s.corners[CornerLabel::TopRight.index()];
    assert!((tr - DVec3::new(7.5, 1.0, 0.0)).length() < 1e-12);
}

#[test]
fn subframes_interpolate_motion() {
    let h = host();
    let s = h.snapshot(SampleTime::new(2, 0.5).unwrap()).unwrap();
    assert!((s.viewpoint.location.x - 2.5).abs() < 1e-12);
}

#[test]
fn snapshots_are_pure_in_time() {
    let h = host();
    let t = SampleTime::new(7, 0.25).unwrap();
    assert_eq!(h.snapshot(t).unwrap(), h.snapshot(t).unwrap());
}

#[test]
fn host_rotation_is_carried_but_separate() {
    let h = host();
    let s = h.snapshot(SampleTime::at_frame(0)).unwrap();
    let expected = crate::foundation::core::DQuat::from_rotation_z(45f64.to_radians());
    assert!(s.viewpoint.rotation.angle_between(expected) < 1e-12);
}

#[test]
fn invalid_scenes_are_rejected() {
    let bad = SCENE.replace("\"duration\": 10", "\"duration\": 0");
    let scene = Scene::from_reader(bad.as_bytes()).unwrap();
    assert!(SceneHost::new(&scene).is_err());

    let short = SCENE.replace("[[0, 0, 5], [10, 0, 5]]", "[[0, 0, 5]]");
    let scene = Scene::from_reader(short.as_bytes()).unwrap();
    assert!(SceneHost::new(&scene).is_err());

    assert!(Scene::from_reader("{ not json".as_bytes()).is_err());
}

#[test]
fn path_points_follow_arc_length() {
    let path = crate::scene::model::PathDef {
        id: 0,
        points: vec![DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0), DVec3::new(3.0, 1.0, 0.0)],
        offset: crate::scene::anim::Track::Constant(0.0),
    };
    assert_eq!(path.length(), 4.0);
    assert!((path.point_at(0.5) - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    assert!((path.point_at(1.0) - DVec3::new(3.0, 1.0, 0.0)).length() < 1e-12);
    assert_eq!(path.point_at(-1.0), DVec3::ZERO);
}
