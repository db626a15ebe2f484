use core::f64::consts::{FRAC_PI_2, PI};
use cv_core::nalgebra::{Rotation3, Vector3};
use cv_core::{ObjectPoint, ObjectToCamera, Pose};
use cv_mbt::{Polygon, Stage, APPEARING_MARGIN};

const EPSILON: f64 = 1e-6;

/// A triangle centered on the optical axis whose normal makes `angle` with the
/// direction towards the camera.
fn face_at_angle(angle: f64) -> (Polygon, ObjectToCamera) {
    let face = Polygon::from_corners([
        ObjectPoint::new(-0.1, -0.1, 0.0),
        ObjectPoint::new(-0.1, 0.2, 0.0),
        ObjectPoint::new(0.2, -0.1, 0.0),
    ]);
    let pose = ObjectToCamera::from_parts(
        Vector3::new(0.0, 0.0, 5.0),
        Rotation3::from_axis_angle(&Vector3::x_axis(), angle),
    );
    (face, pose)
}

fn classify(angle: f64, alpha: f64, wrap_around: bool) -> (bool, bool) {
    let (mut face, pose) = face_at_angle(angle);
    let visible = face.is_visible(pose, alpha, wrap_around);
    assert_eq!(visible, face.is_visible_flag());
    (visible, face.is_appearing())
}

#[test]
fn visible_below_threshold() {
    assert_eq!(
        classify(FRAC_PI_2 - EPSILON, FRAC_PI_2, false),
        (true, false)
    );
    assert_eq!(classify(0.0, FRAC_PI_2, false), (true, false));
}

#[test]
fn appearing_just_past_threshold() {
    assert_eq!(
        classify(FRAC_PI_2 + EPSILON, FRAC_PI_2, false),
        (false, true)
    );
    assert_eq!(
        classify(FRAC_PI_2 + 0.5 * APPEARING_MARGIN, FRAC_PI_2, false),
        (false, true)
    );
    assert_eq!(
        classify(FRAC_PI_2 + APPEARING_MARGIN - EPSILON, FRAC_PI_2, false),
        (false, true)
    );
}

#[test]
fn hidden_past_appearing_band() {
    assert_eq!(
        classify(FRAC_PI_2 + APPEARING_MARGIN + EPSILON, FRAC_PI_2, false),
        (false, false)
    );
    assert_eq!(classify(PI, FRAC_PI_2, false), (false, false));
}

#[test]
fn wrap_around_accepts_back_faces() {
    let alpha = 30f64.to_radians();
    let back_face = PI - 10f64.to_radians();
    assert_eq!(classify(back_face, alpha, false), (false, false));
    assert_eq!(classify(back_face, alpha, true), (true, false));

    let almost_back_face = PI - alpha - 0.5 * APPEARING_MARGIN;
    assert_eq!(classify(almost_back_face, alpha, false), (false, false));
    assert_eq!(classify(almost_back_face, alpha, true), (false, true));
}

#[test]
fn visibility_transforms_the_face() {
    let (mut face, pose) = face_at_angle(0.0);
    face.is_visible(pose, FRAC_PI_2, false);
    assert_eq!(face.stage(), Stage::Transformed);
    let corners = face.transformed_corners().unwrap();
    assert!(corners.iter().all(|corner| (corner.depth() - 5.0).abs() < 1e-12));
}

#[test]
fn lines_are_always_visible() {
    let mut line = Polygon::from_corners([
        ObjectPoint::new(0.0, 0.0, 0.0),
        ObjectPoint::new(1.0, 0.0, 0.0),
    ]);
    let behind = ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, -10.0), Rotation3::identity());
    assert!(line.is_visible(behind, 0.0, false));
    assert!(line.is_visible_flag());
    assert!(!line.is_appearing());
    assert_eq!(line.stage(), Stage::Uninitialized);
}

#[test]
fn collinear_face_is_hidden() {
    let mut face = Polygon::from_corners([
        ObjectPoint::new(0.0, 0.0, 0.0),
        ObjectPoint::new(1.0, 0.0, 0.0),
        ObjectPoint::new(2.0, 0.0, 0.0),
    ]);
    let pose = ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, 3.0), Rotation3::identity());
    assert!(!face.is_visible(pose, PI, true));
    assert!(!face.is_appearing());
}
