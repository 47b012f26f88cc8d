//! Avatar Driver Tests
//!
//! Tests for:
//! - Binding a skeleton and driving it from encoded textures
//! - Dropped-frame handling
//! - Subject layer selection
//! - Recording through the render-loop tick
//! - Configuration loading

use glam::{Quat, Vec3};

use mocap::config::MotionConfig;
use mocap::errors::MocapError;
use mocap::motion::{BoneChannelLayout, HumanBone, MotionSample, codec};
use mocap::retarget::AvatarCalibration;
use mocap::skeleton::{Skeleton, Transform};
use mocap::Avatar;

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn simple_rig() -> Skeleton {
    let mut skeleton = Skeleton::new();
    let hips = skeleton.add_bone(
        "Hips",
        None,
        Transform::from_trs(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    let spine = skeleton.add_bone(
        "Spine",
        Some(hips),
        Transform::from_trs(Vec3::new(0.0, 0.1, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    skeleton.add_bone(
        "Head",
        Some(spine),
        Transform::from_trs(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    skeleton
}

/// A two-subject texture with hips heights `y0` and `y1`.
fn texture(y0: f32, y1: f32) -> Vec<u8> {
    let layout = BoneChannelLayout::humanoid();
    let mut frame = layout.rest_frame(2);
    for (layer, y) in [(0, y0), (1, y1)] {
        layout
            .write_samples(
                &[MotionSample::full(HumanBone::Hips, Vec3::new(0.0, y, 0.0), Quat::IDENTITY, 1.0)],
                &mut frame,
                layer,
            )
            .unwrap();
    }
    codec::encode(frame.channels())
}

fn hips_position(rig: &Skeleton) -> Vec3 {
    let key = rig.humanoid_bone(HumanBone::Hips).unwrap();
    rig.bone(key).unwrap().transform.position
}

// ============================================================================
// Binding and ticking
// ============================================================================

#[test]
fn bound_avatar_drives_rig() {
    let mut rig = simple_rig();
    let mut avatar = Avatar::bind(&rig, &MotionConfig::default()).unwrap();
    assert_eq!(avatar.texture_size(), (8, 110));
    assert_eq!(avatar.calibration().len(), 3);

    let mut pixels = texture(0.5, 1.5);
    assert!(avatar.tick(&mut pixels, &mut rig, 1.0 / 60.0));

    assert_eq!(avatar.pose().len(), 3);
    assert!(vec3_approx(hips_position(&rig), Vec3::new(0.0, 0.5, 0.0)));
    assert_eq!(avatar.dropped_frames(), 0);
}

#[test]
fn bad_frame_keeps_previous_pose() {
    let mut rig = simple_rig();
    let mut avatar = Avatar::bind(&rig, &MotionConfig::default()).unwrap();

    let mut good = texture(0.5, 1.5);
    assert!(avatar.tick(&mut good, &mut rig, 0.1));
    let before = avatar.pose().clone();

    let mut truncated = vec![0u8; 10];
    assert!(!avatar.tick(&mut truncated, &mut rig, 0.1));
    assert_eq!(avatar.dropped_frames(), 1);
    assert_eq!(avatar.pose(), &before);
    assert!(vec3_approx(hips_position(&rig), Vec3::new(0.0, 0.5, 0.0)));

    let err = avatar.update(&truncated).unwrap_err();
    assert!(matches!(err, MocapError::PixelBufferSize { actual: 10, .. }));
}

#[test]
fn second_layer_follows_second_subject() {
    let mut rig = simple_rig();
    let config = MotionConfig {
        layer: 1,
        ..Default::default()
    };
    let mut avatar = Avatar::bind(&rig, &config).unwrap();

    let mut pixels = texture(0.5, 1.5);
    assert!(avatar.tick(&mut pixels, &mut rig, 0.1));
    assert!(vec3_approx(hips_position(&rig), Vec3::new(0.0, 1.5, 0.0)));
}

#[test]
fn layer_outside_texture_is_rejected() {
    let layout = BoneChannelLayout::humanoid();
    let calibration = AvatarCalibration::identity(&layout, 1.0);
    let config = MotionConfig {
        layers: 2,
        layer: 2,
        ..Default::default()
    };
    let result = Avatar::with_calibration(layout, calibration, &config);
    assert!(matches!(result, Err(MocapError::LayerOutOfRange { layer: 2, layers: 2 })));
}

// ============================================================================
// Recording
// ============================================================================

#[test]
fn recording_through_ticks() {
    let mut rig = simple_rig();
    let mut avatar = Avatar::bind(&rig, &MotionConfig::default()).unwrap();
    assert!(!avatar.is_recording());
    assert!(avatar.stop_recording().is_none());

    avatar.start_recording();
    assert!(avatar.is_recording());
    for i in 0..3 {
        let mut pixels = texture(0.5 + i as f32 * 0.1, 1.5);
        avatar.tick(&mut pixels, &mut rig, 0.5);
    }
    assert!((avatar.recording_time().unwrap() - 1.5).abs() < EPSILON);

    let clip = avatar.stop_recording().unwrap();
    assert!(!avatar.is_recording());
    assert_eq!(clip.len(), 3);
    let times: Vec<f32> = clip.samples().iter().map(|s| s.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);

    let last_hips = clip.samples()[2].pose.get(HumanBone::Hips).unwrap();
    assert!(vec3_approx(last_hips.position.unwrap(), Vec3::new(0.0, 0.7, 0.0)));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_json_fills_defaults() {
    let config = MotionConfig::from_json_str(r#"{ "layer": 1, "flip_z": false }"#).unwrap();
    assert_eq!(config.layer, 1);
    assert!(!config.flip_z);
    assert_eq!(config.layers, 2);
    assert!((config.wrap_period - 10.0).abs() < EPSILON);
    assert!(!config.retarget_config().flip_z);

    assert!(matches!(
        MotionConfig::from_json_str("{ \"layers\": -1 }"),
        Err(MocapError::JsonError(_))
    ));
    assert!(matches!(
        MotionConfig::from_path("/nonexistent/motion.json"),
        Err(MocapError::IoError(_))
    ));
}
