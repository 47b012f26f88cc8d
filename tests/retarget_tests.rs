//! Pose Retargeting Tests
//!
//! Tests for:
//! - Calibration identity (no spurious rotation from calibration alone)
//! - Root position wraparound and height-ratio scaling
//! - Missing-bone tolerance
//! - Handedness conversion and axis signs
//! - End-to-end decode -> retarget of a rest frame

use glam::{Quat, Vec3};

use mocap::motion::{
    BoneChannelLayout, BoneSlot, HumanBone, MotionSample, MotionTextureCodec, SlotArity,
};
use mocap::retarget::{
    AvatarCalibration, BoneCalibration, PoseRetargeter, ReferenceFrame, ReferencePoses,
    RetargetConfig, unwrap_position,
};
use mocap::skeleton::{HumanoidRig, Skeleton, Transform};

const EPSILON: f32 = 1e-5;

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn unflipped() -> RetargetConfig {
    RetargetConfig {
        flip_z: false,
        ..Default::default()
    }
}

/// Hips at (0, 1, 0) rotated about Y, with a tilted spine above it.
fn two_bone_rig() -> Skeleton {
    let mut skeleton = Skeleton::new();
    let hips = skeleton.add_bone(
        "Hips",
        None,
        Transform::from_trs(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(0.3), Vec3::ONE),
    );
    skeleton.add_bone(
        "Spine",
        Some(hips),
        Transform::from_trs(Vec3::new(0.0, 0.1, 0.0), Quat::from_rotation_x(0.2), Vec3::ONE),
    );
    skeleton
}

fn two_bone_layout() -> BoneChannelLayout {
    BoneChannelLayout::new(vec![
        BoneSlot {
            bone: HumanBone::Hips,
            arity: SlotArity::Full,
        },
        BoneSlot {
            bone: HumanBone::Spine,
            arity: SlotArity::Swing,
        },
    ])
    .unwrap()
}

// ============================================================================
// Calibration identity
// ============================================================================

#[test]
fn identity_motion_reproduces_bind_rotation() {
    let rig = two_bone_rig();
    let layout = two_bone_layout();
    let references = ReferencePoses::uniform(
        &[HumanBone::Hips, HumanBone::Spine],
        ReferenceFrame::IDENTITY,
    );
    let calibration = AvatarCalibration::compute(&rig, &layout, &references, true);
    assert_eq!(calibration.len(), 2);
    assert!((calibration.target_hip_height() - 1.0).abs() < EPSILON);

    let samples = [
        MotionSample::full(HumanBone::Hips, Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, 1.0),
        MotionSample::swing(HumanBone::Spine, Vec3::ZERO),
    ];
    let pose = PoseRetargeter::default().retarget_samples(&samples, &calibration);

    let hips = pose.get(HumanBone::Hips).unwrap();
    assert!(quat_approx(hips.rotation, Quat::from_rotation_y(0.3)), "{}", hips.rotation);
    assert!(vec3_approx(hips.position.unwrap(), Vec3::new(0.0, 1.0, 0.0)));

    let spine = pose.get(HumanBone::Spine).unwrap();
    assert!(quat_approx(spine.rotation, Quat::from_rotation_x(0.2)), "{}", spine.rotation);
}

#[test]
fn inverse_calibration_pair_is_neutral() {
    let q = Quat::from_axis_angle(Vec3::new(0.2, 1.0, -0.4).normalize(), 1.3);
    let mut calibration = AvatarCalibration::new(1.0);
    calibration.insert(
        HumanBone::Head,
        BoneCalibration {
            rest_to_world: q,
            world_to_rest: q.inverse(),
            ..BoneCalibration::IDENTITY
        },
    );

    let samples = [MotionSample::swing(HumanBone::Head, Vec3::ZERO)];
    let pose = PoseRetargeter::default().retarget_samples(&samples, &calibration);
    assert!(quat_approx(pose.bones[0].rotation, Quat::IDENTITY));
}

#[test]
fn calibration_conjugates_decoded_rotation() {
    let frame = Quat::from_rotation_z(0.9);
    let mut calibration = AvatarCalibration::new(1.0);
    calibration.insert(
        HumanBone::Neck,
        BoneCalibration {
            rest_to_world: frame,
            world_to_rest: frame.inverse(),
            ..BoneCalibration::IDENTITY
        },
    );

    let decoded = Quat::from_rotation_x(0.4);
    let samples = [MotionSample {
        bone: HumanBone::Neck,
        translation: None,
        rotation: mocap::RotationEncoding::Explicit(decoded),
        scale: None,
    }];
    let pose = PoseRetargeter::new(unflipped()).retarget_samples(&samples, &calibration);
    assert!(quat_approx(pose.bones[0].rotation, frame * decoded * frame.inverse()));
}

// ============================================================================
// Root position
// ============================================================================

#[test]
fn unwrap_position_removes_nearest_period() {
    let t = unwrap_position(Vec3::new(9.5, -14.0, 3.0), 10.0);
    assert!(vec3_approx(t, Vec3::new(-0.5, -4.0, 3.0)), "{t}");
    assert_eq!(unwrap_position(Vec3::splat(12.0), 0.0), Vec3::splat(12.0));
}

#[test]
fn wraparound_does_not_teleport() {
    let period = 10.0;
    let eps = 0.01;
    let retargeter = PoseRetargeter::new(RetargetConfig {
        wrap_period: period,
        ..unflipped()
    });
    let calibration = AvatarCalibration::identity(&BoneChannelLayout::humanoid(), 1.0);

    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        let near_top = [MotionSample::full(HumanBone::Hips, axis * (period - eps), Quat::IDENTITY, 1.0)];
        let near_zero = [MotionSample::full(HumanBone::Hips, axis * -eps, Quat::IDENTITY, 1.0)];

        let a = retargeter.retarget_samples(&near_top, &calibration).bones[0].position.unwrap();
        let b = retargeter.retarget_samples(&near_zero, &calibration).bones[0].position.unwrap();
        assert!((a - b).length() <= 2.0 * eps, "axis {axis}: {a} vs {b}");
    }
}

#[test]
fn height_ratio_scales_translation_and_scale() {
    let retargeter = PoseRetargeter::new(RetargetConfig {
        source_hip_height: 1.0,
        ..unflipped()
    });
    let calibration = AvatarCalibration::identity(&BoneChannelLayout::humanoid(), 2.0);
    assert!((retargeter.height_ratio(&calibration) - 2.0).abs() < EPSILON);

    let samples = [MotionSample::full(HumanBone::Hips, Vec3::new(0.5, 1.0, 0.25), Quat::IDENTITY, 1.0)];
    let hips = retargeter.retarget_samples(&samples, &calibration).bones[0];
    assert!(vec3_approx(hips.position.unwrap(), Vec3::new(1.0, 2.0, 0.5)));
    assert!((hips.scale.unwrap() - 0.5).abs() < EPSILON);
}

#[test]
fn hips_position_lands_in_parent_space() {
    let mut rig = Skeleton::new();
    let armature = rig.add_bone(
        "Armature",
        None,
        Transform::from_trs(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    rig.add_bone(
        "Hips",
        Some(armature),
        Transform::from_trs(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    let layout = two_bone_layout();
    let references = ReferencePoses::uniform(&[HumanBone::Hips], ReferenceFrame::IDENTITY);
    let calibration = AvatarCalibration::compute(&rig, &layout, &references, false);

    let samples = [MotionSample::full(HumanBone::Hips, Vec3::new(0.2, 1.0, 0.0), Quat::IDENTITY, 1.0)];
    let hips = PoseRetargeter::new(unflipped()).retarget_samples(&samples, &calibration).bones[0];
    assert!(vec3_approx(hips.position.unwrap(), Vec3::new(0.2, 0.5, 0.0)));
}

/// Encodes a single hips translation, decodes it and retargets it with an
/// identity calibration.
fn through_codec(t: Vec3, retargeter: &PoseRetargeter) -> Vec3 {
    let layout = BoneChannelLayout::humanoid();
    let mut frame = layout.rest_frame(1);
    layout
        .write_samples(&[MotionSample::full(HumanBone::Hips, t, Quat::IDENTITY, 1.0)], &mut frame, 0)
        .unwrap();

    let mut codec = MotionTextureCodec::for_layout(&layout, 1).unwrap();
    let pixels = codec.encode(&frame).unwrap();
    let decoded = codec.decode(&pixels).unwrap();

    let calibration = AvatarCalibration::identity(&layout, 1.0);
    let pose = retargeter.retarget(decoded, &layout, 0, &calibration).unwrap();
    pose.get(HumanBone::Hips).unwrap().position.unwrap()
}

#[test]
fn decoded_translation_outside_channel_range() {
    let retargeter = PoseRetargeter::new(unflipped());
    let t = Vec3::new(-2.5, 1.0, 4.0);
    let back = through_codec(t, &retargeter);
    assert!((back - t).abs().max_element() < 1e-4, "{t} came back as {back}");
}

#[test]
fn decoded_translation_crosses_wrap_boundary() {
    let retargeter = PoseRetargeter::new(unflipped());
    let eps = 0.01;
    let near_top = through_codec(Vec3::new(10.0 - eps, 1.0, 0.0), &retargeter);
    let near_zero = through_codec(Vec3::new(-eps, 1.0, 0.0), &retargeter);

    assert!((near_top - near_zero).length() <= 2.0 * eps, "{near_top} vs {near_zero}");
    assert!((near_zero - Vec3::new(-eps, 1.0, 0.0)).abs().max_element() < 1e-4, "{near_zero}");
}

// ============================================================================
// Missing bones
// ============================================================================

#[test]
fn missing_bones_are_skipped() {
    // Body bones only: no fingers, no jaw.
    let mut rig = Skeleton::new();
    let hips = rig.add_bone(
        "Hips",
        None,
        Transform::from_trs(Vec3::new(0.0, 0.9, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    let body: Vec<HumanBone> = HumanBone::ALL
        .iter()
        .copied()
        .filter(|b| b.index() <= HumanBone::RightEye.index() || *b == HumanBone::UpperChest)
        .filter(|b| *b != HumanBone::Hips)
        .collect();
    for bone in &body {
        rig.add_bone(bone.name(), Some(hips), Transform::new());
    }

    let layout = BoneChannelLayout::humanoid();
    let calibration = AvatarCalibration::compute(&rig, &layout, &ReferencePoses::humanoid(), true);
    let frame = layout.rest_frame(1);
    let pose = PoseRetargeter::default()
        .retarget(&frame, &layout, 0, &calibration)
        .unwrap();

    assert_eq!(pose.len(), body.len() + 1);
    assert_eq!(pose.len(), 24);
    assert!(pose.get(HumanBone::LeftIndexProximal).is_none());
    assert!(pose.get(HumanBone::Jaw).is_none());
}

#[test]
fn jaw_is_never_calibrated() {
    let mut rig = Skeleton::new();
    let head = rig.add_bone("Head", None, Transform::new());
    rig.add_bone("Jaw", Some(head), Transform::new());
    assert!(rig.bind_pose(HumanBone::Jaw).is_some());

    let calibration = AvatarCalibration::compute(
        &rig,
        &BoneChannelLayout::humanoid(),
        &ReferencePoses::humanoid(),
        true,
    );
    assert!(calibration.get(HumanBone::Head).is_some());
    assert!(calibration.get(HumanBone::Jaw).is_none());
}

// ============================================================================
// Handedness
// ============================================================================

#[test]
fn flip_z_mirrors_rotation_and_translation() {
    let calibration = AvatarCalibration::identity(&BoneChannelLayout::humanoid(), 1.0);
    let samples = [MotionSample::full(
        HumanBone::Hips,
        Vec3::new(0.1, 0.2, 0.3),
        Quat::from_rotation_y(0.5),
        1.0,
    )];

    let flipped = PoseRetargeter::default().retarget_samples(&samples, &calibration).bones[0];
    assert!(quat_approx(flipped.rotation, Quat::from_rotation_y(-0.5)));
    assert!(vec3_approx(flipped.position.unwrap(), Vec3::new(0.1, 0.2, -0.3)));

    let kept = PoseRetargeter::new(unflipped()).retarget_samples(&samples, &calibration).bones[0];
    assert!(quat_approx(kept.rotation, Quat::from_rotation_y(0.5)));
    assert!(vec3_approx(kept.position.unwrap(), Vec3::new(0.1, 0.2, 0.3)));
}

#[test]
fn axis_sign_applies_to_swing_channels() {
    let mut calibration = AvatarCalibration::new(1.0);
    calibration.insert(
        HumanBone::LeftHand,
        BoneCalibration {
            axis_sign: -1.0,
            ..BoneCalibration::IDENTITY
        },
    );
    let s = Vec3::new(0.2, 0.0, 0.1);
    let samples = [MotionSample::swing(HumanBone::LeftHand, s)];
    let pose = PoseRetargeter::new(unflipped()).retarget_samples(&samples, &calibration);
    assert!(quat_approx(pose.bones[0].rotation, mocap::motion::reconstruct_swing(-s)));
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn rest_frame_end_to_end() {
    let layout = BoneChannelLayout::humanoid();
    let mut frame = layout.rest_frame(1);
    layout
        .write_samples(
            &[MotionSample::full(HumanBone::Hips, Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, 1.0)],
            &mut frame,
            0,
        )
        .unwrap();

    let mut codec = MotionTextureCodec::for_layout(&layout, 1).unwrap();
    let pixels = codec.encode(&frame).unwrap();
    let decoded = codec.decode(&pixels).unwrap().clone();

    let calibration = AvatarCalibration::identity(&layout, 1.0);
    let pose = PoseRetargeter::default()
        .retarget(&decoded, &layout, 0, &calibration)
        .unwrap();

    assert_eq!(pose.len(), 55);
    let hips = pose.get(HumanBone::Hips).unwrap();
    assert!(vec3_approx(hips.position.unwrap(), Vec3::new(0.0, 1.0, 0.0)));
    assert!((hips.scale.unwrap() - 1.0).abs() < EPSILON);
    for bone in pose.iter() {
        assert!(quat_approx(bone.rotation, Quat::IDENTITY), "{}: {}", bone.bone, bone.rotation);
        if bone.bone != HumanBone::Hips {
            assert!(bone.position.is_none());
            assert!(bone.scale.is_none());
        }
    }
}
