use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufWriter;

use glam::{Quat, Vec3};
use mocap::motion::{BoneChannelLayout, HumanBone, MotionSample, codec, swing_from_rotation};
use mocap::skeleton::{Skeleton, Transform};
use mocap::{Avatar, MotionConfig};

/// Builds a minimal humanoid: hips, spine chain, head and both arms.
fn build_rig() -> Skeleton {
    let mut rig = Skeleton::new();
    let bone = |y: f32| Transform::from_trs(Vec3::new(0.0, y, 0.0), Quat::IDENTITY, Vec3::ONE);

    let hips = rig.add_bone("Hips", None, bone(0.95));
    let spine = rig.add_bone("Spine", Some(hips), bone(0.1));
    let chest = rig.add_bone("Chest", Some(spine), bone(0.15));
    let neck = rig.add_bone("Neck", Some(chest), bone(0.2));
    rig.add_bone("Head", Some(neck), bone(0.1));

    for (side, x) in [("Left", 0.08_f32), ("Right", -0.08)] {
        let shoulder = rig.add_bone(
            &format!("{side}Shoulder"),
            Some(chest),
            Transform::from_trs(Vec3::new(x, 0.18, 0.0), Quat::IDENTITY, Vec3::ONE),
        );
        let upper = rig.add_bone(
            &format!("{side}UpperArm"),
            Some(shoulder),
            Transform::from_trs(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
        );
        rig.add_bone(
            &format!("{side}LowerArm"),
            Some(upper),
            Transform::from_trs(Vec3::new(x * 3.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
        );
    }
    rig
}

/// Encodes one frame of a performer walking in a circle and waving.
fn synthesize(layout: &BoneChannelLayout, layers: usize, t: f32) -> anyhow::Result<Vec<u8>> {
    let mut frame = layout.rest_frame(layers);
    let phase = t * TAU * 0.25;
    let wave = Quat::from_rotation_z(0.8 + 0.4 * (t * TAU).sin());

    let samples = [
        MotionSample::full(
            HumanBone::Hips,
            Vec3::new(phase.cos() * 0.5, 1.0, phase.sin() * 0.5),
            Quat::from_rotation_y(-phase),
            1.0,
        ),
        MotionSample::swing(HumanBone::Head, swing_from_rotation(Quat::from_rotation_x(0.2))),
        MotionSample::swing(HumanBone::RightUpperArm, swing_from_rotation(wave)),
    ];
    for layer in 0..layers {
        layout.write_samples(&samples, &mut frame, layer)?;
    }
    Ok(codec::encode(frame.channels()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = MotionConfig {
        max_record_seconds: 2.0,
        ..Default::default()
    };

    let mut rig = build_rig();
    let mut avatar = Avatar::bind(&rig, &config)?;
    let (width, height) = avatar.texture_size();
    println!(
        "Bound {} bones, expecting a {width}x{height} motion texture",
        avatar.calibration().len()
    );

    let dt = 1.0 / 30.0;
    avatar.start_recording();
    for i in 0..90 {
        let mut pixels = synthesize(avatar.layout(), config.layers, i as f32 * dt)?;
        avatar.tick(&mut pixels, &mut rig, dt);
    }

    if let Some(hips) = avatar.pose().get(HumanBone::Hips) {
        println!("Final hips: {:?} {:?}", hips.position, hips.rotation);
    }

    let Some(clip) = avatar.stop_recording() else {
        anyhow::bail!("recording produced no clip");
    };
    println!(
        "Recorded {} samples over {:.2}s ({} dropped frames)",
        clip.len(),
        clip.duration(),
        avatar.dropped_frames()
    );

    let path = std::env::temp_dir().join("synthetic_stream.json");
    clip.to_json_writer(BufWriter::new(File::create(&path)?))?;
    println!("Wrote {}", path.display());

    Ok(())
}
