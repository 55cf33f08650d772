//! Shared clip builders for rigmix tests and benches.
//!
//! Clip import is a host concern, so fixtures are built programmatically.
//! The walk/idle pair is tuned for blend assertions: at local time t, walk
//! joint translations read [i, t/2, 0] while idle holds [i, 0, 0], so every
//! expected blend value is a one-line lerp.

use rigmix_api_core::Transform;
use rigmix_blend_core::{joint_channel_name, ChannelKeys, ClipChannel, ClipTimeline};

pub const CLIP_DURATION: f64 = 2.0;
pub const JOINTS: usize = 3;

pub fn transform_channel(name: impl Into<String>, keys: &[(f64, Transform)]) -> ClipChannel {
    ClipChannel {
        name: name.into(),
        keys: ChannelKeys::Transform {
            times: keys.iter().map(|(t, _)| *t).collect(),
            samples: keys.iter().map(|(_, s)| *s).collect(),
        },
    }
}

pub fn scalar_channel(name: impl Into<String>, keys: &[(f64, Vec<f32>)]) -> ClipChannel {
    ClipChannel {
        name: name.into(),
        keys: ChannelKeys::Scalar {
            times: keys.iter().map(|(t, _)| *t).collect(),
            samples: keys.iter().map(|(_, s)| s.clone()).collect(),
        },
    }
}

pub fn trigger_channel(name: impl Into<String>, keys: &[(f64, Option<&str>)]) -> ClipChannel {
    ClipChannel {
        name: name.into(),
        keys: ChannelKeys::Trigger {
            times: keys.iter().map(|(t, _)| *t).collect(),
            names: keys
                .iter()
                .map(|(_, n)| n.map(|s| s.to_string()))
                .collect(),
        },
    }
}

pub fn opaque_channel(name: impl Into<String>, value: serde_json::Value) -> ClipChannel {
    ClipChannel {
        name: name.into(),
        keys: ChannelKeys::Opaque { value },
    }
}

/// Static rest pose: joint i holds translation [i, 0, 0]; "speed" holds 0.
pub fn idle_clip() -> ClipTimeline {
    let mut channels = Vec::new();
    for i in 0..JOINTS {
        let rest = Transform::from_translation([i as f32, 0.0, 0.0]);
        channels.push(transform_channel(
            joint_channel_name(i),
            &[(0.0, rest), (CLIP_DURATION, rest)],
        ));
    }
    channels.push(scalar_channel(
        "speed",
        &[(0.0, vec![0.0]), (CLIP_DURATION, vec![0.0])],
    ));
    channels.push(opaque_channel("pose_meta", serde_json::json!("idle")));
    ClipTimeline::new("idle", channels)
}

/// Moving pose: joint i travels from [i, 0, 0] to [i, 1, 0] over the clip;
/// "speed" ramps 0 -> 1.
pub fn walk_clip() -> ClipTimeline {
    let mut channels = Vec::new();
    for i in 0..JOINTS {
        let from = Transform::from_translation([i as f32, 0.0, 0.0]);
        let to = Transform::from_translation([i as f32, 1.0, 0.0]);
        channels.push(transform_channel(
            joint_channel_name(i),
            &[(0.0, from), (CLIP_DURATION, to)],
        ));
    }
    channels.push(scalar_channel(
        "speed",
        &[(0.0, vec![0.0]), (CLIP_DURATION, vec![1.0])],
    ));
    channels.push(opaque_channel("pose_meta", serde_json::json!("walk")));
    ClipTimeline::new("walk", channels)
}

/// Walk plus a footstep trigger channel: "step_left" at 0.5s, a gap at 1.0s,
/// "step_right" at 1.5s.
pub fn footstep_clip() -> ClipTimeline {
    let mut clip = walk_clip();
    clip.name = "footstep".into();
    clip.channels.push(trigger_channel(
        "footsteps",
        &[(0.5, Some("step_left")), (1.0, None), (1.5, Some("step_right"))],
    ));
    clip
}

/// Clip with no channels; degenerate by construction.
pub fn empty_clip() -> ClipTimeline {
    ClipTimeline::new("empty", Vec::new())
}
