//! Channel sampling at clip-local time.
//!
//! Transform and scalar channels interpolate between the surrounding keys and
//! clamp at the ends; trigger channels track the key window entered since the
//! previous sample and arm their shared handle; opaque channels pass through.

use rigmix_api_core::blend::{blend_scalars, blend_transforms};
use rigmix_api_core::{ChannelMap, ChannelValue, Transform, TriggerHandle};

use crate::data::{ChannelKeys, ClipTimeline};
use crate::playback::ClipPlaybackState;

/// Find the key segment [i0, i1] containing time t and the blend factor
/// between them. Edge cases:
/// - t at or before the first key returns (0, 0, 0.0)
/// - t at or after the last key returns (last, last, 0.0)
pub fn find_segment(times: &[f64], t: f64) -> (usize, usize, f32) {
    let n = times.len();
    if n == 0 {
        return (0, 0, 0.0);
    }
    if n == 1 || t <= times[0] {
        return (0, 0, 0.0);
    }
    if t >= times[n - 1] {
        return (n - 1, n - 1, 0.0);
    }
    // Linear scan (could be optimized to binary search if needed)
    for i in 0..(n - 1) {
        let t0 = times[i];
        let t1 = times[i + 1];
        if t >= t0 && t <= t1 {
            let denom = (t1 - t0).max(f64::EPSILON);
            let alpha = ((t - t0) / denom).clamp(0.0, 1.0);
            return (i, i + 1, alpha as f32);
        }
    }
    (n - 1, n - 1, 0.0)
}

/// Index of the last key at or before t; None while t is ahead of every key.
pub fn trigger_key_index(times: &[f64], t: f64) -> Option<usize> {
    let mut current = None;
    for (i, key_time) in times.iter().enumerate() {
        if *key_time <= t {
            current = Some(i);
        } else {
            break;
        }
    }
    current
}

fn sample_transform(times: &[f64], samples: &[Transform], t: f64) -> Transform {
    match samples.len() {
        0 => Transform::IDENTITY,
        1 => samples[0],
        _ => {
            let (i0, i1, alpha) = find_segment(times, t);
            if i0 == i1 {
                samples[i0]
            } else {
                blend_transforms(&samples[i0], &samples[i1], alpha)
            }
        }
    }
}

fn sample_scalars(times: &[f64], samples: &[Vec<f32>], t: f64) -> Vec<f32> {
    match samples.len() {
        0 => Vec::new(),
        1 => samples[0].clone(),
        _ => {
            let (i0, i1, alpha) = find_segment(times, t);
            if i0 == i1 {
                samples[i0].clone()
            } else {
                blend_scalars(&samples[i0], &samples[i1], alpha)
            }
        }
    }
}

/// Advance one trigger channel's arming state to the key window at t.
fn update_trigger(handle: &TriggerHandle, times: &[f64], names: &[Option<String>], t: f64) {
    let current = trigger_key_index(times, t);
    if handle.last_key() == current {
        return;
    }
    handle.set_last_key(current);
    if let Some(i) = current {
        if let Some(name) = names.get(i).and_then(|n| n.as_deref()) {
            handle.arm(name);
        }
    }
}

/// Sample every channel of `clip` at the playback state's current local time,
/// producing a fresh channel map.
pub fn sample_clip(clip: &ClipTimeline, state: &mut ClipPlaybackState) -> ChannelMap {
    let t = state.local_time();
    let mut out = ChannelMap::with_capacity(clip.channels.len());
    for channel in &clip.channels {
        let value = match &channel.keys {
            ChannelKeys::Transform { times, samples } => {
                ChannelValue::Transform(sample_transform(times, samples, t))
            }
            ChannelKeys::Scalar { times, samples } => {
                ChannelValue::Scalars(sample_scalars(times, samples, t))
            }
            ChannelKeys::Trigger { times, names } => {
                let handle = state.trigger_handle(&channel.name);
                update_trigger(&handle, times, names, t);
                ChannelValue::Trigger(handle)
            }
            ChannelKeys::Opaque { value } => ChannelValue::Opaque(value.clone()),
        };
        out.insert(channel.name.clone(), value);
    }
    out
}
