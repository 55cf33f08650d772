//! Blending utilities for channel values.
//! - f32 linear interpolation for scalars and vector components
//! - quaternion slerp (shortest-arc)
//! - transform TRS blending (translation/scale lerp, rotation slerp)
//! - elementwise blending for scalar buffers

use crate::value::{ChannelValue, Transform};

/// Linear interpolation for f32
#[inline]
pub fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
pub fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

/// Normalize a quaternion represented as [x,y,z,w]
fn normalize_quat(q: [f32; 4]) -> [f32; 4] {
    let mag = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if mag == 0.0 {
        [0.0, 0.0, 0.0, 1.0]
    } else {
        [q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag]
    }
}

/// Slerp between two quaternions q1, q2. Inputs are normalized first, so an
/// unnormalized authored rotation cannot leak into a blend.
pub fn slerp(q1: [f32; 4], q2: [f32; 4], t: f32) -> [f32; 4] {
    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = qa[0] * qb[0] + qa[1] * qb[1] + qa[2] * qb[2] + qa[3] * qb[3];

    // If the dot product is negative, slerp won't take the short path.
    // Fix by reversing one quaternion.
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    // If quaternions are close, use lerp
    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        let res = [
            lerp_f(qa[0], qb[0], t),
            lerp_f(qa[1], qb[1], t),
            lerp_f(qa[2], qb[2], t),
            lerp_f(qa[3], qb[3], t),
        ];
        return normalize_quat(res);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta = theta.sin();
    let sin_theta_0 = theta_0.sin();

    let s0 = ((theta_0 - theta).sin()) / sin_theta_0;
    let s1 = sin_theta / sin_theta_0;

    [
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ]
}

/// Blend two scalar buffers elementwise. If lengths differ, treat missing
/// elements as 0.0.
pub fn blend_scalars(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    let n = std::cmp::max(a.len(), b.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let ai = *a.get(i).unwrap_or(&0.0);
        let bi = *b.get(i).unwrap_or(&0.0);
        out.push(lerp_f(ai, bi, t));
    }
    out
}

/// Blend two transforms at t (0 -> pure a, 1 -> pure b).
pub fn blend_transforms(a: &Transform, b: &Transform, t: f32) -> Transform {
    Transform {
        translation: lerp_array(&a.translation, &b.translation, t),
        rotation: slerp(a.rotation, b.rotation, t),
        scale: lerp_array(&a.scale, &b.scale, t),
    }
}

/// Blend two channel values when both sides are the same interpolatable kind.
/// Returns None for any other pairing (Trigger, Opaque, kind mismatch); the
/// caller decides what a non-interpolatable pairing means.
pub fn blend_channel_values(a: &ChannelValue, b: &ChannelValue, t: f32) -> Option<ChannelValue> {
    match (a, b) {
        (ChannelValue::Transform(ta), ChannelValue::Transform(tb)) => {
            Some(ChannelValue::Transform(blend_transforms(ta, tb, t)))
        }
        (ChannelValue::Scalars(sa), ChannelValue::Scalars(sb)) => {
            Some(ChannelValue::Scalars(blend_scalars(sa, sb, t)))
        }
        _ => None,
    }
}
