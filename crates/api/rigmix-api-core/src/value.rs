//! Channel value kinds and typed values for clip sampling and blending.
//! Component values are f32; time quantities live with the playback layer.

use serde::{Deserialize, Serialize};

use crate::trigger::TriggerHandle;

/// One named slot of animation output, keyed by channel name in a [`ChannelMap`].
pub type ChannelMap = hashbrown::HashMap<String, ChannelValue>;

/// Lightweight kind enum for quick dispatch and diagnostics. A channel's kind
/// is stable across the lifetime of a given source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Transform,
    Scalars,
    Trigger,
    Opaque,
}

/// TRS transform split for blending: translation/scale lerp, rotation slerp.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub translation: [f32; 3],
    /// Quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn new(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Convenience constructors
    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: [f32; 4]) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Closed union of everything a source can contribute for one channel.
/// The merge algorithm matches this exhaustively; there is no "unknown kind"
/// fallthrough.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelValue {
    /// Joint or scene-node transform.
    Transform(Transform),
    /// Fixed-size numeric buffer (often length 1).
    Scalars(Vec<f32>),
    /// Shared armed-flag handle; never interpolated.
    Trigger(TriggerHandle),
    /// Pass-through payload (e.g. pose-index metadata); never interpolated.
    Opaque(serde_json::Value),
}

impl ChannelValue {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelValue::Transform(_) => ChannelKind::Transform,
            ChannelValue::Scalars(_) => ChannelKind::Scalars,
            ChannelValue::Trigger(_) => ChannelKind::Trigger,
            ChannelValue::Opaque(_) => ChannelKind::Opaque,
        }
    }

    #[inline]
    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            ChannelValue::Transform(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_scalars(&self) -> Option<&[f32]> {
        match self {
            ChannelValue::Scalars(s) => Some(s),
            _ => None,
        }
    }
}
