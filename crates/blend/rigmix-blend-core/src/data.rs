//! Canonical clip data model.
//!
//! A [`ClipTimeline`] is the immutable, shareable description of one
//! animation clip: named channels, each a keyed curve (or constant payload)
//! over clip-local time in seconds. Import/export of this data is a host
//! concern; the core only samples it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rigmix_api_core::{ChannelKind, Transform};

/// Prefix of channel names that target a skeleton joint. The rest of the
/// name is the joint index in decimal.
pub const JOINT_CHANNEL_PREFIX: &str = "_jnt";

/// Deterministic channel name for a joint index.
pub fn joint_channel_name(index: usize) -> String {
    format!("{JOINT_CHANNEL_PREFIX}{index}")
}

/// Inverse of [`joint_channel_name`]; None for non-joint channel names.
pub fn parse_joint_index(name: &str) -> Option<usize> {
    name.strip_prefix(JOINT_CHANNEL_PREFIX)?.parse().ok()
}

/// Keyed data of one channel. Key times are clip-local seconds,
/// non-decreasing, with one sample per key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ChannelKeys {
    Transform {
        times: Vec<f64>,
        samples: Vec<Transform>,
    },
    Scalar {
        times: Vec<f64>,
        samples: Vec<Vec<f32>>,
    },
    /// None entries are gaps: crossing into them updates key tracking
    /// without arming anything.
    Trigger {
        times: Vec<f64>,
        names: Vec<Option<String>>,
    },
    /// Constant pass-through payload, e.g. pose-index metadata.
    Opaque { value: serde_json::Value },
}

impl ChannelKeys {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelKeys::Transform { .. } => ChannelKind::Transform,
            ChannelKeys::Scalar { .. } => ChannelKind::Scalars,
            ChannelKeys::Trigger { .. } => ChannelKind::Trigger,
            ChannelKeys::Opaque { .. } => ChannelKind::Opaque,
        }
    }

    pub fn times(&self) -> &[f64] {
        match self {
            ChannelKeys::Transform { times, .. } => times,
            ChannelKeys::Scalar { times, .. } => times,
            ChannelKeys::Trigger { times, .. } => times,
            ChannelKeys::Opaque { .. } => &[],
        }
    }

    fn sample_count(&self) -> usize {
        match self {
            ChannelKeys::Transform { samples, .. } => samples.len(),
            ChannelKeys::Scalar { samples, .. } => samples.len(),
            ChannelKeys::Trigger { names, .. } => names.len(),
            ChannelKeys::Opaque { .. } => 0,
        }
    }
}

/// A named channel inside a clip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClipChannel {
    pub name: String,
    pub keys: ChannelKeys,
}

/// One animation clip: a fixed set of channels sampled by local time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClipTimeline {
    pub name: String,
    pub channels: Vec<ClipChannel>,
}

/// Errors produced while validating clip data.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("channel '{channel}' has {times} key times but {samples} samples")]
    KeyCountMismatch {
        channel: String,
        times: usize,
        samples: usize,
    },
    #[error("channel '{channel}' key times must be finite, non-negative and non-decreasing")]
    BadKeyTimes { channel: String },
    #[error("duplicate channel name '{channel}'")]
    DuplicateChannel { channel: String },
}

impl ClipTimeline {
    pub fn new(name: impl Into<String>, channels: Vec<ClipChannel>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// Greatest key time across all channels; the clip's valid local-time
    /// domain is [0, max_time_index]. A clip with no keyed channels is
    /// degenerate (0.0) and never becomes active.
    pub fn max_time_index(&self) -> f64 {
        let mut max = 0.0f64;
        for channel in &self.channels {
            if let Some(last) = channel.keys.times().last() {
                if *last > max {
                    max = *last;
                }
            }
        }
        max
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn channel(&self, name: &str) -> Option<&ClipChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Validate basic invariants (key/sample counts, ordered times, unique
    /// channel names).
    pub fn validate_basic(&self) -> Result<(), ClipError> {
        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|c| c.name == channel.name) {
                return Err(ClipError::DuplicateChannel {
                    channel: channel.name.clone(),
                });
            }
            let times = channel.keys.times();
            if !matches!(channel.keys, ChannelKeys::Opaque { .. })
                && times.len() != channel.keys.sample_count()
            {
                return Err(ClipError::KeyCountMismatch {
                    channel: channel.name.clone(),
                    times: times.len(),
                    samples: channel.keys.sample_count(),
                });
            }
            let mut last = 0.0f64;
            for t in times {
                if !t.is_finite() || *t < 0.0 || *t < last {
                    return Err(ClipError::BadKeyTimes {
                        channel: channel.name.clone(),
                    });
                }
                last = *t;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_names_round_trip() {
        assert_eq!(joint_channel_name(7), "_jnt7");
        assert_eq!(parse_joint_index("_jnt7"), Some(7));
        assert_eq!(parse_joint_index("hand_l"), None);
        assert_eq!(parse_joint_index("_jntx"), None);
    }

    #[test]
    fn max_time_spans_channels() {
        let clip = ClipTimeline::new(
            "c",
            vec![
                ClipChannel {
                    name: "_jnt0".into(),
                    keys: ChannelKeys::Transform {
                        times: vec![0.0, 1.0],
                        samples: vec![Transform::IDENTITY, Transform::IDENTITY],
                    },
                },
                ClipChannel {
                    name: "aperture".into(),
                    keys: ChannelKeys::Scalar {
                        times: vec![0.0, 2.5],
                        samples: vec![vec![0.0], vec![1.0]],
                    },
                },
            ],
        );
        assert_eq!(clip.max_time_index(), 2.5);
        clip.validate_basic().unwrap();
    }

    #[test]
    fn validate_rejects_unordered_times() {
        let clip = ClipTimeline::new(
            "c",
            vec![ClipChannel {
                name: "_jnt0".into(),
                keys: ChannelKeys::Scalar {
                    times: vec![1.0, 0.5],
                    samples: vec![vec![0.0], vec![1.0]],
                },
            }],
        );
        assert!(matches!(
            clip.validate_basic(),
            Err(ClipError::BadKeyTimes { .. })
        ));
    }
}
