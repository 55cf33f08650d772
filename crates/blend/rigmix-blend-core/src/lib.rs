//! Rigmix blend-tree core (engine-agnostic)
//!
//! Advances independent looping, time-scaled clips against one global clock,
//! composes nested sources (clips, filtered clips, managed sources, weighted
//! binary blends) into one merged channel map per tick, and applies that map
//! to a pose, named scene nodes, and trigger callbacks. The host owns the
//! clock, the parameter store, and the root node; one tick is
//! advance_time -> sample -> apply.

pub mod apply;
pub mod config;
pub mod data;
pub mod ids;
pub mod merge;
pub mod outputs;
pub mod params;
pub mod playback;
pub mod sampling;
pub mod tree;

// Re-exports for consumers (hosts/orchestrators)
pub use apply::{ApplyError, NodeHandle, PoseTarget, ResultApplier, SceneTarget, TriggerCallback};
pub use config::Config;
pub use data::{
    joint_channel_name, parse_joint_index, ChannelKeys, ClipChannel, ClipError, ClipTimeline,
    JOINT_CHANNEL_PREFIX,
};
pub use ids::{CallbackId, ClipId};
pub use merge::{combine_maps, combine_maps_into};
pub use outputs::PlaybackEvent;
pub use params::ParamStore;
pub use playback::{ClipPlaybackState, PlaybackRegistry, Repeat};
pub use sampling::{find_segment, sample_clip};
pub use tree::{BinaryBlend, BlendNode, ChannelFilter, ClipSource, FilteredSource, ManagedSource};
pub use rigmix_api_core::{ChannelKind, ChannelMap, ChannelValue, Transform, TriggerHandle};
