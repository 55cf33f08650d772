//! Blend-tree nodes and their evaluation contract.
//!
//! A tree is a closed enum of four source variants evaluated depth-first,
//! left to right. Every node answers three questions each tick: advance time
//! (with side effects on clip state), is anything still contributing, and
//! what does this subtree contribute (a channel map).

use std::collections::{HashMap, HashSet};

use rigmix_api_core::{ChannelMap, ChannelValue, Transform};

use crate::data::joint_channel_name;
use crate::ids::ClipId;
use crate::merge::combine_maps;
use crate::params::ParamStore;
use crate::playback::PlaybackRegistry;
use crate::sampling::sample_clip;

/// Leaf playing one registered clip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipSource {
    pub clip: ClipId,
}

impl ClipSource {
    pub fn new(clip: ClipId) -> Self {
        Self { clip }
    }
}

/// Which channels of a filtered clip survive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelFilter {
    None,
    Include(HashSet<String>),
    Exclude(HashSet<String>),
}

impl ChannelFilter {
    pub fn allows(&self, channel: &str) -> bool {
        match self {
            ChannelFilter::None => true,
            ChannelFilter::Include(set) => set.contains(channel),
            ChannelFilter::Exclude(set) => !set.contains(channel),
        }
    }
}

/// A clip source composed with a channel filter policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilteredSource {
    pub source: ClipSource,
    pub filter: ChannelFilter,
}

impl FilteredSource {
    pub fn including(clip: ClipId, channels: impl IntoIterator<Item = String>) -> Self {
        Self {
            source: ClipSource::new(clip),
            filter: ChannelFilter::Include(channels.into_iter().collect()),
        }
    }

    pub fn excluding(clip: ClipId, channels: impl IntoIterator<Item = String>) -> Self {
        Self {
            source: ClipSource::new(clip),
            filter: ChannelFilter::Exclude(channels.into_iter().collect()),
        }
    }
}

/// Externally-driven source: a directly-settable joint transform map. It has
/// no clock and no notion of finishing.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagedSource {
    name: String,
    values: HashMap<String, Transform>,
}

impl ManagedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn slot(&mut self, joint: usize) -> &mut Transform {
        self.values
            .entry(joint_channel_name(joint))
            .or_insert(Transform::IDENTITY)
    }

    pub fn set_translation(&mut self, joint: usize, translation: [f32; 3]) {
        self.slot(joint).translation = translation;
    }

    pub fn set_rotation(&mut self, joint: usize, rotation: [f32; 4]) {
        self.slot(joint).rotation = rotation;
    }

    pub fn set_scale(&mut self, joint: usize, scale: [f32; 3]) {
        self.slot(joint).scale = scale;
    }

    pub fn set_transform(&mut self, joint: usize, transform: Transform) {
        *self.slot(joint) = transform;
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Immutable snapshot of the current values.
    pub fn sample(&self) -> ChannelMap {
        let mut out = ChannelMap::with_capacity(self.values.len());
        for (key, transform) in self.values.iter() {
            out.insert(key.clone(), ChannelValue::Transform(*transform));
        }
        out
    }
}

/// Weighted composition of two optional children. The weight is fetched
/// fresh each tick from the parameter store under `weight_key`; a missing
/// parameter reads as 0.0 (pure-A bias).
#[derive(Debug)]
pub struct BinaryBlend {
    pub a: Option<Box<BlendNode>>,
    pub b: Option<Box<BlendNode>>,
    pub weight_key: String,
}

impl BinaryBlend {
    pub fn new(
        a: Option<BlendNode>,
        b: Option<BlendNode>,
        weight_key: impl Into<String>,
    ) -> Self {
        Self {
            a: a.map(Box::new),
            b: b.map(Box::new),
            weight_key: weight_key.into(),
        }
    }
}

fn sample_clip_source(source: &ClipSource, registry: &mut PlaybackRegistry) -> ChannelMap {
    match registry.clip_and_state_mut(source.clip) {
        Some((clip, state)) => sample_clip(&clip, state),
        None => ChannelMap::new(),
    }
}

/// One node of a blend tree.
#[derive(Debug)]
pub enum BlendNode {
    Clip(ClipSource),
    Filtered(FilteredSource),
    Managed(ManagedSource),
    Blend(BinaryBlend),
}

impl BlendNode {
    pub fn clip(clip: ClipId) -> Self {
        BlendNode::Clip(ClipSource::new(clip))
    }

    pub fn blend(a: Option<BlendNode>, b: Option<BlendNode>, weight_key: &str) -> Self {
        BlendNode::Blend(BinaryBlend::new(a, b, weight_key))
    }

    /// Propagate the global clock to every descendant clip. All children are
    /// advanced, never short-circuited: an inactive child still updates its
    /// internal state so it can reactivate later. Returns true iff any
    /// descendant is active.
    pub fn advance_time(&self, global_time: f64, registry: &mut PlaybackRegistry) -> bool {
        match self {
            BlendNode::Clip(source) => registry.advance(source.clip, global_time),
            BlendNode::Filtered(filtered) => registry.advance(filtered.source.clip, global_time),
            BlendNode::Managed(_) => true,
            BlendNode::Blend(blend) => {
                let a_active = match &blend.a {
                    Some(a) => a.advance_time(global_time, registry),
                    None => false,
                };
                let b_active = match &blend.b {
                    Some(b) => b.advance_time(global_time, registry),
                    None => false,
                };
                a_active || b_active
            }
        }
    }

    /// Read-only activity query: OR over children, and a clip with a
    /// degenerate timeline is never active.
    pub fn is_active(&self, registry: &PlaybackRegistry) -> bool {
        match self {
            BlendNode::Clip(source) => registry.clip_active(source.clip),
            BlendNode::Filtered(filtered) => registry.clip_active(filtered.source.clip),
            BlendNode::Managed(_) => true,
            BlendNode::Blend(blend) => {
                blend.a.as_deref().is_some_and(|a| a.is_active(registry))
                    || blend.b.as_deref().is_some_and(|b| b.is_active(registry))
            }
        }
    }

    /// Produce this tick's contribution. Children are sampled left to right
    /// so clip-state side effects land before the values are merged.
    pub fn sample(&self, registry: &mut PlaybackRegistry, params: &dyn ParamStore) -> ChannelMap {
        match self {
            BlendNode::Clip(source) => sample_clip_source(source, registry),
            BlendNode::Filtered(filtered) => {
                // The inner sample is already a fresh map owned here, so
                // filtering it in place mutates no shared state.
                let mut map = sample_clip_source(&filtered.source, registry);
                map.retain(|key, _| filtered.filter.allows(key));
                map
            }
            BlendNode::Managed(managed) => managed.sample(),
            BlendNode::Blend(blend) => {
                let a = blend
                    .a
                    .as_deref()
                    .map(|node| node.sample(registry, params));
                let b = blend
                    .b
                    .as_deref()
                    .map(|node| node.sample(registry, params));
                let weight = params.get(&blend.weight_key).unwrap_or(0.0) as f32;
                combine_maps(a.as_ref(), b.as_ref(), weight)
            }
        }
    }

    /// Find a managed source by name anywhere in this subtree, for external
    /// mutation between ticks.
    pub fn managed_mut(&mut self, name: &str) -> Option<&mut ManagedSource> {
        match self {
            BlendNode::Managed(managed) if managed.name() == name => Some(managed),
            BlendNode::Managed(_) | BlendNode::Clip(_) | BlendNode::Filtered(_) => None,
            BlendNode::Blend(blend) => {
                if let Some(found) = blend.a.as_deref_mut().and_then(|a| a.managed_mut(name)) {
                    return Some(found);
                }
                blend.b.as_deref_mut().and_then(|b| b.managed_mut(name))
            }
        }
    }
}
