//! Application of a merged channel map to its targets.
//!
//! One call per tick: joint transforms go straight into the pose, named
//! transforms are routed to scene nodes through a lazily-populated name
//! cache, armed triggers fire their callbacks exactly once, and the pose
//! gets a single batched world-transform recompute at the end.

use std::collections::HashMap;

use thiserror::Error;

use rigmix_api_core::{ChannelMap, ChannelValue, Transform, TriggerHandle};

use crate::data::parse_joint_index;
use crate::ids::{CallbackId, IdAllocator};

/// Opaque scene-node handle resolved by the host (small string key).
pub type NodeHandle = String;

/// Skinned pose consuming joint-local transforms.
pub trait PoseTarget {
    fn joint_count(&self) -> usize;
    fn set_local_joint_transform(&mut self, index: usize, transform: &Transform);
    /// One batched forward-kinematics pass; called at most once per apply.
    fn recompute_world_transforms(&mut self);
}

/// Scene graph consuming named node transforms.
pub trait SceneTarget {
    fn find_child_by_name(&mut self, name: &str) -> Option<NodeHandle>;
    fn apply_transform(&mut self, handle: &NodeHandle, transform: &Transform);
}

/// Invoked with the fired sub-trigger name.
pub type TriggerCallback = Box<dyn FnMut(&str) -> anyhow::Result<()> + Send>;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("trigger callback for '{name}' failed: {source}")]
    TriggerCallback {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Applies one tick's merged channel map to a pose, a scene graph, and the
/// registered trigger callbacks. Scalar and opaque channels are left in the
/// map for external consumers.
#[derive(Default)]
pub struct ResultApplier {
    node_cache: HashMap<String, NodeHandle>,
    callbacks: Vec<(CallbackId, String, TriggerCallback)>,
    ids: IdAllocator,
}

impl ResultApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one trigger name. Multiple callbacks per name
    /// are invoked in registration order.
    pub fn register_trigger(&mut self, trigger: &str, callback: TriggerCallback) -> CallbackId {
        let id = self.ids.alloc_callback();
        self.callbacks.push((id, trigger.to_string(), callback));
        id
    }

    /// Remove a previously registered callback. Returns false if the id is
    /// unknown (already removed).
    pub fn unregister_trigger(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _, _)| *cid != id);
        self.callbacks.len() != before
    }

    /// Drop all cached name->node resolutions. Hosts call this when the
    /// target model changes and old handles may dangle.
    pub fn invalidate_node_cache(&mut self) {
        self.node_cache.clear();
    }

    /// Apply `map` to the targets.
    ///
    /// Panics if a joint channel addresses an index outside the pose: that
    /// is a topology mismatch between clip and skeleton, a programmer error.
    /// Unresolvable scene-node names are logged and skipped. A trigger's
    /// armed flag is cleared even when a callback fails; the first failure is
    /// returned after all callbacks ran and cleanup finished.
    pub fn apply(
        &mut self,
        map: &ChannelMap,
        pose: &mut dyn PoseTarget,
        scene: &mut dyn SceneTarget,
    ) -> Result<(), ApplyError> {
        let mut wrote_joint = false;
        let mut first_error: Option<ApplyError> = None;

        for (name, value) in map.iter() {
            match value {
                ChannelValue::Transform(transform) => {
                    if let Some(index) = parse_joint_index(name) {
                        let count = pose.joint_count();
                        assert!(
                            index < count,
                            "joint channel '{name}' addresses joint {index} but the pose has {count} joints"
                        );
                        pose.set_local_joint_transform(index, transform);
                        wrote_joint = true;
                    } else {
                        self.apply_to_scene_node(name, transform, scene);
                    }
                }
                ChannelValue::Trigger(handle) => {
                    if let Some(error) = self.fire_trigger(handle) {
                        first_error.get_or_insert(error);
                    }
                }
                ChannelValue::Scalars(_) | ChannelValue::Opaque(_) => {}
            }
        }

        if wrote_joint {
            pose.recompute_world_transforms();
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn apply_to_scene_node(
        &mut self,
        name: &str,
        transform: &Transform,
        scene: &mut dyn SceneTarget,
    ) {
        if let Some(handle) = self.node_cache.get(name) {
            scene.apply_transform(handle, transform);
            return;
        }
        match scene.find_child_by_name(name) {
            Some(handle) => {
                log::debug!("resolved scene node '{name}'");
                scene.apply_transform(&handle, transform);
                self.node_cache.insert(name.to_string(), handle);
            }
            None => log::warn!("no scene node named '{name}'; skipping channel"),
        }
    }

    /// Fire every callback registered for the handle's fired names exactly
    /// once, then disarm unconditionally.
    fn fire_trigger(&mut self, handle: &TriggerHandle) -> Option<ApplyError> {
        if !handle.is_armed() {
            return None;
        }
        let fired = handle.fired();
        let mut first_error = None;
        for name in &fired {
            for (_, trigger, callback) in self.callbacks.iter_mut() {
                if trigger == name {
                    if let Err(source) = callback(name) {
                        if first_error.is_none() {
                            first_error = Some(ApplyError::TriggerCallback {
                                name: name.clone(),
                                source,
                            });
                        }
                    }
                }
            }
        }
        handle.disarm();
        first_error
    }
}
