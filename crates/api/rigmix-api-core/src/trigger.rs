//! Shared trigger state.
//!
//! A trigger channel's armed flag must survive map merging and copying: the
//! applier un-arms through whatever copy of the channel map reached it, and
//! the owning playback state must observe that. The handle is therefore a
//! shared cell rather than plain data. Cloning the handle aliases the same
//! state; equality is handle identity.

use std::sync::{Arc, Mutex, PoisonError};

/// Per-channel trigger state owned by a clip's playback state.
#[derive(Debug, Default)]
pub struct TriggerState {
    /// Index of the key window observed on the previous sample, if any.
    pub last_key: Option<usize>,
    pub armed: bool,
    /// Sub-trigger names fired by the current arm.
    pub fired: Vec<String>,
}

/// Cheap-to-clone handle aliasing one [`TriggerState`].
#[derive(Clone, Debug, Default)]
pub struct TriggerHandle(Arc<Mutex<TriggerState>>);

impl PartialEq for TriggerHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl TriggerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut TriggerState) -> R) -> R {
        // A poisoned lock only means a panic elsewhere while armed; the state
        // itself stays coherent, so recover it rather than propagate.
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn is_armed(&self) -> bool {
        self.with(|s| s.armed)
    }

    /// Snapshot of the currently-fired sub-trigger names.
    pub fn fired(&self) -> Vec<String> {
        self.with(|s| s.fired.clone())
    }

    pub fn last_key(&self) -> Option<usize> {
        self.with(|s| s.last_key)
    }

    pub fn set_last_key(&self, key: Option<usize>) {
        self.with(|s| s.last_key = key);
    }

    /// Arm with a single fired name, replacing any unconsumed arm.
    pub fn arm(&self, name: &str) {
        self.with(|s| {
            s.armed = true;
            s.fired.clear();
            s.fired.push(name.to_string());
        });
    }

    /// Clear the armed flag and fired set. Key tracking is untouched.
    pub fn disarm(&self) {
        self.with(|s| {
            s.armed = false;
            s.fired.clear();
        });
    }

    /// Back to the never-sampled state.
    pub fn reset(&self) {
        self.with(|s| {
            s.last_key = None;
            s.armed = false;
            s.fired.clear();
        });
    }
}
