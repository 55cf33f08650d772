//! Core configuration for rigmix-blend-core.

use serde::{Deserialize, Serialize};

/// Sizing knobs for a playback registry. Keep this minimal; expand as needed
/// without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum playback events retained per tick; further events are dropped
    /// until the buffer is drained.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_events_per_tick: 256,
        }
    }
}
