//! Playback events emitted while advancing clip time.
//!
//! Events are buffered on the registry and drained by the orchestrator once
//! per tick; the core never calls back into the host mid-advance.

use serde::{Deserialize, Serialize};

use crate::ids::ClipId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum PlaybackEvent {
    /// A non-looping clip ran past its duration and went inactive.
    ClipFinished { clip: ClipId, local_time: f64 },
}
