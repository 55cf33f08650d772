//! Per-clip playback state and the registry that owns it.
//!
//! Tree nodes never own clip timers: several leaves may reference one clip,
//! so instance state is keyed by [`ClipId`] in a [`PlaybackRegistry`] owned
//! by the orchestrator. The registry also buffers playback events for the
//! orchestrator to drain after each tick.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rigmix_api_core::TriggerHandle;

use crate::config::Config;
use crate::data::ClipTimeline;
use crate::ids::{ClipId, IdAllocator};
use crate::outputs::PlaybackEvent;

/// How many passes a clip plays before it finishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    Count(u32),
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(1)
    }
}

/// Mutable per-instance playback state: the state machine that maps the
/// global clock onto a clip's local time domain.
#[derive(Debug)]
pub struct ClipPlaybackState {
    local_time: f64,
    time_scale: f64,
    repeat: Repeat,
    start_time: f64,
    active: bool,
    /// Shared arming state per trigger channel, created lazily on first
    /// sample of that channel.
    triggers: HashMap<String, TriggerHandle>,
}

impl Default for ClipPlaybackState {
    fn default() -> Self {
        Self {
            local_time: 0.0,
            time_scale: 1.0,
            repeat: Repeat::default(),
            start_time: 0.0,
            active: true,
            triggers: HashMap::new(),
        }
    }
}

impl ClipPlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip-local sample time stored by the last advance.
    pub fn local_time(&self) -> f64 {
        self.local_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Negative scales play in reverse.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: Repeat) {
        self.repeat = repeat;
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn set_start_time(&mut self, start_time: f64) {
        self.start_time = start_time;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Restart at a new global start time; trigger tracking is cleared so a
    /// restarted clip re-fires its keys.
    pub fn reset(&mut self, global_start_time: f64) {
        self.local_time = 0.0;
        self.start_time = global_start_time;
        self.active = true;
        for handle in self.triggers.values() {
            handle.reset();
        }
    }

    /// Handle for one trigger channel's arming state.
    pub fn trigger_handle(&mut self, channel: &str) -> TriggerHandle {
        self.triggers
            .entry(channel.to_string())
            .or_default()
            .clone()
    }

    /// Map `global_time` into this clip's local domain and store it as the
    /// sample time for the tick. Returns whether the clip is still active.
    ///
    /// Looping wraps into [0, max_time); the non-looping remainder gets a
    /// single pre-roll shift for negative clocks, then anything still outside
    /// [0, max_time] is clamped, the clip goes inactive, and a finished event
    /// is due (the registry emits it on the active-flag edge).
    pub fn advance(&mut self, global_time: f64, max_time: f64) -> bool {
        if !self.active {
            return false;
        }
        if max_time <= 0.0 {
            // Degenerate clip: no valid sample domain, no state mutation.
            return false;
        }

        let mut clock = self.time_scale * (global_time - self.start_time);

        let wraps = match self.repeat {
            Repeat::Forever => true,
            Repeat::Count(count) => count > 1 && max_time * f64::from(count) >= clock.abs(),
        };
        if wraps {
            clock = if clock < 0.0 {
                max_time + clock % max_time
            } else {
                clock % max_time
            };
        } else if clock < 0.0 {
            clock += max_time;
        }

        if clock > max_time || clock < 0.0 {
            clock = clock.clamp(0.0, max_time);
            self.active = false;
        }

        self.local_time = clock;
        self.active
    }
}

#[derive(Debug)]
struct PlaybackEntry {
    clip: Arc<ClipTimeline>,
    state: ClipPlaybackState,
}

/// Owns (clip, playback state) pairs and the per-tick event buffer.
#[derive(Debug, Default)]
pub struct PlaybackRegistry {
    cfg: Config,
    ids: IdAllocator,
    entries: Vec<(ClipId, PlaybackEntry)>,
    events: Vec<PlaybackEvent>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: Config) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    /// Register a clip, creating fresh playback state for it.
    pub fn register(&mut self, clip: Arc<ClipTimeline>) -> ClipId {
        let id = self.ids.alloc_clip();
        self.entries.push((
            id,
            PlaybackEntry {
                clip,
                state: ClipPlaybackState::new(),
            },
        ));
        id
    }

    fn entry(&self, id: ClipId) -> Option<&PlaybackEntry> {
        self.entries
            .iter()
            .find_map(|(cid, e)| if *cid == id { Some(e) } else { None })
    }

    fn entry_mut(&mut self, id: ClipId) -> Option<&mut PlaybackEntry> {
        self.entries
            .iter_mut()
            .find_map(|(cid, e)| if *cid == id { Some(e) } else { None })
    }

    pub fn clip(&self, id: ClipId) -> Option<&Arc<ClipTimeline>> {
        self.entry(id).map(|e| &e.clip)
    }

    pub fn state(&self, id: ClipId) -> Option<&ClipPlaybackState> {
        self.entry(id).map(|e| &e.state)
    }

    pub fn state_mut(&mut self, id: ClipId) -> Option<&mut ClipPlaybackState> {
        self.entry_mut(id).map(|e| &mut e.state)
    }

    /// Clip data plus mutable state for sampling in one lookup.
    pub fn clip_and_state_mut(
        &mut self,
        id: ClipId,
    ) -> Option<(Arc<ClipTimeline>, &mut ClipPlaybackState)> {
        self.entry_mut(id).map(|e| (e.clip.clone(), &mut e.state))
    }

    /// Restart a clip's playback at the given global start time.
    pub fn reset(&mut self, id: ClipId, global_start_time: f64) {
        if let Some(e) = self.entry_mut(id) {
            e.state.reset(global_start_time);
        }
    }

    /// Advance one clip's time. Emits [`PlaybackEvent::ClipFinished`] on the
    /// tick the clip goes inactive.
    pub fn advance(&mut self, id: ClipId, global_time: f64) -> bool {
        let max_events = self.cfg.max_events_per_tick;
        let Some((cid, entry)) = self
            .entries
            .iter_mut()
            .find(|(cid, _)| *cid == id)
            .map(|(cid, e)| (*cid, e))
        else {
            return false;
        };
        let was_active = entry.state.active();
        let still_active = entry.state.advance(global_time, entry.clip.max_time_index());
        if was_active && !entry.state.active() && self.events.len() < max_events {
            self.events.push(PlaybackEvent::ClipFinished {
                clip: cid,
                local_time: entry.state.local_time(),
            });
        }
        still_active
    }

    /// Active flag AND non-degenerate clip data.
    pub fn clip_active(&self, id: ClipId) -> bool {
        self.entry(id)
            .map(|e| e.state.active() && e.clip.max_time_index() > 0.0)
            .unwrap_or(false)
    }

    /// Take all events buffered since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}
