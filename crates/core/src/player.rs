use std::sync::Arc;

use serde_json::Value;

use crate::cue::cue::{Cue, CueEvent, CueHandlers, CueId, CueSpec, IdSource};
use crate::cue::track_index::TrackIndex;
use crate::events::{EventCallback, EventListeners};
use crate::playhead::playhead::Playhead;

/// One scheduler + playhead pair: the per-media-element unit the engine
/// addresses by id.
pub struct Player {
    id: String,
    playhead: Playhead,
    pub(crate) tracks: TrackIndex,
    /// Cue ids in registration order; feeds `last_cue_id`.
    history: Vec<CueId>,
    listeners: EventListeners,
}

impl Player {
    pub(crate) fn new(id: String, playhead: Playhead) -> Self {
        let tracks = TrackIndex::new(playhead.guard_bound());
        Self {
            id,
            playhead,
            tracks,
            history: Vec::new(),
            listeners: EventListeners::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    /// Tells the player the real media duration. Cue end defaulting switches
    /// to it and the upper guard moves to sit one past it.
    pub fn set_duration(&mut self, duration: f64) {
        self.playhead.set_duration(duration);
        self.tracks.reposition_upper_guard(duration + 1.0);
    }

    /// Inserts a cue built from `spec`. `fallback` carries the owning
    /// adapter's handlers for specs that did not bring their own.
    pub(crate) fn register(
        &mut self,
        mut spec: CueSpec,
        ids: &mut IdSource,
        fallback: Option<CueHandlers>,
    ) -> Result<CueId, String> {
        let id = spec.normalize(self.playhead.duration(), ids)?;
        let owns_handlers = spec.handlers.is_some();
        let handlers = match spec.handlers.or(fallback) {
            Some(handlers) => handlers,
            None => CueHandlers::nop(),
        };

        let cue = Cue {
            id: Some(id.clone()),
            // normalize() always fills both bounds
            start: spec.start.unwrap_or(0.0),
            end: spec.end.unwrap_or(f64::MAX),
            kind: spec.kind,
            running: false,
            payload: spec.payload,
            handlers: Arc::new(handlers),
            owns_handlers,
        };
        log::debug!(
            "player {}: registered cue {} [{}, {}]",
            self.id,
            id,
            cue.start,
            cue.end
        );
        self.tracks.insert(cue);
        self.history.push(id.clone());
        Ok(id)
    }

    /// Removes one cue by id, pruning it from the history log. Unknown ids
    /// are a no-op.
    pub(crate) fn remove_cue(&mut self, id: &CueId) -> bool {
        if !self.tracks.remove_by_id(id) {
            return false;
        }
        self.history.retain(|h| h != id);
        true
    }

    /// Removes every cue registered by one adapter kind on this player.
    pub(crate) fn remove_kind(&mut self, kind: &str) -> usize {
        let removed = self.tracks.remove_kind(kind);
        self.history.retain(|h| !removed.contains(h));
        removed.len()
    }

    /// All registered cues in start order.
    pub fn cues(&self) -> Vec<CueEvent> {
        self.tracks.cues().filter_map(|cue| cue.event()).collect()
    }

    pub fn cue_count(&self) -> usize {
        self.tracks.user_len()
    }

    /// Id of the most recently registered cue still present.
    pub fn last_cue_id(&self) -> Option<&CueId> {
        self.history.last()
    }

    // Custom events (host- and adapter-defined, outside the cue timeline).

    pub fn listen(&mut self, event: &str, name: &str, callback: EventCallback) {
        self.listeners.listen(event, name, callback);
    }

    pub fn unlisten(&mut self, event: &str, name: Option<&str>) {
        self.listeners.unlisten(event, name);
    }

    pub fn trigger(&self, event: &str, data: &Value) -> usize {
        self.listeners.trigger(event, data)
    }
}
