use serde_json::json;

use crate::adapter::registry::{Adapter, AdapterRegistry};
use crate::cue::cue::{CueCallback, CueEvent, CueHandlers, CueId, CueSpec, IdSource};
use crate::cue::scheduler::{self, PendingOp};
use crate::player::Player;
use crate::playhead::playhead::Playhead;
use crate::registry::InstanceRegistry;

/// Owns the adapter registry and every player, and is the single surface the
/// host driver and adapters talk to. Single-threaded and callback-driven: the
/// host's time samples are the only thing that makes cues fire.
#[derive(Default)]
pub struct Engine {
    adapters: AdapterRegistry,
    instances: InstanceRegistry,
    ids: IdSource,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    // Players

    /// Creates a player for one media element. `natural_id` is used when free,
    /// like an element id; `duration` may be unknown until the host learns it.
    pub fn create_player(&mut self, natural_id: Option<&str>, duration: Option<f64>) -> String {
        self.instances.create(natural_id, Playhead::new(duration))
    }

    pub fn remove_player(&mut self, player_id: &str) -> bool {
        self.instances.remove(player_id).is_some()
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.instances.get(player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.instances.get_mut(player_id)
    }

    pub fn player_ids(&self) -> Vec<&str> {
        self.instances.ids()
    }

    /// Reports the real duration once the host knows it; repositions the
    /// player's upper guard so cue defaulting and scans use the new bound.
    pub fn set_duration(&mut self, player_id: &str, duration: f64) -> Result<(), String> {
        match self.instances.get_mut(player_id) {
            Some(player) => {
                player.set_duration(duration);
                Ok(())
            }
            None => Err(format!("no player '{}'", player_id)),
        }
    }

    // Adapters

    pub fn register_adapter(&mut self, kind: &str, adapter: Adapter) -> Result<(), String> {
        self.adapters.register(kind, adapter)
    }

    /// Unregisters an adapter kind everywhere. Existing cues of the kind are
    /// not touched here; each player's scheduler sweeps them when a scan next
    /// reaches one. Distinct from `remove_cues_of_kind`.
    pub fn unregister_adapter(&mut self, kind: &str) -> bool {
        let removed = self.adapters.unregister(kind);
        if removed {
            log::info!("adapter kind '{}' unregistered", kind);
        }
        removed
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    // Cues

    /// Registers a cue on one player. A spec naming a registered adapter kind
    /// inherits that adapter's handlers; a spec naming an unknown kind must
    /// bring its own.
    pub fn register_cue(&mut self, player_id: &str, spec: CueSpec) -> Result<CueId, String> {
        let fallback = match spec.kind.as_deref() {
            Some(kind) => match self.adapters.get(kind) {
                Some(adapter) => Some(adapter.handlers.clone()),
                None if spec.handlers.is_none() => {
                    return Err(format!("no adapter registered for kind '{}'", kind));
                }
                None => None,
            },
            None => None,
        };
        match self.instances.get_mut(player_id) {
            Some(player) => player.register(spec, &mut self.ids, fallback),
            None => Err(format!("no player '{}'", player_id)),
        }
    }

    /// One-shot callback at a single point in time.
    pub fn exec(&mut self, player_id: &str, time: f64, f: CueCallback) -> Result<CueId, String> {
        let spec = CueSpec {
            kind: Some("exec".to_string()),
            handlers: Some(CueHandlers::start_only(f)),
            ..CueSpec::between(time, time + 1.0)
        };
        self.register_cue(player_id, spec)
    }

    pub fn remove_cue(&mut self, player_id: &str, id: &CueId) -> bool {
        match self.instances.get_mut(player_id) {
            Some(player) => player.remove_cue(id),
            None => false,
        }
    }

    /// Removes every cue of one adapter kind from one player. The adapter
    /// stays registered; see `unregister_adapter` for the global teardown.
    pub fn remove_cues_of_kind(&mut self, player_id: &str, kind: &str) -> usize {
        match self.instances.get_mut(player_id) {
            Some(player) => player.remove_kind(kind),
            None => 0,
        }
    }

    pub fn cues(&self, player_id: &str) -> Vec<CueEvent> {
        self.instances
            .get(player_id)
            .map(|player| player.cues())
            .unwrap_or_default()
    }

    pub fn last_cue_id(&self, player_id: &str) -> Option<CueId> {
        self.instances
            .get(player_id)
            .and_then(|player| player.last_cue_id().cloned())
    }

    // Time

    /// The host driver's per-frame entry point: stores the sample on the
    /// playhead, runs the boundary scan, then applies whatever structural
    /// changes the fired callbacks queued.
    pub fn on_time_update(&mut self, player_id: &str, new_time: f64) {
        let pending = match self.instances.get_mut(player_id) {
            Some(player) => {
                player.playhead_mut().set_time(new_time);
                scheduler::run_update(player, &self.adapters, &mut self.ids, new_time)
            }
            None => {
                log::warn!("time update for unknown player '{}'", player_id);
                return;
            }
        };

        for op in pending {
            match op {
                PendingOp::Register(spec) => {
                    if let Err(err) = self.register_cue(player_id, spec) {
                        log::warn!("deferred cue registration failed: {}", err);
                    }
                }
                PendingOp::Remove(id) => {
                    self.remove_cue(player_id, &id);
                }
            }
        }

        if let Some(player) = self.instances.get(player_id) {
            player.trigger("timeupdate", &json!({ "time": new_time }));
        }
    }
}
