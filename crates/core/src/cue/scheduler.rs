use std::sync::Arc;

use crate::adapter::registry::AdapterRegistry;
use crate::cue::cue::{CueCallback, CueEvent, CueHandlers, CueId, CueSpec, IdSource};
use crate::player::Player;

/// Structural change requested by a callback while a scan was in flight.
pub(crate) enum PendingOp {
    Register(CueSpec),
    Remove(CueId),
}

/// View of the firing player handed to every callback.
///
/// Registration and removal requested here are queued and applied after the
/// current scan finishes, so a callback can never invalidate the cursors of
/// the walk that invoked it.
pub struct CueContext<'a> {
    pub time: f64,
    pub duration: Option<f64>,
    player_id: String,
    pending: &'a mut Vec<PendingOp>,
    ids: &'a mut IdSource,
}

impl CueContext<'_> {
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Registers a cue on the firing player. The id is assigned immediately;
    /// the cue joins the indices once the scan completes and is first
    /// considered on the next time update.
    pub fn register_cue(&mut self, mut spec: CueSpec) -> Result<CueId, String> {
        let id = spec.normalize(self.duration, self.ids)?;
        self.pending.push(PendingOp::Register(spec));
        Ok(id)
    }

    /// Removes a cue from the firing player once the scan completes.
    pub fn remove_cue(&mut self, id: &CueId) {
        self.pending.push(PendingOp::Remove(id.clone()));
    }
}

enum Phase {
    Open,
    Close,
    FlyOver,
}

enum Step {
    Stop,
    Advance,
    Orphan(CueId),
    Fire(Arc<CueHandlers>, Option<CueEvent>, Phase),
}

fn fire(callback: &Option<CueCallback>, event: &Option<CueEvent>, ctx: &mut CueContext<'_>) {
    if let (Some(callback), Some(event)) = (callback, event) {
        callback(ctx, event);
    }
}

/// Fires every start/end callback whose boundary lies between the player's
/// previous time and `new_time`, in boundary order, exactly once per crossing.
///
/// Forward motion closes crossed-out cues (`by_end` walk) before opening
/// newly covered ones (`by_start` walk); backward motion mirrors this. A cue
/// whose whole interval was jumped over fires its start immediately before
/// its end during the closing walk. Cues whose adapter has been unregistered
/// are removed on sight and the walk resumes from the adjusted cursor.
///
/// Returns the structural changes callbacks requested; the caller applies
/// them once the indices are no longer being walked.
pub(crate) fn run_update(
    player: &mut Player,
    adapters: &AdapterRegistry,
    ids: &mut IdSource,
    new_time: f64,
) -> Vec<PendingOp> {
    let prev = player.tracks.previous_time;
    let duration = player.playhead().duration();
    let mut pending = Vec::new();
    let mut ctx = CueContext {
        time: new_time,
        duration,
        player_id: player.id().to_string(),
        pending: &mut pending,
        ids,
    };

    if new_time > prev {
        // Close every cue whose end has been crossed.
        loop {
            let step = match player.tracks.cue_at_end_cursor() {
                Some(cue) if cue.end <= new_time => {
                    if !adapters.cue_alive(cue) {
                        match cue.id.clone() {
                            Some(id) => Step::Orphan(id),
                            None => Step::Advance,
                        }
                    } else if cue.running {
                        Step::Fire(cue.handlers.clone(), cue.event(), Phase::Close)
                    } else if cue.start >= prev {
                        // The whole interval fits inside this update: the cue
                        // was jumped over (or is degenerate) and still owes
                        // both callbacks. The running flag guards against a
                        // second start for anything already opened.
                        Step::Fire(cue.handlers.clone(), cue.event(), Phase::FlyOver)
                    } else {
                        Step::Advance
                    }
                }
                _ => Step::Stop,
            };
            match step {
                Step::Stop => break,
                Step::Advance => player.tracks.advance_end(),
                Step::Orphan(id) => {
                    log::debug!("sweeping orphaned cue {} from {}", id, player.id());
                    player.remove_cue(&id);
                }
                Step::Fire(handlers, event, Phase::Close) => {
                    player.tracks.set_running_at_end_cursor(false);
                    player.tracks.advance_end();
                    fire(&handlers.on_end, &event, &mut ctx);
                }
                Step::Fire(handlers, event, _) => {
                    player.tracks.advance_end();
                    fire(&handlers.on_start, &event, &mut ctx);
                    fire(&handlers.on_end, &event, &mut ctx);
                }
            }
        }

        // Open every cue whose start has been crossed and whose interval
        // still covers the new time.
        loop {
            let step = match player.tracks.cue_at_start_cursor() {
                Some(cue) if cue.start <= new_time => {
                    if !adapters.cue_alive(cue) {
                        match cue.id.clone() {
                            Some(id) => Step::Orphan(id),
                            None => Step::Advance,
                        }
                    } else if cue.end > new_time && !cue.running {
                        Step::Fire(cue.handlers.clone(), cue.event(), Phase::Open)
                    } else {
                        Step::Advance
                    }
                }
                _ => Step::Stop,
            };
            match step {
                Step::Stop => break,
                Step::Advance => player.tracks.advance_start(),
                Step::Orphan(id) => {
                    log::debug!("sweeping orphaned cue {} from {}", id, player.id());
                    player.remove_cue(&id);
                }
                Step::Fire(handlers, event, _) => {
                    player.tracks.set_running_at_start_cursor(true);
                    player.tracks.advance_start();
                    fire(&handlers.on_start, &event, &mut ctx);
                }
            }
        }
    } else if new_time < prev {
        // Close cues whose start is now in the future.
        loop {
            let step = match player.tracks.cue_at_start_cursor() {
                Some(cue) if cue.start > new_time => {
                    if !adapters.cue_alive(cue) {
                        match cue.id.clone() {
                            Some(id) => Step::Orphan(id),
                            None => Step::Advance,
                        }
                    } else if cue.running {
                        Step::Fire(cue.handlers.clone(), cue.event(), Phase::Close)
                    } else {
                        Step::Advance
                    }
                }
                _ => Step::Stop,
            };
            match step {
                Step::Stop => break,
                Step::Advance => {
                    if !player.tracks.retreat_start() {
                        break;
                    }
                }
                Step::Orphan(id) => {
                    log::debug!("sweeping orphaned cue {} from {}", id, player.id());
                    player.remove_cue(&id);
                }
                Step::Fire(handlers, event, _) => {
                    player.tracks.set_running_at_start_cursor(false);
                    let moved = player.tracks.retreat_start();
                    fire(&handlers.on_end, &event, &mut ctx);
                    if !moved {
                        break;
                    }
                }
            }
        }

        // Reopen cues whose interval contains the new time.
        loop {
            let step = match player.tracks.cue_at_end_cursor() {
                Some(cue) if cue.end > new_time => {
                    if !adapters.cue_alive(cue) {
                        match cue.id.clone() {
                            Some(id) => Step::Orphan(id),
                            None => Step::Advance,
                        }
                    } else if cue.start <= new_time && !cue.running {
                        Step::Fire(cue.handlers.clone(), cue.event(), Phase::Open)
                    } else {
                        Step::Advance
                    }
                }
                _ => Step::Stop,
            };
            match step {
                Step::Stop => break,
                Step::Advance => {
                    if !player.tracks.retreat_end() {
                        break;
                    }
                }
                Step::Orphan(id) => {
                    log::debug!("sweeping orphaned cue {} from {}", id, player.id());
                    player.remove_cue(&id);
                }
                Step::Fire(handlers, event, _) => {
                    player.tracks.set_running_at_end_cursor(true);
                    let moved = player.tracks.retreat_end();
                    fire(&handlers.on_start, &event, &mut ctx);
                    if !moved {
                        break;
                    }
                }
            }
        }
    }

    player.tracks.previous_time = new_time;
    drop(ctx);
    pending
}
