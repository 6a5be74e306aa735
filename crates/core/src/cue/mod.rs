pub mod cue;
pub mod scheduler;
pub mod track_index;

pub use cue::{Cue, CueCallback, CueEvent, CueHandlers, CueId, CueSpec};
pub use scheduler::CueContext;
