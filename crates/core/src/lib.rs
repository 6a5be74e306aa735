pub use adapter::{Adapter, AdapterManifest, AdapterRegistry};
pub use cue::{Cue, CueCallback, CueContext, CueEvent, CueHandlers, CueId, CueSpec};
pub use engine::Engine;
pub use events::EventCallback;
pub use player::Player;
pub use playhead::Playhead;
pub use timeline::{Timeline, TimelineEntry, TimelineManager};

mod adapter;
mod cue;
mod engine;
mod events;
mod player;
mod playhead;
mod registry;
mod timeline;
