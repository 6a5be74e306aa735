pub mod timeline;
pub mod timeline_manager;

pub use timeline::{Timeline, TimelineEntry};
pub use timeline_manager::TimelineManager;
