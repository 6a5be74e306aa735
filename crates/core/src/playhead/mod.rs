pub mod playhead;

pub use playhead::Playhead;
