use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{from_reader, to_writer_pretty};

use crate::engine::Engine;

use super::timeline::Timeline;

const TIMELINE_EXTENSION: &str = "reel";

/// Loads and saves timeline files and hydrates the current one into an
/// engine's cue set.
pub struct TimelineManager {
    timelines_directory: PathBuf,
    current_timeline: Option<Timeline>,
    current_path: Option<PathBuf>,
}

impl TimelineManager {
    pub fn new() -> Result<Self> {
        let directory = std::env::current_dir()?;
        Ok(Self::with_directory(directory))
    }

    pub fn with_directory(directory: PathBuf) -> Self {
        Self {
            timelines_directory: directory,
            current_timeline: None,
            current_path: None,
        }
    }

    pub fn new_timeline(&mut self, name: String) -> Timeline {
        let timeline = Timeline::new(name);
        self.current_timeline = Some(timeline.clone());
        self.current_path = None;
        timeline
    }

    pub fn current(&self) -> Option<&Timeline> {
        self.current_timeline.as_ref()
    }

    pub fn set_current(&mut self, timeline: Timeline) {
        self.current_timeline = Some(timeline);
    }

    /// Saves the current timeline, deriving a file name from its name when it
    /// has never been saved before.
    pub fn save(&mut self) -> Result<PathBuf> {
        let timeline = match &self.current_timeline {
            Some(timeline) => timeline.clone(),
            None => return Err(anyhow::anyhow!("no timeline is currently loaded")),
        };

        let path = if let Some(path) = &self.current_path {
            path.clone()
        } else {
            let sanitized_name = timeline.name.replace(' ', "_").to_lowercase();
            self.timelines_directory
                .join(format!("{}.{}", sanitized_name, TIMELINE_EXTENSION))
        };

        let file = File::create(&path)?;
        to_writer_pretty(file, &timeline)?;

        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn save_as(&mut self, timeline: Timeline, path: PathBuf) -> Result<PathBuf> {
        let file = File::create(&path)?;
        to_writer_pretty(file, &timeline)?;

        self.current_timeline = Some(timeline);
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn load(&mut self, path: &Path) -> Result<Timeline> {
        let file = File::open(path)?;
        let timeline: Timeline = from_reader(file)?;

        self.current_timeline = Some(timeline.clone());
        self.current_path = Some(path.to_path_buf());
        Ok(timeline)
    }

    /// Registers the current timeline's entries as cues on one player.
    /// Entries whose kind has no registered adapter are skipped with a
    /// warning. Returns how many cues were registered.
    pub fn apply_to_player(&self, engine: &mut Engine, player_id: &str) -> Result<usize> {
        let timeline = match &self.current_timeline {
            Some(timeline) => timeline,
            None => return Err(anyhow::anyhow!("no timeline is currently loaded")),
        };

        let mut registered = 0;
        for entry in &timeline.entries {
            if !engine.adapters().is_registered(&entry.kind) {
                log::warn!(
                    "timeline '{}': skipping entry at {}s, no adapter for kind '{}'",
                    timeline.name,
                    entry.start,
                    entry.kind
                );
                continue;
            }
            engine
                .register_cue(player_id, entry.to_spec())
                .map_err(|err| anyhow::anyhow!(err))?;
            registered += 1;
        }
        log::info!(
            "timeline '{}': registered {} of {} entries on {}",
            timeline.name,
            registered,
            timeline.entries.len(),
            player_id
        );
        Ok(registered)
    }

    pub fn list_timelines(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.timelines_directory)?;

        let mut timelines = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext == TIMELINE_EXTENSION)
            {
                timelines.push(path);
            }
        }
        Ok(timelines)
    }
}
