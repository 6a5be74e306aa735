use std::collections::HashMap;

use crate::player::Player;
use crate::playhead::playhead::Playhead;

/// Players addressed by id, so several independent playheads can coexist in
/// one engine. Ids come from the host's natural element id when it is free,
/// otherwise a generated `playerN` name.
#[derive(Default)]
pub(crate) struct InstanceRegistry {
    players: HashMap<String, Player>,
    counter: u64,
}

impl InstanceRegistry {
    pub(crate) fn create(&mut self, natural_id: Option<&str>, playhead: Playhead) -> String {
        let id = match natural_id {
            Some(id) if !id.is_empty() && !self.players.contains_key(id) => id.to_string(),
            _ => loop {
                self.counter += 1;
                let candidate = format!("player{}", self.counter);
                if !self.players.contains_key(&candidate) {
                    break candidate;
                }
            },
        };
        log::info!("creating player '{}'", id);
        self.players.insert(id.clone(), Player::new(id.clone(), playhead));
        id
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Tears the player down; its cues die with it.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub(crate) fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.players.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_id_wins_when_free() {
        let mut registry = InstanceRegistry::default();
        let id = registry.create(Some("intro-video"), Playhead::default());
        assert_eq!(id, "intro-video");
        assert!(registry.get("intro-video").is_some());
    }

    #[test]
    fn test_collision_falls_back_to_generated_id() {
        let mut registry = InstanceRegistry::default();
        registry.create(Some("video"), Playhead::default());
        let second = registry.create(Some("video"), Playhead::default());
        assert_eq!(second, "player1");
        assert_eq!(registry.ids().len(), 2);
    }

    #[test]
    fn test_remove_tears_down_player() {
        let mut registry = InstanceRegistry::default();
        let id = registry.create(None, Playhead::default());
        assert!(registry.remove(&id).is_some());
        assert!(registry.ids().is_empty());
        assert!(registry.remove(&id).is_none());
    }
}
