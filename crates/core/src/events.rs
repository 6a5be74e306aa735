use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

/// Listener invoked when a custom event fires on a player.
pub type EventCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Named listener table for per-player custom events.
///
/// Listeners are keyed by event type and listener name; registering the same
/// name again replaces the previous listener.
#[derive(Clone, Default)]
pub(crate) struct EventListeners {
    listeners: HashMap<String, Vec<(String, EventCallback)>>,
}

impl EventListeners {
    pub(crate) fn listen(&mut self, event: &str, name: &str, callback: EventCallback) {
        let entries = self.listeners.entry(event.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = callback;
        } else {
            entries.push((name.to_string(), callback));
        }
    }

    /// Drops one listener by name, or every listener for the event type.
    pub(crate) fn unlisten(&mut self, event: &str, name: Option<&str>) {
        match name {
            Some(name) => {
                if let Some(entries) = self.listeners.get_mut(event) {
                    entries.retain(|(n, _)| n != name);
                }
            }
            None => {
                self.listeners.remove(event);
            }
        }
    }

    /// Fires every listener for the event type, returning how many ran.
    pub(crate) fn trigger(&self, event: &str, data: &Value) -> usize {
        match self.listeners.get(event) {
            Some(entries) => {
                for (_, callback) in entries {
                    callback(data);
                }
                entries.len()
            }
            None => 0,
        }
    }
}
