use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cue::cue::{Cue, CueHandlers};

/// Kind names the engine reserves for its own operations.
const RESERVED_KINDS: &[&str] = &["exec", "cue", "timeupdate"];

/// Metadata describing an adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdapterManifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl AdapterManifest {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// An external collaborator that owns cues of one kind: a manifest plus the
/// start/end handler pair stamped onto every cue it registers.
#[derive(Clone)]
pub struct Adapter {
    pub manifest: AdapterManifest,
    pub handlers: CueHandlers,
}

impl Adapter {
    pub fn new(manifest: AdapterManifest, handlers: CueHandlers) -> Self {
        Self { manifest, handlers }
    }
}

/// The set of adapter kinds the engine currently knows how to drive.
///
/// Unregistering a kind does not touch existing cues directly; the scheduler
/// sweeps them lazily when a scan reaches a cue whose kind is no longer here.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Adapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: &str, adapter: Adapter) -> Result<(), String> {
        if RESERVED_KINDS.contains(&kind) {
            return Err(format!("'{}' is a protected kind name", kind));
        }
        if self.adapters.insert(kind.to_string(), adapter).is_some() {
            log::warn!("adapter kind '{}' re-registered, replacing handlers", kind);
        }
        Ok(())
    }

    pub fn unregister(&mut self, kind: &str) -> bool {
        self.adapters.remove(kind).is_some()
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.adapters.contains_key(kind)
    }

    pub fn get(&self, kind: &str) -> Option<&Adapter> {
        self.adapters.get(kind)
    }

    pub fn manifest(&self, kind: &str) -> Option<&AdapterManifest> {
        self.adapters.get(kind).map(|adapter| &adapter.manifest)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Whether a scan may still fire this cue. Untagged cues (guards) and
    /// cues carrying their own handlers are always alive; adapter-backed cues
    /// die with their adapter's registration.
    pub(crate) fn cue_alive(&self, cue: &Cue) -> bool {
        match cue.kind.as_deref() {
            Some(kind) => cue.owns_handlers || self.is_registered(kind),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(name: &str) -> Adapter {
        Adapter::new(AdapterManifest::named(name), CueHandlers::nop())
    }

    #[test]
    fn test_reserved_kind_is_rejected() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.register("exec", adapter("exec")).is_err());
        assert!(registry.register("caption", adapter("caption")).is_ok());
    }

    #[test]
    fn test_unregister_removes_kind() {
        let mut registry = AdapterRegistry::new();
        registry.register("caption", adapter("caption")).unwrap();
        assert!(registry.is_registered("caption"));
        assert!(registry.unregister("caption"));
        assert!(!registry.is_registered("caption"));
        assert!(!registry.unregister("caption"));
    }

    #[test]
    fn test_kinds_are_sorted() {
        let mut registry = AdapterRegistry::new();
        registry.register("marker", adapter("marker")).unwrap();
        registry.register("caption", adapter("caption")).unwrap();
        assert_eq!(registry.kinds(), vec!["caption", "marker"]);
    }
}
