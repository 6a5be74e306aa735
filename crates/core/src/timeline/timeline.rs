use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cue::cue::{CueId, CueSpec};

/// A saved cue sheet: plain timing data an engine can hydrate into cues once
/// the matching adapter kinds are registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub name: String,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new(name: String) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }
}

/// One scheduled action in a timeline file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub start: f64,
    /// Missing end means "until the media ends".
    #[serde(default)]
    pub end: Option<f64>,
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl TimelineEntry {
    pub fn to_spec(&self) -> CueSpec {
        CueSpec {
            id: self.id.as_deref().map(CueId::from),
            start: Some(self.start),
            end: self.end,
            kind: Some(self.kind.clone()),
            payload: self.payload.clone(),
            handlers: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_deserializes_with_defaults() {
        let entry: TimelineEntry =
            serde_json::from_value(json!({ "start": 4.0, "kind": "caption" })).unwrap();
        assert_eq!(entry.end, None);
        assert_eq!(entry.id, None);
        assert_eq!(entry.payload, Value::Null);

        let spec = entry.to_spec();
        assert_eq!(spec.start, Some(4.0));
        assert_eq!(spec.kind.as_deref(), Some("caption"));
    }
}
