use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cue::scheduler::CueContext;

/// Unique identifier for a registered cue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CueId(String);

impl CueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Hands out cue ids from a monotonically increasing counter, prefixed with
/// the owning adapter kind when one is known.
#[derive(Debug, Default)]
pub struct IdSource {
    counter: u64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str) -> CueId {
        self.counter += 1;
        CueId(format!("{}{}", prefix, self.counter))
    }
}

/// Callback invoked when the playhead crosses a cue boundary. The context
/// allows the callback to register or remove cues on the firing player; those
/// requests are applied once the current scan finishes.
pub type CueCallback = Arc<dyn Fn(&mut CueContext<'_>, &CueEvent) + Send + Sync>;

/// Start/end callback pair. An adapter supplies one pair that is stamped onto
/// every cue of its kind; a missing side simply never fires.
#[derive(Clone, Default)]
pub struct CueHandlers {
    pub on_start: Option<CueCallback>,
    pub on_end: Option<CueCallback>,
}

impl CueHandlers {
    pub fn new(on_start: CueCallback, on_end: CueCallback) -> Self {
        Self {
            on_start: Some(on_start),
            on_end: Some(on_end),
        }
    }

    pub fn start_only(on_start: CueCallback) -> Self {
        Self {
            on_start: Some(on_start),
            on_end: None,
        }
    }

    /// Handlers that do nothing, for boundary-marker cues.
    pub fn nop() -> Self {
        Self::default()
    }
}

impl fmt::Debug for CueHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CueHandlers")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Snapshot of a cue handed to callbacks and query results.
#[derive(Debug, Clone)]
pub struct CueEvent {
    pub id: CueId,
    pub start: f64,
    pub end: f64,
    pub kind: Option<String>,
    pub payload: Value,
}

/// Registration request for a new cue.
///
/// `start` defaults to 0 and `end` to the player's duration (or an effectively
/// infinite bound when the duration is unknown). A spec naming a registered
/// adapter kind inherits that adapter's handlers; explicit handlers override.
#[derive(Clone, Default)]
pub struct CueSpec {
    pub id: Option<CueId>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub kind: Option<String>,
    pub payload: Value,
    pub handlers: Option<CueHandlers>,
}

impl CueSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// Fills timing defaults, rejects malformed timing and assigns an id when
    /// the caller did not pick one.
    pub(crate) fn normalize(
        &mut self,
        duration: Option<f64>,
        ids: &mut IdSource,
    ) -> Result<CueId, String> {
        let start = self.start.unwrap_or(0.0);
        let end = self.end.unwrap_or_else(|| duration.unwrap_or(f64::MAX));
        if start.is_nan() || end.is_nan() {
            return Err("cue timing must be a number".to_string());
        }
        self.start = Some(start);
        self.end = Some(end);

        let id = match &self.id {
            Some(id) => id.clone(),
            None => ids.next(self.kind.as_deref().unwrap_or("cue")),
        };
        self.id = Some(id.clone());
        Ok(id)
    }
}

/// A schedulable time interval with boundary callbacks.
///
/// Mutated only by the scheduler (the `running` flip) or by explicit removal.
/// The two guard cues a player owns are the only id-less entries.
#[derive(Clone)]
pub struct Cue {
    pub(crate) id: Option<CueId>,
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) kind: Option<String>,
    pub(crate) running: bool,
    pub(crate) payload: Value,
    pub(crate) handlers: Arc<CueHandlers>,
    /// True when the handlers were supplied with the spec rather than
    /// inherited from an adapter; such cues survive adapter unregistration.
    pub(crate) owns_handlers: bool,
}

impl Cue {
    /// Boundary marker pinned at `bound`; never fires, never removable.
    pub(crate) fn guard(bound: f64) -> Self {
        Self {
            id: None,
            start: bound,
            end: bound,
            kind: None,
            running: false,
            payload: Value::Null,
            handlers: Arc::new(CueHandlers::nop()),
            owns_handlers: true,
        }
    }

    pub(crate) fn is_guard(&self) -> bool {
        self.id.is_none()
    }

    pub fn id(&self) -> Option<&CueId> {
        self.id.as_ref()
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Snapshot for callbacks and queries; guards have none.
    pub(crate) fn event(&self) -> Option<CueEvent> {
        let id = self.id.clone()?;
        Some(CueEvent {
            id,
            start: self.start,
            end: self.end,
            kind: self.kind.clone(),
            payload: self.payload.clone(),
        })
    }
}

impl fmt::Debug for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cue")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("kind", &self.kind)
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_source_prefixes_and_increments() {
        let mut ids = IdSource::new();
        assert_eq!(ids.next("caption").as_str(), "caption1");
        assert_eq!(ids.next("caption").as_str(), "caption2");
        assert_eq!(ids.next("marker").as_str(), "marker3");
    }

    #[test]
    fn test_guard_has_no_id_and_no_event() {
        let guard = Cue::guard(-1.0);
        assert!(guard.is_guard());
        assert!(guard.event().is_none());
    }
}
