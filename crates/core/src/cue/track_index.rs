use std::collections::HashMap;

use crate::cue::cue::{Cue, CueId};

/// Dual sorted view over one player's cue set.
///
/// Cues live in an arena keyed by stable slot handles; `by_start` and
/// `by_end` order those handles by start and end time respectively, so both
/// views always observe the same cue (one `running` flag per cue, not two).
/// Each view has its own cursor marking scan progress, and two id-less guard
/// cues bound the arrays so cursor walks never index out of range.
pub(crate) struct TrackIndex {
    slots: HashMap<u64, Cue>,
    by_start: Vec<u64>,
    by_end: Vec<u64>,
    next_slot: u64,
    pub(crate) start_index: usize,
    pub(crate) end_index: usize,
    pub(crate) previous_time: f64,
}

impl TrackIndex {
    /// A fresh index holding the lower guard at -1 and the upper guard at
    /// `upper_bound` (duration + 1, or an effectively infinite bound).
    pub(crate) fn new(upper_bound: f64) -> Self {
        let mut index = Self {
            slots: HashMap::new(),
            by_start: Vec::new(),
            by_end: Vec::new(),
            next_slot: 0,
            start_index: 0,
            end_index: 0,
            previous_time: 0.0,
        };
        index.insert(Cue::guard(-1.0));
        index.insert(Cue::guard(upper_bound));
        index
    }

    /// Sorted insertion into both views. Placement is after any equal key, so
    /// relative order among ties follows insertion order within each view.
    pub(crate) fn insert(&mut self, cue: Cue) {
        let key = self.next_slot;
        self.next_slot += 1;

        let at = self
            .by_start
            .partition_point(|k| self.slots[k].start <= cue.start);
        self.by_start.insert(at, key);

        let at = self.by_end.partition_point(|k| self.slots[k].end <= cue.end);
        self.by_end.insert(at, key);

        self.slots.insert(key, cue);
    }

    /// Removes the cue carrying `id`, fixing up whichever cursors sat at or
    /// past its position in each view. Guards carry no id and are never
    /// eligible; an unknown id is a no-op.
    pub(crate) fn remove_by_id(&mut self, id: &CueId) -> bool {
        let pos_start = match self
            .by_start
            .iter()
            .position(|k| self.slots[k].id.as_ref() == Some(id))
        {
            Some(pos) => pos,
            None => return false,
        };
        let key = self.by_start[pos_start];
        let pos_end = match self.by_end.iter().position(|k| *k == key) {
            Some(pos) => pos,
            None => return false,
        };

        self.by_start.remove(pos_start);
        self.by_end.remove(pos_end);
        self.slots.remove(&key);

        if pos_start <= self.start_index {
            self.start_index = self.start_index.saturating_sub(1);
        }
        if pos_end <= self.end_index {
            self.end_index = self.end_index.saturating_sub(1);
        }
        true
    }

    /// Removes every cue tagged with `kind`, returning the removed ids.
    pub(crate) fn remove_kind(&mut self, kind: &str) -> Vec<CueId> {
        let ids: Vec<CueId> = self
            .by_start
            .iter()
            .filter_map(|k| {
                let cue = &self.slots[k];
                if cue.kind.as_deref() == Some(kind) {
                    cue.id.clone()
                } else {
                    None
                }
            })
            .collect();
        for id in &ids {
            self.remove_by_id(id);
        }
        ids
    }

    /// Moves the upper guard to `bound` once the host learns the real
    /// duration. Cursors are fixed up as for a removal; reinsertion follows
    /// the normal sorted-placement rule.
    pub(crate) fn reposition_upper_guard(&mut self, bound: f64) {
        let pos_start = match self
            .by_start
            .iter()
            .position(|k| self.slots[k].is_guard() && self.slots[k].start >= 0.0)
        {
            Some(pos) => pos,
            None => return,
        };
        let key = self.by_start[pos_start];
        let pos_end = match self.by_end.iter().position(|k| *k == key) {
            Some(pos) => pos,
            None => return,
        };

        self.by_start.remove(pos_start);
        self.by_end.remove(pos_end);
        if pos_start <= self.start_index {
            self.start_index = self.start_index.saturating_sub(1);
        }
        if pos_end <= self.end_index {
            self.end_index = self.end_index.saturating_sub(1);
        }

        if let Some(guard) = self.slots.get_mut(&key) {
            guard.start = bound;
            guard.end = bound;
        }
        let at = self.by_start.partition_point(|k| self.slots[k].start <= bound);
        self.by_start.insert(at, key);
        let at = self.by_end.partition_point(|k| self.slots[k].end <= bound);
        self.by_end.insert(at, key);
    }

    pub(crate) fn cue_at_start_cursor(&self) -> Option<&Cue> {
        self.by_start.get(self.start_index).map(|k| &self.slots[k])
    }

    pub(crate) fn cue_at_end_cursor(&self) -> Option<&Cue> {
        self.by_end.get(self.end_index).map(|k| &self.slots[k])
    }

    pub(crate) fn set_running_at_start_cursor(&mut self, running: bool) {
        if let Some(key) = self.by_start.get(self.start_index) {
            if let Some(cue) = self.slots.get_mut(key) {
                cue.running = running;
            }
        }
    }

    pub(crate) fn set_running_at_end_cursor(&mut self, running: bool) {
        if let Some(key) = self.by_end.get(self.end_index) {
            if let Some(cue) = self.slots.get_mut(key) {
                cue.running = running;
            }
        }
    }

    pub(crate) fn advance_start(&mut self) {
        self.start_index += 1;
    }

    pub(crate) fn advance_end(&mut self) {
        self.end_index += 1;
    }

    /// Steps the start cursor back; false once it sits at the lower guard.
    pub(crate) fn retreat_start(&mut self) -> bool {
        if self.start_index == 0 {
            return false;
        }
        self.start_index -= 1;
        true
    }

    pub(crate) fn retreat_end(&mut self) -> bool {
        if self.end_index == 0 {
            return false;
        }
        self.end_index -= 1;
        true
    }

    /// All id-carrying cues in start order; guards excluded.
    pub(crate) fn cues(&self) -> impl Iterator<Item = &Cue> {
        self.by_start
            .iter()
            .map(|k| &self.slots[k])
            .filter(|cue| !cue.is_guard())
    }

    pub(crate) fn user_len(&self) -> usize {
        self.cues().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(id: &str, start: f64, end: f64) -> Cue {
        Cue {
            id: Some(CueId::new(id)),
            start,
            end,
            kind: None,
            running: false,
            payload: serde_json::Value::Null,
            handlers: std::sync::Arc::new(crate::cue::cue::CueHandlers::nop()),
            owns_handlers: true,
        }
    }

    fn start_order(index: &TrackIndex) -> Vec<String> {
        index.cues().map(|c| c.id().unwrap().to_string()).collect()
    }

    #[test]
    fn test_insert_keeps_both_views_sorted() {
        let mut index = TrackIndex::new(f64::MAX);
        index.insert(cue("b", 4.0, 20.0));
        index.insert(cue("a", 0.0, 5.0));
        index.insert(cue("c", 10.0, 12.0));

        assert_eq!(start_order(&index), vec!["a", "b", "c"]);
        let end_order: Vec<String> = index
            .by_end
            .iter()
            .map(|k| &index.slots[k])
            .filter(|c| !c.is_guard())
            .map(|c| c.id().unwrap().to_string())
            .collect();
        assert_eq!(end_order, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = TrackIndex::new(f64::MAX);
        index.insert(cue("first", 5.0, 6.0));
        index.insert(cue("second", 5.0, 6.0));
        assert_eq!(start_order(&index), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_unknown_id_is_a_no_op() {
        let mut index = TrackIndex::new(f64::MAX);
        index.insert(cue("a", 0.0, 5.0));
        assert!(!index.remove_by_id(&CueId::new("missing")));
        assert_eq!(index.user_len(), 1);
    }

    #[test]
    fn test_remove_all_leaves_only_guards() {
        let mut index = TrackIndex::new(31.0);
        index.insert(cue("a", 0.0, 4.0));
        index.insert(cue("b", 4.0, 5.0));
        index.insert(cue("c", 5.0, 6.0));

        index.remove_by_id(&CueId::new("b"));
        index.remove_by_id(&CueId::new("c"));
        index.remove_by_id(&CueId::new("a"));

        assert_eq!(index.user_len(), 0);
        assert_eq!(index.by_start.len(), 2);
        assert_eq!(index.by_end.len(), 2);
        assert!(index.by_start.iter().all(|k| index.slots[k].is_guard()));
    }

    #[test]
    fn test_removal_before_cursor_shifts_it_back() {
        let mut index = TrackIndex::new(f64::MAX);
        index.insert(cue("a", 0.0, 4.0));
        index.insert(cue("b", 4.0, 5.0));
        // Simulate a scan having consumed the lower guard and "a".
        index.start_index = 2;
        index.end_index = 2;

        index.remove_by_id(&CueId::new("a"));
        assert_eq!(index.start_index, 1);
        assert_eq!(index.end_index, 1);
        assert_eq!(
            index.cue_at_start_cursor().and_then(|c| c.id()).unwrap(),
            &CueId::new("b")
        );
    }

    #[test]
    fn test_remove_kind_only_touches_matching_cues() {
        let mut index = TrackIndex::new(f64::MAX);
        let mut tagged = cue("a", 0.0, 4.0);
        tagged.kind = Some("caption".to_string());
        index.insert(tagged);
        index.insert(cue("b", 4.0, 5.0));

        let removed = index.remove_kind("caption");
        assert_eq!(removed, vec![CueId::new("a")]);
        assert_eq!(start_order(&index), vec!["b"]);
    }

    #[test]
    fn test_reposition_upper_guard() {
        let mut index = TrackIndex::new(f64::MAX);
        index.insert(cue("a", 0.0, 40.0));
        index.reposition_upper_guard(31.0);

        let bounds: Vec<f64> = index
            .by_start
            .iter()
            .map(|k| &index.slots[k])
            .filter(|c| c.is_guard())
            .map(|c| c.start())
            .collect();
        assert_eq!(bounds, vec![-1.0, 31.0]);
        // The endless cue now sorts past the guard in the end view.
        let last = index.by_end.last().map(|k| &index.slots[k]).unwrap();
        assert_eq!(last.id().unwrap(), &CueId::new("a"));
    }
}
