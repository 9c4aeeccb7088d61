use crate::canvas::layers::LayerId;
use crate::canvas::surface::{Snapshot, Surface};
use std::collections::{HashMap, VecDeque};

/// Undo/redo stacks of full-surface snapshots for one layer.
#[derive(Debug, Clone, Default)]
pub struct LayerHistory {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl LayerHistory {
    /// Records the surface as it is right now and invalidates the redo branch.
    pub fn save(&mut self, surface: &Surface, limit: Option<usize>) {
        self.undo_stack.push_back(surface.snapshot());
        self.redo_stack.clear();
        if let Some(limit) = limit {
            while self.undo_stack.len() > limit.max(1) {
                let _ = self.undo_stack.pop_front();
            }
        }
    }

    /// Returns `false` and leaves everything untouched when there is nothing to undo.
    pub fn undo(&mut self, surface: &mut Surface) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = surface.snapshot();
        if let Err(err) = surface.restore(&previous) {
            tracing::error!(%err, "undo snapshot does not fit the surface");
            self.undo_stack.push_back(previous);
            return false;
        }
        self.redo_stack.push(current);
        true
    }

    pub fn redo(&mut self, surface: &mut Surface) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = surface.snapshot();
        if let Err(err) = surface.restore(&next) {
            tracing::error!(%err, "redo snapshot does not fit the surface");
            self.redo_stack.push(next);
            return false;
        }
        self.undo_stack.push_back(current);
        true
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn retained_bytes(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(Snapshot::byte_len)
            .sum()
    }
}

/// Per-layer histories keyed by stable layer id rather than stack position.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: HashMap<LayerId, LayerHistory>,
    limit: Option<usize>,
}

impl HistoryLedger {
    /// `limit` caps each layer's undo depth; `None` keeps every snapshot.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            limit,
        }
    }

    pub fn register(&mut self, id: LayerId) {
        let _ = self.entries.entry(id).or_default();
    }

    pub fn entry(&self, id: LayerId) -> Option<&LayerHistory> {
        self.entries.get(&id)
    }

    pub fn save(&mut self, id: LayerId, surface: &Surface) {
        let limit = self.limit;
        self.entries.entry(id).or_default().save(surface, limit);
    }

    pub fn undo(&mut self, id: LayerId, surface: &mut Surface) -> bool {
        self.entries
            .get_mut(&id)
            .is_some_and(|history| history.undo(surface))
    }

    pub fn redo(&mut self, id: LayerId, surface: &mut Surface) -> bool {
        self.entries
            .get_mut(&id)
            .is_some_and(|history| history.redo(surface))
    }

    pub fn retained_bytes(&self) -> usize {
        self.entries.values().map(LayerHistory::retained_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::model::{Color, Point, StrokeMode};

    fn dab(surface: &mut Surface, x: f32) {
        surface.paint_stroke(
            Point::new(x, 5.0),
            Point::new(x, 5.0),
            Color::BLACK,
            3.0,
            StrokeMode::Normal,
        );
    }

    #[test]
    fn new_save_clears_redo_stack() {
        let mut surface = Surface::new(20, 10);
        let mut history = LayerHistory::default();

        history.save(&surface, None);
        dab(&mut surface, 5.0);
        assert!(history.undo(&mut surface));
        assert_eq!(history.redo_len(), 1);

        history.save(&surface, None);
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
        assert!(!history.redo(&mut surface));
    }

    #[test]
    fn undo_redo_roundtrip_pixels() {
        let mut surface = Surface::new(20, 10);
        let mut history = LayerHistory::default();
        let before = surface.snapshot();

        history.save(&surface, None);
        dab(&mut surface, 5.0);
        let after = surface.snapshot();

        assert!(history.undo(&mut surface));
        assert_eq!(surface.snapshot(), before);
        assert!(history.redo(&mut surface));
        assert_eq!(surface.snapshot(), after);
    }

    #[test]
    fn empty_stacks_are_silent_noops() {
        let mut surface = Surface::new(4, 4);
        dab(&mut surface, 2.0);
        let before = surface.snapshot();
        let mut history = LayerHistory::default();

        assert!(!history.undo(&mut surface));
        assert!(!history.redo(&mut surface));
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn limit_evicts_oldest_snapshot_first() {
        let mut surface = Surface::new(30, 10);
        let mut history = LayerHistory::default();

        for x in [5.0, 15.0, 25.0] {
            history.save(&surface, Some(2));
            dab(&mut surface, x);
        }
        assert_eq!(history.undo_len(), 2);

        assert!(history.undo(&mut surface));
        assert!(history.undo(&mut surface));
        assert!(!history.undo(&mut surface));
        // The first dab predates the oldest retained snapshot.
        assert_eq!(surface.pixel(5, 5), Color::BLACK);
        assert_eq!(surface.pixel(15, 5), Color::TRANSPARENT);
    }

    #[test]
    fn ledger_keeps_layers_apart() {
        let mut first = Surface::new(10, 10);
        let mut second = Surface::new(10, 10);
        let mut ledger = HistoryLedger::new(None);
        ledger.register(LayerId::new(1));
        ledger.register(LayerId::new(2));

        ledger.save(LayerId::new(1), &first);
        dab(&mut first, 5.0);

        assert!(!ledger.undo(LayerId::new(2), &mut second));
        assert!(ledger.undo(LayerId::new(1), &mut first));
        assert!(first.is_blank());
        assert_eq!(ledger.entry(LayerId::new(1)).map(LayerHistory::redo_len), Some(1));
        assert_eq!(ledger.entry(LayerId::new(2)).map(LayerHistory::undo_len), Some(0));
    }

    #[test]
    fn unknown_layer_undo_is_a_noop() {
        let mut surface = Surface::new(4, 4);
        let mut ledger = HistoryLedger::default();
        assert!(!ledger.undo(LayerId::new(9), &mut surface));
        assert!(!ledger.redo(LayerId::new(9), &mut surface));
    }
}
