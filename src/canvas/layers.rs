use crate::canvas::error::CanvasError;
use crate::canvas::history::{HistoryLedger, LayerHistory};
use crate::canvas::surface::Surface;

/// Stable identity of a layer. Survives reordering and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    surface: Surface,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// Ordered layers, bottom to top, plus the active index and every layer's history.
#[derive(Debug, Clone)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: usize,
    history: HistoryLedger,
    next_id: u64,
}

impl LayerStack {
    /// Starts with one transparent layer whose history is empty.
    pub fn new(width: u32, height: u32, history_limit: Option<usize>) -> Self {
        let mut stack = Self {
            width,
            height,
            layers: Vec::new(),
            active: 0,
            history: HistoryLedger::new(history_limit),
            next_id: 1,
        };
        let _ = stack.add_layer();
        stack
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Appends a transparent layer on top and makes it active.
    pub fn add_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let name = format!("Layer {}", self.layers.len() + 1);
        self.layers.push(Layer {
            id,
            name,
            surface: Surface::new(self.width, self.height),
        });
        self.history.register(id);
        self.active = self.layers.len() - 1;
        tracing::debug!(layer = id.raw(), count = self.layers.len(), "layer added");
        id
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.layers.len() {
            return Err(CanvasError::InvalidLayerIndex {
                index,
                len: self.layers.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_id(&self) -> LayerId {
        self.layers[self.active].id
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn surface_mut(&mut self, id: LayerId) -> Option<&mut Surface> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .map(|layer| &mut layer.surface)
    }

    pub fn history(&self, id: LayerId) -> Option<&LayerHistory> {
        self.history.entry(id)
    }

    pub fn history_bytes(&self) -> usize {
        self.history.retained_bytes()
    }

    /// Records the layer's current pixels as an undo point.
    pub fn save(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.iter().find(|layer| layer.id == id) else {
            return false;
        };
        self.history.save(id, &layer.surface);
        true
    }

    /// Undoable: saves first, then wipes only the active layer.
    pub fn clear_active(&mut self) {
        let id = self.active_id();
        let _ = self.save(id);
        if let Some(surface) = self.surface_mut(id) {
            surface.clear();
        }
    }

    pub fn undo(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == id) else {
            return false;
        };
        self.history.undo(id, &mut layer.surface)
    }

    pub fn redo(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == id) else {
            return false;
        };
        self.history.redo(id, &mut layer.surface)
    }

    pub fn undo_active(&mut self) -> bool {
        self.undo(self.active_id())
    }

    pub fn redo_active(&mut self) -> bool {
        self.redo(self.active_id())
    }
}
