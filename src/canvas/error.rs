use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("layer index {index} is out of range (stack has {len} layers)")]
    InvalidLayerIndex { index: usize, len: usize },
    #[error("snapshot is {snapshot:?} but the surface is {surface:?}")]
    SnapshotSizeMismatch {
        snapshot: (u32, u32),
        surface: (u32, u32),
    },
}
