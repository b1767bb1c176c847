use serde::{Deserialize, Serialize};

use super::chunk_key::ChunkPos;

/// Позиция блока в мире
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Чанк, в котором лежит блок
    #[inline]
    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::from_block_pos(*self)
    }
}
