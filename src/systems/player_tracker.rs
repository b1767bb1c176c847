// ============================================
// Player Tracker - Вход игрока в новый чанк
// ============================================

use crate::scheduler::ChunkTransformer;
use crate::terrain::{BlockPos, ChunkPos, WorldMutator};

/// Помнит последний чанк игрока. Хост вызывает раз в тик.
#[derive(Debug, Default)]
pub struct PlayerTracker {
    last_chunk: Option<ChunkPos>,
}

impl PlayerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_chunk(&self) -> Option<ChunkPos> {
        self.last_chunk
    }

    /// Новый чанк, если игрок его сменил
    pub fn observe(&mut self, pos: BlockPos) -> Option<ChunkPos> {
        let chunk = pos.chunk_pos();
        if self.last_chunk == Some(chunk) {
            return None;
        }
        self.last_chunk = Some(chunk);
        Some(chunk)
    }

    /// Тик игрока: при смене чанка передаём событие трансформеру
    pub fn on_player_tick<W: WorldMutator + ?Sized>(
        &mut self,
        transformer: &ChunkTransformer,
        pos: BlockPos,
        world: &mut W,
    ) -> bool {
        match self.observe(pos) {
            Some(chunk) => {
                log::debug!("[PLAYER] Entered chunk {:?}", chunk);
                transformer.handle_chunk_enter(chunk, world);
                true
            }
            None => false,
        }
    }

    /// После респауна следующий тик всегда считается входом
    pub fn on_respawn(&mut self) {
        self.last_chunk = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_in_same_chunk_are_filtered() {
        let mut tracker = PlayerTracker::new();
        assert_eq!(tracker.observe(BlockPos::new(1, 64, 1)), Some(ChunkPos::new(0, 0)));
        assert_eq!(tracker.observe(BlockPos::new(15, 70, 15)), None);
        assert_eq!(tracker.observe(BlockPos::new(16, 70, 15)), Some(ChunkPos::new(1, 0)));
        assert_eq!(tracker.observe(BlockPos::new(-1, 70, 0)), Some(ChunkPos::new(-1, 0)));
    }

    #[test]
    fn respawn_forces_next_entry() {
        let mut tracker = PlayerTracker::new();
        tracker.observe(BlockPos::new(0, 0, 0));
        tracker.on_respawn();
        assert_eq!(tracker.last_chunk(), None);
        assert_eq!(tracker.observe(BlockPos::new(0, 0, 0)), Some(ChunkPos::new(0, 0)));
    }
}
