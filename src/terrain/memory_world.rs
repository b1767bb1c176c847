// ============================================
// Memory World - Мир в памяти
// ============================================
// Слои по высоте + изменённые блоки поверх них.
// Эталонный хост для демо и тестов: читается из фоновых
// потоков, пишется владельцем через WorldMutator.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, RwLock};

use crate::blocks::BlockType;
use crate::core::{read, write};
use super::block_pos::BlockPos;
use super::chunk_key::ChunkPos;
use super::grid::{BlockReader, Cell, UpdateFlags, WorldMutator};

/// Счётчики обновлений мира
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldUpdateStats {
    /// set_block с UpdateFlags::All
    pub full_updates: u64,
    /// set_block с UpdateFlags::ClientsOnly
    pub client_updates: u64,
    /// Вызовы block_updated
    pub neighbor_updates: u64,
}

struct WorldState {
    min_y: i32,
    max_y: i32,
    /// Базовый блок для каждого уровня высоты
    layers: Vec<Cell>,
    /// Изменённые клетки: позиция -> состояние
    changes: HashMap<BlockPos, Cell>,
    /// Чанки с изменениями с момента последнего take_dirty_chunks
    dirty_chunks: Vec<ChunkPos>,
    /// Версия изменений (инкрементируется при каждой записи)
    version: u64,
    stats: WorldUpdateStats,
}

impl WorldState {
    fn cell(&self, pos: BlockPos) -> Cell {
        if pos.y < self.min_y || pos.y >= self.max_y {
            return Cell::AIR;
        }
        if let Some(cell) = self.changes.get(&pos) {
            return *cell;
        }
        self.layers[(pos.y - self.min_y) as usize]
    }

    fn put(&mut self, pos: BlockPos, cell: Cell) {
        if pos.y < self.min_y || pos.y >= self.max_y {
            return;
        }
        self.changes.insert(pos, cell);
        self.version += 1;

        let chunk = pos.chunk_pos();
        if !self.dirty_chunks.contains(&chunk) {
            self.dirty_chunks.push(chunk);
        }
    }
}

/// Хэндл мира. Клоны разделяют одно состояние.
#[derive(Clone)]
pub struct MemoryWorld {
    state: Arc<RwLock<WorldState>>,
}

impl MemoryWorld {
    /// Пустой мир (воздух) с высотами [min_y, max_y)
    pub fn new(min_y: i32, max_y: i32) -> Self {
        let height = (max_y - min_y).max(0) as usize;
        Self {
            state: Arc::new(RwLock::new(WorldState {
                min_y,
                max_y: min_y + height as i32,
                layers: vec![Cell::AIR; height],
                changes: HashMap::new(),
                dirty_chunks: Vec::new(),
                version: 0,
                stats: WorldUpdateStats::default(),
            })),
        }
    }

    /// Мир со слоями: layer_fn(y) задаёт базовый блок уровня
    pub fn with_layers(min_y: i32, max_y: i32, layer_fn: impl Fn(i32) -> Cell) -> Self {
        let world = Self::new(min_y, max_y);
        {
            let mut state = write(&world.state);
            for y in state.min_y..state.max_y {
                let idx = (y - state.min_y) as usize;
                state.layers[idx] = layer_fn(y);
            }
        }
        world
    }

    /// Поставить клетку без учёта в статистике обновлений (генерация, тесты)
    pub fn place(&self, pos: BlockPos, cell: Cell) {
        write(&self.state).put(pos, cell);
    }

    /// Версия изменений
    pub fn version(&self) -> u64 {
        read(&self.state).version
    }

    /// Количество изменённых клеток
    pub fn change_count(&self) -> usize {
        read(&self.state).changes.len()
    }

    pub fn update_stats(&self) -> WorldUpdateStats {
        read(&self.state).stats
    }

    /// Получить и очистить список грязных чанков
    pub fn take_dirty_chunks(&self) -> Vec<ChunkPos> {
        std::mem::take(&mut write(&self.state).dirty_chunks)
    }

    /// Все клетки чанка, равные блоку
    pub fn count_in_chunk(&self, chunk: ChunkPos, block: BlockType) -> usize {
        let state = read(&self.state);
        let mut count = 0;
        for x in 0..16 {
            for z in 0..16 {
                for y in state.min_y..state.max_y {
                    let pos = BlockPos::new(chunk.min_block_x() + x, y, chunk.min_block_z() + z);
                    if state.cell(pos).block == block {
                        count += 1;
                    }
                }
            }
        }
        count
    }
}

impl BlockReader for MemoryWorld {
    fn height_range(&self) -> Range<i32> {
        let state = read(&self.state);
        state.min_y..state.max_y
    }

    fn cell(&self, pos: BlockPos) -> Cell {
        read(&self.state).cell(pos)
    }
}

impl WorldMutator for MemoryWorld {
    fn set_block(&mut self, pos: BlockPos, block: BlockType, flags: UpdateFlags) {
        let mut state = write(&self.state);
        // Новый блок вытесняет жидкость
        state.put(pos, Cell::of(block));
        match flags {
            UpdateFlags::All => state.stats.full_updates += 1,
            UpdateFlags::ClientsOnly => state.stats.client_updates += 1,
        }
    }

    fn block_updated(&mut self, _pos: BlockPos, _block: BlockType) {
        write(&self.state).stats.neighbor_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{LiquidKind, STONE};
    use crate::terrain::FluidState;

    #[test]
    fn layers_and_changes_overlay() {
        let world = MemoryWorld::with_layers(0, 4, |y| if y < 2 { Cell::of(STONE) } else { Cell::AIR });
        assert_eq!(world.height_range(), 0..4);
        assert_eq!(world.cell(BlockPos::new(3, 1, 3)).block, STONE);
        assert_eq!(world.cell(BlockPos::new(3, 2, 3)), Cell::AIR);
        assert_eq!(world.cell(BlockPos::new(3, 10, 3)), Cell::AIR);

        let water = Cell::with_fluid(50, FluidState::still(LiquidKind::Water));
        world.place(BlockPos::new(3, 1, 3), water);
        assert_eq!(world.cell(BlockPos::new(3, 1, 3)), water);
        assert_eq!(world.change_count(), 1);
        assert_eq!(world.version(), 1);
    }

    #[test]
    fn mutator_counts_flags_and_marks_dirty_chunks() {
        let mut world = MemoryWorld::new(0, 4);
        world.set_block(BlockPos::new(1, 0, 1), STONE, UpdateFlags::All);
        world.set_block(BlockPos::new(17, 0, 1), STONE, UpdateFlags::ClientsOnly);
        world.set_block(BlockPos::new(18, 0, 1), STONE, UpdateFlags::ClientsOnly);
        world.block_updated(BlockPos::new(18, 0, 1), STONE);

        let stats = world.update_stats();
        assert_eq!(stats.full_updates, 1);
        assert_eq!(stats.client_updates, 2);
        assert_eq!(stats.neighbor_updates, 1);

        let dirty = world.take_dirty_chunks();
        assert_eq!(dirty, vec![ChunkPos::new(0, 0), ChunkPos::new(1, 0)]);
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let world = MemoryWorld::new(0, 2);
        let mut writer = world.clone();
        writer.set_block(BlockPos::new(0, 0, 0), STONE, UpdateFlags::All);
        assert_eq!(world.cell(BlockPos::new(0, 0, 0)).block, STONE);
        assert_eq!(world.count_in_chunk(ChunkPos::new(0, 0), STONE), 1);
    }
}
