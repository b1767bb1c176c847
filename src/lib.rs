// ============================================
// Chunk Transformer - Массовая трансформация чанков
// ============================================
// Игрок входит в новый чанк -> все блоки чанка заменяются случайным
// блоком из реестра. Работа дозируется по тикам хоста, чтобы
// симуляция никогда не подвисала.

pub mod core;
pub mod terrain;
pub mod blocks;
pub mod save;
pub mod settings;
pub mod scheduler;
pub mod systems;

// Re-exports
pub use crate::core::{Clock, ManualClock, SystemClock};
pub use terrain::{
    BlockPos, BlockReader, Cell, ChunkKey, ChunkPos, FluidState, MainThreadHandle,
    MainThreadQueue, MemoryWorld, OwnerThread, UpdateFlags, WorldMutator, main_thread_channel,
};
pub use blocks::{BlockConfig, BlockRegistry, BlockType, ValidBlockCache, AIR};
pub use save::{SaveError, TransformerPaths};
pub use settings::{PerformanceConfig, SettingsPanel, SettingsStore};
pub use scheduler::{Admission, ChunkTransformer, TransformerError, TransformerOptions, TransformerStats};
pub use systems::PlayerTracker;
