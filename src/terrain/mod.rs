// ============================================
// Terrain Module - Мир хоста и его интерфейсы
// ============================================

mod block_pos;
mod chunk_key;
mod grid;
mod main_thread;
mod memory_world;

// Re-exports
pub use block_pos::BlockPos;
pub use chunk_key::{ChunkKey, ChunkPos};
pub use grid::{BlockReader, Cell, FluidState, SharedWorldView, UpdateFlags, WorldMutator};
pub use main_thread::{main_thread_channel, MainThreadHandle, MainThreadQueue, MainThreadTask, OwnerThread};
pub use memory_world::{MemoryWorld, WorldUpdateStats};
