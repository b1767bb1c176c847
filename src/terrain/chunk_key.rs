// ============================================
// Chunk Key - Идентификатор чанка
// ============================================
// ChunkPos -> i64: старшие 32 бита = x, младшие = z.
// Ключ - элемент множества обработанных чанков и очереди.

use serde::{Deserialize, Serialize};

use crate::core::CHUNK_SIZE;
use super::block_pos::BlockPos;

/// Координаты чанка (колонка 16x16 на всю высоту мира)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Из мировых координат блока
    #[inline]
    pub fn from_block_pos(pos: BlockPos) -> Self {
        Self {
            x: pos.x.div_euclid(CHUNK_SIZE),
            z: pos.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Из мировых координат (float)
    #[inline]
    pub fn from_world_pos(world_x: f32, world_z: f32) -> Self {
        Self::from_block_pos(BlockPos::new(world_x.floor() as i32, 0, world_z.floor() as i32))
    }

    #[inline]
    pub fn to_key(self) -> ChunkKey {
        ChunkKey(((self.x as i64) << 32) | (self.z as i64 & 0xFFFF_FFFF))
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz))
    }

    /// Мировая X координата первого блока чанка
    #[inline]
    pub fn min_block_x(self) -> i32 {
        self.x.wrapping_mul(CHUNK_SIZE)
    }

    /// Мировая Z координата первого блока чанка
    #[inline]
    pub fn min_block_z(self) -> i32 {
        self.z.wrapping_mul(CHUNK_SIZE)
    }

    /// Манхэттенское расстояние в чанках
    #[inline]
    pub fn manhattan(self, other: ChunkPos) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// Упакованный ключ чанка
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkKey(pub i64);

impl ChunkKey {
    #[inline]
    pub fn pos(self) -> ChunkPos {
        ChunkPos::new((self.0 >> 32) as i32, self.0 as i32)
    }

    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl From<ChunkPos> for ChunkKey {
    fn from(pos: ChunkPos) -> Self {
        pos.to_key()
    }
}

impl From<ChunkKey> for ChunkPos {
    fn from(key: ChunkKey) -> Self {
        key.pos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrip_covers_extremes() {
        let samples = [
            (0, 0),
            (1, -1),
            (-1, 1),
            (-1, -1),
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MAX),
            (12345, -98765),
        ];
        for (x, z) in samples {
            let pos = ChunkPos::new(x, z);
            assert_eq!(pos.to_key().pos(), pos, "roundtrip failed for ({x}, {z})");
        }
    }

    #[test]
    fn key_layout_puts_x_in_high_bits() {
        assert_eq!(ChunkPos::new(1, 0).to_key().raw(), 1i64 << 32);
        assert_eq!(ChunkPos::new(0, -1).to_key().raw(), 0xFFFF_FFFF);
        assert_eq!(ChunkPos::new(-1, 0).to_key().raw(), -1i64 << 32);
    }

    #[test]
    fn neighbouring_chunks_get_distinct_keys() {
        let origin = ChunkPos::new(0, 0);
        let mut keys = std::collections::HashSet::new();
        for dx in -2..=2 {
            for dz in -2..=2 {
                assert!(keys.insert(origin.offset(dx, dz).to_key()));
            }
        }
        assert_eq!(keys.len(), 25);
    }

    #[test]
    fn block_to_chunk_uses_floor_division() {
        assert_eq!(ChunkPos::from_block_pos(BlockPos::new(0, 64, 15)), ChunkPos::new(0, 0));
        assert_eq!(ChunkPos::from_block_pos(BlockPos::new(16, 0, -1)), ChunkPos::new(1, -1));
        assert_eq!(ChunkPos::from_block_pos(BlockPos::new(-16, 0, -17)), ChunkPos::new(-1, -2));
        assert_eq!(ChunkPos::from_world_pos(-0.5, 31.9), ChunkPos::new(-1, 1));
    }

    #[test]
    fn serializes_as_plain_integer() {
        let key = ChunkPos::new(2, -3).to_key();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, key.raw().to_string());
        let back: ChunkKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
