// ============================================
// Grid - Интерфейс мира хоста
// ============================================
// Чтение разрешено из любого потока через BlockReader.
// Запись только через WorldMutator на главном потоке хоста.

use std::ops::Range;
use std::sync::Arc;

use crate::blocks::{BlockType, LiquidKind, AIR};
use super::block_pos::BlockPos;

/// Состояние жидкости в клетке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidState {
    pub kind: LiquidKind,
    pub flowing: bool,
}

impl FluidState {
    pub fn still(kind: LiquidKind) -> Self {
        Self { kind, flowing: false }
    }

    pub fn flowing(kind: LiquidKind) -> Self {
        Self { kind, flowing: true }
    }
}

/// Клетка мира: блок + жидкость в нём
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub block: BlockType,
    pub fluid: Option<FluidState>,
}

impl Cell {
    pub const AIR: Cell = Cell { block: AIR, fluid: None };

    pub const fn of(block: BlockType) -> Self {
        Self { block, fluid: None }
    }

    pub const fn with_fluid(block: BlockType, fluid: FluidState) -> Self {
        Self { block, fluid: Some(fluid) }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::AIR
    }
}

/// Флаг обновления при установке блока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateFlags {
    /// Полное обновление: клиенты + пересчёт соседей
    All,
    /// Только синхронизация с клиентами
    ClientsOnly,
}

/// Чтение мира
pub trait BlockReader {
    /// Диапазон высот [min, max)
    fn height_range(&self) -> Range<i32>;

    fn cell(&self, pos: BlockPos) -> Cell;
}

/// Запись в мир. Реализуется только владельцем мира.
pub trait WorldMutator: BlockReader {
    fn set_block(&mut self, pos: BlockPos, block: BlockType, flags: UpdateFlags);

    /// Уведомить соседей об изменении блока
    fn block_updated(&mut self, pos: BlockPos, block: BlockType);
}

/// Вид на мир для фоновых потоков
pub type SharedWorldView = Arc<dyn BlockReader + Send + Sync>;
