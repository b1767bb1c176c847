// ============================================
// Stats - Счётчики планировщика
// ============================================

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::terrain::{ChunkKey, ChunkPos};
use super::tracker::ChunkTracker;

#[derive(Default)]
pub struct Counters {
    pub jobs_completed: AtomicU64,
    pub jobs_abandoned: AtomicU64,
    pub batches_scheduled: AtomicU64,
    pub blocks_changed: AtomicU64,
    /// Задачи, выполняющиеся прямо сейчас в пуле
    pub active_workers: AtomicUsize,
}

impl Counters {
    #[inline]
    pub fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// Снимок состояния трансформера
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformerStats {
    /// Чанков ждёт диспетчера
    pub queued: usize,
    /// Чанков в работе (очередь + батчи в пути)
    pub in_flight: usize,
    /// Размер множества обработанных чанков
    pub transformed: usize,
    pub jobs_completed: u64,
    pub jobs_abandoned: u64,
    pub batches_scheduled: u64,
    /// Блоков заменено в мире
    pub blocks_changed: u64,
}

/// Держит чанк в in_flight до последнего батча.
/// Выпускает чанк при любом исходе. Если последний батч так и
/// не был выполнен, чанк убирается и из множества обработанных.
pub struct InFlightGuard {
    tracker: Arc<ChunkTracker>,
    counters: Arc<Counters>,
    key: ChunkKey,
    completed: bool,
}

impl InFlightGuard {
    pub fn new(tracker: Arc<ChunkTracker>, counters: Arc<Counters>, key: ChunkKey) -> Self {
        Self { tracker, counters, key, completed: false }
    }

    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.completed {
            self.tracker.release(self.key);
            Counters::bump(&self.counters.jobs_completed, 1);
            log::debug!("[TRANSFORM] Chunk {:?} done", ChunkPos::from(self.key));
        } else {
            // Чанк не обработан: следующий вход возьмёт его снова
            self.tracker.forget(self.key);
            Counters::bump(&self.counters.jobs_abandoned, 1);
            log::warn!("[TRANSFORM] Chunk {:?} released before its last batch ran", ChunkPos::from(self.key));
        }
    }
}

/// Учёт активных задач пула
pub struct WorkerGuard {
    counters: Arc<Counters>,
}

impl WorkerGuard {
    pub fn enter(counters: &Arc<Counters>) -> Self {
        counters.active_workers.fetch_add(1, Ordering::AcqRel);
        Self { counters: counters.clone() }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.counters.active_workers.fetch_sub(1, Ordering::AcqRel);
    }
}
