// ============================================
// Transform Context - Всё состояние трансформера
// ============================================
// Создаётся при старте, передаётся всем компонентам через Arc.
// Никаких глобальных переменных.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::blocks::{BlockConfig, BlockRegistry, BlockType, ValidBlockCache};
use crate::core::lock;
use crate::save::{TransformedChunksFile, TransformerPaths};
use crate::settings::SettingsStore;
use crate::terrain::{ChunkKey, MainThreadHandle, SharedWorldView};
use super::queue::TransformQueue;
use super::stats::{Counters, TransformerStats};
use super::timer::DelayTimer;
use super::tracker::ChunkTracker;

pub struct TransformContext {
    pub paths: TransformerPaths,
    pub settings: SettingsStore,
    pub registry: Arc<BlockRegistry>,
    pub block_config: BlockConfig,
    pub valid_blocks: ValidBlockCache,
    pub tracker: Arc<ChunkTracker>,
    pub queue: TransformQueue,
    /// Чтение мира для фоновых потоков
    pub view: SharedWorldView,
    /// Все записи в мир идут только сюда
    pub main_thread: MainThreadHandle,
    pub timer: DelayTimer,
    pub pool: rayon::ThreadPool,
    pub counters: Arc<Counters>,
    pub(super) rng: Mutex<SmallRng>,
    pub(super) running: AtomicBool,
    /// Снимок и запись множества идут одним шагом
    pub(super) save_lock: Mutex<()>,
}

impl TransformContext {
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Случайная цель из допустимых блоков; None - брать нечего
    pub fn pick_target(&self) -> Option<BlockType> {
        let blocks = self.valid_blocks.get(&self.registry, &self.block_config);
        let mut rng = lock(&self.rng);
        blocks.choose(&mut *rng).copied()
    }

    pub fn save_transformed(&self) {
        let _saving = lock(&self.save_lock);
        let snapshot = self.tracker.transformed_snapshot();
        self.write_transformed(&snapshot);
    }

    /// При остановке: только чанки, по которым не осталось работы
    pub fn save_completed(&self) {
        let _saving = lock(&self.save_lock);
        let snapshot = self.tracker.completed_snapshot();
        self.write_transformed(&snapshot);
    }

    fn write_transformed(&self, snapshot: &BTreeSet<ChunkKey>) {
        if let Err(e) = TransformedChunksFile::save(&self.paths.transformed_chunks(), snapshot) {
            log::error!("[CONFIG] Failed to save transformed chunks: {}", e);
        }
    }

    pub fn load_transformed(&self) {
        match TransformedChunksFile::load(&self.paths.transformed_chunks()) {
            Ok(keys) => {
                log::info!("[CONFIG] Loaded {} transformed chunks", keys.len());
                self.tracker.extend_transformed(keys);
            }
            Err(e) => log::error!("[CONFIG] Failed to load transformed chunks: {}", e),
        }
    }

    pub fn delete_transformed(&self) {
        let _saving = lock(&self.save_lock);
        if let Err(e) = TransformedChunksFile::delete(&self.paths.transformed_chunks()) {
            log::error!("[CONFIG] Failed to delete transformed chunks file: {}", e);
        }
    }

    pub fn stats(&self) -> TransformerStats {
        TransformerStats {
            queued: self.queue.len(),
            in_flight: self.tracker.in_flight_count(),
            transformed: self.tracker.transformed_count(),
            jobs_completed: self.counters.jobs_completed.load(Ordering::Relaxed),
            jobs_abandoned: self.counters.jobs_abandoned.load(Ordering::Relaxed),
            batches_scheduled: self.counters.batches_scheduled.load(Ordering::Relaxed),
            blocks_changed: self.counters.blocks_changed.load(Ordering::Relaxed),
        }
    }
}
