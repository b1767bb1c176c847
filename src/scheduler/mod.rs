// ============================================
// Scheduler - Планировщик трансформации чанков
// ============================================
// Вход в чанк -> приём (дедупликация) -> очередь -> диспетчер
// с ограничением темпа -> пул воркеров собирает клетки ->
// батчи по таймеру уходят на главный поток хоста.

mod batch;
mod context;
mod dispatcher;
mod queue;
mod radius;
mod stats;
mod timer;
mod tracker;

pub use batch::{apply_batch, collect_positions, plan_batches, transform_chunk_immediate, Batch};
pub use queue::{TransformQueue, TransformTask};
pub use radius::{expand, RadiusStep};
pub use stats::TransformerStats;
pub use timer::DelayTimer;
pub use tracker::{Admission, ChunkTracker, JobPhase};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::blocks::{BlockConfig, BlockRegistry, BlockType, ValidBlockCache};
use crate::core::{lock, Clock, SystemClock, SHUTDOWN_GRACE, WORKER_THREADS};
use crate::save::TransformerPaths;
use crate::settings::SettingsStore;
use crate::terrain::{ChunkPos, MainThreadHandle, SharedWorldView, WorldMutator};
use context::TransformContext;
use dispatcher::{dispatch_next, Dispatcher};
use stats::{Counters, InFlightGuard, WorkerGuard};

#[derive(Debug, Error)]
pub enum TransformerError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Параметры запуска трансформера
pub struct TransformerOptions {
    pub paths: TransformerPaths,
    /// Источник времени для кэша допустимых блоков
    pub clock: Arc<dyn Clock>,
    /// Фиксированное зерно для выбора блоков (тесты, демо)
    pub seed: Option<u64>,
    /// false - диспетчер не запускается, шаги через dispatch_once()
    pub auto_dispatch: bool,
    pub worker_threads: usize,
}

impl TransformerOptions {
    pub fn new(paths: TransformerPaths) -> Self {
        Self {
            paths,
            clock: Arc::new(SystemClock::new()),
            seed: None,
            auto_dispatch: true,
            worker_threads: WORKER_THREADS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn manual_dispatch(mut self) -> Self {
        self.auto_dispatch = false;
        self
    }
}

impl Default for TransformerOptions {
    fn default() -> Self {
        Self::new(TransformerPaths::default())
    }
}

/// Трансформер чанков: единственная точка входа для хоста
pub struct ChunkTransformer {
    ctx: Arc<TransformContext>,
    dispatcher: Mutex<Option<Dispatcher>>,
}

impl ChunkTransformer {
    pub fn new(
        registry: Arc<BlockRegistry>,
        view: SharedWorldView,
        main_thread: MainThreadHandle,
        options: TransformerOptions,
    ) -> Result<Self, TransformerError> {
        let paths = options.paths;
        let settings = SettingsStore::load(paths.clone());
        let block_config = BlockConfig::new(&registry, paths.blocks());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.worker_threads.max(1))
            .thread_name(|i| format!("chunk-transform-{}", i))
            .build()?;
        let timer = DelayTimer::new("chunk-timer")
            .map_err(|source| TransformerError::Spawn { name: "chunk-timer", source })?;

        let rng = match options.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let ctx = Arc::new(TransformContext {
            valid_blocks: ValidBlockCache::new(options.clock),
            tracker: Arc::new(ChunkTracker::new()),
            queue: TransformQueue::new(),
            counters: Arc::new(Counters::default()),
            rng: Mutex::new(rng),
            running: AtomicBool::new(true),
            save_lock: Mutex::new(()),
            paths,
            settings,
            registry,
            block_config,
            view,
            main_thread,
            timer,
            pool,
        });

        if ctx.settings.save_chunk_transformations() {
            ctx.load_transformed();
        }

        let dispatcher = if options.auto_dispatch {
            let dispatcher = Dispatcher::spawn(ctx.clone())
                .map_err(|source| TransformerError::Spawn { name: "chunk-dispatcher", source })?;
            Some(dispatcher)
        } else {
            None
        };

        log::info!(
            "[TRANSFORM] Started: {} blocks in registry, {} workers, dispatcher {}",
            ctx.registry.count(),
            options.worker_threads.max(1),
            if dispatcher.is_some() { "on" } else { "manual" },
        );

        Ok(Self {
            ctx,
            dispatcher: Mutex::new(dispatcher),
        })
    }

    /// Игрок вошёл в чанк. Вызывается на главном потоке хоста.
    pub fn handle_chunk_enter<W: WorldMutator + ?Sized>(&self, chunk: ChunkPos, world: &mut W) {
        if !self.ctx.is_running() {
            return;
        }

        let radius = self.ctx.settings.transform_radius();
        if radius <= 0 {
            transform_single_chunk(&self.ctx, chunk, Some(world));
            return;
        }

        let optimizations = self.ctx.settings.optimizations_enabled();
        for step in expand(chunk, radius, optimizations) {
            if step.delay.is_zero() {
                transform_single_chunk(&self.ctx, step.chunk, Some(&mut *world));
                continue;
            }

            let ctx = self.ctx.clone();
            let target = step.chunk;
            self.ctx.timer.schedule(step.delay, move || {
                let pool_ctx = ctx.clone();
                ctx.pool.spawn(move || {
                    let _worker = WorkerGuard::enter(&pool_ctx.counters);
                    transform_single_chunk(&pool_ctx, target, None::<&mut dyn WorldMutator>);
                });
            });
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.ctx.settings
    }

    pub fn block_config(&self) -> &BlockConfig {
        &self.ctx.block_config
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.ctx.registry
    }

    /// Текущие допустимые цели (из кэша)
    pub fn valid_blocks(&self) -> Arc<Vec<BlockType>> {
        self.ctx.valid_blocks.get(&self.ctx.registry, &self.ctx.block_config)
    }

    /// Включение: множество читается с диска заново.
    /// Выключение: множество очищается, файл удаляется.
    pub fn toggle_save_chunk_transformations(&self) -> bool {
        let enabled = !self.ctx.settings.save_chunk_transformations();
        self.ctx.settings.set_save_chunk_transformations(enabled);
        self.ctx.tracker.clear_transformed();

        if enabled {
            self.ctx.load_transformed();
        } else {
            self.ctx.delete_transformed();
        }
        log::info!("[CONFIG] Save chunk transformations: {}", enabled);
        enabled
    }

    pub fn should_save_chunk_transformations(&self) -> bool {
        self.ctx.settings.save_chunk_transformations()
    }

    pub fn is_transformed(&self, chunk: ChunkPos) -> bool {
        self.ctx.tracker.is_transformed(chunk.to_key())
    }

    pub fn is_in_flight(&self, chunk: ChunkPos) -> bool {
        self.ctx.tracker.is_in_flight(chunk.to_key())
    }

    pub fn stats(&self) -> TransformerStats {
        self.ctx.stats()
    }

    /// Один шаг диспетчера вручную (при auto_dispatch = false)
    pub fn dispatch_once(&self) -> bool {
        dispatch_next(&self.ctx)
    }

    /// Остановка: диспетчер, таймер, ожидание пула до 5 секунд.
    /// Повторный вызов ничего не делает.
    pub fn shutdown(&self) {
        if !self.ctx.running.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(dispatcher) = lock(&self.dispatcher).take() {
            dispatcher.stop();
        }
        self.ctx.timer.shutdown();

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while self.ctx.counters.active_workers.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                log::warn!("[TRANSFORM] Workers still busy after {:?}, giving up", SHUTDOWN_GRACE);
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        // Невыполненные чанки не должны остаться в множестве
        let dropped = self.ctx.queue.drain();
        for task in &dropped {
            self.ctx.tracker.forget(task.key);
        }
        if !dropped.is_empty() {
            Counters::bump(&self.ctx.counters.jobs_abandoned, dropped.len() as u64);
            log::info!("[TRANSFORM] Dropped {} queued chunks on shutdown", dropped.len());
        }

        if self.ctx.settings.save_chunk_transformations() {
            self.ctx.save_completed();
        }
        log::info!("[TRANSFORM] Stopped");
    }
}

impl Drop for ChunkTransformer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Приём одного чанка.
/// world = None: вызов не с главного потока, запись только через очередь.
fn transform_single_chunk<W: WorldMutator + ?Sized>(
    ctx: &Arc<TransformContext>,
    chunk: ChunkPos,
    world: Option<&mut W>,
) {
    if !ctx.is_running() {
        return;
    }

    let persist = ctx.settings.save_chunk_transformations();
    // Без сохранения каждый вход в чанк обрабатывает его заново
    if !persist {
        ctx.tracker.clear_transformed();
    }

    let key = chunk.to_key();
    match ctx.tracker.try_admit(key) {
        Admission::Admitted => {}
        rejected => {
            log::trace!("[TRANSFORM] Chunk {:?} skipped: {:?}", chunk, rejected);
            return;
        }
    }

    // Чанк остаётся помеченным, работа просто не создаётся
    let Some(target) = ctx.pick_target() else {
        log::warn!("[TRANSFORM] No valid blocks, chunk {:?} skipped", chunk);
        ctx.tracker.release(key);
        Counters::bump(&ctx.counters.jobs_abandoned, 1);
        return;
    };

    if ctx.settings.optimizations_enabled() {
        if let Err(task) = ctx.queue.offer(TransformTask::new(chunk, target)) {
            log::warn!("[TRANSFORM] Queue full, chunk {:?} will be retried on next visit", task.chunk);
            ctx.tracker.forget(key);
            return;
        }
    } else {
        let guard = InFlightGuard::new(ctx.tracker.clone(), ctx.counters.clone(), key);
        match world {
            Some(world) => {
                let changed = transform_chunk_immediate(world, &ctx.registry, chunk, target);
                Counters::bump(&ctx.counters.blocks_changed, changed as u64);
                guard.complete();
            }
            None => {
                let registry = ctx.registry.clone();
                let counters = ctx.counters.clone();
                let accepted = ctx.main_thread.execute(move |world: &mut dyn WorldMutator| {
                    let changed = transform_chunk_immediate(world, &registry, chunk, target);
                    Counters::bump(&counters.blocks_changed, changed as u64);
                    guard.complete();
                });
                if !accepted {
                    log::warn!("[TRANSFORM] World owner is gone, chunk {:?} dropped", chunk);
                }
            }
        }
    }

    if persist {
        ctx.save_transformed();
    }
}
