// ============================================
// Config - Константы трансформера
// ============================================

use std::time::Duration;

/// Размер чанка по X и Z (в блоках)
pub const CHUNK_SIZE: i32 = 16;

/// Время жизни кэша допустимых блоков (мс)
pub const VALID_BLOCKS_CACHE_MS: u64 = 30_000;

/// Интервал между батчами одного чанка (мс) - один тик хоста
pub const BATCH_INTERVAL_MS: u64 = 50;

/// Задержка на единицу манхэттенского расстояния при обработке радиуса (мс)
pub const RADIUS_STEP_DELAY_MS: u64 = 100;

/// Размер фонового пула
pub const WORKER_THREADS: usize = 2;

/// Максимум задач в очереди
pub const MAX_QUEUED_TASKS: usize = 1024;

/// Сколько ждать пул при остановке
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// Файлы конфигурации
pub const BLOCKS_FILE: &str = "chunktransformer_blocks.json";
pub const PERFORMANCE_FILE: &str = "chunktransformer_performance.json";
pub const CHUNK_SAVE_FILE: &str = "chunktransformer_chunks.json";
pub const TRANSFORMED_CHUNKS_FILE: &str = "chunktransformer_transformed_chunks.json";

/// Директория конфигов по умолчанию
pub const DEFAULT_CONFIG_DIR: &str = "config";
