use std::path::{Path, PathBuf};

use crate::core::{
    BLOCKS_FILE, CHUNK_SAVE_FILE, DEFAULT_CONFIG_DIR, PERFORMANCE_FILE, TRANSFORMED_CHUNKS_FILE,
};

/// Где лежат документы трансформера
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformerPaths {
    config_dir: PathBuf,
}

impl TransformerPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Включённость блоков
    pub fn blocks(&self) -> PathBuf {
        self.config_dir.join(BLOCKS_FILE)
    }

    /// Настройки производительности
    pub fn performance(&self) -> PathBuf {
        self.config_dir.join(PERFORMANCE_FILE)
    }

    /// Флаг сохранения трансформаций
    pub fn chunk_save(&self) -> PathBuf {
        self.config_dir.join(CHUNK_SAVE_FILE)
    }

    /// Множество обработанных чанков
    pub fn transformed_chunks(&self) -> PathBuf {
        self.config_dir.join(TRANSFORMED_CHUNKS_FILE)
    }
}

impl Default for TransformerPaths {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}
