// ============================================
// Settings Store - Живые настройки с сохранением
// ============================================
// Сеттеры зажимают значение в диапазон и сразу пишут файл.
// Диспетчер и батчи читают текущие значения на каждом цикле.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{read, write};
use crate::save::{read_json, write_json, TransformerPaths};
use super::performance::{
    clamp_chunks_per_second, clamp_max_blocks_per_tick, clamp_transform_radius, PerformanceConfig,
};

/// Формат chunktransformer_chunks.json
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkSaveConfig {
    #[serde(default)]
    save_chunk_transformations: bool,
}

pub struct SettingsStore {
    paths: TransformerPaths,
    performance: RwLock<PerformanceConfig>,
    save_chunk_transformations: AtomicBool,
}

impl SettingsStore {
    /// Загрузить оба документа; ошибки - значения по умолчанию
    pub fn load(paths: TransformerPaths) -> Self {
        let performance = match read_json::<PerformanceConfig>(&paths.performance()) {
            Ok(Some(config)) => config.clamped(),
            Ok(None) => PerformanceConfig::default(),
            Err(e) => {
                log::error!("[CONFIG] Failed to load performance configuration: {}", e);
                PerformanceConfig::default()
            }
        };

        let save_chunks = match read_json::<ChunkSaveConfig>(&paths.chunk_save()) {
            Ok(config) => config.unwrap_or_default().save_chunk_transformations,
            Err(e) => {
                log::error!("[CONFIG] Failed to load chunk transformation save configuration: {}", e);
                false
            }
        };

        log::info!(
            "[CONFIG] optimizations={} blocks/tick={} chunks/s={} radius={} save_chunks={}",
            performance.optimizations_enabled,
            performance.max_blocks_per_tick,
            performance.chunks_per_second,
            performance.transform_radius,
            save_chunks,
        );

        Self {
            paths,
            performance: RwLock::new(performance),
            save_chunk_transformations: AtomicBool::new(save_chunks),
        }
    }

    pub fn paths(&self) -> &TransformerPaths {
        &self.paths
    }

    /// Снимок всех четырёх параметров
    pub fn performance(&self) -> PerformanceConfig {
        *read(&self.performance)
    }

    pub fn optimizations_enabled(&self) -> bool {
        read(&self.performance).optimizations_enabled
    }

    pub fn set_optimizations_enabled(&self, enabled: bool) {
        self.update(|config| config.optimizations_enabled = enabled);
    }

    pub fn max_blocks_per_tick(&self) -> i32 {
        read(&self.performance).max_blocks_per_tick
    }

    pub fn set_max_blocks_per_tick(&self, max_blocks: i32) -> i32 {
        let value = clamp_max_blocks_per_tick(max_blocks);
        self.update(|config| config.max_blocks_per_tick = value);
        value
    }

    pub fn chunks_per_second(&self) -> i32 {
        read(&self.performance).chunks_per_second
    }

    /// Новый темп подхватывается диспетчером на следующем цикле
    pub fn set_chunks_per_second(&self, chunks: i32) -> i32 {
        let value = clamp_chunks_per_second(chunks);
        self.update(|config| config.chunks_per_second = value);
        value
    }

    pub fn transform_radius(&self) -> i32 {
        read(&self.performance).transform_radius
    }

    pub fn set_transform_radius(&self, radius: i32) -> i32 {
        let value = clamp_transform_radius(radius);
        self.update(|config| config.transform_radius = value);
        value
    }

    pub fn dispatch_period(&self) -> Duration {
        read(&self.performance).dispatch_period()
    }

    pub fn save_chunk_transformations(&self) -> bool {
        self.save_chunk_transformations.load(Ordering::Acquire)
    }

    pub fn set_save_chunk_transformations(&self, enabled: bool) {
        self.save_chunk_transformations.store(enabled, Ordering::Release);
        let doc = ChunkSaveConfig { save_chunk_transformations: enabled };
        if let Err(e) = write_json(&self.paths.chunk_save(), &doc) {
            log::error!("[CONFIG] Failed to save chunk transformation save configuration: {}", e);
        }
    }

    fn update(&self, change: impl FnOnce(&mut PerformanceConfig)) {
        let snapshot = {
            let mut config = write(&self.performance);
            change(&mut config);
            *config
        };
        self.save_performance(&snapshot);
    }

    fn save_performance(&self, config: &PerformanceConfig) {
        if let Err(e) = write_json(&self.paths.performance(), config) {
            log::error!("[CONFIG] Failed to save performance configuration: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn setters_clamp_and_persist() {
        let dir = tempdir().unwrap();
        let paths = TransformerPaths::new(dir.path());
        let store = SettingsStore::load(paths.clone());

        assert_eq!(store.set_max_blocks_per_tick(-5), 1);
        assert_eq!(store.max_blocks_per_tick(), 1);
        assert_eq!(store.set_max_blocks_per_tick(999_999), 10_000);
        assert_eq!(store.set_chunks_per_second(0), 1);
        assert_eq!(store.set_transform_radius(50), 10);
        store.set_optimizations_enabled(false);

        let reloaded = SettingsStore::load(paths);
        assert_eq!(
            reloaded.performance(),
            PerformanceConfig {
                optimizations_enabled: false,
                max_blocks_per_tick: 10_000,
                chunks_per_second: 1,
                transform_radius: 10,
            }
        );
    }

    #[test]
    fn out_of_range_file_values_are_clamped_on_load() {
        let dir = tempdir().unwrap();
        let paths = TransformerPaths::new(dir.path());
        std::fs::write(
            paths.performance(),
            r#"{ "optimizationsEnabled": true, "maxBlocksPerTick": 0, "chunksPerSecond": 99, "transformRadius": -4 }"#,
        )
        .unwrap();

        let store = SettingsStore::load(paths);
        assert_eq!(store.max_blocks_per_tick(), 1);
        assert_eq!(store.chunks_per_second(), 20);
        assert_eq!(store.transform_radius(), 0);
    }

    #[test]
    fn broken_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let paths = TransformerPaths::new(dir.path());
        std::fs::write(paths.performance(), "{{{").unwrap();
        std::fs::write(paths.chunk_save(), "nope").unwrap();

        let store = SettingsStore::load(paths);
        assert_eq!(store.performance(), PerformanceConfig::default());
        assert!(!store.save_chunk_transformations());
    }

    #[test]
    fn chunk_save_flag_roundtrips() {
        let dir = tempdir().unwrap();
        let paths = TransformerPaths::new(dir.path());
        let store = SettingsStore::load(paths.clone());
        store.set_save_chunk_transformations(true);

        let text = std::fs::read_to_string(paths.chunk_save()).unwrap();
        assert!(text.contains("saveChunkTransformations"));
        assert!(SettingsStore::load(paths).save_chunk_transformations());
    }
}
