// ============================================
// Performance Config - Настройки скорости трансформации
// ============================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const MIN_BLOCKS_PER_TICK: i32 = 1;
pub const MAX_BLOCKS_PER_TICK: i32 = 10_000;
pub const MIN_CHUNKS_PER_SECOND: i32 = 1;
pub const MAX_CHUNKS_PER_SECOND: i32 = 20;
pub const MIN_TRANSFORM_RADIUS: i32 = 0;
pub const MAX_TRANSFORM_RADIUS: i32 = 10;

/// Четыре живых параметра производительности.
/// Формат файла: chunktransformer_performance.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    /// false - чанк обрабатывается сразу, на вызывающем потоке
    pub optimizations_enabled: bool,
    /// Блоков за один батч
    pub max_blocks_per_tick: i32,
    /// Сколько чанков диспетчер запускает в секунду
    pub chunks_per_second: i32,
    /// 0 = только текущий чанк, 1 = 3x3, 2 = 5x5 ...
    pub transform_radius: i32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            optimizations_enabled: true,
            max_blocks_per_tick: 500,
            chunks_per_second: 2,
            transform_radius: 0,
        }
    }
}

#[inline]
pub fn clamp_max_blocks_per_tick(value: i32) -> i32 {
    value.clamp(MIN_BLOCKS_PER_TICK, MAX_BLOCKS_PER_TICK)
}

#[inline]
pub fn clamp_chunks_per_second(value: i32) -> i32 {
    value.clamp(MIN_CHUNKS_PER_SECOND, MAX_CHUNKS_PER_SECOND)
}

#[inline]
pub fn clamp_transform_radius(value: i32) -> i32 {
    value.clamp(MIN_TRANSFORM_RADIUS, MAX_TRANSFORM_RADIUS)
}

impl PerformanceConfig {
    /// Все поля в допустимых диапазонах
    pub fn clamped(self) -> Self {
        Self {
            optimizations_enabled: self.optimizations_enabled,
            max_blocks_per_tick: clamp_max_blocks_per_tick(self.max_blocks_per_tick),
            chunks_per_second: clamp_chunks_per_second(self.chunks_per_second),
            transform_radius: clamp_transform_radius(self.transform_radius),
        }
    }

    /// Период диспетчера: 1000 / chunks_per_second мс
    pub fn dispatch_period(&self) -> Duration {
        Duration::from_millis(1000 / clamp_chunks_per_second(self.chunks_per_second) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_match_documented_ranges() {
        assert_eq!(clamp_max_blocks_per_tick(-5), 1);
        assert_eq!(clamp_max_blocks_per_tick(999_999), 10_000);
        assert_eq!(clamp_chunks_per_second(0), 1);
        assert_eq!(clamp_chunks_per_second(21), 20);
        assert_eq!(clamp_transform_radius(50), 10);
        assert_eq!(clamp_transform_radius(-1), 0);
    }

    #[test]
    fn dispatch_period_follows_rate() {
        let mut config = PerformanceConfig::default();
        assert_eq!(config.dispatch_period(), Duration::from_millis(500));
        config.chunks_per_second = 20;
        assert_eq!(config.dispatch_period(), Duration::from_millis(50));
        config.chunks_per_second = 0;
        assert_eq!(config.dispatch_period(), Duration::from_millis(1000));
    }

    #[test]
    fn file_uses_camel_case_and_tolerates_missing_fields() {
        let json = serde_json::to_string(&PerformanceConfig::default()).unwrap();
        assert!(json.contains("\"maxBlocksPerTick\":500"));
        assert!(json.contains("\"optimizationsEnabled\":true"));

        let partial: PerformanceConfig = serde_json::from_str(r#"{ "transformRadius": 3 }"#).unwrap();
        assert_eq!(partial.transform_radius, 3);
        assert_eq!(partial.chunks_per_second, 2);
    }
}
