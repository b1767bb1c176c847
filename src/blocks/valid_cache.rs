// ============================================
// Valid Block Cache - Кэш допустимых целей
// ============================================
// Пересчёт O(размер реестра) не чаще раза в 30 секунд.
// Устаревание до TTL допустимо: изменения конфига подхватятся позже.

use std::sync::{Arc, Mutex};

use crate::core::{lock, Clock, VALID_BLOCKS_CACHE_MS};
use super::block_config::BlockConfig;
use super::registry::BlockRegistry;
use super::types::BlockType;

struct CachedBlocks {
    blocks: Arc<Vec<BlockType>>,
    computed_at: u64,
}

pub struct ValidBlockCache {
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
    cached: Mutex<Option<CachedBlocks>>,
}

impl ValidBlockCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, VALID_BLOCKS_CACHE_MS)
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl_ms: u64) -> Self {
        Self {
            clock,
            ttl_ms,
            cached: Mutex::new(None),
        }
    }

    /// Допустимые блоки; пересчёт если кэш пуст или старше TTL
    pub fn get(&self, registry: &BlockRegistry, config: &BlockConfig) -> Arc<Vec<BlockType>> {
        let now = self.clock.now_millis();
        let mut cached = lock(&self.cached);

        if let Some(entry) = cached.as_ref() {
            let fresh = now.saturating_sub(entry.computed_at) <= self.ttl_ms;
            if fresh && !entry.blocks.is_empty() {
                return entry.blocks.clone();
            }
        }

        let blocks = Arc::new(registry.valid_targets(config));
        log::debug!("[TRANSFORM] Recomputed valid blocks: {}", blocks.len());
        *cached = Some(CachedBlocks { blocks: blocks.clone(), computed_at: now });
        blocks
    }
}
