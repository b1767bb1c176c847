// ============================================
// Block Registry - Data-Driven из JSON
// ============================================
// Единый источник правды для всех блоков. Строится при старте
// и дальше только читается, поэтому делится через Arc без блокировок.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::terrain::Cell;
use super::block_config::BlockConfig;
use super::definition::{BlockDefinition, BlockDescriptor, BlockKind, BlocksFile, LiquidKind};
use super::types::{BlockType, AIR};

/// Ошибки загрузки реестра
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to parse blocks JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Реестр блоков
pub struct BlockRegistry {
    /// Блоки по string ID
    blocks_by_id: HashMap<String, BlockDefinition>,
    /// Дескрипторы по numeric ID
    descriptors: HashMap<BlockType, BlockDescriptor>,
    /// Маппинг string ID -> numeric ID
    id_to_numeric: HashMap<String, BlockType>,
    /// Порядок регистрации (отсортирован по numeric ID)
    order: Vec<BlockType>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks_by_id: HashMap::new(),
            descriptors: HashMap::new(),
            id_to_numeric: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Реестр со встроенным набором блоков
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        if let Err(e) = registry.load_from_json(include_str!("../../assets/blocks/default_blocks.json")) {
            log::warn!("Failed to load default blocks: {}", e);
            register_fallback_blocks(&mut registry);
        }
        registry
    }

    /// Загрузить блоки из JSON строки
    pub fn load_from_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let blocks_file: BlocksFile = serde_json::from_str(json)?;

        let count = blocks_file.blocks.len();
        for block in blocks_file.blocks {
            self.register(block);
        }
        Ok(count)
    }

    /// Загрузить блоки из файла
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, RegistryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_json(&content)
    }

    /// Загрузить все JSON из директории (моды)
    pub fn load_from_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, RegistryError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(0);
        }

        let io_err = |source| RegistryError::Io { path: dir.to_path_buf(), source };
        let mut total = 0;
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match self.load_from_file(&path) {
                    Ok(count) => total += count,
                    Err(e) => log::warn!("Skipping block file {}: {}", path.display(), e),
                }
            }
        }
        Ok(total)
    }

    /// Зарегистрировать блок (повторный numeric ID перезаписывает)
    pub fn register(&mut self, block: BlockDefinition) {
        let numeric = block.numeric_id;
        if let Some(old) = self.descriptors.get(&numeric) {
            let old_id = old.id.clone();
            self.blocks_by_id.remove(&old_id);
            self.id_to_numeric.remove(&old_id);
        }

        self.descriptors.insert(numeric, BlockDescriptor::from(&block));
        self.id_to_numeric.insert(block.id.clone(), numeric);
        self.blocks_by_id.insert(block.id.clone(), block);

        if let Err(idx) = self.order.binary_search(&numeric) {
            self.order.insert(idx, numeric);
        }
    }

    /// Получить блок по string ID
    pub fn get(&self, id: &str) -> Option<&BlockDefinition> {
        self.blocks_by_id.get(id)
    }

    pub fn descriptor(&self, block: BlockType) -> Option<&BlockDescriptor> {
        self.descriptors.get(&block)
    }

    /// Получить numeric ID по string ID
    pub fn get_numeric_id(&self, id: &str) -> Option<BlockType> {
        self.id_to_numeric.get(id).copied()
    }

    /// Получить string ID по numeric ID
    pub fn get_string_id(&self, numeric: BlockType) -> Option<&str> {
        self.descriptors.get(&numeric).map(|d| d.id.as_str())
    }

    /// Все дескрипторы в порядке numeric ID
    pub fn descriptors(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.order.iter().filter_map(move |id| self.descriptors.get(id))
    }

    /// Все string ID, отсортированные
    pub fn block_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.blocks_by_id.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Количество блоков
    pub fn count(&self) -> usize {
        self.blocks_by_id.len()
    }

    /// Клетку нельзя трансформировать: воздух, спавнер, рамка портала,
    /// жидкость (стоячая или текущая) или блок с жидкостью внутри.
    pub fn should_skip(&self, cell: Cell) -> bool {
        if cell.block == AIR || cell.fluid.is_some() {
            return true;
        }
        self.descriptors
            .get(&cell.block)
            .map_or(false, |d| d.excluded_kind)
    }

    /// Допустимые цели трансформации: не особый блок, полная коллизия,
    /// включён в конфиге. Порядок - по numeric ID.
    pub fn valid_targets(&self, config: &BlockConfig) -> Vec<BlockType> {
        self.descriptors()
            .filter(|d| !d.excluded_kind && d.full_solid && config.is_block_enabled(&d.id))
            .map(|d| d.numeric_id)
            .collect()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self { Self::new() }
}

/// Fallback блоки если JSON не загрузился
fn register_fallback_blocks(registry: &mut BlockRegistry) {
    registry.register(BlockDefinition {
        id: "minecraft:air".to_string(),
        numeric_id: AIR,
        name: "Air".to_string(),
        kind: BlockKind::Air,
        solid: false,
        ..Default::default()
    });

    registry.register(BlockDefinition {
        id: "minecraft:stone".to_string(),
        numeric_id: 1,
        name: "Stone".to_string(),
        ..Default::default()
    });

    registry.register(BlockDefinition {
        id: "minecraft:water".to_string(),
        numeric_id: 50,
        name: "Water".to_string(),
        kind: BlockKind::Liquid,
        liquid: Some(LiquidKind::Water),
        solid: false,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{END_PORTAL_FRAME, GLASS, LAVA, SAND, SPAWNER, STONE, TORCH, WATER};
    use crate::terrain::FluidState;

    #[test]
    fn embedded_defaults_load() {
        let registry = BlockRegistry::with_defaults();
        assert!(registry.count() > 10);
        assert_eq!(registry.get_numeric_id("minecraft:stone"), Some(STONE));
        assert_eq!(registry.get_string_id(WATER), Some("minecraft:water"));
        assert!(registry.descriptor(SAND).unwrap().falling);
    }

    #[test]
    fn skip_rules_cover_special_blocks_and_fluids() {
        let registry = BlockRegistry::with_defaults();
        assert!(registry.should_skip(Cell::AIR));
        assert!(registry.should_skip(Cell::of(SPAWNER)));
        assert!(registry.should_skip(Cell::of(END_PORTAL_FRAME)));
        assert!(registry.should_skip(Cell::of(WATER)));
        assert!(registry.should_skip(Cell::of(LAVA)));
        assert!(registry.should_skip(Cell::with_fluid(
            crate::blocks::OAK_STAIRS,
            FluidState::flowing(LiquidKind::Water)
        )));
        assert!(!registry.should_skip(Cell::of(STONE)));
        // Неполные блоки трансформируются, просто не бывают целью
        assert!(!registry.should_skip(Cell::of(TORCH)));
        // Неизвестный блок не исключён
        assert!(!registry.should_skip(Cell::of(9999)));
    }

    #[test]
    fn reregistering_numeric_id_replaces_old_entry() {
        let mut registry = BlockRegistry::new();
        registry.register(BlockDefinition {
            id: "a:one".to_string(),
            numeric_id: 5,
            name: "One".to_string(),
            ..Default::default()
        });
        registry.register(BlockDefinition {
            id: "a:two".to_string(),
            numeric_id: 5,
            name: "Two".to_string(),
            ..Default::default()
        });
        assert_eq!(registry.count(), 1);
        assert!(registry.get("a:one").is_none());
        assert_eq!(registry.get_string_id(5), Some("a:two"));
        assert_eq!(registry.descriptors().count(), 1);
    }

    #[test]
    fn broken_json_is_an_error() {
        let mut registry = BlockRegistry::new();
        assert!(matches!(registry.load_from_json("{ not json"), Err(RegistryError::Parse(_))));
        assert!(registry.load_from_file("/definitely/missing.json").is_err());
        assert_eq!(registry.load_from_directory("/definitely/missing").unwrap(), 0);
    }

    #[test]
    fn glass_is_a_valid_full_block() {
        let registry = BlockRegistry::with_defaults();
        let desc = registry.descriptor(GLASS).unwrap();
        assert!(desc.full_solid && !desc.excluded_kind);
    }
}
