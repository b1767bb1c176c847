// ============================================
// Block Config - Какие блоки могут быть целью
// ============================================
// string ID -> включён. По умолчанию включены все блоки,
// кроме падающих (песок, гравий, наковальня).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::core::{read, write};
use crate::save::{read_json, write_json};
use super::registry::BlockRegistry;

pub struct BlockConfig {
    path: PathBuf,
    block_states: RwLock<HashMap<String, bool>>,
}

impl BlockConfig {
    /// Значения по умолчанию из реестра + загрузка с диска
    pub fn new(registry: &BlockRegistry, path: impl Into<PathBuf>) -> Self {
        let block_states = registry
            .descriptors()
            .map(|d| (d.id.clone(), !d.falling))
            .collect();

        let config = Self {
            path: path.into(),
            block_states: RwLock::new(block_states),
        };
        config.load();
        config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Неизвестные блоки считаются включёнными
    pub fn is_block_enabled(&self, block_id: &str) -> bool {
        read(&self.block_states).get(block_id).copied().unwrap_or(true)
    }

    pub fn toggle_block(&self, block_id: &str) -> bool {
        let enabled = {
            let mut states = write(&self.block_states);
            let enabled = !states.get(block_id).copied().unwrap_or(true);
            states.insert(block_id.to_string(), enabled);
            enabled
        };
        self.save();
        enabled
    }

    pub fn set_block_enabled(&self, block_id: &str, enabled: bool) {
        write(&self.block_states).insert(block_id.to_string(), enabled);
        self.save();
    }

    /// Включить все перечисленные блоки, одна запись на диск
    pub fn enable_all<'a, I>(&self, block_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        {
            let mut states = write(&self.block_states);
            for id in block_ids {
                states.insert(id.to_string(), true);
                count += 1;
            }
        }
        self.save();
        count
    }

    /// Копия всех состояний
    pub fn block_states(&self) -> HashMap<String, bool> {
        read(&self.block_states).clone()
    }

    /// Загруженный файл заменяет значения целиком; нет файла - создаём
    pub fn load(&self) {
        match read_json::<HashMap<String, bool>>(&self.path) {
            Ok(Some(states)) => {
                log::info!("[CONFIG] Loaded {} block states from {}", states.len(), self.path.display());
                *write(&self.block_states) = states;
            }
            Ok(None) => self.save(),
            Err(e) => log::error!("[CONFIG] Failed to load block configuration: {}", e),
        }
    }

    pub fn save(&self) {
        let states = read(&self.block_states);
        if let Err(e) = write_json(&self.path, &*states) {
            log::error!("[CONFIG] Failed to save block configuration: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn falling_blocks_start_disabled_and_file_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        let registry = BlockRegistry::with_defaults();
        let config = BlockConfig::new(&registry, &path);

        assert!(path.exists());
        assert!(!config.is_block_enabled("minecraft:sand"));
        assert!(!config.is_block_enabled("minecraft:anvil"));
        assert!(config.is_block_enabled("minecraft:stone"));
        assert!(config.is_block_enabled("mod:unknown"));
    }

    #[test]
    fn toggles_persist_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        let registry = BlockRegistry::with_defaults();

        let config = BlockConfig::new(&registry, &path);
        assert!(!config.toggle_block("minecraft:stone"));
        config.set_block_enabled("minecraft:sand", true);

        let reloaded = BlockConfig::new(&registry, &path);
        assert!(!reloaded.is_block_enabled("minecraft:stone"));
        assert!(reloaded.is_block_enabled("minecraft:sand"));
    }

    #[test]
    fn enable_all_turns_everything_on() {
        let dir = tempdir().unwrap();
        let registry = BlockRegistry::with_defaults();
        let config = BlockConfig::new(&registry, dir.path().join("blocks.json"));

        let ids = registry.block_ids();
        let count = config.enable_all(ids.iter().map(String::as_str));
        assert_eq!(count, ids.len());
        assert!(config.block_states().values().all(|enabled| *enabled));
    }

    #[test]
    fn corrupt_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        std::fs::write(&path, "not json").unwrap();

        let config = BlockConfig::new(&BlockRegistry::with_defaults(), &path);
        assert!(!config.is_block_enabled("minecraft:gravel"));
        assert!(config.is_block_enabled("minecraft:dirt"));
    }
}
