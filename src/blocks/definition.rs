// ============================================
// Data-Driven Block Definition
// ============================================
// Структуры для загрузки блоков из JSON

use serde::{Deserialize, Serialize};

use super::types::BlockType;

/// Вид блока: особые блоки никогда не трансформируются
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Normal,
    Air,
    Spawner,
    PortalFrame,
    Liquid,
}

impl BlockKind {
    /// Исключён из трансформации (и как цель, и как источник)
    #[inline]
    pub fn is_excluded(self) -> bool {
        !matches!(self, BlockKind::Normal)
    }
}

/// Два стандартных вида жидкости
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidKind {
    Water,
    Lava,
}

/// Определение блока из JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Уникальный ID блока (string, например "minecraft:stone")
    pub id: String,

    /// Числовой ID для мира
    pub numeric_id: BlockType,

    /// Отображаемое имя
    pub name: String,

    /// Вид блока
    #[serde(default)]
    pub kind: BlockKind,

    /// Жидкость (для kind = liquid)
    #[serde(default)]
    pub liquid: Option<LiquidKind>,

    /// Занимает полный объём коллизии
    #[serde(default = "default_true")]
    pub solid: bool,

    /// Подвержен гравитации (по умолчанию выключен в конфиге)
    #[serde(default)]
    pub falling: bool,
}

fn default_true() -> bool { true }

impl Default for BlockDefinition {
    fn default() -> Self {
        Self {
            id: "unknown".to_string(),
            numeric_id: 0,
            name: "Unknown".to_string(),
            kind: BlockKind::Normal,
            liquid: None,
            solid: true,
            falling: false,
        }
    }
}

/// Файл с определениями блоков
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksFile {
    /// Версия формата
    #[serde(default = "default_version")]
    pub version: String,

    /// Список блоков
    pub blocks: Vec<BlockDefinition>,
}

fn default_version() -> String { "1.0".to_string() }

/// Возможности блока, вычисленные один раз при загрузке реестра
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub id: String,
    pub numeric_id: BlockType,
    /// Полная коллизия в начале координат
    pub full_solid: bool,
    /// Воздух, спавнер, рамка портала, жидкость
    pub excluded_kind: bool,
    pub falling: bool,
}

impl From<&BlockDefinition> for BlockDescriptor {
    fn from(def: &BlockDefinition) -> Self {
        Self {
            id: def.id.clone(),
            numeric_id: def.numeric_id,
            full_solid: def.solid && def.kind != BlockKind::Liquid,
            excluded_kind: def.kind.is_excluded() || def.liquid.is_some(),
            falling: def.falling,
        }
    }
}
