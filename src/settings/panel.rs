// ============================================
// Settings Panel - Граница между редактором и ядром
// ============================================
// Состояние экрана настроек без рендеринга: текстовые поля,
// пресеты, поиск по блокам и постраничный список.
// Все изменения идут через публичные сеттеры трансформера.

use thiserror::Error;

use crate::scheduler::ChunkTransformer;
use super::performance::{
    clamp_chunks_per_second, clamp_max_blocks_per_tick, clamp_transform_radius, PerformanceConfig,
};

/// Блоков на одной странице списка
pub const BLOCKS_PER_PAGE: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid number for {field}: {text:?}")]
    InvalidNumber { field: &'static str, text: String },
}

/// Пресеты производительности, по кругу: Fast -> Balanced -> Slow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    FastPc,
    Balanced,
    SlowPc,
}

impl Preset {
    pub fn next(self) -> Self {
        match self {
            Preset::FastPc => Preset::Balanced,
            Preset::Balanced => Preset::SlowPc,
            Preset::SlowPc => Preset::FastPc,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::FastPc => "Fast PC",
            Preset::Balanced => "Balanced",
            Preset::SlowPc => "Slow PC",
        }
    }

    /// (блоков за тик, чанков в секунду, радиус)
    pub fn values(self) -> (i32, i32, i32) {
        match self {
            Preset::FastPc => (2000, 5, 1),
            Preset::Balanced => (500, 2, 1),
            Preset::SlowPc => (100, 1, 1),
        }
    }
}

/// Пусто - допустимо во время ввода, иначе неотрицательное целое
pub fn is_valid_number(text: &str) -> bool {
    text.is_empty() || text.parse::<i32>().map_or(false, |v| v >= 0)
}

fn parse_field(field: &'static str, text: &str) -> Result<i32, SettingsError> {
    text.parse::<i32>().map_err(|_| SettingsError::InvalidNumber {
        field,
        text: text.to_string(),
    })
}

/// Одна строка списка блоков
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub id: String,
    pub enabled: bool,
}

pub struct SettingsPanel<'a> {
    transformer: &'a ChunkTransformer,

    optimizations_enabled: bool,
    max_blocks_text: String,
    chunks_per_second_text: String,
    radius_text: String,
    preset: Preset,

    search: String,
    displayed: Vec<String>,
    page: usize,
}

impl<'a> SettingsPanel<'a> {
    /// Открыть панель: поля заполняются текущими значениями
    pub fn open(transformer: &'a ChunkTransformer) -> Self {
        let current = transformer.settings().performance();
        let mut panel = Self {
            transformer,
            optimizations_enabled: current.optimizations_enabled,
            max_blocks_text: current.max_blocks_per_tick.to_string(),
            chunks_per_second_text: current.chunks_per_second.to_string(),
            radius_text: current.transform_radius.to_string(),
            preset: Preset::Balanced,
            search: String::new(),
            displayed: Vec::new(),
            page: 0,
        };
        panel.refresh_displayed();
        panel
    }

    // ---- Производительность ----

    pub fn optimizations_enabled(&self) -> bool {
        self.optimizations_enabled
    }

    pub fn set_optimizations_enabled(&mut self, enabled: bool) {
        self.optimizations_enabled = enabled;
    }

    pub fn max_blocks_text(&self) -> &str {
        &self.max_blocks_text
    }

    pub fn chunks_per_second_text(&self) -> &str {
        &self.chunks_per_second_text
    }

    pub fn radius_text(&self) -> &str {
        &self.radius_text
    }

    /// Фильтр ввода: неверный текст отклоняется, поле не меняется
    pub fn set_max_blocks_text(&mut self, text: &str) -> bool {
        accept_input(&mut self.max_blocks_text, text)
    }

    pub fn set_chunks_per_second_text(&mut self, text: &str) -> bool {
        accept_input(&mut self.chunks_per_second_text, text)
    }

    pub fn set_radius_text(&mut self, text: &str) -> bool {
        accept_input(&mut self.radius_text, text)
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Следующий пресет заполняет поля; применяется кнопкой Apply
    pub fn cycle_preset(&mut self) -> Preset {
        self.preset = self.preset.next();
        let (blocks, chunks, radius) = self.preset.values();
        self.max_blocks_text = blocks.to_string();
        self.chunks_per_second_text = chunks.to_string();
        self.radius_text = radius.to_string();
        self.optimizations_enabled = true;
        self.preset
    }

    /// Разобрать все поля, зажать в диапазоны и передать в ядро.
    /// При ошибке ни один сеттер не вызывается.
    pub fn apply(&mut self) -> Result<PerformanceConfig, SettingsError> {
        let max_blocks = clamp_max_blocks_per_tick(parse_field("maxBlocksPerTick", &self.max_blocks_text)?);
        let chunks = clamp_chunks_per_second(parse_field("chunksPerSecond", &self.chunks_per_second_text)?);
        let radius = clamp_transform_radius(parse_field("transformRadius", &self.radius_text)?);

        let settings = self.transformer.settings();
        settings.set_optimizations_enabled(self.optimizations_enabled);
        settings.set_max_blocks_per_tick(max_blocks);
        settings.set_chunks_per_second(chunks);
        settings.set_transform_radius(radius);

        self.max_blocks_text = max_blocks.to_string();
        self.chunks_per_second_text = chunks.to_string();
        self.radius_text = radius.to_string();

        Ok(settings.performance())
    }

    pub fn save_chunk_transformations(&self) -> bool {
        self.transformer.should_save_chunk_transformations()
    }

    pub fn toggle_save_chunk_transformations(&self) -> bool {
        self.transformer.toggle_save_chunk_transformations()
    }

    // ---- Список блоков ----

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Новый поиск сбрасывает страницу
    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
        self.page = 0;
        self.refresh_displayed();
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        (self.displayed.len() + BLOCKS_PER_PAGE - 1) / BLOCKS_PER_PAGE
    }

    pub fn scroll_up(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn scroll_down(&mut self) -> bool {
        if (self.page + 1) * BLOCKS_PER_PAGE < self.displayed.len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Строки текущей страницы
    pub fn page_entries(&self) -> Vec<BlockEntry> {
        let config = self.transformer.block_config();
        self.displayed
            .iter()
            .skip(self.page * BLOCKS_PER_PAGE)
            .take(BLOCKS_PER_PAGE)
            .map(|id| BlockEntry {
                id: id.clone(),
                enabled: config.is_block_enabled(id),
            })
            .collect()
    }

    pub fn toggle_block(&self, block_id: &str) -> bool {
        self.transformer.block_config().toggle_block(block_id)
    }

    /// Включить все блоки, подходящие под текущий поиск
    pub fn enable_all_displayed(&self) -> usize {
        let count = self
            .transformer
            .block_config()
            .enable_all(self.displayed.iter().map(String::as_str));
        log::info!("[CONFIG] Enabled {} blocks matching {:?}", count, self.search);
        count
    }

    fn refresh_displayed(&mut self) {
        let needle = self.search.to_lowercase();
        self.displayed = self
            .transformer
            .registry()
            .block_ids()
            .into_iter()
            .filter(|id| needle.is_empty() || id.to_lowercase().contains(&needle))
            .collect();
    }
}

fn accept_input(field: &mut String, text: &str) -> bool {
    if is_valid_number(text) {
        *field = text.to_string();
        true
    } else {
        false
    }
}
