// ============================================
// Save System - Документы трансформера
// ============================================
// Три независимых JSON документа в директории конфигов:
// блоки, производительность, сохранение трансформаций (+ чанки).

mod json_file;
mod paths;
mod transformed_chunks;

pub use json_file::{read_json, remove_json, write_json, SaveError};
pub use paths::TransformerPaths;
pub use transformed_chunks::TransformedChunksFile;
