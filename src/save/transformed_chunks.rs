// ============================================
// Transformed Chunks File - Множество обработанных чанков
// ============================================
// JSON массив ключей чанков. Существует только пока включено
// сохранение трансформаций.

use std::collections::BTreeSet;
use std::path::Path;

use crate::terrain::ChunkKey;
use super::json_file::{read_json, remove_json, write_json, SaveError};

/// Основной интерфейс для работы с файлом чанков
pub struct TransformedChunksFile;

impl TransformedChunksFile {
    pub fn load(path: &Path) -> Result<BTreeSet<ChunkKey>, SaveError> {
        Ok(read_json::<BTreeSet<ChunkKey>>(path)?.unwrap_or_default())
    }

    pub fn save(path: &Path, chunks: &BTreeSet<ChunkKey>) -> Result<(), SaveError> {
        write_json(path, chunks)
    }

    pub fn delete(path: &Path) -> Result<(), SaveError> {
        remove_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::ChunkPos;
    use tempfile::tempdir;

    #[test]
    fn keys_are_stored_as_integer_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        let chunks: BTreeSet<ChunkKey> =
            [ChunkPos::new(0, 0), ChunkPos::new(-3, 7)].into_iter().map(ChunkPos::to_key).collect();

        TransformedChunksFile::save(&path, &chunks).unwrap();
        let raw: Vec<i64> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);

        assert_eq!(TransformedChunksFile::load(&path).unwrap(), chunks);

        TransformedChunksFile::delete(&path).unwrap();
        assert!(TransformedChunksFile::load(&path).unwrap().is_empty());
    }
}
