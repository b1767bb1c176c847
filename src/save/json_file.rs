// ============================================
// JSON File - Чтение/запись конфигов
// ============================================
// Человекочитаемый JSON, файл переписывается целиком:
// сначала во временный файл рядом, затем rename поверх.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Ошибки сохранения/загрузки
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SaveError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        SaveError::Io { path: path.to_path_buf(), source }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        SaveError::Json { path: path.to_path_buf(), source }
    }
}

/// Прочитать документ. Нет файла - Ok(None).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SaveError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SaveError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| SaveError::json(path, e))
}

/// Записать документ целиком, создав директорию при необходимости
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SaveError::io(parent, e))?;
        }
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| SaveError::json(path, e))?;

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| SaveError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SaveError::io(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Удалить документ, если он есть
pub fn remove_json(path: &Path) -> Result<(), SaveError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SaveError::io(path, e)),
    }
}
