// ============================================
// Библиотека блоков
// ============================================
// Data-Driven Architecture: блоки загружаются из JSON

mod types;
mod definition;
mod registry;
mod block_config;
mod valid_cache;

pub use types::*;
pub use definition::*;
pub use registry::*;
pub use block_config::BlockConfig;
pub use valid_cache::ValidBlockCache;
