// ============================================
// Settings - Настройки производительности и редактор
// ============================================

mod panel;
mod performance;
mod store;

pub use panel::{is_valid_number, BlockEntry, Preset, SettingsError, SettingsPanel, BLOCKS_PER_PAGE};
pub use performance::*;
pub use store::SettingsStore;
