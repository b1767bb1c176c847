// ============================================
// Core Module - Константы, часы, синхронизация
// ============================================

mod config;
mod clock;
mod sync;

pub use config::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub(crate) use sync::{lock, read, write};
