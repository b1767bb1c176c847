// ============================================
// Systems Module - Адаптеры событий хоста
// ============================================

mod player_tracker;

pub use player_tracker::PlayerTracker;
