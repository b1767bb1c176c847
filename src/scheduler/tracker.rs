// ============================================
// Chunk Tracker - Дедупликация чанков
// ============================================
// Два множества:
// - transformed: чанки, которые уже приняты в работу (без повторов)
// - in_flight:   чанки, по которым сейчас идёт работа
// Проверка и пометка - один шаг под замком, поэтому один чанк
// никогда не попадёт в работу дважды.
// Порядок блокировок всегда: in_flight -> transformed.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use crate::core::lock;
use crate::terrain::ChunkKey;

/// Результат попытки взять чанк в работу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    AlreadyDone,
    AlreadyInFlight,
}

/// Фаза работы над чанком
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// В очереди, ждёт диспетчера
    Queued,
    /// Взят воркером, батчи в пути
    Running,
}

pub struct ChunkTracker {
    transformed: Mutex<HashSet<ChunkKey>>,
    in_flight: Mutex<HashMap<ChunkKey, JobPhase>>,
}

impl ChunkTracker {
    pub fn new() -> Self {
        Self {
            transformed: Mutex::new(HashSet::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Атомарно: проверить оба множества и пометить чанк
    pub fn try_admit(&self, key: ChunkKey) -> Admission {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains_key(&key) {
            return Admission::AlreadyInFlight;
        }
        let mut transformed = lock(&self.transformed);
        if !transformed.insert(key) {
            return Admission::AlreadyDone;
        }
        in_flight.insert(key, JobPhase::Queued);
        Admission::Admitted
    }

    /// Диспетчер забирает чанк. false - его уже кто-то обрабатывает.
    pub fn begin(&self, key: ChunkKey) -> bool {
        let mut in_flight = lock(&self.in_flight);
        match in_flight.get(&key) {
            Some(JobPhase::Running) => false,
            _ => {
                in_flight.insert(key, JobPhase::Running);
                true
            }
        }
    }

    /// Работа над чанком закончена (или брошена)
    pub fn release(&self, key: ChunkKey) -> bool {
        lock(&self.in_flight).remove(&key).is_some()
    }

    /// Откат приёма: чанк снова можно взять позже
    pub fn forget(&self, key: ChunkKey) {
        let mut in_flight = lock(&self.in_flight);
        in_flight.remove(&key);
        lock(&self.transformed).remove(&key);
    }

    pub fn is_transformed(&self, key: ChunkKey) -> bool {
        lock(&self.transformed).contains(&key)
    }

    pub fn is_in_flight(&self, key: ChunkKey) -> bool {
        lock(&self.in_flight).contains_key(&key)
    }

    pub fn phase(&self, key: ChunkKey) -> Option<JobPhase> {
        lock(&self.in_flight).get(&key).copied()
    }

    pub fn transformed_count(&self) -> usize {
        lock(&self.transformed).len()
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn clear_transformed(&self) {
        lock(&self.transformed).clear();
    }

    /// Упорядоченный снимок для сохранения
    pub fn transformed_snapshot(&self) -> BTreeSet<ChunkKey> {
        lock(&self.transformed).iter().copied().collect()
    }

    /// Снимок без чанков, по которым ещё идёт работа
    pub fn completed_snapshot(&self) -> BTreeSet<ChunkKey> {
        let in_flight = lock(&self.in_flight);
        lock(&self.transformed)
            .iter()
            .filter(|key| !in_flight.contains_key(key))
            .copied()
            .collect()
    }

    pub fn extend_transformed(&self, keys: impl IntoIterator<Item = ChunkKey>) {
        lock(&self.transformed).extend(keys);
    }
}

impl Default for ChunkTracker {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::ChunkPos;
    use std::sync::Arc;
    use std::thread;

    fn key(x: i32, z: i32) -> ChunkKey {
        ChunkPos::new(x, z).to_key()
    }

    #[test]
    fn second_admission_is_rejected() {
        let tracker = ChunkTracker::new();
        assert_eq!(tracker.try_admit(key(1, 1)), Admission::Admitted);
        assert_eq!(tracker.try_admit(key(1, 1)), Admission::AlreadyInFlight);
        tracker.release(key(1, 1));
        assert_eq!(tracker.try_admit(key(1, 1)), Admission::AlreadyDone);
        assert_eq!(tracker.try_admit(key(1, 2)), Admission::Admitted);
    }

    #[test]
    fn begin_only_once_per_admission() {
        let tracker = ChunkTracker::new();
        tracker.try_admit(key(0, 0));
        assert_eq!(tracker.phase(key(0, 0)), Some(JobPhase::Queued));
        assert!(tracker.begin(key(0, 0)));
        assert!(!tracker.begin(key(0, 0)));
        assert!(tracker.release(key(0, 0)));
        assert!(!tracker.is_in_flight(key(0, 0)));
        assert!(tracker.is_transformed(key(0, 0)));
    }

    #[test]
    fn forget_rolls_back_both_sets() {
        let tracker = ChunkTracker::new();
        tracker.try_admit(key(4, -4));
        tracker.forget(key(4, -4));
        assert!(!tracker.is_transformed(key(4, -4)));
        assert!(!tracker.is_in_flight(key(4, -4)));
        assert_eq!(tracker.try_admit(key(4, -4)), Admission::Admitted);
    }

    #[test]
    fn concurrent_admission_has_one_winner() {
        let tracker = Arc::new(ChunkTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || tracker.try_admit(key(7, 7)) == Admission::Admitted)
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(tracker.transformed_count(), 1);
        assert_eq!(tracker.in_flight_count(), 1);
    }

    #[test]
    fn snapshot_is_sorted() {
        let tracker = ChunkTracker::new();
        tracker.extend_transformed([key(3, 0), key(-1, 0), key(0, 5)]);
        let snapshot: Vec<_> = tracker.transformed_snapshot().into_iter().collect();
        assert!(snapshot.windows(2).all(|w| w[0] < w[1]));
        tracker.clear_transformed();
        assert_eq!(tracker.transformed_count(), 0);
    }

    #[test]
    fn completed_snapshot_skips_in_flight() {
        let tracker = ChunkTracker::new();
        tracker.try_admit(key(0, 0));
        tracker.try_admit(key(1, 0));
        tracker.release(key(0, 0));
        let completed: Vec<_> = tracker.completed_snapshot().into_iter().collect();
        assert_eq!(completed, vec![key(0, 0)]);
        assert_eq!(tracker.transformed_snapshot().len(), 2);
    }
}
