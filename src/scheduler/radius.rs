// Развёртка радиуса: квадрат (2r+1)^2 чанков вокруг центра.
// С оптимизациями дальние чанки стартуют позже:
// задержка = манхэттенское расстояние * 100 мс.

use std::time::Duration;

use crate::core::RADIUS_STEP_DELAY_MS;
use crate::terrain::ChunkPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusStep {
    pub chunk: ChunkPos,
    pub delay: Duration,
}

/// Порядок обхода: x снаружи, z внутри
pub fn expand(origin: ChunkPos, radius: i32, optimizations: bool) -> Vec<RadiusStep> {
    let radius = radius.max(0);
    let side = (2 * radius + 1) as usize;
    let mut steps = Vec::with_capacity(side * side);

    for dx in -radius..=radius {
        for dz in -radius..=radius {
            let chunk = origin.offset(dx, dz);
            let delay = if optimizations {
                Duration::from_millis(u64::from(chunk.manhattan(origin)) * RADIUS_STEP_DELAY_MS)
            } else {
                Duration::ZERO
            };
            steps.push(RadiusStep { chunk, delay });
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_is_just_the_origin() {
        let steps = expand(ChunkPos::new(5, 5), 0, true);
        assert_eq!(steps, vec![RadiusStep { chunk: ChunkPos::new(5, 5), delay: Duration::ZERO }]);
    }

    #[test]
    fn radius_one_covers_three_by_three_with_staggered_delays() {
        let steps = expand(ChunkPos::new(0, 0), 1, true);
        assert_eq!(steps.len(), 9);
        assert_eq!(steps[0].chunk, ChunkPos::new(-1, -1));
        assert_eq!(steps[0].delay, Duration::from_millis(200));
        assert_eq!(steps[1].chunk, ChunkPos::new(-1, 0));
        assert_eq!(steps[1].delay, Duration::from_millis(100));
        assert_eq!(steps[4].chunk, ChunkPos::new(0, 0));
        assert_eq!(steps[4].delay, Duration::ZERO);
    }

    #[test]
    fn radius_two_delay_grows_with_distance() {
        let origin = ChunkPos::new(-3, 2);
        let steps = expand(origin, 2, true);
        assert_eq!(steps.len(), 25);

        let center: Vec<_> = steps.iter().filter(|s| s.chunk == origin).collect();
        assert_eq!(center.len(), 1);
        assert_eq!(center[0].delay, Duration::ZERO);

        let mut by_distance: Vec<_> = steps.iter().map(|s| (s.chunk.manhattan(origin), s.delay)).collect();
        by_distance.sort();
        assert!(by_distance.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(by_distance.last().map(|d| d.1), Some(Duration::from_millis(400)));
        // Одинаковое расстояние - одинаковая задержка
        for (distance, delay) in &by_distance {
            assert_eq!(*delay, Duration::from_millis(u64::from(*distance) * 100));
        }
    }

    #[test]
    fn no_delays_without_optimizations() {
        let steps = expand(ChunkPos::new(-3, 2), 2, false);
        assert_eq!(steps.len(), 25);
        assert!(steps.iter().all(|s| s.delay.is_zero()));
    }
}
