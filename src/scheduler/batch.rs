// ============================================
// Batch Engine - Замена блоков чанка порциями
// ============================================
// 1. Воркер один раз собирает список клеток (только чтение мира)
// 2. Список режется на батчи по max_blocks_per_tick
// 3. Батч i уходит на главный поток через i * 50 мс
// 4. Каждая клетка проверяется заново прямо перед записью:
//    соседний чанк или игрок могли её уже изменить
// 5. Последний батч дополнительно уведомляет соседей

use std::sync::Arc;
use std::time::Duration;

use crate::blocks::{BlockRegistry, BlockType};
use crate::core::{BATCH_INTERVAL_MS, CHUNK_SIZE};
use crate::terrain::{BlockPos, BlockReader, ChunkPos, UpdateFlags, WorldMutator};
use super::context::TransformContext;
use super::queue::TransformTask;
use super::stats::{Counters, InFlightGuard, WorkerGuard};

/// Порция клеток для одной передачи на главный поток
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    /// Задержка от старта задачи
    pub delay: Duration,
    pub positions: Vec<BlockPos>,
    pub is_last: bool,
}

/// Клетки чанка, которые нужно заменить на target
pub fn collect_positions<R: BlockReader + ?Sized>(
    reader: &R,
    registry: &BlockRegistry,
    chunk: ChunkPos,
    target: BlockType,
) -> Vec<BlockPos> {
    let heights = reader.height_range();
    let base_x = chunk.min_block_x();
    let base_z = chunk.min_block_z();
    let mut positions = Vec::new();

    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in heights.clone() {
                let pos = BlockPos::new(base_x + x, y, base_z + z);
                let cell = reader.cell(pos);
                if !registry.should_skip(cell) && cell.block != target {
                    positions.push(pos);
                }
            }
        }
    }
    positions
}

/// ceil(K / max) батчей, все кроме последнего ровно по max
pub fn plan_batches(positions: Vec<BlockPos>, max_per_batch: usize) -> Vec<Batch> {
    let max_per_batch = max_per_batch.max(1);
    let total = (positions.len() + max_per_batch - 1) / max_per_batch;

    positions
        .chunks(max_per_batch)
        .enumerate()
        .map(|(index, slice)| Batch {
            index,
            delay: Duration::from_millis(index as u64 * BATCH_INTERVAL_MS),
            positions: slice.to_vec(),
            is_last: index + 1 == total,
        })
        .collect()
}

/// Записать батч. Только на главном потоке.
pub fn apply_batch<W: WorldMutator + ?Sized>(
    world: &mut W,
    registry: &BlockRegistry,
    positions: &[BlockPos],
    target: BlockType,
    notify_neighbors: bool,
) -> usize {
    let mut changed = 0;
    for &pos in positions {
        let cell = world.cell(pos);
        if registry.should_skip(cell) || cell.block == target {
            continue;
        }
        world.set_block(pos, target, UpdateFlags::ClientsOnly);
        changed += 1;
    }

    if notify_neighbors {
        for &pos in positions {
            world.block_updated(pos, target);
        }
    }
    changed
}

/// Весь чанк за один проход с полными обновлениями.
/// Путь без оптимизаций: вызывающий поток стоит до конца.
pub fn transform_chunk_immediate<W: WorldMutator + ?Sized>(
    world: &mut W,
    registry: &BlockRegistry,
    chunk: ChunkPos,
    target: BlockType,
) -> usize {
    let positions = collect_positions(&*world, registry, chunk, target);
    for &pos in &positions {
        world.set_block(pos, target, UpdateFlags::All);
    }
    positions.len()
}

/// Задача воркера: собрать клетки и расписать батчи.
/// Чанк остаётся в работе до выполнения последнего батча.
pub(crate) fn run_task(ctx: &Arc<TransformContext>, task: TransformTask) {
    let _worker = WorkerGuard::enter(&ctx.counters);
    let guard = InFlightGuard::new(ctx.tracker.clone(), ctx.counters.clone(), task.key);

    let positions = collect_positions(&*ctx.view, &ctx.registry, task.chunk, task.target);
    if positions.is_empty() {
        log::debug!("[TRANSFORM] Chunk {:?}: nothing to replace", task.chunk);
        guard.complete();
        return;
    }

    let max_per_batch = ctx.settings.max_blocks_per_tick() as usize;
    let batches = plan_batches(positions, max_per_batch);
    log::debug!(
        "[TRANSFORM] Chunk {:?} -> block {}: {} batches",
        task.chunk,
        task.target,
        batches.len()
    );

    let mut guard = Some(guard);
    for batch in batches {
        let last_guard = if batch.is_last { guard.take() } else { None };
        let registry = ctx.registry.clone();
        let counters = ctx.counters.clone();
        let main_thread = ctx.main_thread.clone();
        let target = task.target;
        let Batch { delay, positions, is_last, .. } = batch;

        let scheduled = ctx.timer.schedule(delay, move || {
            let accepted = main_thread.execute(move |world: &mut dyn WorldMutator| {
                let changed = apply_batch(world, &registry, &positions, target, is_last);
                Counters::bump(&counters.blocks_changed, changed as u64);
                if let Some(guard) = last_guard {
                    guard.complete();
                }
            });
            if !accepted {
                log::warn!("[TRANSFORM] World owner is gone, batch dropped");
            }
        });

        if scheduled {
            Counters::bump(&ctx.counters.batches_scheduled, 1);
        } else {
            log::warn!("[TRANSFORM] Timer stopped, chunk {:?} abandoned", task.chunk);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{LiquidKind, DIRT, SPAWNER, STONE, WATER};
    use crate::terrain::{Cell, FluidState, MemoryWorld};

    fn stone_world() -> MemoryWorld {
        MemoryWorld::with_layers(0, 4, |y| if y < 3 { Cell::of(STONE) } else { Cell::AIR })
    }

    #[test]
    fn collects_every_solid_cell_except_excluded() {
        let world = stone_world();
        let registry = BlockRegistry::with_defaults();
        world.place(BlockPos::new(0, 0, 0), Cell::of(SPAWNER));
        world.place(BlockPos::new(1, 0, 0), Cell::with_fluid(WATER, FluidState::still(LiquidKind::Water)));
        // Соседний чанк не входит
        world.place(BlockPos::new(16, 3, 0), Cell::of(STONE));

        let positions = collect_positions(&world, &registry, ChunkPos::new(0, 0), DIRT);
        assert_eq!(positions.len(), 16 * 16 * 3 - 2);
        assert!(positions.iter().all(|p| p.y < 3 && p.x < 16));
    }

    #[test]
    fn negative_chunk_covers_its_own_columns() {
        let world = stone_world();
        let registry = BlockRegistry::with_defaults();
        let positions = collect_positions(&world, &registry, ChunkPos::new(-1, -1), DIRT);
        assert_eq!(positions.len(), 16 * 16 * 3);
        assert!(positions.iter().all(|p| (-16..0).contains(&p.x) && (-16..0).contains(&p.z)));
    }

    #[test]
    fn batches_partition_the_list() {
        let positions: Vec<BlockPos> = (0..1234).map(|i| BlockPos::new(i, 0, 0)).collect();
        let batches = plan_batches(positions, 500);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].positions.len(), 500);
        assert_eq!(batches[1].positions.len(), 500);
        assert_eq!(batches[2].positions.len(), 234);
        assert_eq!(batches.iter().map(|b| b.positions.len()).sum::<usize>(), 1234);
        assert_eq!(batches[2].delay, Duration::from_millis(100));
        assert!(batches[2].is_last && !batches[1].is_last);
        assert!(plan_batches(Vec::new(), 500).is_empty());
    }

    #[test]
    fn exact_multiple_has_full_last_batch() {
        let positions: Vec<BlockPos> = (0..1000).map(|i| BlockPos::new(i, 0, 0)).collect();
        let batches = plan_batches(positions, 500);
        assert_eq!(batches.len(), 2);
        assert!(batches[1].is_last);
        assert_eq!(batches[1].positions.len(), 500);
    }

    #[test]
    fn apply_rechecks_cells_and_notifies_on_last() {
        let mut world = stone_world();
        let registry = BlockRegistry::with_defaults();
        let positions = vec![BlockPos::new(0, 0, 0), BlockPos::new(1, 0, 0), BlockPos::new(2, 0, 0)];
        // Между сбором и записью клетка стала жидкостью
        world.place(BlockPos::new(1, 0, 0), Cell::of(WATER));

        let changed = apply_batch(&mut world, &registry, &positions, DIRT, false);
        assert_eq!(changed, 2);
        assert_eq!(world.cell(BlockPos::new(1, 0, 0)).block, WATER);
        assert_eq!(world.update_stats().client_updates, 2);
        assert_eq!(world.update_stats().neighbor_updates, 0);

        apply_batch(&mut world, &registry, &positions, DIRT, true);
        assert_eq!(world.update_stats().client_updates, 2);
        assert_eq!(world.update_stats().neighbor_updates, 3);
    }

    #[test]
    fn second_run_finds_nothing() {
        let mut world = stone_world();
        let registry = BlockRegistry::with_defaults();
        let chunk = ChunkPos::new(2, -1);

        let changed = transform_chunk_immediate(&mut world, &registry, chunk, DIRT);
        assert_eq!(changed, 16 * 16 * 3);
        assert_eq!(world.count_in_chunk(chunk, DIRT), 16 * 16 * 3);
        assert_eq!(world.update_stats().full_updates, 16 * 16 * 3);

        assert!(collect_positions(&world, &registry, chunk, DIRT).is_empty());
        assert_eq!(transform_chunk_immediate(&mut world, &registry, chunk, DIRT), 0);
    }
}
