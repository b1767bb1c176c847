// ============================================
// Demo - Игрок идёт по миру, чанки трансформируются
// ============================================
// Главный поток играет роль хоста: 20 тиков в секунду,
// в каждом тике разбирает очередь записей и двигает игрока.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chunk_transformer::blocks::{BEDROCK, DIRT, GRASS, STONE};
use chunk_transformer::scheduler::TransformerOptions;
use chunk_transformer::{
    main_thread_channel, BlockPos, BlockRegistry, Cell, ChunkTransformer, MemoryWorld,
    PlayerTracker, TransformerPaths,
};

const TICK: Duration = Duration::from_millis(50);
const WALK_TICKS: u32 = 200;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_dir = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let paths = TransformerPaths::new(config_dir);

    let mut world = MemoryWorld::with_layers(0, 16, |y| match y {
        0 => Cell::of(BEDROCK),
        1..=9 => Cell::of(STONE),
        10..=11 => Cell::of(DIRT),
        12 => Cell::of(GRASS),
        _ => Cell::AIR,
    });

    let mut registry = BlockRegistry::with_defaults();
    match registry.load_from_directory(paths.config_dir().join("blocks")) {
        Ok(0) => {}
        Ok(count) => log::info!("Loaded {} extra block definitions", count),
        Err(e) => log::warn!("Failed to load extra blocks: {}", e),
    }

    let (handle, queue) = main_thread_channel();
    let transformer = match ChunkTransformer::new(
        Arc::new(registry),
        Arc::new(world.clone()),
        handle,
        TransformerOptions::new(paths),
    ) {
        Ok(transformer) => transformer,
        Err(e) => {
            log::error!("Failed to start transformer: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Chunk Transformer Demo ===");
    println!("Settings: {:?}", transformer.settings().performance());
    println!("Valid target blocks: {}", transformer.valid_blocks().len());
    println!("==============================");

    let mut player = PlayerTracker::new();
    let mut executed = 0;

    for tick in 0..WALK_TICKS {
        let started = Instant::now();

        executed += queue.run_pending(&mut world);

        // Два блока за тик вдоль оси X, чуть наискосок
        let pos = BlockPos::new(tick as i32 * 2, 13, tick as i32 / 2);
        if player.on_player_tick(&transformer, pos, &mut world) {
            log::info!("Tick {}: player entered chunk {:?}", tick, pos.chunk_pos());
        }

        if let Some(rest) = TICK.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    // Дать последним батчам дойти до мира
    let drain_until = Instant::now() + Duration::from_secs(2);
    while transformer.stats().in_flight > 0 && Instant::now() < drain_until {
        executed += queue.run_pending(&mut world);
        thread::sleep(TICK);
    }

    transformer.shutdown();
    executed += queue.run_pending(&mut world);

    let stats = transformer.stats();
    println!("=== Result ===");
    println!("Main thread tasks executed: {}", executed);
    println!("Chunks transformed:        {}", stats.transformed);
    println!("Jobs completed/abandoned:  {}/{}", stats.jobs_completed, stats.jobs_abandoned);
    println!("Batches scheduled:         {}", stats.batches_scheduled);
    println!("Blocks changed:            {}", stats.blocks_changed);
    println!("World updates:             {:?}", world.update_stats());
    println!("Dirty chunks:              {}", world.take_dirty_chunks().len());
}
