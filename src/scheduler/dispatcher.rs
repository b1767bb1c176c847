// ============================================
// Dispatcher - Запуск чанков с ограничением темпа
// ============================================
// Раз в 1000 / chunks_per_second мс берёт из очереди одну задачу
// и отдаёт её в пул. Темп перечитывается на каждом цикле.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::batch::run_task;
use super::context::TransformContext;

/// Один шаг диспетчера. true - задача ушла в пул.
pub(crate) fn dispatch_next(ctx: &Arc<TransformContext>) -> bool {
    if !ctx.is_running() {
        return false;
    }
    let Some(task) = ctx.queue.pop() else {
        return false;
    };

    if !ctx.tracker.begin(task.key) {
        log::debug!("[TRANSFORM] Chunk {:?} already running, dropped", task.chunk);
        return false;
    }

    let worker_ctx = Arc::clone(ctx);
    ctx.pool.spawn(move || run_task(&worker_ctx, task));
    true
}

pub(crate) struct Dispatcher {
    stop_tx: Sender<()>,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    pub fn spawn(ctx: Arc<TransformContext>) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = channel::<()>();

        let worker = thread::Builder::new()
            .name("chunk-dispatcher".to_string())
            .spawn(move || loop {
                dispatch_next(&ctx);
                match stop_rx.recv_timeout(ctx.settings.dispatch_period()) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self { stop_tx, worker })
    }

    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.worker.join().is_err() {
            log::error!("[TRANSFORM] Dispatcher thread panicked");
        }
    }
}
