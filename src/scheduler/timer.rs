// ============================================
// Delay Timer - Отложенный запуск задач
// ============================================
// Один поток с min-heap по времени запуска. Задачи с одинаковым
// временем выполняются в порядке постановки.
// Задачи должны быть короткими: передача батча на главный поток,
// постановка чанка радиуса в пул.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::core::lock;

pub type TimerTask = Box<dyn FnOnce() + Send>;

enum Command {
    Schedule { delay: Duration, task: TimerTask },
    Shutdown,
}

struct Entry {
    due: Instant,
    seq: u64,
    task: TimerTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Перевёрнуто: BinaryHeap - max-heap, нам нужен ближайший
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct DelayTimer {
    tx: Mutex<Sender<Command>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DelayTimer {
    pub fn new(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = channel::<Command>();

        let worker = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut heap: BinaryHeap<Entry> = BinaryHeap::new();
            let mut seq = 0u64;

            loop {
                while heap.peek().map_or(false, |e| e.due <= Instant::now()) {
                    if let Some(entry) = heap.pop() {
                        if panic::catch_unwind(AssertUnwindSafe(entry.task)).is_err() {
                            log::error!("[TRANSFORM] Delayed task panicked");
                        }
                    }
                }

                let command = match heap.peek() {
                    Some(next) => rx.recv_timeout(next.due.saturating_duration_since(Instant::now())),
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };

                match command {
                    Ok(Command::Schedule { delay, task }) => {
                        heap.push(Entry { due: Instant::now() + delay, seq, task });
                        seq += 1;
                    }
                    Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            if !heap.is_empty() {
                log::debug!("[TRANSFORM] Timer stopped with {} pending tasks", heap.len());
            }
        })?;

        Ok(Self {
            tx: Mutex::new(tx),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// false - таймер уже остановлен, задача выброшена
    pub fn schedule<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        lock(&self.tx)
            .send(Command::Schedule { delay, task: Box::new(task) })
            .is_ok()
    }

    /// Остановить поток. Невыполненные задачи выбрасываются.
    pub fn shutdown(&self) {
        let _ = lock(&self.tx).send(Command::Shutdown);
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                log::error!("[TRANSFORM] Timer thread panicked");
            }
        }
    }
}

impl Drop for DelayTimer {
    fn drop(&mut self) {
        let _ = lock(&self.tx).send(Command::Shutdown);
    }
}
