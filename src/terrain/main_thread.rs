// ============================================
// Main Thread - Передача работы владельцу мира
// ============================================
// Мир хоста не потокобезопасен для записи. Фоновые потоки не трогают
// его напрямую: каждая мутация - сообщение в очередь, которую
// разбирает единственный владелец мира.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::grid::WorldMutator;

/// Единица работы для главного потока
pub type MainThreadTask = Box<dyn FnOnce(&mut dyn WorldMutator) + Send>;

/// Создать пару (отправитель, очередь)
pub fn main_thread_channel() -> (MainThreadHandle, MainThreadQueue) {
    let (tx, rx) = channel();
    (MainThreadHandle { tx }, MainThreadQueue { rx })
}

/// Отправитель задач. Клонируется в любые потоки.
#[derive(Clone)]
pub struct MainThreadHandle {
    tx: Sender<MainThreadTask>,
}

impl MainThreadHandle {
    /// Поставить задачу в очередь. false - владелец мира уже ушёл.
    pub fn execute<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut dyn WorldMutator) + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Очередь задач на стороне владельца мира
pub struct MainThreadQueue {
    rx: Receiver<MainThreadTask>,
}

impl MainThreadQueue {
    /// Выполнить всё, что накопилось. Вызывается хостом раз в тик.
    pub fn run_pending<W: WorldMutator>(&self, world: &mut W) -> usize {
        let world: &mut dyn WorldMutator = world;
        let mut executed = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(&mut *world);
            executed += 1;
        }
        executed
    }
}

/// Поток-владелец мира: для хостов без собственного игрового цикла
pub struct OwnerThread<W> {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<W>>,
}

impl<W: WorldMutator + Send + 'static> OwnerThread<W> {
    pub fn spawn(mut world: W, queue: MainThreadQueue) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let worker = thread::Builder::new()
            .name("world-owner".to_string())
            .spawn(move || {
                loop {
                    match queue.rx.recv_timeout(Duration::from_millis(10)) {
                        Ok(task) => {
                            let target: &mut dyn WorldMutator = &mut world;
                            task(target);
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if stop_flag.load(Ordering::Acquire) {
                        queue.run_pending(&mut world);
                        break;
                    }
                }
                world
            })?;

        Ok(Self { stop, worker: Some(worker) })
    }

    /// Остановить поток и вернуть мир
    pub fn stop(mut self) -> Option<W> {
        self.stop.store(true, Ordering::Release);
        self.worker.take().and_then(|worker| worker.join().ok())
    }
}

impl<W> Drop for OwnerThread<W> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
