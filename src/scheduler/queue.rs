// ============================================
// Transform Queue - Очередь чанков на обработку
// ============================================
// FIFO с фиксированной ёмкостью. Производитель - обработчик входа
// в чанк, потребитель - диспетчер.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::blocks::BlockType;
use crate::core::MAX_QUEUED_TASKS;
use crate::terrain::{ChunkKey, ChunkPos};

/// Чанк + выбранный для него блок
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformTask {
    pub key: ChunkKey,
    pub chunk: ChunkPos,
    pub target: BlockType,
}

impl TransformTask {
    pub fn new(chunk: ChunkPos, target: BlockType) -> Self {
        Self { key: chunk.to_key(), chunk, target }
    }
}

/// Обе стороны канала живут в контексте, поэтому он не закрывается
pub struct TransformQueue {
    tx: Sender<TransformTask>,
    rx: Receiver<TransformTask>,
}

impl TransformQueue {
    pub fn new() -> Self {
        Self::with_capacity(MAX_QUEUED_TASKS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Положить задачу. Очередь полна - задача возвращается обратно.
    pub fn offer(&self, task: TransformTask) -> Result<(), TransformTask> {
        self.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) | TrySendError::Disconnected(task) => task,
        })
    }

    pub fn pop(&self) -> Option<TransformTask> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Забрать всё (при остановке)
    pub fn drain(&self) -> Vec<TransformTask> {
        self.rx.try_iter().collect()
    }
}

impl Default for TransformQueue {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::STONE;

    #[test]
    fn fifo_order() {
        let queue = TransformQueue::new();
        for x in 0..3 {
            queue.offer(TransformTask::new(ChunkPos::new(x, 0), STONE)).unwrap();
        }
        let order: Vec<i32> = std::iter::from_fn(|| queue.pop()).map(|t| t.chunk.x).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_hands_task_back() {
        let queue = TransformQueue::with_capacity(2);
        queue.offer(TransformTask::new(ChunkPos::new(0, 0), STONE)).unwrap();
        queue.offer(TransformTask::new(ChunkPos::new(1, 0), STONE)).unwrap();
        let rejected = queue.offer(TransformTask::new(ChunkPos::new(2, 0), STONE)).unwrap_err();
        assert_eq!(rejected.chunk, ChunkPos::new(2, 0));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);

        // После разбора место снова есть
        assert!(queue.is_empty());
        queue.offer(TransformTask::new(ChunkPos::new(3, 0), STONE)).unwrap();
        assert_eq!(queue.pop().map(|t| t.chunk), Some(ChunkPos::new(3, 0)));
    }
}
