//! Deferred work that runs on the host's next frame.

use std::collections::VecDeque;

use crate::cancellation::CancellationToken;

/// Identifies a task scheduled on a [`FrameQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// FIFO of tasks deferred to the next frame.
///
/// [`take_frame`](FrameQueue::take_frame) hands out everything scheduled so far.
/// Tasks scheduled while those run land in the queue for the following frame, so a
/// task that reschedules itself advances by exactly one frame instead of spinning.
#[derive(Debug)]
pub struct FrameQueue<T> {
    tasks: VecDeque<(TaskHandle, T)>,
    next_id: u64,
    token: CancellationToken,
}

impl<T> FrameQueue<T> {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            tasks: VecDeque::new(),
            next_id: 1,
            token,
        }
    }

    /// Queues `task` for the next frame. Returns `None` once the queue's token is cancelled.
    pub fn schedule(&mut self, task: T) -> Option<TaskHandle> {
        if self.token.is_cancelled() {
            return None;
        }
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push_back((handle, task));
        Some(handle)
    }

    /// Queues `task` unless an equal task is already waiting.
    pub fn schedule_unique(&mut self, task: T) -> Option<TaskHandle>
    where
        T: PartialEq,
    {
        if let Some((handle, _)) = self.tasks.iter().find(|(_, queued)| *queued == task) {
            if self.token.is_cancelled() {
                return None;
            }
            return Some(*handle);
        }
        self.schedule(task)
    }

    /// Removes a queued task. Returns `false` if it already ran or was never queued.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(queued, _)| *queued != handle);
        self.tasks.len() != before
    }

    /// Removes every queued task matching `predicate` and returns how many were dropped.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|(_, task)| !predicate(task));
        before - self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Drains the tasks due this frame. Empty once the token is cancelled.
    pub fn take_frame(&mut self) -> Vec<T> {
        if self.token.is_cancelled() {
            self.tasks.clear();
            return Vec::new();
        }
        self.tasks.drain(..).map(|(_, task)| task).collect()
    }

    pub fn contains(&self, task: &T) -> bool
    where
        T: PartialEq,
    {
        self.tasks.iter().any(|(_, queued)| queued == task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
