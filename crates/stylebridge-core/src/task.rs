//! Deferred task queue.
//!
//! The engine never blocks its caller. Work that must happen "later" (such as
//! parsing a freshly edited stylesheet) is posted here, and the host drains the
//! queue from its own event loop, on its own thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::targets;

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// FIFO queue of deferred tasks.
#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<TaskData>,
}

impl TaskQueue {
    /// Create a new task queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a task to be executed on the next drain.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.tasks.push_back(TaskData {
            id,
            task: Box::new(task),
        });
        tracing::trace!(target: targets::TASK, id = id.as_u64(), "task posted");
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and removed. Dropping the task
    /// drops everything it captured, so a captured [`Settler`](crate::Settler)
    /// rejects its promise with [`Error::Cancelled`](crate::Error::Cancelled).
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if there are any pending tasks.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Run the oldest pending task, if any.
    pub fn process_next(&mut self) -> bool {
        match self.tasks.pop_front() {
            Some(data) => {
                tracing::trace!(target: targets::TASK, id = data.id.as_u64(), "running task");
                (data.task)();
                true
            }
            None => false,
        }
    }

    /// Process all pending tasks, in posting order.
    ///
    /// Returns the number of tasks processed.
    pub fn process_all(&mut self) -> usize {
        let mut count = 0;
        while self.process_next() {
            count += 1;
        }
        count
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
