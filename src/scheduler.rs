//! Deferred work that runs once the current message has been fully handled.
//!
//! The dispatcher flushes the queue after every inbound message, so a task
//! queued while handling a message runs after all observer callbacks that
//! message triggered, and before the next message is taken.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

type Task = Box<dyn FnOnce() + Send>;

#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, task: impl FnOnce() + Send + 'static) {
        self.tasks.lock().push_back(Box::new(task));
    }

    /// Runs queued tasks in FIFO order until the queue is empty, including
    /// tasks queued by tasks. Returns how many ran.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop under the lock, run without it: tasks may queue more work.
            let next = self.tasks.lock().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}
