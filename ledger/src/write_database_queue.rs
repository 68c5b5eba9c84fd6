use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
};

/// The lanes of the single writer. Requests are served in FIFO order; a
/// lane change only ever happens at a transaction boundary, when the
/// current holder releases its guard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Writer {
    ConfirmationHeight,
    ProcessBatch,
    Testing,
}

/// Releases the queue slot when dropped
pub struct WriteGuard {
    guard_finish_callback: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl WriteGuard {
    fn new(guard_finish_callback: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            guard_finish_callback: Some(guard_finish_callback),
        }
    }

    pub fn release(&mut self) {
        if let Some(callback) = self.guard_finish_callback.take() {
            callback();
        }
    }

    pub fn is_owned(&self) -> bool {
        self.guard_finish_callback.is_some()
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Serializes all writers of the store. Only the front of the queue may
/// hold the write transaction; everyone else parks until their lane
/// reaches the front.
pub struct WriteDatabaseQueue {
    data: Arc<Mutex<VecDeque<Writer>>>,
    condition: Arc<Condvar>,
}

impl WriteDatabaseQueue {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(VecDeque::new())),
            condition: Arc::new(Condvar::new()),
        }
    }

    /// Blocks until the writer reaches the front of the queue
    pub fn wait(&self, writer: Writer) -> WriteGuard {
        let mut guard = self.data.lock().unwrap();
        debug_assert!(!guard.contains(&writer), "writer queued twice");
        guard.push_back(writer);
        while *guard.front().unwrap() != writer {
            guard = self.condition.wait(guard).unwrap();
        }
        drop(guard);
        self.create_write_guard()
    }

    /// Whether the given writer is currently queued or writing
    pub fn contains(&self, writer: Writer) -> bool {
        self.data.lock().unwrap().contains(&writer)
    }

    /// Tries to claim the queue without waiting. Returns true when the
    /// writer is now at the front; call `pop` to obtain the guard.
    pub fn process(&self, writer: Writer) -> bool {
        let mut guard = self.data.lock().unwrap();
        if guard.is_empty() {
            guard.push_back(writer);
            true
        } else {
            false
        }
    }

    /// Guard for a writer that won `process`
    pub fn pop(&self) -> WriteGuard {
        self.create_write_guard()
    }

    fn create_write_guard(&self) -> WriteGuard {
        let data = self.data.clone();
        let condition = self.condition.clone();
        WriteGuard::new(Arc::new(move || {
            data.lock().unwrap().pop_front();
            condition.notify_all();
        }))
    }
}

impl Default for WriteDatabaseQueue {
    fn default() -> Self {
        Self::new()
    }
}
