//! Fixed-size pool of named worker threads draining a shared task queue.
//!
//! Tasks are collected in a [`TaskQueueBuilder`] and frozen into a
//! [`TaskQueue`] before any worker starts, so the queue only ever shrinks
//! while the pool runs. Each worker pops one task at a time under the queue
//! lock and exits once it observes the queue empty.

use crate::error::TaskError;
use std::any::Any;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

type Job<'a> = Box<dyn FnOnce() -> Result<(), TaskError> + Send + 'a>;

/// A unit of work identified by `key`.
pub struct Task<'a, K> {
    key: K,
    job: Job<'a>,
}

impl<'a, K> Task<'a, K> {
    pub fn new<F>(key: K, job: F) -> Self
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'a,
    {
        Self {
            key,
            job: Box::new(job),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

/// Observes the queue each time a worker takes a task.
pub trait ProgressSink: Sync {
    /// Called under the queue lock with the number of tasks still queued,
    /// including the one about to be taken.
    fn on_take(&self, tasks_left: usize);
}

/// Progress sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_take(&self, _tasks_left: usize) {}
}

/// A task that returned an error or panicked.
#[derive(Debug)]
pub struct TaskFailure<K> {
    pub key: K,
    pub error: TaskError,
}

/// Collects tasks before execution starts.
pub struct TaskQueueBuilder<'a, K> {
    tasks: VecDeque<Task<'a, K>>,
}

impl<'a, K> TaskQueueBuilder<'a, K> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, task: Task<'a, K>) {
        self.tasks.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Freeze the queue. No task can be added afterwards.
    pub fn build(self) -> TaskQueue<'a, K> {
        TaskQueue {
            total: self.tasks.len(),
            tasks: Mutex::new(self.tasks),
        }
    }
}

impl<K> Default for TaskQueueBuilder<'_, K> {
    fn default() -> Self {
        Self::new()
    }
}

/// FIFO of tasks shared by the workers. Supports removal only.
pub struct TaskQueue<'a, K> {
    tasks: Mutex<VecDeque<Task<'a, K>>>,
    total: usize,
}

impl<'a, K> TaskQueue<'a, K> {
    /// Number of tasks the queue was built with.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Pop the next task, reporting the queue length to `progress` while
    /// the lock is held.
    fn take<P: ProgressSink + ?Sized>(&self, progress: &P) -> Option<Task<'a, K>> {
        let mut tasks = lock(&self.tasks);
        if tasks.is_empty() {
            return None;
        }
        progress.on_take(tasks.len());
        tasks.pop_front()
    }
}

/// Outcome of a pool run.
#[derive(Debug)]
pub struct PoolReport<K> {
    pub total: usize,
    pub completed: usize,
    /// Tasks never started because the run was cancelled.
    pub skipped: usize,
    pub failures: Vec<TaskFailure<K>>,
}

impl<K> PoolReport<K> {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Runs a [`TaskQueue`] to completion on a fixed number of threads.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    cancel_on_failure: bool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            cancel_on_failure: true,
        }
    }

    /// Stop handing out tasks after the first failure (default: on).
    pub fn cancel_on_failure(mut self, enabled: bool) -> Self {
        self.cancel_on_failure = enabled;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task in `queue` and wait for all workers to exit.
    ///
    /// Task errors and panics are collected into the report and never stop
    /// the other workers unless cancellation on failure is enabled. Fails
    /// only when a worker thread cannot be spawned.
    pub fn run<'a, K, P>(&self, queue: TaskQueue<'a, K>, progress: &P) -> io::Result<PoolReport<K>>
    where
        K: Send + 'a,
        P: ProgressSink + ?Sized,
    {
        let total = queue.len();
        let cancelled = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let failures = Mutex::new(Vec::new());

        tracing::debug!(workers = self.workers, tasks = total, "Starting worker pool");

        thread::scope(|scope| {
            for index in 0..self.workers {
                let spawned = thread::Builder::new()
                    .name(format!("aniniscale-worker-{index}"))
                    .spawn_scoped(scope, || {
                        self.work(&queue, progress, &cancelled, &completed, &failures)
                    });
                if let Err(e) = spawned {
                    cancelled.store(true, Ordering::Relaxed);
                    return Err(e);
                }
            }
            Ok(())
        })?;

        let failures = failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let completed = completed.into_inner();
        Ok(PoolReport {
            total,
            completed,
            skipped: total - completed - failures.len(),
            failures,
        })
    }

    fn work<'a, K, P>(
        &self,
        queue: &TaskQueue<'a, K>,
        progress: &P,
        cancelled: &AtomicBool,
        completed: &AtomicUsize,
        failures: &Mutex<Vec<TaskFailure<K>>>,
    ) where
        P: ProgressSink + ?Sized,
    {
        let current = thread::current();
        let worker = current.name().unwrap_or("worker");
        tracing::debug!(worker, "Worker ready");

        while !cancelled.load(Ordering::Relaxed) {
            let Some(Task { key, job }) = queue.take(progress) else {
                break;
            };
            match run_job(job) {
                Ok(()) => {
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(error) => {
                    tracing::debug!(worker, error = %error, "Task failed");
                    if self.cancel_on_failure {
                        cancelled.store(true, Ordering::Relaxed);
                    }
                    lock(failures).push(TaskFailure { key, error });
                }
            }
        }

        tracing::debug!(worker, "Worker done");
    }
}

fn run_job(job: Job<'_>) -> Result<(), TaskError> {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(result) => result,
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
