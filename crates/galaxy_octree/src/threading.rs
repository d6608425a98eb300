//! Task submission contract for the octree's parallel bulk build.
//!
//! The octree only needs "submit one unit of work, await its result". That
//! contract is [`TaskExecutor`] plus [`SubmitExt::submit`], which returns a
//! [`TaskHandle`] the caller can poll or block on.
//!
//! Two executors are provided:
//! - [`RayonExecutor`]: rayon's global pool, or a dedicated pool with a fixed
//!   thread count.
//! - [`InlineExecutor`]: runs each job on the submitting thread (targets
//!   without threads, deterministic tests).
//!
//! # Usage
//!
//! ```ignore
//! let executor = RayonExecutor::new();
//!
//! let handle = executor.submit(move || expensive_computation());
//! let result = handle.join()?;
//! ```
//!
//! Blocking in [`TaskHandle::join`] from inside a worker of the same rayon
//! pool can starve that pool. Build from outside the pool, or give the
//! octree a dedicated one via [`RayonExecutor::with_threads`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;

/// Unique identifier for a submitted task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Type-erased unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Failure of a submitted task, observed when its handle is joined.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TaskError {
  /// The task panicked; carries the panic message when it was a string.
  #[error("task panicked: {0}")]
  Panicked(String),
  /// The executor dropped the task without running it to completion.
  #[error("task was dropped before completing")]
  Abandoned,
}

/// Minimal task execution service.
///
/// Implementors run each job exactly once, on any thread they like.
pub trait TaskExecutor: Send + Sync {
  /// Schedule a job for execution.
  fn execute(&self, job: Job);

  /// Number of threads jobs may run on concurrently.
  fn num_threads(&self) -> usize {
    1
  }
}

/// Typed submission on top of [`TaskExecutor::execute`].
pub trait SubmitExt: TaskExecutor {
  /// Submit work and obtain a handle to its result.
  ///
  /// Panics inside `work` are caught and surface as
  /// [`TaskError::Panicked`] when the handle is joined.
  fn submit<F, T>(&self, work: F) -> TaskHandle<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let id = TaskId::next();
    let (sender, receiver) = crossbeam_channel::bounded(1);

    self.execute(Box::new(move || {
      let outcome = panic::catch_unwind(AssertUnwindSafe(work)).map_err(panic_to_error);
      // The handle may have been dropped; nobody is waiting then.
      let _ = sender.send(outcome);
    }));

    TaskHandle { id, receiver }
  }
}

impl<E: TaskExecutor + ?Sized> SubmitExt for E {}

fn panic_to_error(payload: Box<dyn Any + Send>) -> TaskError {
  let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  };
  TaskError::Panicked(message)
}

/// Awaitable result of a submitted task.
///
/// The result can be taken once, either by [`poll`](Self::poll) or by
/// [`join`](Self::join).
pub struct TaskHandle<T> {
  id: TaskId,
  receiver: Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
  /// Identifier assigned at submission.
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Poll for the task's result (non-blocking).
  ///
  /// Returns `None` while the task is still pending.
  pub fn poll(&self) -> Option<Result<T, TaskError>> {
    match self.receiver.try_recv() {
      Ok(outcome) => Some(outcome),
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => Some(Err(TaskError::Abandoned)),
    }
  }

  /// Block until the task finishes and return its result.
  pub fn join(self) -> Result<T, TaskError> {
    self
      .receiver
      .recv()
      .unwrap_or_else(|_| Err(TaskError::Abandoned))
  }
}

/// Executor backed by rayon.
///
/// Uses `rayon::spawn` on the global pool unless a dedicated pool was
/// configured with [`with_threads`](Self::with_threads).
#[derive(Clone, Default)]
pub struct RayonExecutor {
  pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonExecutor {
  /// Executor on rayon's global thread pool.
  pub fn new() -> Self {
    Self { pool: None }
  }

  /// Executor on a dedicated pool with `num_threads` workers
  /// (0 lets rayon pick).
  pub fn with_threads(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .thread_name(|index| format!("octree-build-{index}"))
      .build()?;
    Ok(Self {
      pool: Some(Arc::new(pool)),
    })
  }
}

impl TaskExecutor for RayonExecutor {
  fn execute(&self, job: Job) {
    match &self.pool {
      Some(pool) => pool.spawn(job),
      None => rayon::spawn(job),
    }
  }

  fn num_threads(&self) -> usize {
    match &self.pool {
      Some(pool) => pool.current_num_threads(),
      None => rayon::current_num_threads(),
    }
  }
}

/// Executor that runs every job immediately on the submitting thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
  fn execute(&self, job: Job) {
    job();
  }
}

// =============================================================================
// Tests
// =============================================================================
