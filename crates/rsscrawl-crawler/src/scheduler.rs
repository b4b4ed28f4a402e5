use std::any::Any;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use futures::FutureExt;
use tokio::sync::oneshot;

/// A unit of work accepted by the [`Scheduler`].
pub type Job = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Runs at most `limit` jobs at once and signals when none is left.
///
/// Jobs beyond the limit wait on a stack: when a slot frees up, the job
/// submitted last is started first. A running job may submit new jobs through
/// its own clone of the scheduler, which is how a crawl fans out.
///
/// Cloning is cheap, all clones share the same state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    limit: NonZeroUsize,
    state: Mutex<State>,
    idle_rx: Mutex<Option<oneshot::Receiver<()>>>,
}

struct State {
    active: usize,
    waiting: Vec<Job>,
    idle_tx: Option<oneshot::Sender<()>>,
}

impl State {
    fn resolve_idle(&mut self) {
        // Taking the sender turns every later attempt into a no-op
        if let Some(tx) = self.idle_tx.take() {
            tx.send(()).ok();
        }
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler {
    pub fn new(limit: NonZeroUsize) -> Self {
        let (idle_tx, idle_rx) = oneshot::channel();
        let state = State {
            active: 0,
            waiting: Vec::new(),
            idle_tx: Some(idle_tx),
        };
        Self {
            inner: Arc::new(Inner {
                limit,
                state: Mutex::new(state),
                idle_rx: Mutex::new(Some(idle_rx)),
            }),
        }
    }

    /// Starts `job` right away if a slot is free, otherwise queues it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&self, job: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let job: Job = Box::pin(job);
        let mut state = self.inner.state();
        if state.active < self.inner.limit.get() {
            state.active += 1;
            drop(state);
            self.start(job);
        } else {
            state.waiting.push(job);
        }
    }

    /// Waits until no job is running and none is waiting.
    ///
    /// Resolves immediately when the scheduler is already idle. Only one
    /// caller may wait, any further call returns an error.
    pub async fn wait_idle(&self) -> Result<()> {
        let idle_rx = self
            .inner
            .idle_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| anyhow!("Scheduler idleness is already awaited"))?;

        {
            let mut state = self.inner.state();
            if state.active == 0 && state.waiting.is_empty() {
                state.resolve_idle();
            }
        }

        idle_rx
            .await
            .map_err(|_| anyhow!("Scheduler dropped before becoming idle"))
    }

    pub fn limit(&self) -> NonZeroUsize {
        self.inner.limit
    }

    /// Number of jobs currently running.
    pub fn active(&self) -> usize {
        self.inner.state().active
    }

    /// Number of jobs queued behind the limit.
    pub fn waiting(&self) -> usize {
        self.inner.state().waiting.len()
    }

    fn start(&self, job: Job) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            match AssertUnwindSafe(job).catch_unwind().await {
                Ok(Ok(())) => (),
                Ok(Err(e)) => log::error!("Task failed: {e:#}"),
                Err(panic) => log::error!("Task panicked: {}", panic_message(&*panic)),
            }
            scheduler.complete();
        });
    }

    fn complete(&self) {
        let mut state = self.inner.state();
        state.active -= 1;
        if let Some(job) = state.waiting.pop() {
            state.active += 1;
            drop(state);
            self.start(job);
        } else if state.active == 0 {
            state.resolve_idle();
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state();
        f.debug_struct("Scheduler")
            .field("limit", &self.inner.limit)
            .field("active", &state.active)
            .field("waiting", &state.waiting.len())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
