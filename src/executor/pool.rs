//! Bounded copy pool: N file workers plus one directory consumer.
//!
//! Layout:
//! - one bounded file queue (capacity = worker count) shared by every file
//!   worker, each pulling the next entry as soon as it is free
//! - one bounded directory queue drained serially by a single consumer
//! - the producer blocks on a full queue, which bounds memory on huge trees
//! - explicit sender drop on close before awaiting every task (the
//!   completion barrier)

use crate::executor::{create_directory, process_file, RunContext};
use crate::scanner::EntrySink;
use crate::types::{Entry, RunStats, SyncError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Entry>>>;

/// Worker pool for one run
///
/// Must be driven from a plain thread: `dispatch` blocks the caller when a
/// queue is full and would panic inside an async context.
pub struct WorkerPool {
    // Senders are declared before the runtime so an early drop closes the
    // queues before the runtime waits on its blocking tasks.
    file_tx: Option<mpsc::Sender<Entry>>,
    dir_tx: Option<mpsc::Sender<Entry>>,
    file_workers: Vec<JoinHandle<RunStats>>,
    dir_worker: Option<JoinHandle<RunStats>>,
    workers: usize,
    runtime: Runtime,
}

impl WorkerPool {
    /// Start `ctx.job.concurrency` file workers and the directory consumer
    pub fn new(ctx: RunContext) -> Result<Self, SyncError> {
        let workers = ctx.job.concurrency.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers + 1)
            .thread_name("dirbackup-worker")
            .enable_all()
            .build()
            .map_err(SyncError::Io)?;

        let (file_tx, file_rx) = mpsc::channel::<Entry>(workers);
        let (dir_tx, dir_rx) = mpsc::channel::<Entry>(workers);
        let file_rx: SharedReceiver = Arc::new(Mutex::new(file_rx));

        let handle = runtime.handle().clone();
        let file_workers = (0..workers)
            .map(|worker_id| {
                let ctx = ctx.clone();
                let rx = Arc::clone(&file_rx);
                handle.spawn_blocking(move || file_worker_loop(worker_id, ctx, rx))
            })
            .collect();
        let dir_worker = handle.spawn_blocking(move || dir_worker_loop(ctx, dir_rx));

        Ok(Self {
            file_tx: Some(file_tx),
            dir_tx: Some(dir_tx),
            file_workers,
            dir_worker: Some(dir_worker),
            workers,
            runtime,
        })
    }

    /// Number of file workers
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue one entry, blocking while its queue is full
    pub fn dispatch(&self, entry: Entry) -> Result<(), SyncError> {
        let (sender, name) = if entry.is_directory() {
            (self.dir_tx.as_ref(), "directory")
        } else {
            (self.file_tx.as_ref(), "file")
        };
        let sender = sender
            .ok_or_else(|| SyncError::Worker(format!("{} queue is already closed", name)))?;

        sender
            .blocking_send(entry)
            .map_err(|_| SyncError::Worker(format!("{} queue has no consumers left", name)))
    }

    /// Close both queues and wait for every task to drain and exit
    ///
    /// All tasks are awaited even if one failed, so nothing is still
    /// running when this returns. The first task failure is reported.
    pub fn close_and_wait(mut self) -> Result<RunStats, SyncError> {
        self.file_tx.take();
        self.dir_tx.take();

        let mut handles = std::mem::take(&mut self.file_workers);
        handles.extend(self.dir_worker.take());

        self.runtime.block_on(async move {
            let mut total = RunStats::default();
            let mut first_error = None;
            for handle in handles {
                match handle.await {
                    Ok(stats) => total += stats,
                    Err(e) => {
                        tracing::error!(error = %e, "pool task failed");
                        first_error.get_or_insert(map_join_error(e));
                    }
                }
            }
            match first_error {
                Some(e) => Err(e),
                None => Ok(total),
            }
        })
    }
}

impl EntrySink for WorkerPool {
    fn accept(&mut self, entry: Entry) -> Result<(), SyncError> {
        self.dispatch(entry)
    }
}

fn file_worker_loop(worker_id: usize, ctx: RunContext, rx: SharedReceiver) -> RunStats {
    let mut stats = RunStats::default();
    loop {
        // Hold the lock only while waiting for the next entry, never while
        // copying, so an idle worker can take the following one.
        let next = rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .blocking_recv();
        let Some(entry) = next else { break };
        process_file(&ctx, &entry, &mut stats);
    }
    tracing::debug!(worker_id, files = stats.files_seen, "file worker drained");
    stats
}

fn dir_worker_loop(ctx: RunContext, mut rx: mpsc::Receiver<Entry>) -> RunStats {
    let mut stats = RunStats::default();
    while let Some(entry) = rx.blocking_recv() {
        create_directory(&ctx, &entry, &mut stats);
    }
    stats
}

fn map_join_error(error: tokio::task::JoinError) -> SyncError {
    SyncError::Worker(format!("copy worker task failed: {}", error))
}
