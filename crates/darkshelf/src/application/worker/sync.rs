use std::{
    collections::HashSet,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use bytes::Bytes;
use darkshelf_lib::prelude::{CatalogEntry, parse_entry, sort_by_recency};
use futures::FutureExt;
use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};

use super::progress::ProgressReporter;
use crate::domain::{
    entities::sync::{SyncReport, SyncSettings, SyncTrigger},
    repositories::{
        comic::ComicRepository,
        snapshot::{SnapshotRepository, SnapshotRepositoryError},
    },
    services::comic::ComicService,
};

pub type SyncCommandReceiver = flume::Receiver<SyncTrigger>;
pub type SyncCommandSender = flume::Sender<SyncTrigger>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] SnapshotRepositoryError),
}

struct FetchOutcome {
    id: u64,
    payload: Option<Bytes>,
}

/// Reports exactly one outcome for a job. Dropping it without calling
/// `complete` reports an empty outcome, so the aggregator always receives one
/// message per dispatched id, even when a fetch panics.
struct Completion<'a> {
    id: u64,
    done_tx: &'a flume::Sender<FetchOutcome>,
    processed: &'a AtomicU64,
    progress: &'a dyn ProgressReporter,
    sent: bool,
}

impl<'a> Completion<'a> {
    fn new(
        id: u64,
        done_tx: &'a flume::Sender<FetchOutcome>,
        processed: &'a AtomicU64,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            id,
            done_tx,
            processed,
            progress,
            sent: false,
        }
    }

    fn complete(mut self, payload: Option<Bytes>) {
        self.send(payload);
    }

    fn send(&mut self, payload: Option<Bytes>) {
        if self.sent {
            return;
        }
        self.sent = true;

        self.processed.fetch_add(1, Ordering::SeqCst);
        self.progress.inc();

        // unbounded, never blocks; fails only when the aggregator is gone
        if self
            .done_tx
            .send(FetchOutcome {
                id: self.id,
                payload,
            })
            .is_err()
        {
            warn!("aggregator gone, dropping result of comic {}", self.id);
        }
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        if !self.sent {
            self.send(None);
        }
    }
}

/// Clears the running flag when the run ends, however it ends
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct SyncContext<R, S>
where
    R: ComicRepository,
    S: SnapshotRepository,
{
    comic_svc: ComicService<R>,
    snapshot_repo: S,
    settings: SyncSettings,
    progress: Box<dyn ProgressReporter>,
    processed: AtomicU64,
    running: AtomicBool,
}

pub struct SyncWorker<R, S>
where
    R: ComicRepository,
    S: SnapshotRepository,
{
    ctx: Arc<SyncContext<R, S>>,
}

impl<R, S> Clone for SyncWorker<R, S>
where
    R: ComicRepository,
    S: SnapshotRepository,
{
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
        }
    }
}

impl<R, S> SyncWorker<R, S>
where
    R: ComicRepository + 'static,
    S: SnapshotRepository + 'static,
{
    pub fn new<P>(comic_repo: R, snapshot_repo: S, settings: SyncSettings, progress: P) -> Self
    where
        P: ProgressReporter + 'static,
    {
        Self {
            ctx: Arc::new(SyncContext {
                comic_svc: ComicService::new(comic_repo),
                snapshot_repo,
                settings,
                progress: Box::new(progress),
                processed: AtomicU64::new(0),
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.ctx.running.load(Ordering::Acquire)
    }

    /// Jobs finished by the current or last run
    pub fn processed(&self) -> u64 {
        self.ctx.processed.load(Ordering::SeqCst)
    }

    /// Runs the whole pipeline unless a run is already in progress, in which
    /// case this returns `Ok(None)` right away.
    pub async fn trigger(&self, origin: SyncTrigger) -> Result<Option<SyncReport>, SyncError> {
        let Some(_guard) = RunGuard::acquire(&self.ctx.running) else {
            return Ok(None);
        };

        info!("start sync ({origin})");
        self.run().await.map(Some)
    }

    /// Triggers a run in the background and logs how it went
    pub fn spawn_trigger(&self, origin: SyncTrigger) -> JoinHandle<()> {
        let worker = self.clone();
        tokio::spawn(async move {
            match worker.trigger(origin).await {
                Ok(Some(report)) => info!(
                    "sync done in {:?}, {} of {} comics collected",
                    report.elapsed, report.collected, report.dispatched
                ),
                Ok(None) => info!("sync already in progress, ignoring {origin} request"),
                Err(e) => error!("sync failed: {e}"),
            }
        })
    }

    async fn run(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let settings = self.ctx.settings;
        let total = settings.total_jobs();

        self.ctx.processed.store(0, Ordering::SeqCst);
        self.ctx.progress.start(total);

        let (job_tx, job_rx) = flume::unbounded();
        let (done_tx, done_rx) = flume::unbounded();

        let workers = self.spawn_workers(job_rx, done_tx);

        for id in 1..settings.max_id {
            if job_tx.send(id).is_err() {
                error!("no sync worker left, stop dispatching at comic {id}");
                break;
            }
        }
        drop(job_tx);

        let mut entries = aggregate(total, done_rx).await;

        for handle in workers {
            if let Err(e) = handle.await {
                error!("sync worker failed: {e}");
            }
        }
        self.ctx.progress.finish();

        sort_by_recency(&mut entries);
        self.ctx.snapshot_repo.save(&entries).await?;

        Ok(SyncReport {
            dispatched: total,
            collected: entries.len(),
            elapsed: start.elapsed(),
        })
    }

    fn spawn_workers(
        &self,
        job_rx: flume::Receiver<u64>,
        done_tx: flume::Sender<FetchOutcome>,
    ) -> Vec<JoinHandle<()>> {
        (0..self.ctx.settings.workers.max(1))
            .map(|_| {
                let ctx = self.ctx.clone();
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();

                tokio::spawn(async move {
                    while let Ok(id) = job_rx.recv_async().await {
                        let completion =
                            Completion::new(id, &done_tx, &ctx.processed, ctx.progress.as_ref());
                        // a panicking fetch only loses its own job
                        let payload =
                            AssertUnwindSafe(ctx.comic_svc.fetch(id, ctx.settings.max_attempts))
                                .catch_unwind()
                                .await
                                .unwrap_or_else(|_| {
                                    error!("fetch of comic {id} panicked");
                                    None
                                });
                        completion.complete(payload);
                    }
                })
            })
            .collect()
    }
}

/// Collects one outcome per dispatched job, in whatever order they finish
async fn aggregate(total: u64, done_rx: flume::Receiver<FetchOutcome>) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut received = 0;

    while received < total {
        let outcome = match done_rx.recv_async().await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "all sync workers stopped, {} of {total} results missing",
                    total - received
                );
                break;
            }
        };
        received += 1;

        let Some(payload) = outcome.payload else {
            continue;
        };

        match parse_entry(&payload) {
            Ok(entry) if seen.insert(entry.id) => entries.push(entry),
            Ok(entry) => debug!("comic {} returned duplicate id {}", outcome.id, entry.id),
            Err(e) => trace!("discard comic {}: {e}", outcome.id),
        }
    }

    entries
}

/// Spawns the trigger loop: one run after `startup_delay`, one per received
/// command and one every `period` seconds when `period` is not 0.
pub fn start<R, S>(
    worker: SyncWorker<R, S>,
    startup_delay: Duration,
    period: u64,
) -> (SyncCommandSender, JoinHandle<()>)
where
    R: ComicRepository + 'static,
    S: SnapshotRepository + 'static,
{
    if period > 0 {
        info!("periodic sync every {period} seconds");
    }

    let (command_tx, command_rx) = flume::unbounded();
    let handle = tokio::spawn(run_triggers(worker, command_rx, startup_delay, period));

    (command_tx, handle)
}

async fn run_triggers<R, S>(
    worker: SyncWorker<R, S>,
    command_rx: SyncCommandReceiver,
    startup_delay: Duration,
    period: u64,
) where
    R: ComicRepository + 'static,
    S: SnapshotRepository + 'static,
{
    time::sleep(startup_delay).await;
    worker.spawn_trigger(SyncTrigger::Startup);

    let every = Duration::from_secs(period.max(1));
    let mut periodic = time::interval_at(Instant::now() + every, every);

    loop {
        tokio::select! {
            cmd = command_rx.recv_async() => match cmd {
                Ok(origin) => {
                    info!("received {origin} sync request");
                    worker.spawn_trigger(origin);
                }
                Err(_) => {
                    info!("sync command channel closed");
                    break;
                }
            },
            _ = periodic.tick(), if period > 0 => {
                worker.spawn_trigger(SyncTrigger::Periodic);
            }
        }
    }
}
