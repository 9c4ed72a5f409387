//! Pipeline orchestration
//!
//! One `run()` call is one job: fetch the page, discover candidates, fetch
//! and recompress each image, package the survivors, hand the archive to
//! the caller, and clear the workspace no matter how the job ended.
//!
//! Per-candidate failures are isolated: a task that fails is recorded and
//! reported, and its siblings continue. Only the page fetch, packaging,
//! and cancellation are fatal to the whole job.

use crate::archive::ArchiveBuilder;
use crate::config::Config;
use crate::error::{Error, ProcessingError, Result};
use crate::fetcher::Fetcher;
use crate::scrape;
use crate::types::{ArchiveFile, ImageTask, JobId, JobOutcome, ProgressEvent, TaskStatus};
use crate::workspace::Workspace;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Capacity of the progress broadcast channel; subscribers that lag past
/// this simply miss events (delivery is at-most-once by design).
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The central coordinator: discover, fetch, transform, package, report
///
/// Cheap to share behind an `Arc`; each [`run`](Self::run) call is an
/// independent job with its own workspace.
pub struct DownloadPipeline {
    config: Arc<Config>,
    fetcher: Fetcher,
    archiver: ArchiveBuilder,
    event_tx: broadcast::Sender<ProgressEvent>,
    next_job_id: AtomicU64,
}

impl DownloadPipeline {
    /// Build a pipeline from configuration
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let archiver = ArchiveBuilder::new(&config.archive);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            archiver,
            event_tx,
            next_job_id: AtomicU64::new(1),
        })
    }

    /// Subscribe to progress events
    ///
    /// Events are snapshots emitted after each task resolves. Delivery is
    /// best-effort: missed events are not re-sent.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.event_tx.subscribe()
    }

    /// Run one job to completion
    pub async fn run(&self, url: &str) -> Result<JobOutcome> {
        self.run_with_cancel(url, CancellationToken::new()).await
    }

    /// Run one job, checking the token between candidates
    ///
    /// A cancelled job returns [`Error::Cancelled`] and produces no archive,
    /// partial or otherwise; whatever was already written is cleaned up.
    pub async fn run_with_cancel(&self, url: &str, cancel: CancellationToken) -> Result<JobOutcome> {
        // Scheme prefix check only; anything deeper is the fetch's problem.
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Input(format!(
                "not an HTTP or HTTPS URL: {url}"
            )));
        }
        let base = Url::parse(url).map_err(|e| Error::Input(format!("unparsable URL: {e}")))?;

        // A page fetch failure is fatal; no partial outcome is possible yet.
        let page = self.fetcher.fetch(&base).await.map_err(Error::Transport)?;
        let html = String::from_utf8_lossy(&page);
        let candidates = scrape::extract_image_links(&html, &base);
        if candidates.is_empty() {
            return Err(Error::NoImagesFound);
        }

        let job_id = JobId::new(self.next_job_id.fetch_add(1, Ordering::Relaxed));
        info!(%job_id, url, candidates = candidates.len(), "job started");

        let workspace =
            Workspace::create(&self.config.workspace.root, job_id, &self.config.archive)?;
        let mut tasks: Vec<ImageTask> = candidates.into_iter().map(ImageTask::new).collect();

        let result = self.execute(&workspace, &mut tasks, &cancel).await;

        // Cleanup runs on every exit path; its failures never override the
        // job's already-determined outcome.
        if let Err(e) = workspace.clear() {
            warn!(%job_id, error = %e, "workspace cleanup failed");
        }

        match &result {
            Ok(outcome) => info!(
                %job_id,
                archive = outcome.archive().file_name,
                failed = outcome.failed_count(),
                "job finished"
            ),
            Err(e) => warn!(%job_id, error = %e, "job failed"),
        }
        result
    }

    async fn execute(
        &self,
        workspace: &Workspace,
        tasks: &mut [ImageTask],
        cancel: &CancellationToken,
    ) -> Result<JobOutcome> {
        let total = tasks.len();
        let mut completed = 0usize;

        for task in tasks.iter_mut() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match self.run_task(workspace, task).await {
                Ok(path) => {
                    completed += 1;
                    let last_item = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| task.candidate.src.clone());
                    self.emit(ProgressEvent {
                        completed,
                        total,
                        last_item,
                        error: None,
                    });
                }
                Err(e) => {
                    // Isolated: record, report, move on to the next sibling.
                    warn!(
                        index = task.candidate.index,
                        url = %task.candidate.url,
                        error = %e,
                        "image task failed"
                    );
                    task.fail(e.to_string());
                    self.emit(ProgressEvent {
                        completed,
                        total,
                        last_item: task.candidate.url.to_string(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let done: Vec<PathBuf> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .filter_map(|t| t.output.clone())
            .collect();
        let failed = total - done.len();

        if done.is_empty() {
            return Err(Error::AllImagesFailed { total });
        }

        // Tasks run in sequence-index order, so `done` is already ordered.
        let archive_path = self.archiver.build(workspace, &done)?;
        let data = tokio::fs::read(&archive_path).await?;
        let file_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive_path.display().to_string());
        let archive = ArchiveFile { file_name, data };

        Ok(if failed == 0 {
            JobOutcome::Success { archive }
        } else {
            JobOutcome::PartialSuccess { archive, failed }
        })
    }

    /// Fetch, process, and write one candidate
    ///
    /// Any error here is a per-item failure; the caller records it on the
    /// task and continues.
    async fn run_task(&self, workspace: &Workspace, task: &mut ImageTask) -> Result<PathBuf> {
        task.start_fetch();
        let raw = self
            .fetcher
            .fetch(&task.candidate.url)
            .await
            .map_err(Error::Transport)?;
        task.start_process(raw.len());

        let options = self.config.image.clone();
        let processed = tokio::task::spawn_blocking(move || crate::processing::process(&raw, &options))
            .await
            .map_err(|e| Error::Processing(ProcessingError::Worker(e.to_string())))?
            .map_err(Error::Processing)?;

        let path = workspace.path_for(&task.candidate);
        tokio::fs::write(&path, &processed.data).await?;
        task.complete(path.clone());
        Ok(path)
    }

    fn emit(&self, event: ProgressEvent) {
        // Best-effort: no subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
