//! Core types and progress events for pagepack

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Unique identifier for one pipeline run
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A discovered, not-yet-fetched image reference
///
/// Immutable once created. `index` is the element's position among **all**
/// `img` tags in the source document, not among the filtered candidates, so
/// indices stay stable and strictly increasing even when tags are skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageCandidate {
    /// The original `src` attribute text
    pub src: String,
    /// The attribute resolved against the page URL
    pub url: Url,
    /// Position in the original tag enumeration
    pub index: usize,
}

impl ImageCandidate {
    /// File base name of the source attribute (text after the last `/`)
    pub fn base_name(&self) -> &str {
        self.src.rsplit('/').next().unwrap_or(&self.src)
    }

    /// Base name without its extension, used for output file naming
    pub fn file_stem(&self) -> &str {
        let base = self.base_name();
        match base.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        }
    }
}

/// Lifecycle state of a single [`ImageTask`]
///
/// Transitions are monotonic: `Pending → Fetching → Processing → Done`,
/// with `Failed` reachable from any non-terminal state. Terminal states
/// never regress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not yet started
    Pending,
    /// Image bytes are being fetched
    Fetching,
    /// Raw bytes are being decoded and recompressed
    Processing,
    /// Processed output written to the workspace
    Done,
    /// Failed at some stage; siblings are unaffected
    Failed,
}

impl TaskStatus {
    /// Whether this state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Fetching => 1,
            TaskStatus::Processing => 2,
            TaskStatus::Done | TaskStatus::Failed => 3,
        }
    }
}

/// The processing record for one candidate
#[derive(Clone, Debug)]
pub struct ImageTask {
    /// The candidate this task processes
    pub candidate: ImageCandidate,
    /// Raw byte length, recorded once the fetch succeeds
    pub raw_len: Option<usize>,
    /// Output file path, recorded once the write succeeds
    pub output: Option<PathBuf>,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// Failure message, set only when `status` is [`TaskStatus::Failed`]
    pub error: Option<String>,
}

impl ImageTask {
    /// Create a pending task for a candidate
    pub fn new(candidate: ImageCandidate) -> Self {
        Self {
            candidate,
            raw_len: None,
            output: None,
            status: TaskStatus::Pending,
            error: None,
        }
    }

    /// Move to `Fetching`; ignored once terminal
    pub fn start_fetch(&mut self) {
        self.advance(TaskStatus::Fetching);
    }

    /// Record the fetched byte length and move to `Processing`
    pub fn start_process(&mut self, raw_len: usize) {
        if !self.status.is_terminal() {
            self.raw_len = Some(raw_len);
        }
        self.advance(TaskStatus::Processing);
    }

    /// Record the output path and move to `Done`
    pub fn complete(&mut self, output: PathBuf) {
        if !self.status.is_terminal() {
            self.output = Some(output);
        }
        self.advance(TaskStatus::Done);
    }

    /// Record a failure message and move to `Failed`
    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.status.is_terminal() {
            self.error = Some(error.into());
        }
        self.advance(TaskStatus::Failed);
    }

    fn advance(&mut self, next: TaskStatus) {
        // Backward moves and transitions out of a terminal state are dropped.
        if !self.status.is_terminal() && next.rank() > self.status.rank() {
            self.status = next;
        }
    }
}

/// Immutable progress snapshot emitted after each task resolves
///
/// `completed` counts Done tasks only and is monotonically increasing over
/// a job. Delivery is best-effort, at-most-once per task resolution: a
/// subscriber that lags simply misses events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Number of tasks that have reached Done so far
    pub completed: usize,
    /// Total number of candidates in the job
    pub total: usize,
    /// File name of the task that just resolved, or its source URL when it
    /// failed before producing a file
    pub last_item: String,
    /// Failure message when the task that just resolved failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The packaged output, handed to the caller as owned bytes
///
/// The on-disk copy is removed by workspace cleanup before the job
/// returns, so these bytes are the only surviving copy.
#[derive(Clone)]
pub struct ArchiveFile {
    /// Archive file name (timestamped, no directory component)
    pub file_name: String,
    /// Complete archive contents
    pub data: Vec<u8>,
}

impl std::fmt::Debug for ArchiveFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveFile")
            .field("file_name", &self.file_name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Terminal outcome of a successful job
///
/// Job-level failures are the `Err` side of
/// [`Result`](crate::error::Result); this enum only distinguishes complete
/// from partial success.
#[derive(Clone, Debug)]
pub enum JobOutcome {
    /// Every candidate reached Done
    Success {
        /// The packaged archive
        archive: ArchiveFile,
    },
    /// At least one candidate reached Done and at least one failed
    PartialSuccess {
        /// The packaged archive, containing only the Done members
        archive: ArchiveFile,
        /// Number of candidates that failed
        failed: usize,
    },
}

impl JobOutcome {
    /// The packaged archive, regardless of partiality
    pub fn archive(&self) -> &ArchiveFile {
        match self {
            JobOutcome::Success { archive } | JobOutcome::PartialSuccess { archive, .. } => archive,
        }
    }

    /// Number of failed candidates (zero for full success)
    pub fn failed_count(&self) -> usize {
        match self {
            JobOutcome::Success { .. } => 0,
            JobOutcome::PartialSuccess { failed, .. } => *failed,
        }
    }
}
