//! # pagepack
//!
//! Library for turning a web page into a single archive of its content
//! images: discover embedded images by a naming heuristic, fetch each one,
//! normalize and recompress it, and package the results into a
//! zip-compatible container, reporting progress along the way and
//! guaranteeing that a single bad image never aborts the whole job.
//!
//! ## Design Philosophy
//!
//! pagepack is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Failure-isolating** - Per-image errors are recorded and reported,
//!   never fatal to the job
//! - **Event-driven** - Consumers subscribe to progress events, no polling
//! - **Tidy** - Every artifact a job produces is removed when the job ends,
//!   whatever the outcome
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagepack::{Config, DownloadPipeline, JobOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = DownloadPipeline::new(Config::default())?;
//!
//!     // Subscribe to progress events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{}/{}: {}", event.completed, event.total, event.last_item);
//!         }
//!     });
//!
//!     match pipeline.run("https://example.com/chapter/12").await? {
//!         JobOutcome::Success { archive } => {
//!             std::fs::write(&archive.file_name, &archive.data)?;
//!         }
//!         JobOutcome::PartialSuccess { archive, failed } => {
//!             eprintln!("{failed} images failed");
//!             std::fs::write(&archive.file_name, &archive.data)?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive packaging
pub mod archive;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Single-shot HTTP fetching
pub mod fetcher;
/// Pipeline orchestration
pub mod pipeline;
/// Image normalization and recompression
pub mod processing;
/// Retry logic with exponential backoff (caller-layer, opt-in)
pub mod retry;
/// Image link discovery
pub mod scrape;
/// Core types and progress events
pub mod types;
/// Per-job scratch storage
pub mod workspace;

// Re-export commonly used types
pub use archive::ArchiveBuilder;
pub use config::{ArchiveConfig, Config, FetchConfig, ImageConfig, RetryConfig, WorkspaceConfig};
pub use error::{Error, PackagingError, ProcessingError, Result, TransportError};
pub use fetcher::Fetcher;
pub use pipeline::DownloadPipeline;
pub use processing::ProcessedImage;
pub use types::{
    ArchiveFile, ImageCandidate, ImageTask, JobId, JobOutcome, ProgressEvent, TaskStatus,
};
pub use workspace::Workspace;
