//! Error types for pagepack
//!
//! The taxonomy separates failures by how the pipeline reacts to them:
//! - `Input` — the job never starts
//! - `Transport` — fatal for the page fetch, isolated-and-recorded for
//!   individual image fetches
//! - `Processing` — always isolated at the per-candidate boundary
//! - `Packaging` — fatal even when every image succeeded
//!
//! Workspace cleanup failures are logged with `tracing::warn!` at the call
//! site and never surface through these types.

use thiserror::Error;

/// Result type alias for pagepack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pagepack
///
/// A value of this type is always a job-level failure: per-candidate errors
/// are recorded on the task and reported through progress events instead of
/// being returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input URL (job never starts)
    #[error("invalid input: {0}")]
    Input(String),

    /// Page fetch failure (image fetch failures are isolated, not returned)
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Image decode/resample/encode failure escalated to job level
    ///
    /// Only reachable when a caller invokes [`crate::processing::process`]
    /// directly; inside the pipeline these stay per-candidate.
    #[error("image processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// Archive write failure
    #[error("packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or other reqwest-level error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The page contained no qualifying image references
    #[error("no images found on page")]
    NoImagesFound,

    /// Every candidate failed; there is nothing to archive
    #[error("all {total} images failed to download or process")]
    AllImagesFailed {
        /// Number of candidates the job attempted
        total: usize,
    },

    /// The job was cancelled between candidates; no partial archive is kept
    #[error("job cancelled")]
    Cancelled,
}

/// Network transport errors for a single HTTP GET
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request failed at the connection or protocol level
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that was being fetched
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP status {status}")]
    Status {
        /// The URL that was being fetched
        url: String,
        /// The HTTP status code
        status: u16,
    },
}

/// Image processing errors (decode, resample, encode)
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The raw bytes could not be decoded as an image
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Downscaling produced a zero-size axis
    #[error("downscaled image has zero dimension ({width}x{height})")]
    ZeroDimension {
        /// Computed output width
        width: u32,
        /// Computed output height
        height: u32,
    },

    /// JPEG encoding failed
    #[error("failed to encode JPEG: {0}")]
    Encode(String),

    /// The blocking worker running the processing step panicked or was aborted
    #[error("processing worker failed: {0}")]
    Worker(String),
}

/// Archive packaging errors
#[derive(Debug, Error)]
pub enum PackagingError {
    /// The zip container could not be created or finalized
    #[error("failed to write archive {path}: {reason}")]
    Write {
        /// Path of the archive being written
        path: std::path::PathBuf,
        /// Why the write failed
        reason: String,
    },

    /// A member file could not be read or appended
    #[error("failed to add member {name}: {reason}")]
    Member {
        /// Member name inside the archive
        name: String,
        /// Why the member failed
        reason: String,
    },
}
