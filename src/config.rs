//! Configuration types for pagepack

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Main configuration for [`DownloadPipeline`](crate::pipeline::DownloadPipeline)
///
/// Fields are organized into logical sub-configs:
/// - [`fetch`](FetchConfig) — HTTP client behavior
/// - [`image`](ImageConfig) — recompression parameters
/// - [`workspace`](WorkspaceConfig) — scratch storage location
/// - [`archive`](ArchiveConfig) — output container naming
/// - [`retry`](RetryConfig) — caller-layer retry policy (the pipeline
///   itself never retries)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior (timeout, user agent)
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Image recompression parameters
    #[serde(default)]
    pub image: ImageConfig,

    /// Scratch storage settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Archive naming settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Retry policy for callers wrapping the pipeline
    #[serde(default)]
    pub retry: RetryConfig,
}

/// HTTP fetch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (default: 30 seconds)
    ///
    /// Without a deadline a hung fetch hangs the whole job, so every
    /// request carries one.
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Image recompression configuration
///
/// The defaults define the output contract: a 0.8 downscale on each axis
/// and JPEG quality 85.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Downscale factor applied to each axis (default: 0.8)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// JPEG encode quality, 1-100 (default: 85)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Workspace configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Shared root directory under which per-job subdirectories are created
    /// (default: "./workspace")
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

/// Archive naming configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Name prefix for the produced archive (default: "pages")
    #[serde(default = "default_archive_prefix")]
    pub name_prefix: String,

    /// File extension of the produced archive (default: "cbz", a plain
    /// zip container)
    #[serde(default = "default_archive_extension")]
    pub extension: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_archive_prefix(),
            extension: default_archive_extension(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

// Default value functions
fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("pagepack/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_scale() -> f32 {
    0.8
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("workspace")
}

fn default_archive_prefix() -> String {
    "pages".to_string()
}

fn default_archive_extension() -> String {
    "cbz".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
