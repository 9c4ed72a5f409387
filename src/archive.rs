//! Archive packaging
//!
//! Packs a job's processed page files into a single zip-compatible
//! container. Member order is whatever order the pipeline supplies, which
//! is ascending sequence index; member names carry no directory component.

use crate::config::ArchiveConfig;
use crate::error::PackagingError;
use crate::workspace::Workspace;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;

/// Builds the final archive for a job
pub struct ArchiveBuilder {
    name_prefix: String,
    extension: String,
}

impl ArchiveBuilder {
    /// Create a builder using the configured naming scheme
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            name_prefix: config.name_prefix.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Package the given files, in the given order, into a new archive
    ///
    /// The archive is written into the workspace directory under a
    /// timestamped name. The timestamp alone is unique for one job at a
    /// time; the job-id suffix keeps concurrent jobs from colliding.
    pub fn build(
        &self,
        workspace: &Workspace,
        members: &[PathBuf],
    ) -> std::result::Result<PathBuf, PackagingError> {
        let file_name = format!(
            "{}_{}_{}.{}",
            self.name_prefix,
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            workspace.job_id(),
            self.extension
        );
        let archive_path = workspace.dir().join(&file_name);

        let file = std::fs::File::create(&archive_path).map_err(|e| PackagingError::Write {
            path: archive_path.clone(),
            reason: e.to_string(),
        })?;
        let mut writer = zip::ZipWriter::new(file);
        let options = FileOptions::default();

        for member in members {
            let name = member_name(member)?;
            let data = std::fs::read(member).map_err(|e| PackagingError::Member {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

            writer
                .start_file(name, options)
                .map_err(|e| PackagingError::Member {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
            writer.write_all(&data).map_err(|e| PackagingError::Member {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        }

        writer.finish().map_err(|e| PackagingError::Write {
            path: archive_path.clone(),
            reason: e.to_string(),
        })?;

        info!(
            archive = %archive_path.display(),
            members = members.len(),
            "archive written"
        );
        Ok(archive_path)
    }
}

fn member_name(path: &Path) -> std::result::Result<&str, PackagingError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PackagingError::Member {
            name: path.display().to_string(),
            reason: "member has no valid file name".to_string(),
        })
}
