//! Per-job scratch storage
//!
//! Each job gets its own `job-<id>` subdirectory under a shared root, so
//! concurrent jobs can never corrupt each other's file sets. Cleanup is
//! scoped to the job's naming convention: zero-padded-index page files and
//! the job's archive. Anything else that ends up in the directory is left
//! alone.

use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::types::{ImageCandidate, JobId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scoped temporary storage for one job's artifacts
#[derive(Clone, Debug)]
pub struct Workspace {
    dir: PathBuf,
    job_id: JobId,
    archive_prefix: String,
    archive_extension: String,
}

impl Workspace {
    /// Create the job directory under the shared root
    pub fn create(root: &Path, job_id: JobId, archive: &ArchiveConfig) -> Result<Self> {
        let dir = root.join(format!("job-{job_id}"));
        std::fs::create_dir_all(&dir)?;
        debug!(%job_id, dir = %dir.display(), "workspace created");
        Ok(Self {
            dir,
            job_id,
            archive_prefix: archive.name_prefix.clone(),
            archive_extension: archive.extension.clone(),
        })
    }

    /// The job directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The owning job's identifier
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Output path for a candidate's processed image
    ///
    /// The zero-padded sequence index keeps names unique even when several
    /// candidates share a base name, and makes lexicographic order equal
    /// sequence-index order.
    pub fn path_for(&self, candidate: &ImageCandidate) -> PathBuf {
        self.dir
            .join(format!("{:04}-{}.jpg", candidate.index, candidate.file_stem()))
    }

    /// Produced page files, in ascending sequence-index order
    pub fn list_produced_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if is_page_file_name(&name.to_string_lossy()) {
                files.push(entry.path());
            }
        }
        // Zero-padded indices sort lexicographically in index order.
        files.sort();
        Ok(files)
    }

    /// Delete every file matching the job's naming convention
    ///
    /// Safe to call repeatedly and on an already-removed directory. Files
    /// outside the convention are never touched; the directory itself is
    /// removed only once it is empty.
    pub fn clear(&self) -> Result<()> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_page_file_name(&name) && !self.is_archive_name(&name) {
                continue;
            }
            if let Err(e) = std::fs::remove_file(entry.path()) {
                warn!(file = %entry.path().display(), error = %e, "failed to remove artifact");
            }
        }

        // Leftover foreign files keep the directory alive; that is fine.
        let _ = std::fs::remove_dir(&self.dir);
        debug!(job_id = %self.job_id, "workspace cleared");
        Ok(())
    }

    fn is_archive_name(&self, name: &str) -> bool {
        name.starts_with(&format!("{}_", self.archive_prefix))
            && name.ends_with(&format!(".{}", self.archive_extension))
    }
}

fn is_page_file_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 5
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && name.ends_with(".jpg")
}
