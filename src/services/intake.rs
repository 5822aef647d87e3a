//! Transient file intake — stream an uploaded file into a scoped temp dir.
//!
//! DESIGN
//! ======
//! Intake runs before any component lock is taken: the sync handler streams
//! the file to disk first and only then applies the finished artifact to the
//! component in a short, separately locked step.
//!
//! The client-declared filename is untrusted. It is kept verbatim on the
//! artifact for traceability, but the on-disk name uses only its sanitized
//! final segment behind a random prefix, so traversal sequences can never
//! escape the temp root.
//!
//! LIFECYCLE
//! =========
//! Files are created with create-new semantics. On any error the partial
//! file is removed and only the error is returned. The same holds when the
//! intake future is dropped mid-copy (client gone): a guard owns the path
//! until the copy finishes. A successful artifact is
//! never deleted here: whoever consumes it owns the file from then on
//! (`UploadArtifact::discard` is available for that).

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use rand::Rng;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::notification::ErrorCode;
use crate::payload::FilePart;

const MAX_NAME_CHARS: usize = 100;
const MAX_NAME_ATTEMPTS: usize = 4;
const FALLBACK_NAME: &str = "upload";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to create temp dir: {0}")]
    CreateDir(#[source] io::Error),
    #[error("failed to create temp file: {0}")]
    Create(#[source] io::Error),
    #[error("failed to read upload stream: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write temp file: {0}")]
    Write(#[source] io::Error),
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("could not allocate a unique temp file name")]
    NameExhausted,
}

impl ErrorCode for IntakeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CreateDir(_) => "E_INTAKE_CREATE_DIR",
            Self::Create(_) => "E_INTAKE_CREATE",
            Self::Read(_) => "E_INTAKE_READ",
            Self::Write(_) => "E_INTAKE_WRITE",
            Self::TooLarge { .. } => "E_INTAKE_TOO_LARGE",
            Self::NameExhausted => "E_INTAKE_NAME",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::NameExhausted)
    }
}

/// A successfully persisted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArtifact {
    stored_path: PathBuf,
    original_name: String,
    size: u64,
}

impl UploadArtifact {
    #[must_use]
    pub fn stored_path(&self) -> &Path {
        &self.stored_path
    }

    /// Client-supplied name. Untrusted; never use it to build paths.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete the stored file.
    ///
    /// # Errors
    ///
    /// Returns the filesystem error from removing the file.
    pub async fn discard(self) -> io::Result<()> {
        fs::remove_file(&self.stored_path).await
    }
}

// =============================================================================
// TEMP STORE
// =============================================================================

/// Scoped temporary directory receiving uploads.
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
    max_bytes: Option<u64>,
}

impl TempStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), max_bytes: None }
    }

    /// Cap accepted upload size. `None` disables the cap.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one file part under the temp root.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` on any I/O failure or when the size cap is
    /// exceeded. No file is left behind in that case.
    pub async fn intake(&self, part: FilePart<'_>) -> Result<UploadArtifact, IntakeError> {
        let FilePart { original_name, mut chunks } = part;

        // create_dir_all tolerates concurrent creators.
        fs::create_dir_all(&self.root)
            .await
            .map_err(IntakeError::CreateDir)?;

        let safe_name = sanitize_file_name(&original_name);
        let (stored_path, mut file) = self.create_unique(&safe_name).await?;
        let partial = PartialFile::new(stored_path);

        let mut size: u64 = 0;
        let copied: Result<(), IntakeError> = async {
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(IntakeError::Read)?;
                size += chunk.len() as u64;
                if let Some(limit) = self.max_bytes {
                    if size > limit {
                        return Err(IntakeError::TooLarge { limit });
                    }
                }
                file.write_all(&chunk).await.map_err(IntakeError::Write)?;
            }
            file.flush().await.map_err(IntakeError::Write)
        }
        .await;

        drop(file);
        copied?;

        let stored_path = partial.keep();
        debug!(path = %stored_path.display(), size, "intake: stored upload");
        Ok(UploadArtifact { stored_path, original_name, size })
    }

    async fn create_unique(&self, safe_name: &str) -> Result<(PathBuf, File), IntakeError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self
                .root
                .join(format!("{}_{safe_name}", random_prefix()));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(IntakeError::Create(e)),
            }
        }
        Err(IntakeError::NameExhausted)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Removes a file being written unless `keep` is called.
struct PartialFile {
    path: Option<PathBuf>,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn keep(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        // Drop may run outside a runtime, so the removal is synchronous.
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "intake: failed to remove partial file");
        }
    }
}

/// Reduce a client filename to a safe single path segment.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mapped: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    let name: String = mapped
        .trim_start_matches('.')
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();

    if name.is_empty() { FALLBACK_NAME.to_string() } else { name }
}

fn random_prefix() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

#[cfg(test)]
#[path = "intake_test.rs"]
mod tests;
