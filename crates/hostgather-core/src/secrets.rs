//! Ephemeral secret-material handling
//!
//! Credentials arrive as inline base64 strings but the transport layer wants
//! filesystem paths, so decoded material is bridged through uniquely named
//! temporary files that live for exactly one gather cycle.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Errors while materializing secret material to disk.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded credential written to a uniquely named temporary file.
///
/// Owned by a single run. `remove()` is the teardown path and never fails
/// outward; dropping an un-removed handle also deletes the file, so
/// credentials cannot outlive the run even when setup aborts partway.
#[derive(Debug)]
pub struct SecretFile {
    file: Option<NamedTempFile>,
}

impl SecretFile {
    /// Decode base64 credential material and write it to a fresh temporary
    /// file with the given name prefix, mode 0600.
    ///
    /// # Errors
    /// Returns `SecretError` on invalid base64 or I/O failure.
    pub fn write(prefix: &str, encoded: &str) -> Result<Self, SecretError> {
        let data = base64_decode(encoded)?;

        let mut file = tempfile::Builder::new().prefix(prefix).tempfile()?;
        file.write_all(&data)?;
        file.flush()?;

        debug!(path = %file.path().display(), "wrote temporary credential file");

        Ok(Self { file: Some(file) })
    }

    /// Path of the on-disk artifact, `None` once removed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    /// Remove the artifact. Idempotent; an already-missing file is not an
    /// error and other removal failures are logged and swallowed so teardown
    /// never masks the failure that triggered it.
    pub fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => debug!(path = %path.display(), "removed temporary credential file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove temporary credential file");
                }
            }
        }
    }
}

impl Drop for SecretFile {
    fn drop(&mut self) {
        self.remove();
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(input.trim())
}
