//! Artifact export ("download").
//!
//! Writes an artifact's bytes to `{app}-{kind}-{epoch_millis}.{ext}` in the
//! target directory and drops a metadata sidecar next to it. Best-effort:
//! failures are reported to the caller but never change session state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::artifact::{ArtifactMetadata, MediaArtifact};
use crate::models::error::CaptureError;
use crate::storage::metadata;

/// Export an artifact to `directory`, returning the written path.
pub fn export_artifact(
    artifact: &MediaArtifact,
    directory: &Path,
    app_name: &str,
) -> Result<PathBuf, CaptureError> {
    fs::create_dir_all(directory)
        .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;

    let millis = chrono::Utc::now().timestamp_millis();
    let file_name = format!(
        "{}-{}-{}.{}",
        app_name,
        artifact.kind.as_str(),
        millis,
        artifact.kind.file_extension()
    );
    let path = directory.join(file_name);

    fs::write(&path, &artifact.data)
        .map_err(|e| CaptureError::StorageError(format!("failed to write artifact: {}", e)))?;

    let sidecar = ArtifactMetadata::for_export(artifact, &path.to_string_lossy());
    if let Err(e) = metadata::write_metadata(&sidecar, &path) {
        // The artifact itself made it to disk; a missing sidecar is not
        // worth failing the download over.
        log::warn!("failed to write metadata sidecar for {}: {}", path.display(), e);
    }

    log::debug!(
        "exported {} artifact ({} bytes) to {}",
        artifact.kind.as_str(),
        artifact.data.len(),
        path.display()
    );

    Ok(path)
}
