use std::fs;
use std::path::Path;

use crate::models::artifact::ArtifactMetadata;
use crate::models::error::CaptureError;

/// Write artifact metadata as a JSON sidecar file.
///
/// Creates `{export_path}.metadata.json` alongside the exported artifact.
pub fn write_metadata(metadata: &ArtifactMetadata, export_path: &Path) -> Result<(), CaptureError> {
    let metadata_path = export_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read artifact metadata from a JSON sidecar file.
pub fn read_metadata(export_path: &Path) -> Result<ArtifactMetadata, CaptureError> {
    let metadata_path = export_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: ArtifactMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}
