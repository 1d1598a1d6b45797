use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::segment::SegmentSummary;

/// Sidecar path for a segment: `{segment_stem}.metadata.json`.
pub fn metadata_path(segment_path: &Path) -> PathBuf {
    segment_path.with_extension("metadata.json")
}

/// Write a segment summary as a JSON sidecar file next to the segment.
pub fn write_metadata(summary: &SegmentSummary, segment_path: &Path) -> Result<(), RecorderError> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| RecorderError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(segment_path), json)
        .map_err(|e| RecorderError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read a segment summary back from its JSON sidecar file.
pub fn read_metadata(segment_path: &Path) -> Result<SegmentSummary, RecorderError> {
    let json = fs::read_to_string(metadata_path(segment_path))
        .map_err(|e| RecorderError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| RecorderError::StorageError(format!("failed to parse metadata: {}", e)))
}
