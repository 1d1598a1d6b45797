use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One open output file.
///
/// Exactly one of these exists while the controller is recording; rotation
/// replaces it with a fresh one.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub id: String,
    pub file_name: String,
    pub path: PathBuf,
    /// Monotonic start time; rotation is measured against this.
    pub started_at: Instant,
    /// Wall-clock start time the file name was derived from.
    pub created_at: DateTime<Local>,
    pub frames_captured: u64,
    /// Whether the encoder accepted the file. When false the session runs
    /// without writing anything.
    pub encoder_available: bool,
}

impl RecordingSession {
    pub fn new(
        file_name: String,
        path: PathBuf,
        started_at: Instant,
        created_at: DateTime<Local>,
        encoder_available: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name,
            path,
            started_at,
            created_at,
            frames_captured: 0,
            encoder_available,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

/// Summary produced when a segment is closed.
///
/// Serializable so it can be stored as a JSON sidecar next to the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub id: String,
    pub file_name: String,
    pub file_path: String,
    pub created_at: String,
    pub duration_secs: f64,
    pub frames_captured: u64,
    pub frames_encoded: u64,
    pub encoder_available: bool,
}

impl SegmentSummary {
    pub fn from_session(session: &RecordingSession, ended_at: Instant, frames_encoded: u64) -> Self {
        Self {
            id: session.id.clone(),
            file_name: session.file_name.clone(),
            file_path: session.path.to_string_lossy().into_owned(),
            created_at: session.created_at.to_rfc3339(),
            duration_secs: session.elapsed(ended_at).as_secs_f64(),
            frames_captured: session.frames_captured,
            frames_encoded,
            encoder_available: session.encoder_available,
        }
    }
}

/// Counters for debugging the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderDiagnostics {
    pub ticks: u64,
    pub frames_captured: u64,
    /// Frames rejected because the queue was full.
    pub frames_dropped: u64,
    pub frames_encoded: u64,
    /// Frames that failed conversion or encoding.
    pub frames_skipped: u64,
    /// Frames drained while no encoder was open.
    pub frames_discarded: u64,
    pub capture_failures: u64,
    pub segments_started: u64,
    pub segments_completed: u64,
    pub encoder_open_failures: u64,
}
