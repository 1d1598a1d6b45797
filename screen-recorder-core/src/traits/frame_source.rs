use crate::models::error::RecorderError;
use crate::models::frame::Snapshot;

/// Produces full-resolution snapshots of the rendered display.
///
/// Called synchronously from the thread that drives `update_screen`, once
/// per capture tick while recording.
pub trait FrameSource: Send {
    /// Grab the currently composited display.
    fn capture(&mut self) -> Result<Snapshot, RecorderError>;
}
