use std::path::Path;
use std::time::Duration;

use crate::models::error::RecorderError;

/// Fixed parameters of an encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderParams {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Bits per second.
    pub bitrate: u32,
}

/// Interface for platform video encoders.
///
/// Implemented by:
/// - `H264Mp4Encoder` (`screen-recorder-h264`)
///
/// An encoder is driven from one thread at a time and never concurrently.
/// Callers guarantee `encode_frame` only happens between a successful `open`
/// and the matching `close`.
pub trait VideoEncoder: Send {
    /// Allocate the encoder and start a new output container at `path`.
    fn open(&mut self, path: &Path, params: &EncoderParams) -> Result<(), RecorderError>;

    /// Feed one RGBA frame. `timestamp` is relative to the segment start.
    fn encode_frame(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: Duration,
    ) -> Result<(), RecorderError>;

    /// Flush and finalize the container, releasing the encoder.
    fn close(&mut self) -> Result<(), RecorderError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
