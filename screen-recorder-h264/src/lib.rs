//! # screen-recorder-h264
//!
//! Software H.264 backend for screen-recorder-core.
//!
//! Provides:
//! - `H264Mp4Encoder`: `VideoEncoder` that converts RGBA frames to I420,
//!   encodes them with OpenH264 and muxes the stream into an MP4 file
//! - `annexb`: helpers to split an Annex-B byte stream into NAL units and
//!   repackage them with length prefixes for MP4 samples
//!
//! ## Usage
//! ```ignore
//! use screen_recorder_core::{RecorderConfiguration, RecordingController};
//! use screen_recorder_h264::H264Mp4Encoder;
//!
//! let config = RecorderConfiguration::default();
//! let mut recorder = RecordingController::new(config, my_source, H264Mp4Encoder::new())?;
//! recorder.start(true)?;
//! ```

pub mod annexb;
pub mod encoder;
mod mp4_segment;

pub use encoder::H264Mp4Encoder;
