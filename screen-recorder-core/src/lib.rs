//! # screen-recorder-core
//!
//! Platform-agnostic screen recording pipeline.
//!
//! Captures the composited display at the UI's frame cadence, scales each
//! frame to the encoder resolution on a dedicated thread, and manages the
//! encoder's output files, including timed segment rotation.
//! Platform encoders implement the `VideoEncoder` trait and plug into the
//! generic `RecordingController`.
//!
//! ## Architecture
//!
//! ```text
//! screen-recorder-core (this crate)
//! ├── traits/       ← FrameSource, UiNotifier, VideoEncoder, Clock
//! ├── models/       ← RecorderError, RecordingState, RecorderConfiguration, CapturedFrame, etc.
//! ├── processing/   ← FrameQueue, FrameConverter, BlinkIndicator
//! ├── session/      ← RecordingController, encoding worker, CaptureTicker
//! └── storage/      ← EncoderSession, segment file naming, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{DeviceProfile, RecorderConfiguration};
pub use models::error::RecorderError;
pub use models::frame::{CapturedFrame, PixelFormat, Snapshot};
pub use models::segment::{RecorderDiagnostics, RecordingSession, SegmentSummary};
pub use models::state::RecordingState;
pub use processing::frame_converter::FrameConverter;
pub use processing::frame_queue::{FrameQueue, PushOutcome};
pub use processing::indicator::{BlinkIndicator, IndicatorColor};
pub use session::controller::RecordingController;
pub use session::ticker::CaptureTicker;
pub use storage::encoder_session::{ClosedSegment, EncoderSession};
pub use traits::clock::{Clock, SystemClock};
pub use traits::frame_source::FrameSource;
pub use traits::ui_notifier::UiNotifier;
pub use traits::video_encoder::{EncoderParams, VideoEncoder};
