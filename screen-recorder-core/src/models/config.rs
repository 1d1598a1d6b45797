use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::video_encoder::EncoderParams;

const MIB: u32 = 1024 * 1024;

/// Device family the recorder runs on.
///
/// Resolved once at startup; determines where recordings go, the resolution
/// of the rendered display and the encoder bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Tici,
    Eon,
}

impl DeviceProfile {
    /// Detect the running device family from its marker file.
    pub fn detect() -> Self {
        Self::detect_in(Path::new("/"))
    }

    /// Same as [`detect`](Self::detect) but looks for markers under `root`.
    pub fn detect_in(root: &Path) -> Self {
        if root.join("EON").exists() {
            Self::Eon
        } else {
            Self::Tici
        }
    }

    pub fn recordings_dir(self) -> PathBuf {
        match self {
            Self::Tici => PathBuf::from("/data/media/0/videos"),
            Self::Eon => PathBuf::from("/storage/emulated/0/videos"),
        }
    }

    /// Resolution of the composited display, `(width, height)`.
    pub fn source_resolution(self) -> (u32, u32) {
        match self {
            Self::Tici => (2160, 1080),
            Self::Eon => (1920, 1080),
        }
    }

    /// Encoder bitrate in bits per second.
    pub fn bitrate(self) -> u32 {
        match self {
            Self::Tici => 4 * MIB,
            Self::Eon => 3 * MIB,
        }
    }
}

/// Configuration for a recording controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfiguration {
    pub profile: DeviceProfile,

    /// Directory where segment files are written.
    pub output_directory: PathBuf,

    /// Width of captured frames.
    pub source_width: u32,

    /// Height of captured frames.
    pub source_height: u32,

    /// Height of encoded frames (default: 720). Width follows the source aspect.
    pub target_height: u32,

    /// Nominal encoder frame rate (default: 20).
    pub fps: u32,

    /// Encoder bitrate in bits per second.
    pub bitrate: u32,

    /// Maximum number of frames waiting for the encoder (default: 30).
    pub queue_capacity: usize,

    /// A segment is rotated once it has been open this long (default: 3 minutes).
    pub max_segment_duration: Duration,

    /// How long the encoding worker waits for a frame before re-checking
    /// whether it should exit (default: 10 ms).
    pub worker_poll_timeout: Duration,

    /// Rate at which the UI calls `update_screen` (default: 20 Hz).
    pub ui_frequency_hz: u32,

    /// Output container extension, without the dot (default: "mp4").
    pub container_extension: String,

    /// Write a `.metadata.json` sidecar for every finished segment.
    pub write_metadata: bool,
}

impl RecorderConfiguration {
    pub fn for_profile(profile: DeviceProfile) -> Self {
        let (source_width, source_height) = profile.source_resolution();
        Self {
            profile,
            output_directory: profile.recordings_dir(),
            source_width,
            source_height,
            target_height: 720,
            fps: 20,
            bitrate: profile.bitrate(),
            queue_capacity: 30,
            max_segment_duration: Duration::from_secs(3 * 60),
            worker_poll_timeout: Duration::from_millis(10),
            ui_frequency_hz: 20,
            container_extension: "mp4".into(),
            write_metadata: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.source_width == 0 || self.source_height == 0 {
            return Err(format!(
                "invalid source resolution: {}x{}",
                self.source_width, self.source_height
            ));
        }
        if self.target_height == 0 || self.target_height % 2 != 0 {
            return Err(format!(
                "target height must be positive and even: {}",
                self.target_height
            ));
        }
        if self.fps == 0 {
            return Err("frame rate must be positive".into());
        }
        if self.bitrate == 0 {
            return Err("bitrate must be positive".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue capacity must be positive".into());
        }
        if self.max_segment_duration.is_zero() {
            return Err("max segment duration must be positive".into());
        }
        if self.worker_poll_timeout.is_zero() {
            return Err("worker poll timeout must be positive".into());
        }
        if self.ui_frequency_hz == 0 {
            return Err("ui frequency must be positive".into());
        }
        if self.container_extension.is_empty() || self.container_extension.contains('.') {
            return Err(format!(
                "invalid container extension: {:?}",
                self.container_extension
            ));
        }
        Ok(())
    }

    /// Dimensions of encoded frames, `(width, height)`.
    pub fn target_dimensions(&self) -> (u32, u32) {
        crate::processing::frame_converter::target_dimensions(
            self.source_width,
            self.source_height,
            self.target_height,
        )
    }

    pub fn encoder_params(&self) -> EncoderParams {
        let (width, height) = self.target_dimensions();
        EncoderParams {
            width,
            height,
            fps: self.fps,
            bitrate: self.bitrate,
        }
    }

    /// Interval between capture ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.ui_frequency_hz.max(1)))
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self::for_profile(DeviceProfile::Tici)
    }
}
