use std::time::Instant;

use crate::models::error::RecorderError;

/// Memory layout of a 32-bit captured pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Bytes in R, G, B, A order.
    Rgba8888,
    /// Bytes in B, G, R, A order (little-endian ARGB32).
    Bgra8888,
}

impl PixelFormat {
    pub const BYTES_PER_PIXEL: usize = 4;
}

/// Raw display snapshot as returned by a [`FrameSource`](crate::FrameSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// An immutable, owned snapshot of the rendered display.
///
/// Created on the capture side, moved through the frame queue and dropped by
/// the encoding worker once it has been converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    captured_at: Instant,
}

impl CapturedFrame {
    /// Wrap a snapshot, checking that the buffer matches its dimensions.
    pub fn new(snapshot: Snapshot, captured_at: Instant) -> Result<Self, RecorderError> {
        let Snapshot {
            pixels,
            width,
            height,
            format,
        } = snapshot;

        if width == 0 || height == 0 {
            return Err(RecorderError::CaptureFailed(format!(
                "empty snapshot: {}x{}",
                width, height
            )));
        }

        let expected = width as usize * height as usize * PixelFormat::BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(RecorderError::CaptureFailed(format!(
                "snapshot buffer is {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
            format,
            captured_at,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Monotonic capture time.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}
