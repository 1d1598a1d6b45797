use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};

use crate::models::error::RecorderError;
use crate::models::frame::{CapturedFrame, PixelFormat};

/// Encoder frame size for a given source resolution and target height.
///
/// The width keeps the source aspect ratio and is rounded up to the next even
/// number, since hardware encoders reject odd dimensions.
pub fn target_dimensions(source_width: u32, source_height: u32, target_height: u32) -> (u32, u32) {
    if source_height == 0 {
        return (0, target_height);
    }
    let mut width = (u64::from(source_width) * u64::from(target_height) / u64::from(source_height)) as u32;
    if width % 2 != 0 {
        width += 1;
    }
    (width, target_height)
}

/// Converts captured frames to the encoder's RGBA format and resolution.
///
/// Both scratch buffers are sized once from the configured resolutions and
/// reused for every frame:
///
/// ```text
/// [CapturedFrame (RGBA/BGRA, source size)]
///     → source_buffer (RGBA, source size)
///     → bilinear scale
///     → scaled_buffer (RGBA, target size)
/// ```
///
/// Owned by the encoding worker while a session is running.
pub struct FrameConverter {
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
    source_buffer: Vec<u8>,
    scaled_buffer: Vec<u8>,
    resizer: Resizer,
    options: ResizeOptions,
}

impl FrameConverter {
    pub fn new(source_width: u32, source_height: u32, target_height: u32) -> Result<Self, RecorderError> {
        if source_width == 0 || source_height == 0 || target_height == 0 {
            return Err(RecorderError::ConfigurationFailed(format!(
                "invalid conversion {}x{} -> height {}",
                source_width, source_height, target_height
            )));
        }

        let (target_width, target_height) =
            target_dimensions(source_width, source_height, target_height);

        Ok(Self {
            source_width,
            source_height,
            target_width,
            target_height,
            source_buffer: vec![0u8; rgba_len(source_width, source_height)],
            scaled_buffer: vec![0u8; rgba_len(target_width, target_height)],
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        })
    }

    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Convert and scale `frame`, returning the RGBA pixels at target size.
    ///
    /// The returned slice borrows the converter's scratch buffer and is
    /// overwritten by the next call.
    pub fn convert(&mut self, frame: &CapturedFrame) -> Result<&[u8], RecorderError> {
        if (frame.width(), frame.height()) != (self.source_width, self.source_height) {
            return Err(RecorderError::ConversionFailed(format!(
                "frame is {}x{}, converter expects {}x{}",
                frame.width(),
                frame.height(),
                self.source_width,
                self.source_height
            )));
        }

        match frame.format() {
            PixelFormat::Rgba8888 => self.source_buffer.copy_from_slice(frame.pixels()),
            PixelFormat::Bgra8888 => {
                for (dst, src) in self
                    .source_buffer
                    .chunks_exact_mut(4)
                    .zip(frame.pixels().chunks_exact(4))
                {
                    dst[0] = src[2];
                    dst[1] = src[1];
                    dst[2] = src[0];
                    dst[3] = src[3];
                }
            }
        }

        {
            let src_image = Image::from_slice_u8(
                self.source_width,
                self.source_height,
                &mut self.source_buffer,
                PixelType::U8x4,
            )
            .map_err(|e| RecorderError::ConversionFailed(format!("source image: {}", e)))?;

            let mut dst_image = Image::from_slice_u8(
                self.target_width,
                self.target_height,
                &mut self.scaled_buffer,
                PixelType::U8x4,
            )
            .map_err(|e| RecorderError::ConversionFailed(format!("destination image: {}", e)))?;

            self.resizer
                .resize(&src_image, &mut dst_image, &self.options)
                .map_err(|e| RecorderError::ConversionFailed(format!("resize failed: {}", e)))?;
        }

        Ok(&self.scaled_buffer)
    }
}

fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * PixelFormat::BYTES_PER_PIXEL
}
