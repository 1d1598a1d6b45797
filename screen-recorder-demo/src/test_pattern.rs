use screen_recorder_core::{FrameSource, PixelFormat, RecorderError, Snapshot};

/// Synthetic display: a diagonal gradient with a bar sweeping across it.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: 0,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn capture(&mut self) -> Result<Snapshot, RecorderError> {
        let (width, height) = (self.width as usize, self.height as usize);
        let bar_width = (width / 16).max(1);
        let bar_x = (self.frame as usize * 8) % width;

        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                if x >= bar_x && x < bar_x + bar_width {
                    pixels.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    let r = (x * 255 / width) as u8;
                    let g = (y * 255 / height) as u8;
                    pixels.extend_from_slice(&[r, g, 128, 255]);
                }
            }
        }

        self.frame = self.frame.wrapping_add(1);
        Ok(Snapshot {
            pixels,
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8888,
        })
    }
}
