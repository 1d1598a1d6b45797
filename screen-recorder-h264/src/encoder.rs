//! OpenH264 + MP4 implementation of [`VideoEncoder`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVSlices;
use openh264::OpenH264API;
use yuv::{
    rgba_to_yuv420, YuvChromaSubsampling, YuvConversionMode, YuvPlanarImageMut, YuvRange,
    YuvStandardMatrix,
};

use screen_recorder_core::{EncoderParams, RecorderError, VideoEncoder};

use crate::annexb::{self, NAL_IDR_SLICE, NAL_PPS, NAL_SPS};
use crate::mp4_segment::{Mp4Segment, VIDEO_TIMESCALE};

struct OpenFile {
    path: PathBuf,
    params: EncoderParams,
    encoder: Encoder,
    segment: Mp4Segment,
    yuv: YuvPlanarImageMut<'static, u8>,
}

/// Software H.264 encoder writing one MP4 file per `open`/`close` pair.
///
/// Frames must arrive at the dimensions given to `open`. Every file starts
/// with a fresh OpenH264 instance so each segment begins with a keyframe and
/// carries its own parameter sets.
#[derive(Default)]
pub struct H264Mp4Encoder {
    current: Option<OpenFile>,
}

impl H264Mp4Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

impl VideoEncoder for H264Mp4Encoder {
    fn open(&mut self, path: &Path, params: &EncoderParams) -> Result<(), RecorderError> {
        if self.current.is_some() {
            self.close()?;
        }
        if params.width == 0 || params.height == 0 || params.width % 2 != 0 || params.height % 2 != 0
        {
            return Err(RecorderError::EncoderUnavailable(format!(
                "unsupported frame size {}x{}",
                params.width, params.height
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RecorderError::StorageError(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let config = EncoderConfig::new()
            .bitrate(BitRate::from_bps(params.bitrate))
            .max_frame_rate(FrameRate::from_hz(params.fps as f32));
        let encoder = Encoder::with_api_config(OpenH264API::from_source(), config).map_err(|e| {
            RecorderError::EncoderUnavailable(format!("failed to create OpenH264 encoder: {:?}", e))
        })?;

        let segment = Mp4Segment::create(path, params.width, params.height, params.fps)?;

        log::debug!(
            "H.264 encoder ready: {}x{} @ {} fps, {} bps -> {}",
            params.width,
            params.height,
            params.fps,
            params.bitrate,
            path.display()
        );

        self.current = Some(OpenFile {
            path: path.to_path_buf(),
            params: *params,
            encoder,
            segment,
            yuv: YuvPlanarImageMut::alloc(params.width, params.height, YuvChromaSubsampling::Yuv420),
        });
        Ok(())
    }

    fn encode_frame(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: Duration,
    ) -> Result<(), RecorderError> {
        let file = self.current.as_mut().ok_or(RecorderError::EncoderNotOpen)?;

        if width != file.params.width || height != file.params.height {
            return Err(RecorderError::EncodingFailed(format!(
                "frame is {}x{}, encoder expects {}x{}",
                width, height, file.params.width, file.params.height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RecorderError::EncodingFailed(format!(
                "frame has {} bytes, expected {}",
                rgba.len(),
                expected
            )));
        }

        rgba_to_yuv420(
            &mut file.yuv,
            rgba,
            width * 4,
            YuvRange::Limited,
            YuvStandardMatrix::Bt601,
            YuvConversionMode::Balanced,
        )
        .map_err(|e| RecorderError::EncodingFailed(format!("RGBA to YUV conversion failed: {:?}", e)))?;

        let slices = YUVSlices::new(
            (
                file.yuv.y_plane.borrow(),
                file.yuv.u_plane.borrow(),
                file.yuv.v_plane.borrow(),
            ),
            (width as usize, height as usize),
            (
                file.yuv.y_stride as usize,
                file.yuv.u_stride as usize,
                file.yuv.v_stride as usize,
            ),
        );

        let bitstream = file
            .encoder
            .encode(&slices)
            .map_err(|e| RecorderError::EncodingFailed(format!("OpenH264 encoding failed: {:?}", e)))?
            .to_vec();

        write_access_unit(&mut file.segment, &bitstream, timestamp)
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        let Some(file) = self.current.take() else {
            return Ok(());
        };
        let samples = file.segment.finish()?;
        log::debug!("Closed {} with {} samples", file.path.display(), samples);
        Ok(())
    }

    fn name(&self) -> &str {
        "openh264-mp4"
    }
}

impl Drop for H264Mp4Encoder {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close H.264 output: {}", e);
        }
    }
}

/// Mux one encoded access unit (Annex-B) into the segment.
///
/// Parameter sets configure the track on first sight and are kept out of the
/// samples. Frames the encoder skipped produce no output and no sample.
fn write_access_unit(
    segment: &mut Mp4Segment,
    bitstream: &[u8],
    timestamp: Duration,
) -> Result<(), RecorderError> {
    let units = annexb::split_nal_units(bitstream);
    if units.is_empty() {
        return Ok(());
    }

    if !segment.has_track() {
        let sps = units.iter().find(|u| annexb::nal_type(u) == Some(NAL_SPS));
        let pps = units.iter().find(|u| annexb::nal_type(u) == Some(NAL_PPS));
        match (sps, pps) {
            (Some(sps), Some(pps)) => segment.add_track(sps, pps)?,
            _ => {
                log::warn!("Dropping access unit received before parameter sets");
                return Ok(());
            }
        }
    }

    let is_sync = units
        .iter()
        .any(|u| annexb::nal_type(u) == Some(NAL_IDR_SLICE));
    let payload = annexb::to_length_prefixed(
        units
            .into_iter()
            .filter(|u| !matches!(annexb::nal_type(u), Some(NAL_SPS) | Some(NAL_PPS))),
    );
    if payload.is_empty() {
        return Ok(());
    }

    segment.push_sample(ticks(timestamp), is_sync, payload)
}

fn ticks(timestamp: Duration) -> u64 {
    (timestamp.as_micros() * u128::from(VIDEO_TIMESCALE) / 1_000_000) as u64
}
