use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use mp4::{AvcConfig, FourCC, MediaConfig, Mp4Config, Mp4Sample, Mp4Writer, TrackConfig, TrackType};

use screen_recorder_core::RecorderError;

/// Timescale of the video track (90 kHz).
pub(crate) const VIDEO_TIMESCALE: u32 = 90_000;

const VIDEO_TRACK_ID: u32 = 1;

struct PendingSample {
    start_time: u64,
    is_sync: bool,
    bytes: Vec<u8>,
}

/// One MP4 file holding a single H.264 track.
///
/// Samples are written one behind: a sample's duration is only known once
/// the next sample's timestamp arrives. The last sample gets one nominal
/// frame duration.
pub(crate) struct Mp4Segment {
    writer: Mp4Writer<BufWriter<File>>,
    width: u16,
    height: u16,
    frame_duration: u32,
    track_added: bool,
    pending: Option<PendingSample>,
    samples_written: u64,
}

impl Mp4Segment {
    pub fn create(path: &Path, width: u32, height: u32, fps: u32) -> Result<Self, RecorderError> {
        let file = File::create(path).map_err(|e| {
            RecorderError::StorageError(format!("failed to create {}: {}", path.display(), e))
        })?;

        let config = Mp4Config {
            major_brand: brand("isom")?,
            minor_version: 512,
            compatible_brands: vec![brand("isom")?, brand("iso2")?, brand("avc1")?, brand("mp41")?],
            timescale: VIDEO_TIMESCALE,
        };
        let writer = Mp4Writer::write_start(BufWriter::new(file), &config)
            .map_err(|e| RecorderError::StorageError(format!("failed to start mp4: {}", e)))?;

        Ok(Self {
            writer,
            width: dimension(width)?,
            height: dimension(height)?,
            frame_duration: VIDEO_TIMESCALE / fps.max(1),
            track_added: false,
            pending: None,
            samples_written: 0,
        })
    }

    pub fn has_track(&self) -> bool {
        self.track_added
    }

    /// Add the video track from the stream's first parameter sets.
    pub fn add_track(&mut self, sps: &[u8], pps: &[u8]) -> Result<(), RecorderError> {
        let track = TrackConfig {
            track_type: TrackType::Video,
            timescale: VIDEO_TIMESCALE,
            language: "und".to_string(),
            media_conf: MediaConfig::AvcConfig(AvcConfig {
                width: self.width,
                height: self.height,
                seq_param_set: sps.to_vec(),
                pic_param_set: pps.to_vec(),
            }),
        };
        self.writer
            .add_track(&track)
            .map_err(|e| RecorderError::StorageError(format!("failed to add video track: {}", e)))?;
        self.track_added = true;
        Ok(())
    }

    /// Queue a length-prefixed access unit at `start_time` (90 kHz ticks).
    pub fn push_sample(
        &mut self,
        start_time: u64,
        is_sync: bool,
        bytes: Vec<u8>,
    ) -> Result<(), RecorderError> {
        let mut start_time = start_time;
        if let Some(previous) = self.pending.take() {
            // Keep decode order strictly increasing even if capture times collide.
            start_time = start_time.max(previous.start_time + 1);
            let duration = (start_time - previous.start_time) as u32;
            self.write(previous, duration)?;
        }
        self.pending = Some(PendingSample {
            start_time,
            is_sync,
            bytes,
        });
        Ok(())
    }

    /// Flush the last sample, write the index and close the file.
    ///
    /// Returns the number of samples written.
    pub fn finish(mut self) -> Result<u64, RecorderError> {
        if let Some(last) = self.pending.take() {
            self.write(last, self.frame_duration)?;
        }
        self.writer
            .write_end()
            .map_err(|e| RecorderError::StorageError(format!("failed to finalize mp4: {}", e)))?;
        self.writer
            .into_writer()
            .flush()
            .map_err(|e| RecorderError::StorageError(format!("failed to flush mp4: {}", e)))?;
        Ok(self.samples_written)
    }

    fn write(&mut self, sample: PendingSample, duration: u32) -> Result<(), RecorderError> {
        let sample = Mp4Sample {
            start_time: sample.start_time,
            duration,
            rendering_offset: 0,
            is_sync: sample.is_sync,
            bytes: sample.bytes.into(),
        };
        self.writer
            .write_sample(VIDEO_TRACK_ID, &sample)
            .map_err(|e| RecorderError::StorageError(format!("failed to write sample: {}", e)))?;
        self.samples_written += 1;
        Ok(())
    }
}

fn brand(code: &str) -> Result<FourCC, RecorderError> {
    FourCC::from_str(code)
        .map_err(|e| RecorderError::StorageError(format!("invalid brand {}: {}", code, e)))
}

fn dimension(value: u32) -> Result<u16, RecorderError> {
    u16::try_from(value)
        .map_err(|_| RecorderError::EncoderUnavailable(format!("frame dimension {} too large", value)))
}
