use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::error::RecorderError;
use crate::traits::video_encoder::{EncoderParams, VideoEncoder};

/// A segment that has just been closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSegment {
    pub path: PathBuf,
    pub frames_encoded: u64,
}

/// Owns a [`VideoEncoder`] and tracks the one output file it may have open.
///
/// Opening a new file closes the current one first, so at most one file is
/// open per session object. Dropping the session closes any open file.
pub struct EncoderSession<E: VideoEncoder> {
    encoder: E,
    params: EncoderParams,
    output_directory: PathBuf,
    current: Option<PathBuf>,
    frames_encoded: u64,
}

impl<E: VideoEncoder> EncoderSession<E> {
    pub fn new(encoder: E, params: EncoderParams, output_directory: PathBuf) -> Self {
        Self {
            encoder,
            params,
            output_directory,
            current: None,
            frames_encoded: 0,
        }
    }

    /// Start a new output file named `file_name` in the output directory.
    pub fn open(&mut self, file_name: &str) -> Result<&Path, RecorderError> {
        if let Some(previous) = &self.current {
            log::warn!(
                "Encoder session still open on {}, closing before reopening",
                previous.display()
            );
            if let Err(e) = self.close() {
                log::warn!("Failed to close previous segment: {}", e);
            }
        }

        fs::create_dir_all(&self.output_directory).map_err(|e| {
            RecorderError::EncoderUnavailable(format!(
                "failed to create {}: {}",
                self.output_directory.display(),
                e
            ))
        })?;

        let path = self.output_directory.join(file_name);
        self.encoder.open(&path, &self.params)?;

        log::info!(
            "Opened {} encoder on {} ({}x{} @ {} fps, {} bps)",
            self.encoder.name(),
            path.display(),
            self.params.width,
            self.params.height,
            self.params.fps,
            self.params.bitrate
        );

        self.frames_encoded = 0;
        Ok(self.current.insert(path).as_path())
    }

    /// Feed one frame to the open file.
    pub fn encode(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: Duration,
    ) -> Result<(), RecorderError> {
        if self.current.is_none() {
            return Err(RecorderError::EncoderNotOpen);
        }
        self.encoder.encode_frame(rgba, width, height, timestamp)?;
        self.frames_encoded += 1;
        Ok(())
    }

    /// Finalize the open file. Returns `Ok(None)` when nothing was open.
    ///
    /// The session counts as closed afterwards even if the encoder reported
    /// an error while finalizing.
    pub fn close(&mut self) -> Result<Option<ClosedSegment>, RecorderError> {
        let Some(path) = self.current.take() else {
            return Ok(None);
        };

        let frames_encoded = std::mem::take(&mut self.frames_encoded);
        self.encoder.close()?;

        log::info!("Closed {} ({} frames)", path.display(), frames_encoded);
        Ok(Some(ClosedSegment {
            path,
            frames_encoded,
        }))
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }
}

impl<E: VideoEncoder> Drop for EncoderSession<E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close segment on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EncoderEvent, MockEncoder};

    fn params() -> EncoderParams {
        EncoderParams {
            width: 4,
            height: 2,
            fps: 20,
            bitrate: 1_000_000,
        }
    }

    #[test]
    fn open_encode_close() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("videos");
        let encoder = MockEncoder::new();
        let events = encoder.events();
        let mut session = EncoderSession::new(encoder, params(), output.clone());

        let path = session.open("a.mp4").unwrap().to_path_buf();
        assert_eq!(path, output.join("a.mp4"));
        assert!(output.is_dir());

        session.encode(&[0; 32], 4, 2, Duration::ZERO).unwrap();
        session.encode(&[0; 32], 4, 2, Duration::from_millis(50)).unwrap();
        assert_eq!(session.frames_encoded(), 2);

        let closed = session.close().unwrap().unwrap();
        assert_eq!(closed.frames_encoded, 2);
        assert_eq!(closed.path, path);
        assert!(!session.is_open());

        assert_eq!(events.opens(), vec![path]);
        assert_eq!(events.closes(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = MockEncoder::new();
        let events = encoder.events();
        let mut session = EncoderSession::new(encoder, params(), dir.path().to_path_buf());

        assert_eq!(session.close().unwrap(), None);
        session.open("a.mp4").unwrap();
        assert!(session.close().unwrap().is_some());
        assert_eq!(session.close().unwrap(), None);
        assert_eq!(events.closes(), 1);
    }

    #[test]
    fn encode_requires_open_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = EncoderSession::new(MockEncoder::new(), params(), dir.path().to_path_buf());

        let err = session.encode(&[0; 32], 4, 2, Duration::ZERO).unwrap_err();
        assert_eq!(err, RecorderError::EncoderNotOpen);
    }

    #[test]
    fn reopen_closes_previous_first() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = MockEncoder::new();
        let events = encoder.events();
        let mut session = EncoderSession::new(encoder, params(), dir.path().to_path_buf());

        session.open("a.mp4").unwrap();
        session.open("b.mp4").unwrap();

        let log = events.snapshot();
        assert!(matches!(log[0], EncoderEvent::Open(_)));
        assert_eq!(log[1], EncoderEvent::Close);
        assert!(matches!(log[2], EncoderEvent::Open(_)));
        assert_eq!(events.max_open_sessions(), 1);
    }

    #[test]
    fn failed_open_leaves_session_closed() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = MockEncoder::failing_open();
        let mut session = EncoderSession::new(encoder, params(), dir.path().to_path_buf());

        let err = session.open("a.mp4").unwrap_err();
        assert!(matches!(err, RecorderError::EncoderUnavailable(_)));
        assert!(!session.is_open());
        assert_eq!(session.close().unwrap(), None);
    }

    #[test]
    fn drop_closes_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = MockEncoder::new();
        let events = encoder.events();
        {
            let mut session = EncoderSession::new(encoder, params(), dir.path().to_path_buf());
            session.open("a.mp4").unwrap();
        }
        assert_eq!(events.closes(), 1);
        assert_eq!(events.open_sessions(), 0);
    }
}
