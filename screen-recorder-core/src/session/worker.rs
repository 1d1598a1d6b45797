use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::segment::RecorderDiagnostics;
use crate::processing::frame_converter::FrameConverter;
use crate::processing::frame_queue::FrameQueue;
use crate::storage::encoder_session::EncoderSession;
use crate::traits::video_encoder::VideoEncoder;

/// Everything the encoding thread needs exclusive access to.
///
/// Moved into the worker when a session starts and handed back when it is
/// joined, so the controller never touches it while a worker is running.
pub(crate) struct EncoderResources<E: VideoEncoder> {
    pub encoder: EncoderSession<E>,
    pub converter: FrameConverter,
}

/// Handle to the background thread that drains the frame queue into the
/// encoder for one session.
pub(crate) struct EncodingWorker<E: VideoEncoder> {
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<EncoderResources<E>>,
}

impl<E: VideoEncoder + 'static> EncodingWorker<E> {
    pub fn spawn(
        resources: EncoderResources<E>,
        queue: Arc<FrameQueue>,
        diagnostics: Arc<Mutex<RecorderDiagnostics>>,
        session_start: Instant,
        poll_timeout: Duration,
    ) -> Result<Self, RecorderError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("screen-encoder".into())
            .spawn(move || {
                encode_loop(resources, &queue, &diagnostics, &flag, session_start, poll_timeout)
            })
            .map_err(|e| RecorderError::WorkerFailed(format!("failed to spawn encoder thread: {}", e)))?;

        Ok(Self { running, handle })
    }

    /// Ask the worker to exit and wait for it, returning its resources.
    ///
    /// The worker observes the request within one poll timeout, or right
    /// after the frame it is currently encoding.
    pub fn stop(self) -> Result<EncoderResources<E>, RecorderError> {
        self.running.store(false, Ordering::SeqCst);
        self.handle.join().map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".into());
            RecorderError::WorkerFailed(format!("encoder thread panicked: {}", message))
        })
    }
}

fn encode_loop<E: VideoEncoder>(
    mut resources: EncoderResources<E>,
    queue: &FrameQueue,
    diagnostics: &Mutex<RecorderDiagnostics>,
    running: &AtomicBool,
    session_start: Instant,
    poll_timeout: Duration,
) -> EncoderResources<E> {
    log::debug!("Encoder thread started");

    while running.load(Ordering::SeqCst) {
        let Some(frame) = queue.pop_wait(poll_timeout) else {
            continue;
        };

        if !resources.encoder.is_open() {
            diagnostics.lock().frames_discarded += 1;
            continue;
        }

        let (width, height) = resources.converter.target_dimensions();
        let scaled = match resources.converter.convert(&frame) {
            Ok(scaled) => scaled,
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                diagnostics.lock().frames_skipped += 1;
                continue;
            }
        };

        let timestamp = frame.captured_at().saturating_duration_since(session_start);

        match resources.encoder.encode(scaled, width, height, timestamp) {
            Ok(()) => diagnostics.lock().frames_encoded += 1,
            Err(e) => {
                log::warn!("Failed to encode frame at {:?}: {}", timestamp, e);
                diagnostics.lock().frames_skipped += 1;
            }
        }
    }

    log::debug!("Encoder thread exit");
    resources
}
