use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::frame::CapturedFrame;
use crate::models::segment::{RecorderDiagnostics, RecordingSession, SegmentSummary};
use crate::models::state::RecordingState;
use crate::processing::frame_converter::FrameConverter;
use crate::processing::frame_queue::{FrameQueue, PushOutcome};
use crate::processing::indicator::{BlinkIndicator, IndicatorColor};
use crate::session::worker::{EncoderResources, EncodingWorker};
use crate::storage::encoder_session::EncoderSession;
use crate::storage::{file_naming, metadata};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::frame_source::FrameSource;
use crate::traits::ui_notifier::UiNotifier;
use crate::traits::video_encoder::VideoEncoder;

/// Screen recording orchestrator.
///
/// Owns the capture cadence, the frame queue and the encoding worker, and
/// rotates output files once a segment reaches the configured duration.
///
/// ```text
/// update_screen() ─▶ [FrameSource] ─▶ [FrameQueue] ─▶ worker: [FrameConverter] ─▶ [EncoderSession]
/// ```
///
/// All methods are meant to be called from a single driving thread (the UI
/// thread). The queue is the only state shared with the worker; the encoder
/// and scratch buffers move into the worker for the lifetime of a session and
/// come back when it is joined.
pub struct RecordingController<F: FrameSource, E: VideoEncoder + 'static> {
    config: RecorderConfiguration,
    source: F,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn UiNotifier>>,
    queue: Arc<FrameQueue>,
    diagnostics: Arc<Mutex<RecorderDiagnostics>>,

    // Present while idle; moved into the worker while recording.
    resources: Option<EncoderResources<E>>,
    worker: Option<EncodingWorker<E>>,
    session: Option<RecordingSession>,

    indicator: BlinkIndicator,
    frame: u64,
    last_file_name: Option<String>,
}

impl<F: FrameSource, E: VideoEncoder + 'static> RecordingController<F, E> {
    pub fn new(config: RecorderConfiguration, source: F, encoder: E) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::ConfigurationFailed)?;

        let converter =
            FrameConverter::new(config.source_width, config.source_height, config.target_height)?;
        let encoder =
            EncoderSession::new(encoder, config.encoder_params(), config.output_directory.clone());

        Ok(Self {
            source,
            clock: Arc::new(SystemClock),
            notifier: None,
            queue: Arc::new(FrameQueue::new(config.queue_capacity)),
            diagnostics: Arc::new(Mutex::new(RecorderDiagnostics::default())),
            resources: Some(EncoderResources { encoder, converter }),
            worker: None,
            session: None,
            indicator: BlinkIndicator::new(config.ui_frequency_hz),
            frame: 0,
            last_file_name: None,
            config,
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_notifier(&mut self, notifier: Arc<dyn UiNotifier>) {
        self.notifier = Some(notifier);
    }

    pub fn state(&self) -> RecordingState {
        if self.session.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    /// The segment currently being written, if any.
    pub fn current_session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    pub fn diagnostics(&self) -> RecorderDiagnostics {
        self.diagnostics.lock().clone()
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    /// Number of frames waiting for the encoder.
    pub fn queued_frames(&self) -> usize {
        self.queue.len()
    }

    /// UI ticks since the last start (or since creation).
    pub fn frame_counter(&self) -> u64 {
        self.frame
    }

    pub fn indicator_color(&self) -> IndicatorColor {
        self.indicator.color()
    }

    /// Start a new segment. No-op while already recording.
    ///
    /// An encoder that fails to open does not abort the start: the session
    /// runs with the indicator on and frames are drained without being
    /// written.
    pub fn start(&mut self, with_cue: bool) -> Result<(), RecorderError> {
        if self.session.is_some() {
            log::debug!("Start requested while already recording");
            return Ok(());
        }

        let mut resources = self.resources.take().ok_or_else(|| {
            RecorderError::WorkerFailed("encoder resources were lost with a previous worker".into())
        })?;

        let started_at = self.clock.now();
        let created_at = self.clock.local_now();
        let file_name = file_naming::unique_segment_file_name(
            &self.config.output_directory,
            &created_at,
            &self.config.container_extension,
            self.last_file_name.as_deref(),
        );
        let path = self.config.output_directory.join(&file_name);

        let encoder_available = match resources.encoder.open(&file_name) {
            Ok(_) => true,
            Err(e) => {
                log::warn!(
                    "Failed to open encoder for {}: {}. Recording without output",
                    path.display(),
                    e
                );
                self.diagnostics.lock().encoder_open_failures += 1;
                false
            }
        };

        self.queue.clear();
        let worker = EncodingWorker::spawn(
            resources,
            Arc::clone(&self.queue),
            Arc::clone(&self.diagnostics),
            started_at,
            self.config.worker_poll_timeout,
        )
        .inspect_err(|e| log::error!("Failed to start recording: {}", e))?;

        self.worker = Some(worker);
        self.session = Some(RecordingSession::new(
            file_name.clone(),
            path,
            started_at,
            created_at,
            encoder_available,
        ));
        self.last_file_name = Some(file_name);
        self.frame = 0;
        self.diagnostics.lock().segments_started += 1;

        let color = self.indicator.start();
        self.notify(|n| n.repaint_indicator(color));
        if with_cue {
            self.notify(|n| n.play_start_cue());
        }

        if let Some(session) = &self.session {
            log::info!("Recording started: {}", session.path.display());
        }
        Ok(())
    }

    /// Stop the current segment. No-op (returns `Ok(None)`) while idle.
    ///
    /// On return the worker has exited, the queue is empty and the encoder
    /// file is closed.
    pub fn stop(&mut self, with_cue: bool) -> Result<Option<SegmentSummary>, RecorderError> {
        let Some(session) = self.session.take() else {
            log::debug!("Stop requested while idle");
            return Ok(None);
        };

        let joined = match self.worker.take() {
            Some(worker) => worker.stop(),
            None => Err(RecorderError::WorkerFailed("no encoder thread for session".into())),
        };
        self.queue.clear();
        let ended_at = self.clock.now();

        let outcome = match joined {
            Ok(mut resources) => {
                let mut frames_encoded = resources.encoder.frames_encoded();
                match resources.encoder.close() {
                    Ok(Some(closed)) => frames_encoded = closed.frames_encoded,
                    Ok(None) => {}
                    Err(e) => log::warn!("Failed to finalize {}: {}", session.path.display(), e),
                }
                self.resources = Some(resources);

                let summary = SegmentSummary::from_session(&session, ended_at, frames_encoded);
                if self.config.write_metadata && session.encoder_available {
                    if let Err(e) = metadata::write_metadata(&summary, &session.path) {
                        log::warn!("Failed to write metadata for {}: {}", session.file_name, e);
                    }
                }
                self.diagnostics.lock().segments_completed += 1;

                log::info!(
                    "Recording stopped: {} ({:.1}s, {} frames)",
                    session.path.display(),
                    summary.duration_secs,
                    summary.frames_encoded
                );
                Ok(Some(summary))
            }
            Err(e) => {
                log::error!("Encoder thread for {} did not exit cleanly: {}", session.file_name, e);
                Err(e)
            }
        };

        let color = self.indicator.stop();
        self.notify(|n| n.repaint_indicator(color));
        if with_cue {
            self.notify(|n| n.play_stop_cue());
        }

        outcome
    }

    /// Start when idle, stop when recording. Plays the matching cue.
    pub fn toggle(&mut self) -> Result<(), RecorderError> {
        if self.is_recording() {
            self.stop(true).map(|_| ())
        } else {
            self.start(true)
        }
    }

    /// Capture tick, called once per UI frame.
    ///
    /// While recording this rotates the segment when it is due, advances the
    /// indicator and queues a snapshot of the display. The frame counter
    /// advances on every tick.
    pub fn update_screen(&mut self) {
        self.diagnostics.lock().ticks += 1;

        let now = self.clock.now();
        let rotation_due = self
            .session
            .as_ref()
            .map(|session| session.elapsed(now) >= self.config.max_segment_duration);

        match rotation_due {
            Some(true) => {
                self.rotate();
                return;
            }
            Some(false) => {
                if let Some(color) = self.indicator.update(self.frame) {
                    self.notify(|n| n.repaint_indicator(color));
                }
                self.capture_frame();
            }
            None => {}
        }

        self.frame = self.frame.wrapping_add(1);
    }

    /// Stop silently when the vehicle goes offroad.
    pub fn handle_offroad_transition(&mut self, offroad: bool) {
        if offroad && self.is_recording() {
            log::info!("Offroad transition, stopping recording");
            if let Err(e) = self.stop(false) {
                log::error!("Failed to stop recording: {}", e);
            }
        }
    }

    fn rotate(&mut self) {
        log::info!(
            "Segment reached {:?}, rotating",
            self.config.max_segment_duration
        );
        let started = Instant::now();

        if let Err(e) = self.stop(false) {
            log::error!("Failed to close segment during rotation: {}", e);
        }
        if let Err(e) = self.start(false) {
            log::error!("Failed to open segment during rotation: {}", e);
        }

        log::debug!("Rotation took {:?}", started.elapsed());
    }

    fn capture_frame(&mut self) {
        let captured = self
            .source
            .capture()
            .and_then(|snapshot| CapturedFrame::new(snapshot, self.clock.now()));

        let frame = match captured {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Screen capture failed: {}", e);
                self.diagnostics.lock().capture_failures += 1;
                return;
            }
        };

        match self.queue.push(frame) {
            PushOutcome::Queued { .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.frames_captured += 1;
                }
                self.diagnostics.lock().frames_captured += 1;
            }
            PushOutcome::Dropped => {
                log::warn!(
                    "Frame queue full ({} frames), dropping newest frame",
                    self.queue.capacity()
                );
                self.diagnostics.lock().frames_dropped += 1;
            }
        }
    }

    fn notify(&self, f: impl FnOnce(&dyn UiNotifier)) {
        if let Some(notifier) = &self.notifier {
            f(notifier.as_ref());
        }
    }
}

impl<F: FrameSource, E: VideoEncoder + 'static> Drop for RecordingController<F, E> {
    fn drop(&mut self) {
        if let Err(e) = self.stop(false) {
            log::error!("Failed to stop recording on shutdown: {}", e);
        }
    }
}
