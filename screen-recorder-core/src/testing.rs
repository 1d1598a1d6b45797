//! Test doubles shared by the unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::frame::{PixelFormat, Snapshot};
use crate::processing::indicator::IndicatorColor;
use crate::traits::clock::Clock;
use crate::traits::frame_source::FrameSource;
use crate::traits::ui_notifier::UiNotifier;
use crate::traits::video_encoder::{EncoderParams, VideoEncoder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    Open(PathBuf),
    Encode {
        width: u32,
        height: u32,
        timestamp: Duration,
        marker: u8,
    },
    Close,
}

#[derive(Debug, Default)]
struct EventLog {
    events: Vec<EncoderEvent>,
    open: usize,
    max_open: usize,
}

/// Shared view of everything a [`MockEncoder`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct EncoderEvents(Arc<Mutex<EventLog>>);

impl EncoderEvents {
    pub fn snapshot(&self) -> Vec<EncoderEvent> {
        self.0.lock().events.clone()
    }

    pub fn opens(&self) -> Vec<PathBuf> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                EncoderEvent::Open(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| matches!(e, EncoderEvent::Close))
            .count()
    }

    pub fn encodes(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| matches!(e, EncoderEvent::Encode { .. }))
            .count()
    }

    /// Frame markers grouped by the open call they were encoded under.
    pub fn markers_by_session(&self) -> Vec<Vec<u8>> {
        let mut sessions: Vec<Vec<u8>> = Vec::new();
        for event in self.snapshot() {
            match event {
                EncoderEvent::Open(_) => sessions.push(Vec::new()),
                EncoderEvent::Encode { marker, .. } => {
                    if let Some(current) = sessions.last_mut() {
                        current.push(marker);
                    }
                }
                EncoderEvent::Close => {}
            }
        }
        sessions
    }

    pub fn open_sessions(&self) -> usize {
        self.0.lock().open
    }

    pub fn max_open_sessions(&self) -> usize {
        self.0.lock().max_open
    }
}

/// In-memory [`VideoEncoder`] that records its calls.
pub struct MockEncoder {
    events: EncoderEvents,
    fail_open: bool,
    encode_delay: Duration,
    is_open: bool,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self {
            events: EncoderEvents::default(),
            fail_open: false,
            encode_delay: Duration::ZERO,
            is_open: false,
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }

    /// Make every encode call take `delay`, to back up the queue.
    pub fn with_encode_delay(mut self, delay: Duration) -> Self {
        self.encode_delay = delay;
        self
    }

    pub fn events(&self) -> EncoderEvents {
        self.events.clone()
    }
}

impl VideoEncoder for MockEncoder {
    fn open(&mut self, path: &Path, _params: &EncoderParams) -> Result<(), RecorderError> {
        if self.fail_open {
            return Err(RecorderError::EncoderUnavailable("mock encoder offline".into()));
        }
        let mut log = self.events.0.lock();
        log.events.push(EncoderEvent::Open(path.to_path_buf()));
        log.open += 1;
        log.max_open = log.max_open.max(log.open);
        self.is_open = true;
        Ok(())
    }

    fn encode_frame(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: Duration,
    ) -> Result<(), RecorderError> {
        if !self.is_open {
            return Err(RecorderError::EncoderNotOpen);
        }
        if !self.encode_delay.is_zero() {
            thread::sleep(self.encode_delay);
        }
        self.events.0.lock().events.push(EncoderEvent::Encode {
            width,
            height,
            timestamp,
            marker: rgba.first().copied().unwrap_or_default(),
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        if self.is_open {
            let mut log = self.events.0.lock();
            log.events.push(EncoderEvent::Close);
            log.open -= 1;
            self.is_open = false;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Distance between the colors of consecutive [`PatternSource`] frames.
pub const MARKER_STEP: u64 = 10;

/// Frame source producing solid frames whose color encodes the capture
/// index in steps of [`MARKER_STEP`].
pub struct PatternSource {
    width: u32,
    height: u32,
    captures: Arc<AtomicU64>,
}

impl PatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            captures: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn captures(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.captures)
    }
}

impl FrameSource for PatternSource {
    fn capture(&mut self) -> Result<Snapshot, RecorderError> {
        let index = self.captures.fetch_add(1, Ordering::SeqCst);
        let marker = ((index * MARKER_STEP) % 250) as u8;
        Ok(Snapshot {
            pixels: [marker, marker, marker, 255]
                .repeat(self.width as usize * self.height as usize),
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8888,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierEvent {
    StartCue,
    StopCue,
    Repaint(IndicatorColor),
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: NotifierEvent) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }
}

impl UiNotifier for RecordingNotifier {
    fn play_start_cue(&self) {
        self.events.lock().push(NotifierEvent::StartCue);
    }

    fn play_stop_cue(&self) {
        self.events.lock().push(NotifierEvent::StopCue);
    }

    fn repaint_indicator(&self, color: IndicatorColor) {
        self.events.lock().push(NotifierEvent::Repaint(color));
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    base: Instant,
    base_wall: DateTime<Local>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            base_wall: Local::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn local_now(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(*self.offset.lock()).unwrap_or_default();
        self.base_wall + offset
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(2));
    }
}
