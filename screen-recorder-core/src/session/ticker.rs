use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::session::controller::RecordingController;
use crate::traits::frame_source::FrameSource;
use crate::traits::video_encoder::VideoEncoder;

/// Drives `update_screen` at a fixed cadence from a dedicated thread.
///
/// Stands in for the UI frame clock when the host has none to hook into.
/// Other callers (e.g. a toggle gesture) share the controller through the
/// same mutex.
pub struct CaptureTicker {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureTicker {
    pub fn spawn<F, E>(
        controller: Arc<Mutex<RecordingController<F, E>>>,
        interval: Duration,
    ) -> Result<Self, RecorderError>
    where
        F: FrameSource + 'static,
        E: VideoEncoder + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("capture-ticker".into())
            .spawn(move || {
                let mut next_tick = Instant::now();
                while flag.load(Ordering::SeqCst) {
                    controller.lock().update_screen();

                    next_tick += interval;
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    } else {
                        // Fell behind (e.g. a rotation); don't try to catch up.
                        next_tick = now;
                    }
                }
            })
            .map_err(|e| RecorderError::WorkerFailed(format!("failed to spawn ticker thread: {}", e)))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop ticking and join the thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Capture ticker thread panicked");
            }
        }
    }
}

impl Drop for CaptureTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecorderConfiguration;
    use crate::testing::{wait_until, MockEncoder, PatternSource};

    #[test]
    fn drives_update_screen_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecorderConfiguration {
            output_directory: dir.path().to_path_buf(),
            source_width: 64,
            source_height: 36,
            target_height: 18,
            ..RecorderConfiguration::default()
        };
        let encoder = MockEncoder::new();
        let events = encoder.events();
        let controller = Arc::new(Mutex::new(
            RecordingController::new(config, PatternSource::new(64, 36), encoder).unwrap(),
        ));
        controller.lock().start(false).unwrap();

        let mut ticker = CaptureTicker::spawn(Arc::clone(&controller), Duration::from_millis(5)).unwrap();
        assert!(ticker.is_running());
        assert!(wait_until(Duration::from_secs(5), || events.encodes() >= 3));

        ticker.stop();
        assert!(!ticker.is_running());
        let ticks = controller.lock().diagnostics().ticks;
        thread::sleep(Duration::from_millis(30));
        assert_eq!(controller.lock().diagnostics().ticks, ticks);

        controller.lock().stop(false).unwrap();
        assert_eq!(events.closes(), 1);
    }
}
