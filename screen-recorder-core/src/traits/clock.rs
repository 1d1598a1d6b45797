use std::time::Instant;

use chrono::{DateTime, Local};

/// Time source for the controller.
///
/// Monotonic time drives rotation and frame timestamps; wall-clock time only
/// names output files.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn local_now(&self) -> DateTime<Local>;
}

/// The real clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}
