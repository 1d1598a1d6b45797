use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::frame::CapturedFrame;

/// Result of [`FrameQueue::push`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The frame was queued; `len` is the queue length afterwards.
    Queued { len: usize },
    /// The queue was full and the new frame was dropped.
    Dropped,
}

/// Bounded FIFO of captured frames shared by the capture side and the
/// encoding worker.
///
/// Overflow behavior: the producer never blocks. When the queue is full the
/// newest frame is dropped and the frames already queued are kept.
#[derive(Debug)]
pub struct FrameQueue {
    frames: Mutex<VecDeque<CapturedFrame>>,
    available: Condvar,
    capacity: usize,
}

impl FrameQueue {
    /// `capacity` is clamped to at least one frame.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Insert a frame without blocking.
    pub fn push(&self, frame: CapturedFrame) -> PushOutcome {
        let len = {
            let mut frames = self.frames.lock();
            if frames.len() >= self.capacity {
                return PushOutcome::Dropped;
            }
            frames.push_back(frame);
            frames.len()
        };
        self.available.notify_one();
        PushOutcome::Queued { len }
    }

    /// Remove the oldest frame, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` if the timeout elapsed with the queue still empty.
    pub fn pop_wait(&self, timeout: Duration) -> Option<CapturedFrame> {
        let deadline = Instant::now() + timeout;
        let mut frames = self.frames.lock();
        loop {
            if let Some(frame) = frames.pop_front() {
                return Some(frame);
            }
            if self.available.wait_until(&mut frames, deadline).timed_out() {
                return frames.pop_front();
            }
        }
    }

    /// Discard every queued frame.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::{PixelFormat, Snapshot};
    use std::sync::Arc;
    use std::thread;

    fn frame(marker: u8) -> CapturedFrame {
        let snapshot = Snapshot {
            pixels: vec![marker; 4],
            width: 1,
            height: 1,
            format: PixelFormat::Rgba8888,
        };
        CapturedFrame::new(snapshot, Instant::now()).unwrap()
    }

    fn marker(frame: &CapturedFrame) -> u8 {
        frame.pixels()[0]
    }

    #[test]
    fn pops_in_push_order() {
        let queue = FrameQueue::new(8);
        for i in 0..5 {
            assert_eq!(queue.push(frame(i)), PushOutcome::Queued { len: i as usize + 1 });
        }

        let popped: Vec<u8> = (0..5)
            .map(|_| marker(&queue.pop_wait(Duration::from_millis(1)).unwrap()))
            .collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_newest() {
        let queue = FrameQueue::new(30);
        let mut dropped = 0;
        for i in 0..35 {
            if queue.push(frame(i)) == PushOutcome::Dropped {
                dropped += 1;
            }
        }

        assert_eq!(dropped, 5);
        assert_eq!(queue.len(), 30);

        let popped: Vec<u8> = std::iter::from_fn(|| queue.pop_wait(Duration::ZERO))
            .map(|f| marker(&f))
            .collect();
        assert_eq!(popped, (0..30).collect::<Vec<u8>>());
    }

    #[test]
    fn pop_times_out_when_empty() {
        let queue = FrameQueue::new(4);
        let start = Instant::now();
        assert!(queue.pop_wait(Duration::from_millis(20)).is_none());

        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(20));
        assert!(waited < Duration::from_secs(2));
    }

    #[test]
    fn pop_wakes_on_push() {
        let queue = Arc::new(FrameQueue::new(4));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                let _ = queue.push(frame(42));
            })
        };

        let popped = queue.pop_wait(Duration::from_secs(5));
        producer.join().unwrap();
        assert_eq!(popped.map(|f| marker(&f)), Some(42));
    }

    #[test]
    fn clear_discards_everything() {
        let queue = FrameQueue::new(4);
        let _ = queue.push(frame(1));
        let _ = queue.push(frame(2));
        queue.clear();

        assert!(queue.is_empty());
        assert!(queue.pop_wait(Duration::ZERO).is_none());
        assert_eq!(queue.push(frame(3)), PushOutcome::Queued { len: 1 });
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let queue = FrameQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert_eq!(queue.push(frame(1)), PushOutcome::Queued { len: 1 });
        assert_eq!(queue.push(frame(2)), PushOutcome::Dropped);
    }
}
