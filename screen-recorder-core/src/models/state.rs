/// Recording controller state machine.
///
/// ```text
/// idle ──start()──▶ recording
///  ▲                   │
///  └──────stop()───────┘
/// ```
///
/// Segment rotation is a `stop` immediately followed by a `start`, so it never
/// shows up as a distinct state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}
