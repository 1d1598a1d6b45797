/// Color of the on-screen recording indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorColor {
    #[default]
    Idle,
    Lit,
    Dim,
}

impl IndicatorColor {
    /// RGBA components in `0.0..=1.0`.
    pub fn rgba(self) -> [f32; 4] {
        match self {
            Self::Lit => [1.0, 0.0, 0.0, 0.6],
            Self::Dim | Self::Idle => [0.0, 0.0, 0.0, 0.3],
        }
    }
}

/// Blink state of the recording indicator.
///
/// Toggles every half second of UI ticks: lit for the first half of each
/// second, dim for the second half.
#[derive(Debug, Clone)]
pub struct BlinkIndicator {
    ui_frequency: u64,
    color: IndicatorColor,
}

impl BlinkIndicator {
    pub fn new(ui_frequency_hz: u32) -> Self {
        Self {
            ui_frequency: u64::from(ui_frequency_hz.max(1)),
            color: IndicatorColor::Idle,
        }
    }

    /// Advance to UI tick `frame`. Returns the new color when a repaint is due.
    pub fn update(&mut self, frame: u64) -> Option<IndicatorColor> {
        let half = (self.ui_frequency / 2).max(1);
        if frame % half != 0 {
            return None;
        }

        self.color = if frame % self.ui_frequency < half {
            IndicatorColor::Lit
        } else {
            IndicatorColor::Dim
        };
        Some(self.color)
    }

    /// Recording just started: show the lit color right away.
    pub fn start(&mut self) -> IndicatorColor {
        self.color = IndicatorColor::Lit;
        self.color
    }

    pub fn stop(&mut self) -> IndicatorColor {
        self.color = IndicatorColor::Idle;
        self.color
    }

    pub fn color(&self) -> IndicatorColor {
        self.color
    }
}
