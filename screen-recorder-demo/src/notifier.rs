use screen_recorder_core::{IndicatorColor, UiNotifier};

/// UiNotifier that writes cues and indicator changes to the log.
pub struct LogNotifier;

impl UiNotifier for LogNotifier {
    fn play_start_cue(&self) {
        log::info!("[cue] recording started");
    }

    fn play_stop_cue(&self) {
        log::info!("[cue] recording stopped");
    }

    fn repaint_indicator(&self, color: IndicatorColor) {
        log::debug!("[indicator] {:?} rgba={:?}", color, color.rgba());
    }
}
