use crate::processing::indicator::IndicatorColor;

/// UI hooks invoked by the controller on state transitions.
///
/// All calls are fire-and-forget and happen on the thread that drives the
/// controller. Implementations must not call back into the controller.
pub trait UiNotifier: Send + Sync {
    /// Audio cue for a user-initiated start.
    fn play_start_cue(&self);

    /// Audio cue for a user-initiated stop.
    fn play_stop_cue(&self);

    /// The recording indicator should be repainted with `color`.
    fn repaint_indicator(&self, color: IndicatorColor);
}
