pub mod clock;
pub mod frame_source;
pub mod ui_notifier;
pub mod video_encoder;
