pub mod frame_converter;
pub mod frame_queue;
pub mod indicator;
