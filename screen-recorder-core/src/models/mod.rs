pub mod config;
pub mod error;
pub mod frame;
pub mod segment;
pub mod state;
