pub mod encoder_session;
pub mod file_naming;
pub mod metadata;
