pub mod controller;
pub mod ticker;
pub(crate) mod worker;
